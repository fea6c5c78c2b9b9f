//! Domain logic for homegate.
//!
//! Pure, collaborator-free building blocks: the policy engine, the usage
//! analyzer, the run summary types and the latest-summary store. Nothing in
//! here talks to the router or the network.

pub mod clock;
pub mod error;
pub mod mac;
pub mod period;
pub mod policy;
pub mod state;
pub mod summary;
pub mod types;
pub mod usage;

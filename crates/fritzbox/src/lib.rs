//! Fritz!Box router collaborator.
//!
//! [`RouterClient`] is the capability set the monitor consumes.
//! [`FritzboxClient`] implements it over the router's HTTP interface; with
//! the `fake` feature, [`fake::FakeRouterClient`] implements it in memory
//! for tests.

pub mod client;
pub mod error;
#[cfg(feature = "fake")]
pub mod fake;
pub mod http;
pub mod session;
pub mod types;

pub use client::RouterClient;
pub use error::RouterError;
pub use http::{FritzboxClient, FritzboxConfig};

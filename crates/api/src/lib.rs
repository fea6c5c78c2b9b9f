//! Status server and background monitor loop for `homegate-web`.

pub mod background;
pub mod config;
pub mod router;
pub mod routes;
pub mod state;

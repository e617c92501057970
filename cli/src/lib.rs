//! Terminal host for the QR code dashboard.
//!
//! Supplies what `qrdash-core` leaves to its host: a ureq transport, a
//! credential file, layered configuration and logging.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod store;
pub mod transport;

pub use app::{App, StdinConfirm};
pub use config::Config;
pub use logging::init_logging;

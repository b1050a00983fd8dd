//! Logging setup.
//!
//! The engine logs through the `log` facade only. Hosts that already install a
//! logger can ignore this module; tools and demos call [`init_logging`] once.

mod init;

pub use init::{LoggingConfig, init_logging};

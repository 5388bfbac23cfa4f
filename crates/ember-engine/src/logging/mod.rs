//! Logging utilities.
//!
//! Libraries in this workspace only use the `log` facade; binaries call
//! [`init_logging`] once to install `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};

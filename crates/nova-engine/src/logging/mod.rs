//! Logging setup.
//!
//! Library code only uses the `log` facade; the binary decides the backend
//! through [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig};

//! Syslog backend for the `log` facade.
//!
//! Modules only emit through `log` macros. A host that wants those
//! diagnostics in the system log calls [`init_syslog`] once at startup.

use anyhow::{Result, anyhow};
use log::LevelFilter;
use syslog::{BasicLogger, Facility, Formatter3164};

/// Installs a syslog logger for `process` at `level`.
///
/// # Errors
///
/// Fails if the syslog socket cannot be reached or a logger is already set.
pub fn init_syslog(process: &str, level: LevelFilter) -> Result<()> {
    syslog::unix(Formatter3164 {
        facility: Facility::LOG_USER,
        hostname: None,
        process: process.into(),
        pid: std::process::id(),
    })
    .map_err(|e| anyhow!("{e}"))
    .and_then(|logger| {
        log::set_boxed_logger(Box::new(BasicLogger::new(logger)))
            .map(|_| log::set_max_level(level))
            .map_err(|e| anyhow!("{e}"))
    })
}

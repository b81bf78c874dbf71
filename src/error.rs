//! Error taxonomy shared by every device module.
//!
//! Each variant corresponds to one failure class a host may want to react to
//! differently. [`HalError::errno`] gives the negative errno a C host
//! expects from the module contract.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failure returned by any HAL operation.
#[derive(Error, Debug)]
pub enum HalError {
    /// Caller input is missing or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request is valid but this module, instance or mode does not
    /// implement it.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// The underlying device node could not be opened.
    #[error("no such device {}: {source}", path.display())]
    NoDevice {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The resource exists but could not be reached.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Reading or writing an attribute file failed.
    #[error("attribute {} I/O error: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A transceiver control request was rejected.
    #[error("{request} control request failed: {source}")]
    Negotiation {
        request: &'static str,
        #[source]
        source: io::Error,
    },

    /// The payload write failed or was cut short.
    #[error("transmission failed: {0}")]
    Transmission(String),

    /// A buffer could not be allocated.
    #[error("out of memory")]
    OutOfMemory,
}

/// Result type alias for [`HalError`].
pub type Result<T> = std::result::Result<T, HalError>;

impl HalError {
    /// Builds an [`HalError::Io`] for an attribute path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HalError::Io {
            path: path.into(),
            source,
        }
    }

    /// Negative errno matching the return codes of the C module contract.
    pub fn errno(&self) -> i32 {
        -match self {
            HalError::InvalidArgument(_) => libc::EINVAL,
            HalError::Unsupported(_) => libc::ENOTSUP,
            HalError::NoDevice { .. } => libc::ENODEV,
            HalError::PermissionDenied(_) => libc::EPERM,
            HalError::Io { source, .. } => source.raw_os_error().unwrap_or(libc::EIO),
            HalError::Negotiation { .. } => libc::EBUSY,
            HalError::Transmission(_) => libc::EIO,
            HalError::OutOfMemory => libc::ENOMEM,
        }
    }
}

impl From<std::collections::TryReserveError> for HalError {
    fn from(_: std::collections::TryReserveError) -> Self {
        HalError::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn errno_matches_contract_codes() {
        assert_eq!(HalError::InvalidArgument("x".into()).errno(), -libc::EINVAL);
        assert_eq!(HalError::Unsupported("x".into()).errno(), -libc::ENOTSUP);
        assert_eq!(HalError::PermissionDenied("x".into()).errno(), -libc::EPERM);
        assert_eq!(HalError::OutOfMemory.errno(), -libc::ENOMEM);
        assert_eq!(
            HalError::NoDevice {
                path: "/dev/lirc0".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
            .errno(),
            -libc::ENODEV
        );
    }

    #[test]
    fn io_errno_prefers_os_code() {
        let err = HalError::io("/sys/x", io::Error::from_raw_os_error(libc::EACCES));
        assert_eq!(err.errno(), -libc::EACCES);

        let err = HalError::io("/sys/x", io::Error::new(io::ErrorKind::InvalidData, "nan"));
        assert_eq!(err.errno(), -libc::EIO);
    }

    #[test]
    fn display_names_the_path() {
        let err = HalError::io("/sys/class/leds/x/brightness", io::Error::other("boom"));
        assert!(err.to_string().contains("/sys/class/leds/x/brightness"));
    }
}

//! Integer attribute access for the kernel's sysfs tree.
//!
//! Every brightness attribute holds a single ASCII integer. Reads trim the
//! trailing newline, writes replace the whole value. Nothing is cached here;
//! callers own their caching policy.

use std::{
    fmt::Debug,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

use crate::error::{HalError, Result};

/// Key-value store of integer attributes addressed by path.
#[cfg_attr(test, mockall::automock)]
pub trait AttributeStore: Send + Sync + Debug {
    /// Reads the integer held at `path`.
    fn get_int(&self, path: &Path) -> Result<i32>;

    /// Replaces the value at `path` with `value`.
    fn set_int(&self, path: &Path, value: i32) -> Result<()>;
}

/// [`AttributeStore`] backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysfsStore;

impl AttributeStore for SysfsStore {
    fn get_int(&self, path: &Path) -> Result<i32> {
        let raw = fs::read_to_string(path).map_err(|e| HalError::io(path, e))?;
        raw.trim().parse::<i32>().map_err(|e| {
            HalError::io(
                path,
                io::Error::new(io::ErrorKind::InvalidData, format!("{raw:?}: {e}")),
            )
        })
    }

    /// The attribute must already exist; it is never created.
    fn set_int(&self, path: &Path, value: i32) -> Result<()> {
        OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .and_then(|mut file| file.write_all(format!("{value}\n").as_bytes()))
            .map_err(|e| HalError::io(path, e))
    }
}

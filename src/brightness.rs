//! Brightness domains and the fetch-once maximum cache.
//!
//! Callers speak percent (`0..=100`) or an 8-bit channel (`0..=255`); drivers
//! speak `0..=max` where `max` comes from a `max_brightness` attribute.
//! Conversion truncates toward zero using integer arithmetic, so 100% maps
//! exactly to `max` and 50% of 5 is 2.

use std::{io, path::Path};

use log::debug;
use once_cell::sync::OnceCell;

use crate::{
    error::{HalError, Result},
    sysfs::AttributeStore,
};

/// Highest percentage accepted from callers.
pub const PERCENT_MAX: i32 = 100;

/// Full scale of an 8-bit brightness channel.
pub const CHANNEL_MAX: i32 = 255;

/// Maximum driver brightness, fetched once and then held.
///
/// Concurrent first use is serialized; only one fetch succeeds. A failed
/// fetch (or a negative value) leaves the cell empty so the next call
/// retries.
#[derive(Debug, Default)]
pub struct MaxBrightness(OnceCell<i32>);

impl MaxBrightness {
    pub const fn new() -> Self {
        Self(OnceCell::new())
    }

    /// Cached value, if a fetch has succeeded.
    pub fn get(&self) -> Option<i32> {
        self.0.get().copied()
    }

    /// Returns the cached maximum, reading `path` from `store` on first use.
    pub fn get_or_fetch(&self, store: &dyn AttributeStore, path: &Path) -> Result<i32> {
        self.0
            .get_or_try_init(|| {
                let max = store.get_int(path)?;
                if max < 0 {
                    return Err(HalError::io(
                        path,
                        io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("negative max brightness {max}"),
                        ),
                    ));
                }
                debug!("cached max brightness {max} from {}", path.display());
                Ok(max)
            })
            .copied()
    }
}

/// Scales a percentage into `0..=max`.
///
/// Values outside `0..=100` are rejected before `max` is resolved, so a
/// bad argument never touches the device.
pub fn percent_to_raw<F>(percent: i32, max: F) -> Result<i32>
where
    F: FnOnce() -> Result<i32>,
{
    if !(0..=PERCENT_MAX).contains(&percent) {
        return Err(HalError::InvalidArgument(format!(
            "brightness {percent} outside 0..={PERCENT_MAX}"
        )));
    }
    Ok(scale(percent, PERCENT_MAX, max()?))
}

/// Scales an 8-bit channel into `0..=max`.
pub fn channel_to_raw(channel: u8, max: i32) -> i32 {
    scale(i32::from(channel), CHANNEL_MAX, max)
}

fn scale(value: i32, full: i32, max: i32) -> i32 {
    (i64::from(value) * i64::from(max) / i64::from(full)) as i32
}

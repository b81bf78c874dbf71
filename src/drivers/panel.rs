//! Sysfs brightness control shared by the backlight and display modules.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::error;

use crate::{
    brightness::{MaxBrightness, percent_to_raw},
    error::{HalError, Result},
    sysfs::AttributeStore,
};

/// Brightness attributes of one sysfs backlight class device.
#[derive(Debug, Clone)]
pub struct BacklightPanel {
    brightness: PathBuf,
    max_brightness: PathBuf,
    store: Arc<dyn AttributeStore>,
    max: Arc<MaxBrightness>,
}

impl BacklightPanel {
    /// Panel rooted at a class directory such as `/sys/class/backlight/<dev>`.
    pub fn new(dir: &Path, store: Arc<dyn AttributeStore>, max: Arc<MaxBrightness>) -> Self {
        Self {
            brightness: dir.join("brightness"),
            max_brightness: dir.join("max_brightness"),
            store,
            max,
        }
    }

    /// Raw driver brightness.
    pub fn get_brightness(&self) -> Result<i32> {
        self.store
            .get_int(&self.brightness)
            .inspect_err(|e| error!("fail to get brightness : {e}"))
    }

    pub fn get_max_brightness(&self) -> Result<i32> {
        self.max
            .get_or_fetch(self.store.as_ref(), &self.max_brightness)
            .inspect_err(|e| error!("fail to get max brightness : {e}"))
    }

    /// Scales `percent` into the driver range and writes it.
    pub fn set_brightness(&self, percent: i32) -> Result<()> {
        let value = percent_to_raw(percent, || self.get_max_brightness()).inspect_err(|e| {
            if let HalError::InvalidArgument(_) = e {
                error!("wrong parameter: {e}");
            }
        })?;

        self.store
            .set_int(&self.brightness, value)
            .inspect_err(|e| error!("fail to set brightness : {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysfs::MockAttributeStore;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use std::io;

    const DIR: &str = "/sys/class/backlight/panel";

    fn panel(store: MockAttributeStore) -> BacklightPanel {
        BacklightPanel::new(
            Path::new(DIR),
            Arc::new(store),
            Arc::new(MaxBrightness::new()),
        )
    }

    #[test]
    fn set_scales_with_cached_max() {
        let mut store = MockAttributeStore::new();
        store
            .expect_get_int()
            .withf(|p| p == Path::new(DIR).join("max_brightness"))
            .times(1)
            .returning(|_| Ok(255));
        let written = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = written.clone();
        store
            .expect_set_int()
            .withf(|p, _| p == Path::new(DIR).join("brightness"))
            .times(2)
            .returning(move |_, v| {
                sink.lock().unwrap().push(v);
                Ok(())
            });
        let panel = panel(store);

        panel.set_brightness(50).unwrap();
        panel.set_brightness(100).unwrap();

        assert_eq!(*written.lock().unwrap(), vec![127, 255]);
        assert_eq!(panel.get_max_brightness().unwrap(), 255);
    }

    #[test]
    fn out_of_range_performs_no_io() {
        let mut store = MockAttributeStore::new();
        store.expect_get_int().never();
        store.expect_set_int().never();
        let panel = panel(store);

        assert!(matches!(panel.set_brightness(-1), Err(HalError::InvalidArgument(_))));
        assert!(matches!(panel.set_brightness(101), Err(HalError::InvalidArgument(_))));
    }

    #[test]
    fn max_fetch_failure_skips_write() {
        let mut store = MockAttributeStore::new();
        store
            .expect_get_int()
            .returning(|p| Err(HalError::io(p, io::Error::from(io::ErrorKind::NotFound))));
        store.expect_set_int().never();
        let panel = panel(store);

        assert!(matches!(panel.set_brightness(10), Err(HalError::Io { .. })));
    }

    #[test]
    fn get_returns_raw_value() {
        let mut store = MockAttributeStore::new();
        store
            .expect_get_int()
            .withf(|p| p == Path::new(DIR).join("brightness"))
            .returning(|_| Ok(1234));
        let panel = panel(store);

        assert_eq!(panel.get_brightness().unwrap(), 1234);
    }

    #[test]
    fn writes_truncated_value() {
        let mut store = MockAttributeStore::new();
        store.expect_get_int().returning(|_| Ok(5));
        store
            .expect_set_int()
            .with(eq(Path::new(DIR).join("brightness")), eq(2))
            .times(1)
            .returning(|_, _| Ok(()));
        let panel = panel(store);

        panel.set_brightness(50).unwrap();
    }
}

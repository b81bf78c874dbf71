//! Default backlight module.

use log::error;

use crate::{
    context::HwContext,
    error::{HalError, Result},
    hw_device::{BacklightMode, HwDevice},
    module::{
        DeviceHandle, HARDWARE_INFO_TAG, HARDWARE_INFO_VERSION, ModuleDescriptor, make_version,
        release_handle,
    },
};

use super::panel::BacklightPanel;

pub const BACKLIGHT_HARDWARE_DEVICE_ID: &str = "backlight";
pub const BACKLIGHT_HARDWARE_DEVICE_VERSION: u16 = make_version(0, 1);

pub static BACKLIGHT_MODULE: ModuleDescriptor = ModuleDescriptor {
    magic: HARDWARE_INFO_TAG,
    hal_version: HARDWARE_INFO_VERSION,
    device_version: BACKLIGHT_HARDWARE_DEVICE_VERSION,
    id: BACKLIGHT_HARDWARE_DEVICE_ID,
    name: "Default Backlight",
    author: Some("Jiyoung Yun <jy910.yun@samsung.com>"),
    open: backlight_open,
    close: release_handle,
};

/// Panel backlight. Only manual control is available.
#[derive(Debug)]
pub struct BacklightDevice {
    panel: BacklightPanel,
}

impl HwDevice for BacklightDevice {
    fn get_brightness(&self) -> Result<i32> {
        self.panel.get_brightness()
    }

    fn get_max_brightness(&self) -> Result<i32> {
        self.panel.get_max_brightness()
    }

    fn set_brightness(&self, percent: i32) -> Result<()> {
        self.panel.set_brightness(percent)
    }

    fn get_mode(&self) -> Result<BacklightMode> {
        Ok(BacklightMode::Manual)
    }

    fn set_mode(&self, mode: BacklightMode) -> Result<()> {
        match mode {
            BacklightMode::Manual => Ok(()),
            BacklightMode::Sensor => {
                error!("sensor backlight mode is not supported");
                Err(HalError::Unsupported("sensor backlight mode".into()))
            }
        }
    }
}

fn backlight_open(
    ctx: &HwContext,
    info: &'static ModuleDescriptor,
    _instance: Option<&str>,
) -> Result<DeviceHandle> {
    info.expect_id(BACKLIGHT_HARDWARE_DEVICE_ID)?;

    let panel = BacklightPanel::new(
        &ctx.config().backlight.path,
        ctx.store(),
        ctx.state().backlight_max.clone(),
    );
    Ok(DeviceHandle::new(info, Box::new(BacklightDevice { panel })))
}

//! Default LED module. Only the rear camera flash LED is wired up.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

#[cfg(debug_assertions)]
use log::info;
use log::error;

use crate::{
    brightness::{MaxBrightness, channel_to_raw},
    context::HwContext,
    error::{HalError, Result},
    hw_device::{HwDevice, LedMode, LedState},
    module::{
        DeviceHandle, HARDWARE_INFO_TAG, HARDWARE_INFO_VERSION, ModuleDescriptor, make_version,
        release_handle,
    },
    sysfs::AttributeStore,
};

pub const LED_HARDWARE_DEVICE_ID: &str = "led";
pub const LED_HARDWARE_DEVICE_VERSION: u16 = make_version(0, 1);

/// Instance id of the rear camera flash LED.
pub const LED_ID_CAMERA_BACK: &str = "camera_back";

pub static LED_MODULE: ModuleDescriptor = ModuleDescriptor {
    magic: HARDWARE_INFO_TAG,
    hal_version: HARDWARE_INFO_VERSION,
    device_version: LED_HARDWARE_DEVICE_VERSION,
    id: LED_HARDWARE_DEVICE_ID,
    name: "Default LED",
    author: Some("Jiyoung Yun <jy910.yun@samsung.com>"),
    open: led_open,
    close: release_handle,
};

/// Single-color LED driven through a sysfs `leds` class directory.
#[derive(Debug)]
pub struct LedDevice {
    brightness: PathBuf,
    max_brightness: PathBuf,
    store: Arc<dyn AttributeStore>,
    max: Arc<MaxBrightness>,
}

impl LedDevice {
    fn new(dir: &Path, store: Arc<dyn AttributeStore>, max: Arc<MaxBrightness>) -> Self {
        Self {
            brightness: dir.join("brightness"),
            max_brightness: dir.join("max_brightness"),
            store,
            max,
        }
    }
}

impl HwDevice for LedDevice {
    /// Drives the LED at the brightness carried in the color's top byte.
    /// Blinking is not supported by this LED.
    fn set_led_state(&self, state: &LedState) -> Result<()> {
        if state.mode == LedMode::Blink {
            error!("camera back led does not support blink mode");
            return Err(HalError::Unsupported("blink mode on camera back led".into()));
        }

        let max = self
            .max
            .get_or_fetch(self.store.as_ref(), &self.max_brightness)
            .inspect_err(|e| error!("fail to get max brightness : {e}"))?;
        let value = channel_to_raw(state.brightness_channel(), max);

        #[cfg(debug_assertions)]
        info!("camera back led color {:#010x} -> brightness {value}", state.color);

        self.store
            .set_int(&self.brightness, value)
            .inspect_err(|e| error!("fail to set brightness : {e}"))
    }
}

fn led_open(
    ctx: &HwContext,
    info: &'static ModuleDescriptor,
    instance: Option<&str>,
) -> Result<DeviceHandle> {
    info.expect_id(LED_HARDWARE_DEVICE_ID)?;

    match instance {
        None => Err(HalError::InvalidArgument("led instance id is required".into())),
        Some(LED_ID_CAMERA_BACK) => {
            let device = LedDevice::new(
                &ctx.config().led.camera_back,
                ctx.store(),
                ctx.state().camera_back_max.clone(),
            );
            Ok(DeviceHandle::new(info, Box::new(device)))
        }
        Some(other) => Err(HalError::Unsupported(format!("led instance {other}"))),
    }
}

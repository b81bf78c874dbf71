//! Display module: panel brightness plus DPMS power state.

pub mod dpms;
#[cfg(feature = "x11-dpms")]
pub mod xserver;

use std::sync::Arc;

#[cfg(debug_assertions)]
use log::info;
use log::error;

use crate::{
    context::HwContext,
    error::Result,
    hw_device::{HwDevice, PowerState},
    module::{
        DeviceHandle, HARDWARE_INFO_TAG, HARDWARE_INFO_VERSION, ModuleDescriptor, make_version,
        release_handle,
    },
};

use super::panel::BacklightPanel;
use dpms::DisplayServer;

pub const DISPLAY_HARDWARE_DEVICE_ID: &str = "display";
pub const DISPLAY_HARDWARE_DEVICE_VERSION: u16 = make_version(0, 1);

pub static DISPLAY_MODULE: ModuleDescriptor = ModuleDescriptor {
    magic: HARDWARE_INFO_TAG,
    hal_version: HARDWARE_INFO_VERSION,
    device_version: DISPLAY_HARDWARE_DEVICE_VERSION,
    id: DISPLAY_HARDWARE_DEVICE_ID,
    name: "Display",
    author: None,
    open: display_open,
    close: release_handle,
};

#[derive(Debug)]
pub struct DisplayDevice {
    panel: BacklightPanel,
    server: Arc<dyn DisplayServer>,
}

impl HwDevice for DisplayDevice {
    fn get_brightness(&self) -> Result<i32> {
        self.panel.get_brightness()
    }

    fn get_max_brightness(&self) -> Result<i32> {
        self.panel.get_max_brightness()
    }

    fn set_brightness(&self, percent: i32) -> Result<()> {
        self.panel.set_brightness(percent)
    }

    fn get_power_state(&self) -> Result<PowerState> {
        dpms::query_power_state(self.server.as_ref())
            .inspect_err(|e| error!("fail to get power state : {e}"))
    }

    fn set_power_state(&self, state: PowerState) -> Result<()> {
        #[cfg(debug_assertions)]
        info!("Setting display power state to {state:?}");

        dpms::force_power_state(self.server.as_ref(), state)
            .inspect_err(|e| error!("fail to set power state {state:?} : {e}"))
    }
}

fn display_open(
    ctx: &HwContext,
    info: &'static ModuleDescriptor,
    _instance: Option<&str>,
) -> Result<DeviceHandle> {
    info.expect_id(DISPLAY_HARDWARE_DEVICE_ID)?;

    let panel = BacklightPanel::new(
        &ctx.config().display.path,
        ctx.store(),
        ctx.state().display_max.clone(),
    );
    let device = DisplayDevice {
        panel,
        server: ctx.display_server(),
    };
    Ok(DeviceHandle::new(info, Box::new(device)))
}

//! Infrared transmitter module.

pub mod device_io;
pub mod protocol;
pub mod transmitter;

use crate::{
    context::HwContext,
    error::Result,
    hw_device::HwDevice,
    module::{
        DeviceHandle, HARDWARE_INFO_TAG, HARDWARE_INFO_VERSION, ModuleDescriptor, make_version,
        release_handle,
    },
};

use transmitter::IrTransmitter;

pub const IR_HARDWARE_DEVICE_ID: &str = "ir";
pub const IR_HARDWARE_DEVICE_VERSION: u16 = make_version(0, 1);

pub static IR_MODULE: ModuleDescriptor = ModuleDescriptor {
    magic: HARDWARE_INFO_TAG,
    hal_version: HARDWARE_INFO_VERSION,
    device_version: IR_HARDWARE_DEVICE_VERSION,
    id: IR_HARDWARE_DEVICE_ID,
    name: "ir",
    author: None,
    open: ir_open,
    close: release_handle,
};

/// IR transmitter bound to the context's transceiver.
#[derive(Debug)]
pub struct IrDevice {
    transmitter: IrTransmitter,
}

impl HwDevice for IrDevice {
    /// No hardware probe is performed; the transceiver is opened per call.
    fn is_available(&self) -> Result<bool> {
        Ok(true)
    }

    fn transmit(&self, pattern: &[i32]) -> Result<()> {
        self.transmitter.transmit(pattern)
    }
}

fn ir_open(
    ctx: &HwContext,
    info: &'static ModuleDescriptor,
    _instance: Option<&str>,
) -> Result<DeviceHandle> {
    info.expect_id(IR_HARDWARE_DEVICE_ID)?;

    let transmitter = IrTransmitter::new(ctx.transceiver(), ctx.state().ir_lock.clone());
    Ok(DeviceHandle::new(info, Box::new(IrDevice { transmitter })))
}

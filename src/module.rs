//! Module contract between device modules and their host.
//!
//! Every module exposes one static [`ModuleDescriptor`]. Opening it yields a
//! [`DeviceHandle`] that owns the device's operation set until it is closed
//! or dropped.

use std::{fmt, ops::Deref};

use log::warn;

use crate::{
    context::HwContext,
    error::{HalError, Result},
    hw_device::HwDevice,
};

/// Builds a tag constant from four ASCII bytes, first byte most significant.
pub const fn make_tag(a: u8, b: u8, c: u8, d: u8) -> u32 {
    (a as u32) << 24 | (b as u32) << 16 | (c as u32) << 8 | d as u32
}

/// Encodes a `major.minor` version.
pub const fn make_version(major: u8, minor: u8) -> u16 {
    (major as u16) << 8 | minor as u16
}

/// Tag every descriptor carries.
pub const HARDWARE_INFO_TAG: u32 = make_tag(b'H', b'W', b'I', b'T');

/// Contract version every descriptor carries.
pub const HARDWARE_INFO_VERSION: u16 = make_version(1, 0);

/// Module entry point producing a handle for `instance`.
pub type OpenFn = fn(&HwContext, &'static ModuleDescriptor, Option<&str>) -> Result<DeviceHandle>;

/// Module entry point releasing a handle.
pub type CloseFn = fn(DeviceHandle) -> Result<()>;

/// Identity and entry points of one device module.
pub struct ModuleDescriptor {
    pub magic: u32,
    pub hal_version: u16,
    pub device_version: u16,
    /// Device-type id the module implements.
    pub id: &'static str,
    pub name: &'static str,
    pub author: Option<&'static str>,
    pub open: OpenFn,
    pub close: CloseFn,
}

impl ModuleDescriptor {
    /// Whether the descriptor was built against this contract.
    pub fn is_compatible(&self) -> bool {
        self.magic == HARDWARE_INFO_TAG && self.hal_version == HARDWARE_INFO_VERSION
    }

    /// Opens an instance through the module's own entry point.
    pub fn open_device(
        &'static self,
        ctx: &HwContext,
        instance: Option<&str>,
    ) -> Result<DeviceHandle> {
        if !self.is_compatible() {
            return Err(HalError::Unsupported(format!(
                "module {} has tag {:#010x} version {:#06x}",
                self.id, self.magic, self.hal_version
            )));
        }
        (self.open)(ctx, self, instance)
    }

    /// Rejects descriptors for a device type other than `expected`.
    pub(crate) fn expect_id(&self, expected: &str) -> Result<()> {
        if self.id == expected {
            Ok(())
        } else {
            Err(HalError::Unsupported(format!(
                "module {expected} cannot open device type {}",
                self.id
            )))
        }
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("magic", &format_args!("{:#010x}", self.magic))
            .field("hal_version", &format_args!("{:#06x}", self.hal_version))
            .field("device_version", &format_args!("{:#06x}", self.device_version))
            .field("id", &self.id)
            .field("name", &self.name)
            .field("author", &self.author)
            .finish_non_exhaustive()
    }
}

/// Open device returned by a module's `open`.
///
/// Dereferences to the device's operation set. Consumed by
/// [`DeviceHandle::close`]; a handle that is dropped instead is released
/// the same way.
#[derive(Debug)]
pub struct DeviceHandle {
    info: &'static ModuleDescriptor,
    device: Box<dyn HwDevice>,
    released: bool,
}

impl DeviceHandle {
    pub fn new(info: &'static ModuleDescriptor, device: Box<dyn HwDevice>) -> Self {
        Self {
            info,
            device,
            released: false,
        }
    }

    /// Descriptor of the module that opened this handle.
    pub fn info(&self) -> &'static ModuleDescriptor {
        self.info
    }

    /// Closes the handle through its module's `close` entry point.
    pub fn close(self) -> Result<()> {
        (self.info.close)(self)
    }
}

impl Deref for DeviceHandle {
    type Target = dyn HwDevice;

    fn deref(&self) -> &Self::Target {
        self.device.as_ref()
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.device.release() {
                warn!("Failed to release {} handle: {e}", self.info.id);
            }
        }
    }
}

/// Default `close` entry point: releases the device once and frees the
/// handle.
pub fn release_handle(mut handle: DeviceHandle) -> Result<()> {
    handle.released = true;
    handle.device.release()
}

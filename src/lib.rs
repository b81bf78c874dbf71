//! # device-node
//!
//! Hardware abstraction modules for panel backlight, display power, the
//! camera flash LED and the infrared transmitter.
//!
//! ## Features
//!
//! - **Backlight / Display**: percent brightness over sysfs `backlight` attributes
//! - **Display Power**: DPMS power state through the display server (`x11-dpms`)
//! - **LED**: camera flash brightness from an ARGB color
//! - **IR**: pulse-pattern transmission over a LIRC character device
//! - **Configurable Paths**: YAML configuration with built-in defaults
//!
//! ## Architecture
//!
//! - [`ModuleDescriptor`](module::ModuleDescriptor) - static identity and entry points of a module
//! - [`DeviceHandle`](module::DeviceHandle) - open device, dereferences to [`HwDevice`](hw_device::HwDevice)
//! - [`HwContext`](context::HwContext) - backends and per-module state shared by handles
//! - [`Registry`](registry::Registry) - device-type id to module lookup
//!
//! ## Example
//!
//! ```no_run
//! use device_node::{hw_device::PowerState, registry::Registry};
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = Registry::from_config(None)?;
//!
//!     let display = registry.open("display", None)?;
//!     display.set_brightness(80)?;
//!     display.set_power_state(PowerState::On)?;
//!     display.close()?;
//!
//!     let ir = registry.open("ir", None)?;
//!     ir.transmit(&[38000, 9000, 4500, 560, 560])?;
//!     Ok(())
//! }
//! ```

pub mod brightness;
pub mod config;
pub mod context;
pub mod drivers;
pub mod error;
pub mod hw_device;
pub mod logging;
pub mod module;
pub mod registry;
pub mod sysfs;

pub use error::{HalError, Result};

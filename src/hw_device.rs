//! Device capability trait and the values that flow through it.

use serde::{Deserialize, Serialize};

use crate::error::{HalError, Result};

/// Backlight control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BacklightMode {
    /// Brightness is set explicitly by the caller.
    Manual,
    /// Brightness follows an ambient light sensor.
    Sensor,
}

/// Display power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerState {
    On,
    Standby,
    Suspend,
    Off,
}

impl PowerState {
    pub const ALL: [PowerState; 4] = [
        PowerState::On,
        PowerState::Standby,
        PowerState::Suspend,
        PowerState::Off,
    ];
}

impl TryFrom<i32> for PowerState {
    type Error = HalError;

    /// Accepts the raw contract values `0..=3`.
    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(PowerState::On),
            1 => Ok(PowerState::Standby),
            2 => Ok(PowerState::Suspend),
            3 => Ok(PowerState::Off),
            other => Err(HalError::InvalidArgument(format!(
                "unknown display power state {other}"
            ))),
        }
    }
}

impl From<PowerState> for i32 {
    fn from(state: PowerState) -> Self {
        match state {
            PowerState::On => 0,
            PowerState::Standby => 1,
            PowerState::Suspend => 2,
            PowerState::Off => 3,
        }
    }
}

/// LED drive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LedMode {
    /// Steady output at the requested brightness.
    #[default]
    Normal,
    /// Alternate on/off using the duty fields of [`LedState`].
    Blink,
}

/// Requested LED output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedState {
    pub mode: LedMode,

    /// ARGB color. The top byte is the brightness channel.
    pub color: u32,

    /// Blink on time in milliseconds.
    #[serde(default)]
    pub duty_on: u32,

    /// Blink off time in milliseconds.
    #[serde(default)]
    pub duty_off: u32,
}

impl LedState {
    /// Steady output with the given color.
    pub fn normal(color: u32) -> Self {
        Self {
            mode: LedMode::Normal,
            color,
            ..Default::default()
        }
    }

    /// Brightness channel carried in the top 8 bits of the color.
    pub fn brightness_channel(&self) -> u8 {
        (self.color >> 24) as u8
    }
}

/// Operation set bound to an open device handle.
///
/// Each device type overrides the subset it implements; every other
/// operation reports [`HalError::Unsupported`].
pub trait HwDevice: Send + Sync + core::fmt::Debug {
    /// Reads the raw driver brightness.
    fn get_brightness(&self) -> Result<i32> {
        Err(unsupported("get_brightness"))
    }

    /// Returns the driver's maximum brightness.
    fn get_max_brightness(&self) -> Result<i32> {
        Err(unsupported("get_max_brightness"))
    }

    /// Sets brightness from a percentage in `0..=100`.
    fn set_brightness(&self, _percent: i32) -> Result<()> {
        Err(unsupported("set_brightness"))
    }

    fn get_mode(&self) -> Result<BacklightMode> {
        Err(unsupported("get_mode"))
    }

    fn set_mode(&self, _mode: BacklightMode) -> Result<()> {
        Err(unsupported("set_mode"))
    }

    fn get_power_state(&self) -> Result<PowerState> {
        Err(unsupported("get_power_state"))
    }

    fn set_power_state(&self, _state: PowerState) -> Result<()> {
        Err(unsupported("set_power_state"))
    }

    fn set_led_state(&self, _state: &LedState) -> Result<()> {
        Err(unsupported("set_led_state"))
    }

    fn is_available(&self) -> Result<bool> {
        Err(unsupported("is_available"))
    }

    /// Sends an IR pattern: carrier frequency followed by pulse/space
    /// durations in microseconds.
    fn transmit(&self, _pattern: &[i32]) -> Result<()> {
        Err(unsupported("transmit"))
    }

    /// Releases resources held by the device. Called once when its handle
    /// is closed.
    fn release(&self) -> Result<()> {
        Ok(())
    }
}

fn unsupported(op: &str) -> HalError {
    HalError::Unsupported(format!("{op} is not implemented by this device"))
}

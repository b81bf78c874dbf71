//! Display power management over a display-server connection.
//!
//! The display module talks to the server only through [`DisplayServer`]
//! so hosts without an X server (and tests) can plug in their own backend.

use std::{fmt::Debug, sync::Arc};

use log::warn;

use crate::{
    error::{HalError, Result},
    hw_device::PowerState,
};

/// DPMS power level as carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum DpmsLevel {
    On = 0,
    Standby = 1,
    Suspend = 2,
    Off = 3,
}

impl DpmsLevel {
    /// Level for a raw server value. Unknown values read as `Off`.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => DpmsLevel::On,
            1 => DpmsLevel::Standby,
            2 => DpmsLevel::Suspend,
            3 => DpmsLevel::Off,
            other => {
                warn!("Unknown DPMS level {other}, treating as off");
                DpmsLevel::Off
            }
        }
    }

    pub fn raw(self) -> u16 {
        self as u16
    }
}

impl From<PowerState> for DpmsLevel {
    fn from(state: PowerState) -> Self {
        match state {
            PowerState::On => DpmsLevel::On,
            PowerState::Standby => DpmsLevel::Standby,
            PowerState::Suspend => DpmsLevel::Suspend,
            PowerState::Off => DpmsLevel::Off,
        }
    }
}

impl From<DpmsLevel> for PowerState {
    fn from(level: DpmsLevel) -> Self {
        match level {
            DpmsLevel::On => PowerState::On,
            DpmsLevel::Standby => PowerState::Standby,
            DpmsLevel::Suspend => PowerState::Suspend,
            DpmsLevel::Off => PowerState::Off,
        }
    }
}

/// Open connection to the display server. Dropping it disconnects.
pub trait DpmsConnection {
    /// Whether the server has the DPMS extension.
    fn query_extension(&mut self) -> bool;

    /// Whether the display supports power management.
    fn capable(&mut self) -> bool;

    /// Current power level.
    fn info(&mut self) -> Result<DpmsLevel>;

    fn enable(&mut self) -> Result<()>;

    fn force_level(&mut self, level: DpmsLevel) -> Result<()>;
}

/// Connects to the default display server.
pub trait DisplayServer: Send + Sync + Debug {
    /// # Errors
    ///
    /// [`HalError::PermissionDenied`] if no connection can be made.
    fn connect(&self) -> Result<Box<dyn DpmsConnection>>;
}

/// Backend for builds without a display-server client.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDisplayServer;

impl DisplayServer for NoDisplayServer {
    fn connect(&self) -> Result<Box<dyn DpmsConnection>> {
        Err(HalError::PermissionDenied(
            "no display server backend available".into(),
        ))
    }
}

/// Backend used when the host supplies none.
pub fn system_display_server() -> Arc<dyn DisplayServer> {
    #[cfg(feature = "x11-dpms")]
    {
        Arc::new(super::xserver::X11DisplayServer)
    }
    #[cfg(not(feature = "x11-dpms"))]
    {
        Arc::new(NoDisplayServer)
    }
}

/// Reads the power state, defaulting to `Off` when the server cannot say.
pub fn query_power_state(server: &dyn DisplayServer) -> Result<PowerState> {
    let mut conn = server.connect()?;

    if !conn.query_extension() {
        warn!("Display server has no DPMS extension");
        return Ok(PowerState::Off);
    }
    if !conn.capable() {
        warn!("Display is not DPMS capable");
        return Ok(PowerState::Off);
    }

    match conn.info() {
        Ok(level) => Ok(level.into()),
        Err(e) => {
            warn!("Failed to read DPMS level: {e}");
            Ok(PowerState::Off)
        }
    }
}

/// Enables power management and forces the level for `state`.
pub fn force_power_state(server: &dyn DisplayServer, state: PowerState) -> Result<()> {
    let level = DpmsLevel::from(state);
    let mut conn = server.connect()?;

    conn.enable()?;
    conn.force_level(level)
}

//! DPMS over an Xlib connection to the default display.

use std::ptr::{self, NonNull};

use log::error;
use x11::{
    dpms,
    xlib::{self, Display},
    xmd::{BOOL, CARD16},
};

use super::dpms::{DisplayServer, DpmsConnection, DpmsLevel};
use crate::error::{HalError, Result};

/// Opens `$DISPLAY` through Xlib on every connect.
#[derive(Debug, Default, Clone, Copy)]
pub struct X11DisplayServer;

impl DisplayServer for X11DisplayServer {
    fn connect(&self) -> Result<Box<dyn DpmsConnection>> {
        // SAFETY: a null name selects `$DISPLAY`; the returned display is
        // closed by `X11Connection::drop`.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };

        match NonNull::new(display) {
            Some(display) => Ok(Box::new(X11Connection { display })),
            None => {
                let name = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
                error!("XOpenDisplay failed; DISPLAY={name}");
                Err(HalError::PermissionDenied(format!(
                    "cannot open display {name}"
                )))
            }
        }
    }
}

struct X11Connection {
    display: NonNull<Display>,
}

impl DpmsConnection for X11Connection {
    fn query_extension(&mut self) -> bool {
        let (mut event_base, mut error_base) = (0, 0);
        // SAFETY: `display` is open for the lifetime of `self`.
        unsafe {
            dpms::DPMSQueryExtension(self.display.as_ptr(), &mut event_base, &mut error_base) != 0
        }
    }

    fn capable(&mut self) -> bool {
        // SAFETY: as above.
        unsafe { dpms::DPMSCapable(self.display.as_ptr()) != 0 }
    }

    fn info(&mut self) -> Result<DpmsLevel> {
        let mut level: CARD16 = DpmsLevel::Off.raw();
        let mut enabled: BOOL = 0;
        // SAFETY: as above; both out-pointers reference live locals.
        let ok = unsafe { dpms::DPMSInfo(self.display.as_ptr(), &mut level, &mut enabled) };
        if ok == 0 {
            return Err(HalError::Unsupported("DPMSInfo failed".into()));
        }
        Ok(DpmsLevel::from_raw(level))
    }

    fn enable(&mut self) -> Result<()> {
        // SAFETY: as above.
        if unsafe { dpms::DPMSEnable(self.display.as_ptr()) } == 0 {
            return Err(HalError::Unsupported("DPMSEnable failed".into()));
        }
        Ok(())
    }

    fn force_level(&mut self, level: DpmsLevel) -> Result<()> {
        // SAFETY: as above.
        if unsafe { dpms::DPMSForceLevel(self.display.as_ptr(), level.raw()) } == 0 {
            return Err(HalError::Unsupported(format!(
                "DPMSForceLevel {level:?} failed"
            )));
        }
        // SAFETY: as above.
        unsafe { xlib::XFlush(self.display.as_ptr()) };
        Ok(())
    }
}

impl Drop for X11Connection {
    fn drop(&mut self) {
        // SAFETY: the display was opened by `connect` and is not used again.
        unsafe { xlib::XCloseDisplay(self.display.as_ptr()) };
    }
}

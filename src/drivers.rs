//! Built-in device modules.

pub mod backlight;
pub mod display;
pub mod ir;
pub mod led;
pub mod panel;

use crate::module::ModuleDescriptor;

/// Every module compiled into the crate.
pub static BUILTIN_MODULES: [&ModuleDescriptor; 4] = [
    &backlight::BACKLIGHT_MODULE,
    &display::DISPLAY_MODULE,
    &led::LED_MODULE,
    &ir::IR_MODULE,
];

//! Shared module context.
//!
//! Holds what modules need beyond the caller's arguments: configured paths,
//! the attribute store, the IR transceiver opener, the display server
//! connector, and the per-module state that outlives individual handles
//! (cached maxima, the transceiver lock).

use std::sync::{Arc, Mutex};

use crate::{
    brightness::MaxBrightness,
    config::HalConfig,
    drivers::{
        display::dpms::{self, DisplayServer},
        ir::device_io::{LircOpener, TransceiverOpener},
    },
    sysfs::{AttributeStore, SysfsStore},
};

/// State kept per module for the lifetime of the context.
#[derive(Debug, Default)]
pub struct ModuleState {
    pub backlight_max: Arc<MaxBrightness>,
    pub display_max: Arc<MaxBrightness>,
    pub camera_back_max: Arc<MaxBrightness>,
    /// Serializes transmissions on the IR transceiver.
    pub ir_lock: Arc<Mutex<()>>,
}

/// Environment handed to every module's `open`.
///
/// Cloning is cheap and clones share the same [`ModuleState`].
#[derive(Debug, Clone)]
pub struct HwContext {
    config: Arc<HalConfig>,
    store: Arc<dyn AttributeStore>,
    transceiver: Arc<dyn TransceiverOpener>,
    display_server: Arc<dyn DisplayServer>,
    state: Arc<ModuleState>,
}

impl HwContext {
    /// Context over the real sysfs tree, LIRC device and display server.
    pub fn new(config: HalConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: HalConfig) -> HwContextBuilder {
        HwContextBuilder::new(config)
    }

    pub fn config(&self) -> &HalConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn AttributeStore> {
        self.store.clone()
    }

    pub fn transceiver(&self) -> Arc<dyn TransceiverOpener> {
        self.transceiver.clone()
    }

    pub fn display_server(&self) -> Arc<dyn DisplayServer> {
        self.display_server.clone()
    }

    pub fn state(&self) -> &ModuleState {
        &self.state
    }
}

/// Builder for [`HwContext`], letting hosts and tests swap the backends.
pub struct HwContextBuilder {
    config: HalConfig,
    store: Option<Arc<dyn AttributeStore>>,
    transceiver: Option<Arc<dyn TransceiverOpener>>,
    display_server: Option<Arc<dyn DisplayServer>>,
}

impl HwContextBuilder {
    fn new(config: HalConfig) -> Self {
        Self {
            config,
            store: None,
            transceiver: None,
            display_server: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn AttributeStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_transceiver(mut self, transceiver: Arc<dyn TransceiverOpener>) -> Self {
        self.transceiver = Some(transceiver);
        self
    }

    pub fn with_display_server(mut self, display_server: Arc<dyn DisplayServer>) -> Self {
        self.display_server = Some(display_server);
        self
    }

    pub fn build(self) -> HwContext {
        let transceiver = self
            .transceiver
            .unwrap_or_else(|| Arc::new(LircOpener::new(self.config.ir.device.clone())));

        HwContext {
            store: self.store.unwrap_or_else(|| Arc::new(SysfsStore)),
            transceiver,
            display_server: self.display_server.unwrap_or_else(dpms::system_display_server),
            state: Arc::new(ModuleState::default()),
            config: Arc::new(self.config),
        }
    }
}

//! In-process module registry.
//!
//! Maps device-type ids to module descriptors and owns the [`HwContext`]
//! every module is opened with.

use std::{collections::HashMap, path::PathBuf};

use anyhow::Context;
#[cfg(debug_assertions)]
use log::info;
use log::{error, warn};

use crate::{
    config::HalConfig,
    context::HwContext,
    drivers::BUILTIN_MODULES,
    error::{HalError, Result},
    module::{DeviceHandle, ModuleDescriptor},
};

#[derive(Debug)]
pub struct Registry {
    ctx: HwContext,
    modules: HashMap<&'static str, &'static ModuleDescriptor>,
}

impl Registry {
    /// Registry holding every built-in module.
    pub fn new(ctx: HwContext) -> Self {
        let mut registry = Self::empty(ctx);
        for module in BUILTIN_MODULES {
            // Built-in descriptors always carry the current tag and version.
            if let Err(e) = registry.register(module) {
                error!("{e}");
            }
        }
        registry
    }

    /// Registry without any module.
    pub fn empty(ctx: HwContext) -> Self {
        Self {
            ctx,
            modules: HashMap::new(),
        }
    }

    /// Loads [`HalConfig`] (see [`HalConfig::load`]) and builds a registry
    /// over the real devices.
    pub fn from_config(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = HalConfig::load(path).context("Failed to load device-node configuration")?;
        Ok(Self::new(HwContext::new(config)))
    }

    /// Adds `module` under its device-type id, replacing any module already
    /// registered for that id.
    ///
    /// # Errors
    ///
    /// [`HalError::Unsupported`] if the descriptor's tag or contract version
    /// does not match.
    pub fn register(&mut self, module: &'static ModuleDescriptor) -> Result<()> {
        if !module.is_compatible() {
            return Err(HalError::Unsupported(format!(
                "module {} ({}) has an incompatible descriptor",
                module.id, module.name
            )));
        }

        if let Some(previous) = self.modules.insert(module.id, module) {
            warn!(
                "Module {} replaces {} for device type {}",
                module.name, previous.name, module.id
            );
        }

        #[cfg(debug_assertions)]
        info!("Registered module {} for device type {}", module.name, module.id);

        Ok(())
    }

    /// Descriptor registered for `id`.
    pub fn descriptor(&self, id: &str) -> Result<&'static ModuleDescriptor> {
        self.modules
            .get(id)
            .copied()
            .ok_or_else(|| HalError::Unsupported(format!("no module for device type {id}")))
    }

    /// Registered descriptors, sorted by device-type id.
    pub fn modules(&self) -> Vec<&'static ModuleDescriptor> {
        let mut modules: Vec<_> = self.modules.values().copied().collect();
        modules.sort_by_key(|m| m.id);
        modules
    }

    /// Opens `instance` (if the device type has instances) of device type
    /// `id`.
    pub fn open(&self, id: &str, instance: Option<&str>) -> Result<DeviceHandle> {
        self.descriptor(id)?
            .open_device(&self.ctx, instance)
            .inspect_err(|e| error!("Failed to open {id}: {e}"))
    }

    pub fn context(&self) -> &HwContext {
        &self.ctx
    }
}

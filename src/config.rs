//! Configuration for device-node modules.
//!
//! Holds the sysfs attribute directories and device nodes each module talks
//! to. Every field has a built-in default, so a missing file is not an
//! error: the modules then use the paths of the reference board.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Only supported configuration format version.
pub const CONFIG_VERSION: u8 = 1;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "DEVICE_NODE_CONFIG";

/// Main configuration structure for device-node modules.
///
/// # Example
///
/// ```yaml
/// version: 1
/// backlight:
///   path: /sys/class/backlight/intel_backlight
/// display:
///   path: /sys/class/backlight/s6e3ha2
/// led:
///   camera_back: /sys/class/leds/ktd2692-flash
/// ir:
///   device: /dev/lirc0
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalConfig {
    /// Configuration version for compatibility checking.
    pub version: u8,

    #[serde(default)]
    pub backlight: BacklightCfg,

    #[serde(default)]
    pub display: DisplayCfg,

    #[serde(default)]
    pub led: LedCfg,

    #[serde(default)]
    pub ir: IrCfg,
}

/// Backlight module: sysfs class directory of the panel backlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklightCfg {
    #[serde(default = "defaults::backlight_path")]
    pub path: PathBuf,
}

/// Display module: sysfs class directory of the display backlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayCfg {
    #[serde(default = "defaults::display_path")]
    pub path: PathBuf,
}

/// LED module: one sysfs directory per supported instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedCfg {
    #[serde(default = "defaults::camera_back_path")]
    pub camera_back: PathBuf,
}

/// IR module: transceiver control device node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrCfg {
    #[serde(default = "defaults::ir_device")]
    pub device: PathBuf,
}

mod defaults {
    use std::path::PathBuf;

    pub fn backlight_path() -> PathBuf {
        PathBuf::from("/sys/class/backlight/s6e8aa0-bl")
    }

    pub fn display_path() -> PathBuf {
        PathBuf::from("/sys/class/backlight/s6e3ha2")
    }

    pub fn camera_back_path() -> PathBuf {
        PathBuf::from("/sys/class/leds/ktd2692-flash")
    }

    pub fn ir_device() -> PathBuf {
        PathBuf::from("/dev/lirc0")
    }
}

impl Default for BacklightCfg {
    fn default() -> Self {
        Self {
            path: defaults::backlight_path(),
        }
    }
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            path: defaults::display_path(),
        }
    }
}

impl Default for LedCfg {
    fn default() -> Self {
        Self {
            camera_back: defaults::camera_back_path(),
        }
    }
}

impl Default for IrCfg {
    fn default() -> Self {
        Self {
            device: defaults::ir_device(),
        }
    }
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            backlight: BacklightCfg::default(),
            display: DisplayCfg::default(),
            led: LedCfg::default(),
            ir: IrCfg::default(),
        }
    }
}

impl HalConfig {
    /// Validates the configuration for consistency.
    ///
    /// # Example
    ///
    /// ```
    /// use device_node::config::HalConfig;
    ///
    /// HalConfig::default().validate()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            anyhow::bail!("Unsupported config version {}", self.version);
        }

        let paths = [
            ("backlight.path", &self.backlight.path),
            ("display.path", &self.display.path),
            ("led.camera_back", &self.led.camera_back),
            ("ir.device", &self.ir.device),
        ];
        for (key, path) in paths {
            if path.as_os_str().is_empty() {
                anyhow::bail!("'{key}' cannot be empty");
            }
        }

        Ok(())
    }

    /// Loads configuration from a file or the standard locations.
    ///
    /// Searches in the following order:
    /// 1. Provided path parameter
    /// 2. `DEVICE_NODE_CONFIG` environment variable
    /// 3. `$XDG_CONFIG_HOME/device-node/config.yml` or `~/.config/device-node/config.yml`
    /// 4. `/etc/device-node/config.yml`
    ///
    /// Falls back to [`HalConfig::default`] when no file is found. An explicit
    /// path that cannot be read is an error.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let Some(config_path) = path.or_else(locate_config) else {
            info!("No configuration file found, using built-in device paths");
            return Ok(Self::default());
        };

        info!("Loading config from: {}", config_path.display());
        Self::load_from_path(&config_path)
    }

    /// Loads and validates configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: HalConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Configuration validation failed for: {}", path.display()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    ///
    /// Writes to a temporary sibling first and renames it into place.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let config_yaml =
            serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        let tmp_path = path.with_extension("yml.tmp");
        fs::write(&tmp_path, config_yaml).with_context(|| {
            format!("Failed to write temporary config to {}", tmp_path.display())
        })?;

        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move config to {}", path.display()))?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }
}

fn locate_config() -> Option<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }

    if let Some(mut cfg_dir) = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|h| Path::new(&h).join(".config")))
    {
        cfg_dir.push("device-node/config.yml");
        if cfg_dir.exists() {
            return Some(cfg_dir);
        }
    }

    let etc = Path::new("/etc/device-node/config.yml");
    etc.exists().then(|| etc.to_path_buf())
}

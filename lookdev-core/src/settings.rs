//! Last-used rig settings, cached as JSON between runs.
//!
//! Best effort both ways: a missing or unreadable cache yields defaults and a
//! failed write is only logged.

use std::path::{Path, PathBuf};

use crate::config::RigConfig;
use crate::error::Result;

pub const SETTINGS_FILE: &str = "lookdev_rig_settings.json";
/// Environment variable naming the preferences directory.
pub const PREF_DIR_ENV: &str = "LOOKDEV_USER_PREF_DIR";

#[derive(Debug, Clone)]
pub struct SettingsCache {
    path: PathBuf,
}

impl SettingsCache {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SETTINGS_FILE),
        }
    }

    /// `$LOOKDEV_USER_PREF_DIR`, else the working directory.
    pub fn from_env() -> Self {
        let dir = std::env::var_os(PREF_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::in_dir(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<RigConfig> {
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn load(&self) -> RigConfig {
        match self.try_load() {
            Ok(cfg) => {
                log::debug!("loaded settings from {}", self.path.display());
                cfg
            }
            Err(e) => {
                log::debug!("no usable settings at {} ({e}); using defaults", self.path.display());
                RigConfig::default()
            }
        }
    }

    pub fn try_save(&self, cfg: &RigConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(cfg)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn save(&self, cfg: &RigConfig) {
        if let Err(e) = self.try_save(cfg) {
            log::warn!("could not save settings to {}: {e}", self.path.display());
        }
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};

pub const DEFAULT_START_FRAME: i32 = 1001;
/// Highest accepted start frame; the whole orbit and unwind must fit after it.
pub const MAX_START_FRAME: i32 = 100_000;

/// Everything the user chooses for one rig build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub hdri_path: PathBuf,
    /// Initial orbit angle, degrees.
    pub rotation_offset: f64,
    /// Default for the control node's HDRI rotation offset, degrees.
    pub hdri_rotation_offset: f64,
    pub sweep_enabled: bool,
    #[serde(alias = "add_refkit")]
    pub add_reference_kit: bool,
    /// Colour chart texture; not checked before it is bound.
    pub macbeth_path: PathBuf,
    pub start_frame: i32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            hdri_path: PathBuf::new(),
            rotation_offset: 0.0,
            hdri_rotation_offset: 0.0,
            sweep_enabled: true,
            add_reference_kit: true,
            macbeth_path: PathBuf::new(),
            start_frame: DEFAULT_START_FRAME,
        }
    }
}

impl RigConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_file(&self.hdri_path) {
            return Err(RigError::InvalidHdriPath(self.hdri_path.clone()));
        }
        check_start_frame(self.start_frame)
    }

    pub fn macbeth_texture(&self) -> String {
        self.macbeth_path.to_string_lossy().into_owned()
    }

    pub fn hdri_map(&self) -> String {
        self.hdri_path.to_string_lossy().into_owned()
    }
}

/// Start frames must lie in `1..=MAX_START_FRAME`.
pub fn check_start_frame(start_frame: i32) -> Result<()> {
    if (1..=MAX_START_FRAME).contains(&start_frame) {
        Ok(())
    } else {
        Err(RigError::InvalidStartFrame(start_frame))
    }
}

fn is_file(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_file()
}

//! Rig configuration: YAML in, validated [`RigConfig`] out.

pub mod schema;

use anyhow::{Context, Result};
pub use schema::RigConfig;

pub fn load_from_yaml_str(s: &str) -> Result<RigConfig> {
    let cfg: RigConfig = serde_yaml::from_str(s)?;
    Ok(cfg)
}

pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<RigConfig> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    load_from_yaml_str(&data).with_context(|| format!("parsing {}", path.display()))
}

//! Procedural turntable look-dev rig.
//!
//! Measure a subject, plan an orbiting camera, a rotating environment light,
//! an optional backdrop sweep and calibration kit, then apply the plan to a
//! [`scene::SceneGraph`].

pub mod anim;
pub mod bounds;
pub mod config;
pub mod error;
pub mod mesh;
pub mod plan;
pub mod refkit;
pub mod render;
pub mod rig;
pub mod scene;
pub mod settings;
pub mod shading;
pub mod sweep;

pub use config::RigConfig;
pub use error::{Result, RigError, SceneError};
pub use rig::{RigAssembler, RigAssembly, RigPaths, Subject};
pub use scene::{MemorySceneGraph, SceneGraph};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

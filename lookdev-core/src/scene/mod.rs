//! The host scene graph, seen only through the capabilities the rig needs.
//!
//! A host adapter implements [`SceneGraph`]; [`memory::MemorySceneGraph`] is the
//! in-process implementation used by tests and the CLI.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::error::SceneError;

pub use memory::MemorySceneGraph;

/// Root network every rig object lives in.
pub const OBJ_ROOT: &str = "/obj";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    id: u64,
    path: String,
}

impl NodeHandle {
    pub fn new(id: u64, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Tuple(Vec<f64>),
    Str(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<glam::DVec3> for ParamValue {
    fn from(v: glam::DVec3) -> Self {
        ParamValue::Tuple(v.to_array().to_vec())
    }
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// A user-facing float parameter added to an existing node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamTemplate {
    pub name: String,
    pub label: String,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

/// Capability set the rig builder consumes from a host.
pub trait SceneGraph {
    fn find_node(&self, path: &str) -> Option<NodeHandle>;
    fn create_node(
        &mut self,
        parent: &NodeHandle,
        node_type: &str,
        name: &str,
    ) -> Result<NodeHandle, SceneError>;
    fn destroy_node(&mut self, node: &NodeHandle) -> Result<(), SceneError>;
    fn set_param(
        &mut self,
        node: &NodeHandle,
        name: &str,
        value: ParamValue,
    ) -> Result<(), SceneError>;
    fn add_parameter(
        &mut self,
        node: &NodeHandle,
        template: &ParamTemplate,
    ) -> Result<(), SceneError>;
    fn set_keyframe(
        &mut self,
        node: &NodeHandle,
        channel: &str,
        frame: i32,
        value: f64,
    ) -> Result<(), SceneError>;
    fn clear_keyframes(&mut self, node: &NodeHandle, channel: &str) -> Result<(), SceneError>;
    fn get_bounds(&self, node: &NodeHandle) -> Result<BoundingBox, SceneError>;
    fn set_input(
        &mut self,
        node: &NodeHandle,
        index: usize,
        input: &NodeHandle,
    ) -> Result<(), SceneError>;
    fn bind_expression(
        &mut self,
        node: &NodeHandle,
        param: &str,
        expr: &str,
    ) -> Result<(), SceneError>;
    fn lock_channel(
        &mut self,
        node: &NodeHandle,
        channel: &str,
        locked: bool,
    ) -> Result<(), SceneError>;
    fn set_display_flag(&mut self, node: &NodeHandle, on: bool) -> Result<(), SceneError>;
    fn set_render_flag(&mut self, node: &NodeHandle, on: bool) -> Result<(), SceneError>;

    /// Transform parenting is input 0 on object nodes.
    fn set_parent_input(
        &mut self,
        node: &NodeHandle,
        input: &NodeHandle,
    ) -> Result<(), SceneError> {
        self.set_input(node, 0, input)
    }
}

pub fn parent_path(path: &str) -> Option<&str> {
    let idx = path.rfind('/')?;
    if idx == 0 {
        (path.len() > 1).then_some("/")
    } else {
        Some(&path[..idx])
    }
}

pub fn node_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Path of `to` as seen from node `from`, host-style (`..` is `from`'s network).
pub fn relative_path(from: &str, to: &str) -> String {
    let from: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut parts = vec![".."; from.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

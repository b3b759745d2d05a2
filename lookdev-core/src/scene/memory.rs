//! In-memory scene graph: absolute paths, unique child names, keyed channels.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{join_path, NodeHandle, ParamTemplate, ParamValue, SceneGraph, OBJ_ROOT};
use crate::anim::AnimationTrack;
use crate::bounds::BoundingBox;
use crate::error::SceneError;

#[derive(Debug, Clone, Default)]
pub struct NodeRecord {
    pub node_type: String,
    pub path: String,
    pub params: BTreeMap<String, ParamValue>,
    pub spare_params: Vec<ParamTemplate>,
    pub keyframes: BTreeMap<String, AnimationTrack>,
    pub expressions: BTreeMap<String, String>,
    pub locked: BTreeSet<String>,
    pub inputs: BTreeMap<usize, String>,
    pub display: bool,
    pub render: bool,
    pub bounds: Option<BoundingBox>,
}

#[derive(Debug)]
pub struct MemorySceneGraph {
    nodes: HashMap<u64, NodeRecord>,
    by_path: BTreeMap<String, u64>,
    next_id: u64,
}

impl Default for MemorySceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySceneGraph {
    /// Empty scene with `/` and `/obj`.
    pub fn new() -> Self {
        let mut scene = Self {
            nodes: HashMap::new(),
            by_path: BTreeMap::new(),
            next_id: 0,
        };
        scene.insert("root", "/".to_string());
        scene.insert("objnet", OBJ_ROOT.to_string());
        scene
    }

    fn insert(&mut self, node_type: &str, path: String) -> NodeHandle {
        let id = self.next_id;
        self.next_id += 1;
        let record = NodeRecord {
            node_type: node_type.to_string(),
            path: path.clone(),
            display: true,
            ..Default::default()
        };
        self.nodes.insert(id, record);
        self.by_path.insert(path.clone(), id);
        NodeHandle::new(id, path)
    }

    /// Add a geometry node with known bounds, standing in for a modelled subject.
    pub fn add_geometry(
        &mut self,
        parent: &str,
        name: &str,
        bounds: BoundingBox,
    ) -> Result<NodeHandle, SceneError> {
        let parent = self
            .find_node(parent)
            .ok_or_else(|| SceneError::NodeNotFound(parent.to_string()))?;
        let handle = self.create_node(&parent, "geo", name)?;
        self.record_mut(&handle)?.bounds = Some(bounds);
        Ok(handle)
    }

    pub fn node(&self, path: &str) -> Option<&NodeRecord> {
        self.by_path.get(path).and_then(|id| self.nodes.get(id))
    }

    pub fn param(&self, path: &str, name: &str) -> Option<&ParamValue> {
        self.node(path)?.params.get(name)
    }

    pub fn track(&self, path: &str, channel: &str) -> Option<&AnimationTrack> {
        self.node(path)?.keyframes.get(channel)
    }

    /// Direct children of `path`, sorted by path.
    pub fn children(&self, path: &str) -> Vec<&str> {
        self.by_path
            .keys()
            .filter(|p| super::parent_path(p) == Some(path) && p.as_str() != path)
            .map(String::as_str)
            .collect()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.by_path.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn record(&self, node: &NodeHandle) -> Result<&NodeRecord, SceneError> {
        self.nodes
            .get(&node.id())
            .ok_or_else(|| SceneError::NodeNotFound(node.path().to_string()))
    }

    fn record_mut(&mut self, node: &NodeHandle) -> Result<&mut NodeRecord, SceneError> {
        self.nodes
            .get_mut(&node.id())
            .ok_or_else(|| SceneError::NodeNotFound(node.path().to_string()))
    }

    fn unlocked_mut(
        &mut self,
        node: &NodeHandle,
        channel: &str,
    ) -> Result<&mut NodeRecord, SceneError> {
        let rec = self.record_mut(node)?;
        if rec.locked.contains(channel) {
            return Err(SceneError::ChannelLocked {
                node: rec.path.clone(),
                channel: channel.to_string(),
            });
        }
        Ok(rec)
    }
}

impl SceneGraph for MemorySceneGraph {
    fn find_node(&self, path: &str) -> Option<NodeHandle> {
        self.by_path.get(path).map(|id| NodeHandle::new(*id, path))
    }

    fn create_node(
        &mut self,
        parent: &NodeHandle,
        node_type: &str,
        name: &str,
    ) -> Result<NodeHandle, SceneError> {
        let parent_path = self.record(parent)?.path.clone();
        let path = join_path(&parent_path, name);
        if self.by_path.contains_key(&path) {
            return Err(SceneError::DuplicateName {
                parent: parent_path,
                name: name.to_string(),
            });
        }
        Ok(self.insert(node_type, path))
    }

    fn destroy_node(&mut self, node: &NodeHandle) -> Result<(), SceneError> {
        let path = self.record(node)?.path.clone();
        let prefix = format!("{path}/");
        let doomed: Vec<String> = self
            .by_path
            .keys()
            .filter(|p| **p == path || p.starts_with(&prefix))
            .cloned()
            .collect();
        for p in &doomed {
            if let Some(id) = self.by_path.remove(p) {
                self.nodes.remove(&id);
            }
        }
        for rec in self.nodes.values_mut() {
            rec.inputs.retain(|_, input| !doomed.contains(input));
        }
        Ok(())
    }

    fn set_param(
        &mut self,
        node: &NodeHandle,
        name: &str,
        value: ParamValue,
    ) -> Result<(), SceneError> {
        self.unlocked_mut(node, name)?.params.insert(name.to_string(), value);
        Ok(())
    }

    fn add_parameter(
        &mut self,
        node: &NodeHandle,
        template: &ParamTemplate,
    ) -> Result<(), SceneError> {
        let rec = self.record_mut(node)?;
        rec.spare_params.retain(|t| t.name != template.name);
        rec.spare_params.push(template.clone());
        rec.params.insert(template.name.clone(), ParamValue::Float(template.default));
        Ok(())
    }

    fn set_keyframe(
        &mut self,
        node: &NodeHandle,
        channel: &str,
        frame: i32,
        value: f64,
    ) -> Result<(), SceneError> {
        self.unlocked_mut(node, channel)?
            .keyframes
            .entry(channel.to_string())
            .or_default()
            .insert(frame, value);
        Ok(())
    }

    fn clear_keyframes(&mut self, node: &NodeHandle, channel: &str) -> Result<(), SceneError> {
        self.unlocked_mut(node, channel)?.keyframes.remove(channel);
        Ok(())
    }

    fn get_bounds(&self, node: &NodeHandle) -> Result<BoundingBox, SceneError> {
        let rec = self.record(node)?;
        rec.bounds.ok_or_else(|| SceneError::NoGeometry(rec.path.clone()))
    }

    fn set_input(
        &mut self,
        node: &NodeHandle,
        index: usize,
        input: &NodeHandle,
    ) -> Result<(), SceneError> {
        let input_path = self.record(input)?.path.clone();
        self.record_mut(node)?.inputs.insert(index, input_path);
        Ok(())
    }

    fn bind_expression(
        &mut self,
        node: &NodeHandle,
        param: &str,
        expr: &str,
    ) -> Result<(), SceneError> {
        self.unlocked_mut(node, param)?
            .expressions
            .insert(param.to_string(), expr.to_string());
        Ok(())
    }

    fn lock_channel(
        &mut self,
        node: &NodeHandle,
        channel: &str,
        locked: bool,
    ) -> Result<(), SceneError> {
        let rec = self.record_mut(node)?;
        if locked {
            rec.locked.insert(channel.to_string());
        } else {
            rec.locked.remove(channel);
        }
        Ok(())
    }

    fn set_display_flag(&mut self, node: &NodeHandle, on: bool) -> Result<(), SceneError> {
        self.record_mut(node)?.display = on;
        Ok(())
    }

    fn set_render_flag(&mut self, node: &NodeHandle, on: bool) -> Result<(), SceneError> {
        self.record_mut(node)?.render = on;
        Ok(())
    }
}

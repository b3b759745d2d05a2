//! Declarative rig plans: what to create, before touching any scene.
//!
//! A [`RigPlan`] is a flat list of [`NodeSpec`]s addressed by absolute path.
//! Each spec names what it depends on (its parent network, wired inputs and
//! anything it references), so [`RigPlan::ordered`] can produce a valid
//! creation order regardless of how the plan was assembled.

pub mod apply;

use serde::Serialize;

use crate::anim::{AnimationTrack, Channel};
use crate::error::{Result, RigError};
use crate::scene::{parent_path, ParamTemplate, ParamValue};

pub use apply::{apply, AppliedPlan};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSpec {
    pub path: String,
    pub node_type: String,
    pub params: Vec<(String, ParamValue)>,
    pub spare_params: Vec<ParamTemplate>,
    pub tracks: Vec<(Channel, AnimationTrack)>,
    pub inputs: Vec<(usize, String)>,
    pub expressions: Vec<(String, String)>,
    pub locked: Vec<Channel>,
    pub display: Option<bool>,
    pub render: Option<bool>,
    pub after: Vec<String>,
}

impl NodeSpec {
    pub fn new(path: impl Into<String>, node_type: &str) -> Self {
        Self {
            path: path.into(),
            node_type: node_type.to_string(),
            params: Vec::new(),
            spare_params: Vec::new(),
            tracks: Vec::new(),
            inputs: Vec::new(),
            expressions: Vec::new(),
            locked: Vec::new(),
            display: None,
            render: None,
            after: Vec::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    pub fn spare(mut self, template: ParamTemplate) -> Self {
        self.spare_params.push(template);
        self
    }

    pub fn track(mut self, channel: Channel, track: AnimationTrack) -> Self {
        self.tracks.push((channel, track));
        self
    }

    pub fn input(mut self, index: usize, path: impl Into<String>) -> Self {
        self.inputs.push((index, path.into()));
        self
    }

    pub fn parent_input(self, path: impl Into<String>) -> Self {
        self.input(0, path)
    }

    pub fn expression(mut self, param: &str, expr: impl Into<String>) -> Self {
        self.expressions.push((param.to_string(), expr.into()));
        self
    }

    pub fn lock_transform(mut self) -> Self {
        self.locked.extend(Channel::TRANSFORM);
        self
    }

    pub fn display(mut self, on: bool) -> Self {
        self.display = Some(on);
        self
    }

    pub fn render(mut self, on: bool) -> Self {
        self.render = Some(on);
        self
    }

    /// Display and render flag together, for a network's output node.
    pub fn output(self) -> Self {
        self.display(true).render(true)
    }

    pub fn color(self, rgb: [f64; 3]) -> Self {
        self.param("color", ParamValue::Tuple(rgb.to_vec()))
    }

    pub fn after(mut self, path: impl Into<String>) -> Self {
        self.after.push(path.into());
        self
    }

    pub fn name(&self) -> &str {
        crate::scene::node_name(&self.path)
    }

    pub fn get_param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get_param(name).and_then(ParamValue::as_f64)
    }

    pub fn is_output(&self) -> bool {
        self.display == Some(true) && self.render == Some(true)
    }

    pub fn get_track(&self, channel: Channel) -> Option<&AnimationTrack> {
        self.tracks.iter().find(|(c, _)| *c == channel).map(|(_, t)| t)
    }

    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = Vec::new();
        if let Some(parent) = parent_path(&self.path) {
            deps.push(parent);
        }
        deps.extend(self.inputs.iter().map(|(_, p)| p.as_str()));
        deps.extend(self.after.iter().map(String::as_str));
        deps.dedup();
        deps
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RigPlan {
    pub nodes: Vec<NodeSpec>,
}

impl RigPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, spec: NodeSpec) {
        self.nodes.push(spec);
    }

    pub fn extend(&mut self, specs: impl IntoIterator<Item = NodeSpec>) {
        self.nodes.extend(specs);
    }

    pub fn get(&self, path: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creation order. Ties keep insertion order; `exists` answers for paths
    /// outside the plan.
    pub fn ordered<F>(&self, exists: F) -> Result<Vec<&NodeSpec>>
    where
        F: Fn(&str) -> bool,
    {
        for node in &self.nodes {
            for dep in node.dependencies() {
                if !self.contains(dep) && !exists(dep) {
                    return Err(RigError::UnresolvedDependency {
                        node: node.path.clone(),
                        missing: dep.to_string(),
                    });
                }
            }
        }

        let mut done = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        while order.len() < self.nodes.len() {
            let ready = self.nodes.iter().enumerate().position(|(i, node)| {
                !done[i]
                    && node.dependencies().iter().all(|dep| {
                        self.nodes
                            .iter()
                            .position(|n| n.path == *dep)
                            .map_or(true, |j| done[j])
                    })
            });
            match ready {
                Some(i) => {
                    done[i] = true;
                    order.push(&self.nodes[i]);
                }
                None => {
                    let stuck = done.iter().position(|d| !d).unwrap_or_default();
                    return Err(RigError::DependencyCycle(self.nodes[stuck].path.clone()));
                }
            }
        }
        Ok(order)
    }
}

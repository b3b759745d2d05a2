use std::collections::BTreeMap;

use super::{NodeSpec, RigPlan};
use crate::error::{Result, RigError, SceneError};
use crate::scene::{parent_path, NodeHandle, SceneGraph};

/// Handles for every node a plan created, by path.
#[derive(Debug, Clone, Default)]
pub struct AppliedPlan {
    pub handles: BTreeMap<String, NodeHandle>,
    pub created: Vec<String>,
}

impl AppliedPlan {
    pub fn handle(&self, path: &str) -> Option<&NodeHandle> {
        self.handles.get(path)
    }
}

/// Apply `plan` in dependency order. Any failure destroys what this call
/// created, newest first, and returns [`RigError::Apply`].
pub fn apply<S>(plan: &RigPlan, scene: &mut S) -> Result<AppliedPlan>
where
    S: SceneGraph + ?Sized,
{
    let order = plan.ordered(|p| scene.find_node(p).is_some())?;
    let mut applied = AppliedPlan::default();
    for spec in order {
        if let Err(source) = apply_node(spec, scene, &mut applied) {
            log::warn!(
                "applying {} failed ({source}); rolling back {} nodes",
                spec.path,
                applied.created.len()
            );
            rollback(scene, &applied);
            return Err(RigError::Apply {
                path: spec.path.clone(),
                source,
            });
        }
        log::debug!("applied {} ({})", spec.path, spec.node_type);
    }
    Ok(applied)
}

fn resolve<S>(scene: &S, applied: &AppliedPlan, path: &str) -> Result<NodeHandle, SceneError>
where
    S: SceneGraph + ?Sized,
{
    applied
        .handles
        .get(path)
        .cloned()
        .or_else(|| scene.find_node(path))
        .ok_or_else(|| SceneError::NodeNotFound(path.to_string()))
}

fn apply_node<S>(
    spec: &NodeSpec,
    scene: &mut S,
    applied: &mut AppliedPlan,
) -> Result<(), SceneError>
where
    S: SceneGraph + ?Sized,
{
    let parent = parent_path(&spec.path)
        .ok_or_else(|| SceneError::NodeNotFound(spec.path.clone()))?;
    let parent = resolve(scene, applied, parent)?;
    let node = scene.create_node(&parent, &spec.node_type, spec.name())?;
    applied.created.push(spec.path.clone());
    applied.handles.insert(spec.path.clone(), node.clone());

    for (name, value) in &spec.params {
        scene.set_param(&node, name, value.clone())?;
    }
    for template in &spec.spare_params {
        scene.add_parameter(&node, template)?;
    }
    for (channel, track) in &spec.tracks {
        scene.clear_keyframes(&node, channel.as_str())?;
        for key in track.keys() {
            scene.set_keyframe(&node, channel.as_str(), key.frame, key.value)?;
        }
    }
    for (index, input) in &spec.inputs {
        let input = resolve(scene, applied, input)?;
        scene.set_input(&node, *index, &input)?;
    }
    for (param, expr) in &spec.expressions {
        scene.bind_expression(&node, param, expr)?;
    }
    for channel in &spec.locked {
        scene.lock_channel(&node, channel.as_str(), true)?;
    }
    if let Some(on) = spec.display {
        scene.set_display_flag(&node, on)?;
    }
    if let Some(on) = spec.render {
        scene.set_render_flag(&node, on)?;
    }
    Ok(())
}

fn rollback<S>(scene: &mut S, applied: &AppliedPlan)
where
    S: SceneGraph + ?Sized,
{
    for path in applied.created.iter().rev() {
        // children go with their network
        let Some(node) = scene.find_node(path) else { continue };
        if let Err(e) = scene.destroy_node(&node) {
            log::warn!("rollback could not remove {path}: {e}");
        }
    }
}

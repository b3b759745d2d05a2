//! Turntable rig assembly.
//!
//! [`RigAssembler::plan`] is pure: subject bounds and config in, a
//! [`RigPlan`] out. [`RigAssembler::build`] validates, measures the subject,
//! plans and applies in one pass; a failed apply leaves the scene untouched.

pub mod control;

use serde::Serialize;

use crate::anim::turntable::{
    env_light_rotation_track, orbit_tracks, CameraOrbitParams, TranslateTracks,
};
use crate::anim::Channel;
use crate::bounds::{analyze, BoundingBox, BoundsAnalysis};
use crate::config::schema::check_start_frame;
use crate::config::RigConfig;
use crate::error::{Result, RigError};
use crate::plan::{self, AppliedPlan, NodeSpec, RigPlan};
use crate::refkit::{self, ReferenceKitLayout};
use crate::render::RenderJob;
use crate::scene::{join_path, SceneGraph, OBJ_ROOT};
use crate::sweep::{self, SweepGeometryParams};

use control::ExpressionBinding;

pub const CONTAINER: &str = "lookdev_rig";
pub const CONTROL: &str = "lookdev_rig_control";
pub const ROP_NETWORK: &str = "lookdev_ropnet";
pub const RENDER_NODE: &str = "lookdev_mantra";
pub const CAMERA: &str = "lookdev_cam";
pub const CAMERA_TRANSFORM: &str = "camera_transform";
pub const BACKDROP_CONTROL: &str = "sweep_animation";
pub const LOOKAT_TARGET: &str = "lookat_target";
pub const ENV_LIGHT: &str = "lookdev_envlight";
pub const HDRI_ROTATION: &str = "hdri_rotation";
pub const SWEEP: &str = "lookdev_sweep";
pub const REFERENCE_KIT: &str = "lookdev_refs";

const CONTROL_COLOR: [f64; 3] = [0.0, 1.0, 0.0];
const INTERNAL_COLOR: [f64; 3] = [1.0, 0.0, 0.0];
const CONTAINER_COLOR: [f64; 3] = [1.0, 0.7, 0.7];

/// Where every rig object lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RigPaths {
    pub container: String,
    pub control: String,
    pub camera: String,
    pub camera_transform: String,
    pub backdrop_control: String,
    pub lookat: String,
    pub env_light: String,
    pub hdri_rotation: String,
    pub sweep: String,
    pub reference_kit: String,
    pub rop_network: String,
    pub render_node: String,
}

impl RigPaths {
    pub fn under(root: &str) -> Self {
        let container = join_path(root, CONTAINER);
        let inside = |name: &str| join_path(&container, name);
        let rop_network = join_path(root, ROP_NETWORK);
        Self {
            control: join_path(root, CONTROL),
            camera: inside(CAMERA),
            camera_transform: inside(CAMERA_TRANSFORM),
            backdrop_control: inside(BACKDROP_CONTROL),
            lookat: inside(LOOKAT_TARGET),
            env_light: inside(ENV_LIGHT),
            hdri_rotation: inside(HDRI_ROTATION),
            sweep: inside(SWEEP),
            reference_kit: inside(REFERENCE_KIT),
            render_node: join_path(&rop_network, RENDER_NODE),
            rop_network,
            container,
        }
    }

    /// Top-level nodes a rebuild has to clear.
    pub fn top_level(&self) -> [&str; 3] {
        [
            self.container.as_str(),
            self.control.as_str(),
            self.rop_network.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    pub path: String,
    pub bounds: BoundingBox,
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct RigAssembly {
    pub paths: RigPaths,
    pub bounds: BoundsAnalysis,
    pub bindings: Vec<ExpressionBinding>,
    pub render_job: RenderJob,
    pub applied: AppliedPlan,
}

#[derive(Debug, Clone)]
pub struct RigAssembler {
    config: RigConfig,
    layout: ReferenceKitLayout,
}

impl RigAssembler {
    pub fn new(config: RigConfig) -> Self {
        Self {
            config,
            layout: ReferenceKitLayout::default(),
        }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn paths(&self) -> RigPaths {
        RigPaths::under(OBJ_ROOT)
    }

    pub fn orbit(&self, bounds: &BoundsAnalysis) -> CameraOrbitParams {
        CameraOrbitParams::from_bounds(
            bounds,
            self.config.rotation_offset,
            self.config.start_frame,
        )
    }

    pub fn render_job(&self, subject: &str) -> Result<RenderJob> {
        let p = self.paths();
        RenderJob::new(
            &p.camera,
            &p.reference_kit,
            &p.sweep,
            subject,
            &p.env_light,
            self.config.start_frame,
        )
    }

    pub fn bindings(&self) -> Vec<ExpressionBinding> {
        let p = self.paths();
        control::bindings(&p.control, &p.hdri_rotation, &p.camera_transform).to_vec()
    }

    /// Everything the rig consists of, without touching a scene.
    pub fn plan(&self, subject: &Subject) -> Result<RigPlan> {
        check_start_frame(self.config.start_frame)?;
        let p = self.paths();
        let bounds = analyze(&subject.bounds);
        let orbit = self.orbit(&bounds);
        let mut plan = RigPlan::new();

        plan.push(NodeSpec::new(&p.container, "subnet").color(CONTAINER_COLOR));
        plan.push(self.control_spec(&p));

        let camera_keys = orbit_tracks(&orbit)?;
        plan.push(internal_null(&p.camera_transform));
        plan.push(
            keyed(NodeSpec::new(&p.camera, "cam"), &camera_keys)
                .parent_input(&p.camera_transform)
                .param("lookatpath", p.lookat.as_str())
                .after(&p.lookat),
        );

        let backdrop_keys = orbit_tracks(&orbit)?;
        plan.push(
            keyed(internal_null(&p.backdrop_control), &backdrop_keys)
                .param("lookatpath", p.lookat.as_str())
                .after(&p.lookat),
        );

        plan.push(
            internal_null(&p.lookat)
                .param(Channel::Tx.as_str(), bounds.center.x)
                .param(Channel::Ty.as_str(), bounds.center.y)
                .param(Channel::Tz.as_str(), bounds.center.z)
                .lock_transform(),
        );

        plan.push(internal_null(&p.hdri_rotation));
        plan.push(
            NodeSpec::new(&p.env_light, "envlight")
                .param("light_enable", true)
                .param("light_intensity", 1.0)
                .param("light_contribprimary", true)
                .param("env_map", self.config.hdri_map())
                .track(
                    Channel::Ry,
                    env_light_rotation_track(orbit.initial_angle_deg, orbit.start_frame)?,
                )
                .parent_input(&p.hdri_rotation),
        );

        if self.config.sweep_enabled {
            let params = SweepGeometryParams::derive(&bounds);
            log::debug!("sweep: {params:?}");
            plan.push(sweep::object_spec(&p.sweep, &p.backdrop_control, &bounds));
            plan.extend(sweep::network(&p.sweep, &params, bounds.center));
        } else {
            plan.push(sweep::placeholder_spec(&p.sweep));
        }

        if self.config.add_reference_kit {
            plan.push(refkit::object_spec(&p.reference_kit, &p.camera, &self.layout));
            plan.extend(refkit::network(
                &p.reference_kit,
                &self.layout,
                &self.config.macbeth_texture(),
            ));
        } else {
            plan.push(refkit::placeholder_spec(&p.reference_kit));
        }

        for binding in self.bindings() {
            bind(&mut plan, &binding, &p.control);
        }

        plan.push(NodeSpec::new(&p.rop_network, crate::render::ROP_NETWORK_TYPE));
        plan.push(self.render_job(&subject.path)?.to_spec(&p.render_node));
        Ok(plan)
    }

    fn control_spec(&self, p: &RigPaths) -> NodeSpec {
        let [hdri, height] = control::parameters(self.config.hdri_rotation_offset);
        NodeSpec::new(&p.control, "null")
            .param("controltype", 1)
            .color(CONTROL_COLOR)
            .spare(hdri)
            .spare(height)
    }

    /// Validate, measure the subject, plan and apply.
    pub fn build<S>(&self, scene: &mut S, subject: Option<&str>) -> Result<RigAssembly>
    where
        S: SceneGraph + ?Sized,
    {
        let (subject, rig) = self.prepare(&*scene, subject)?;
        self.assemble(scene, subject, &rig)
    }

    /// Everything that can fail before the scene is touched.
    fn prepare<S>(&self, scene: &S, subject: Option<&str>) -> Result<(Subject, RigPlan)>
    where
        S: SceneGraph + ?Sized,
    {
        self.config.validate()?;
        let subject = subject.ok_or(RigError::NoSubject)?;
        let node = scene
            .find_node(subject)
            .ok_or_else(|| RigError::SubjectNotFound(subject.to_string()))?;
        let bounds = scene.get_bounds(&node)?;
        let subject = Subject {
            path: subject.to_string(),
            bounds,
        };
        let rig = self.plan(&subject)?;
        Ok((subject, rig))
    }

    fn assemble<S>(&self, scene: &mut S, subject: Subject, rig: &RigPlan) -> Result<RigAssembly>
    where
        S: SceneGraph + ?Sized,
    {
        log::info!(
            "building turntable rig for {} from frame {}",
            subject.path,
            self.config.start_frame
        );
        let render_job = self.render_job(&subject.path)?;
        let applied = plan::apply(rig, scene)?;
        log::info!(
            "turntable rig built: {} nodes under {OBJ_ROOT}",
            applied.created.len()
        );

        Ok(RigAssembly {
            paths: self.paths(),
            bounds: analyze(&subject.bounds),
            bindings: self.bindings(),
            render_job,
            applied,
        })
    }

    /// Remove a previous rig's top-level nodes. Returns how many were removed.
    pub fn teardown<S>(&self, scene: &mut S) -> Result<usize>
    where
        S: SceneGraph + ?Sized,
    {
        let mut removed = 0;
        for path in self.paths().top_level() {
            if let Some(node) = scene.find_node(path) {
                scene.destroy_node(&node)?;
                removed += 1;
            }
        }
        if removed > 0 {
            log::info!("removed {removed} nodes of a previous rig");
        }
        Ok(removed)
    }

    /// Fresh construction over whatever rig was there before. The old rig
    /// is only removed once the new one has been planned.
    pub fn rebuild<S>(&self, scene: &mut S, subject: Option<&str>) -> Result<RigAssembly>
    where
        S: SceneGraph + ?Sized,
    {
        let (subject, rig) = self.prepare(&*scene, subject)?;
        self.teardown(scene)?;
        self.assemble(scene, subject, &rig)
    }
}

fn internal_null(path: &str) -> NodeSpec {
    NodeSpec::new(path, "null").display(false).color(INTERNAL_COLOR)
}

fn keyed(spec: NodeSpec, tracks: &TranslateTracks) -> NodeSpec {
    tracks
        .channels()
        .into_iter()
        .fold(spec, |spec, (channel, track)| spec.track(channel, track.clone()))
}

fn bind(plan: &mut RigPlan, binding: &ExpressionBinding, control: &str) {
    if let Some(spec) = plan.nodes.iter_mut().find(|n| n.path == binding.node) {
        spec.expressions.push((binding.channel.as_str().to_string(), binding.expression()));
        spec.after.push(control.to_string());
    }
}

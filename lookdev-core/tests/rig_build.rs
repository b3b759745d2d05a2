use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use glam::DVec3;
use lookdev_core::bounds::BoundingBox;
use lookdev_core::error::SceneError;
use lookdev_core::scene::{NodeHandle, ParamTemplate, ParamValue};
use lookdev_core::{
    MemorySceneGraph, RigAssembler, RigConfig, RigError, RigPaths, SceneGraph,
};

const SUBJECT: &str = "/obj/subject";

struct Fixture {
    _dir: tempfile::TempDir,
    config: RigConfig,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let hdri = dir.path().join("studio.exr");
    std::fs::write(&hdri, b"hdri").unwrap();
    let config = RigConfig {
        hdri_path: hdri,
        macbeth_path: PathBuf::from("/tex/macbeth.png"),
        ..Default::default()
    };
    Fixture { _dir: dir, config }
}

fn scene_with(size: DVec3) -> MemorySceneGraph {
    let mut scene = MemorySceneGraph::new();
    scene
        .add_geometry("/obj", "subject", BoundingBox::new(DVec3::ZERO, size))
        .unwrap();
    scene
}

fn paths() -> RigPaths {
    RigPaths::under("/obj")
}

fn all_paths(scene: &MemorySceneGraph) -> Vec<String> {
    scene.paths().map(str::to_string).collect()
}

fn position(scene: &MemorySceneGraph, node: &str, frame: f64) -> DVec3 {
    let at = |ch: &str| scene.track(node, ch).and_then(|t| t.value_at(frame)).unwrap();
    DVec3::new(at("tx"), at("ty"), at("tz"))
}

fn f64_param(scene: &MemorySceneGraph, node: &str, name: &str) -> f64 {
    scene.param(node, name).and_then(ParamValue::as_f64).unwrap()
}

#[test]
fn camera_and_backdrop_move_together() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::new(4.0, 7.0, 2.0));
    let cfg = RigConfig {
        rotation_offset: 33.0,
        start_frame: 10,
        ..fx.config.clone()
    };
    RigAssembler::new(cfg).build(&mut scene, Some(SUBJECT)).unwrap();
    let p = paths();
    for f in 10..=209 {
        let cam = position(&scene, &p.camera, f as f64);
        let backdrop = position(&scene, &p.backdrop_control, f as f64);
        assert_eq!(cam, backdrop, "frame {f}");
    }
}

#[test]
fn orbit_closes_after_ninety_nine_frames_and_holds() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::new(3.0, 1.0, 3.0));
    RigAssembler::new(fx.config.clone())
        .build(&mut scene, Some(SUBJECT))
        .unwrap();
    let cam = paths().camera;
    let start = position(&scene, &cam, 1001.0);
    let closed = position(&scene, &cam, 1100.0);
    assert_abs_diff_eq!(start.x, closed.x, epsilon = 1e-9);
    assert_abs_diff_eq!(start.z, closed.z, epsilon = 1e-9);
    assert_eq!(scene.track(&cam, "tx").unwrap().len(), 101);
    let last = position(&scene, &cam, 1101.0);
    assert_eq!(position(&scene, &cam, 1150.0), last);
    assert_eq!(position(&scene, &cam, 1200.0), last);
}

#[test]
fn light_turns_once_and_unwinds() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::ONE);
    let cfg = RigConfig {
        rotation_offset: 70.0,
        ..fx.config.clone()
    };
    RigAssembler::new(cfg).build(&mut scene, Some(SUBJECT)).unwrap();
    let ry = scene.track(&paths().env_light, "ry").unwrap();
    let keys: Vec<(i32, f64)> = ry.keys().iter().map(|k| (k.frame, k.value)).collect();
    assert_eq!(keys, [(1001, -110.0), (1100, 250.0), (1200, -110.0)]);
    let wrap = |v: f64| v.rem_euclid(360.0);
    assert_abs_diff_eq!(wrap(keys[0].1), wrap(keys[1].1), epsilon = 1e-9);
    assert_abs_diff_eq!(wrap(keys[1].1), wrap(keys[2].1), epsilon = 1e-9);
    assert_abs_diff_eq!(
        ry.value_at(1150.0).unwrap(),
        250.0 - 360.0 * 50.0 / 100.0,
        epsilon = 1e-9
    );
}

#[test]
fn wide_subject_puts_camera_twenty_five_units_out() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::new(10.0, 5.0, 10.0));
    let rig = RigAssembler::new(fx.config.clone())
        .build(&mut scene, Some(SUBJECT))
        .unwrap();
    assert_eq!(rig.bounds.camera_distance, 25.0);
    let cam = position(&scene, &rig.paths.camera, 1001.0);
    assert_abs_diff_eq!(cam.x, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(cam.y, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(cam.z, 25.0, epsilon = 1e-12);
    let lookat = &rig.paths.lookat;
    assert_eq!(f64_param(&scene, lookat, "tx"), 0.0);
    assert_eq!(
        scene
            .param(&rig.paths.camera, "lookatpath")
            .and_then(ParamValue::as_str),
        Some(lookat.as_str())
    );
}

#[test]
fn sweep_is_sized_from_the_subject() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::new(10.0, 5.0, 10.0));
    RigAssembler::new(fx.config.clone())
        .build(&mut scene, Some(SUBJECT))
        .unwrap();
    let sweep = paths().sweep;
    let at = |name: &str| format!("{sweep}/{name}");
    assert_eq!(f64_param(&scene, &at("arc"), "scale"), 40.0);
    assert_eq!(f64_param(&scene, &at("extrude"), "translatex"), 100.0);
    assert_eq!(f64_param(&scene, &at("floor"), "sizex"), 100.0);
    assert_eq!(
        scene.param(&at("offset_arc"), "t"),
        Some(&ParamValue::Tuple(vec![0.0, 0.0, -6.25]))
    );
    assert_eq!(f64_param(&scene, &sweep, "tz"), -25.0);
    assert_eq!(
        scene
            .param(&at("material"), "shop_materialpath1")
            .and_then(ParamValue::as_str),
        Some("/obj/lookdev_rig/lookdev_sweep/matnet/grey_shader")
    );
    let out = scene.node(&at("OUT")).unwrap();
    assert!(out.display && out.render);
    assert!(scene.node(&sweep).unwrap().locked.contains("tz"));
}

#[test]
fn reference_kit_rides_with_the_camera() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::new(200.0, 10.0, 3.0));
    RigAssembler::new(fx.config.clone())
        .build(&mut scene, Some(SUBJECT))
        .unwrap();
    let p = paths();
    let refs = scene.node(&p.reference_kit).unwrap();
    assert_eq!(refs.inputs.get(&0), Some(&p.camera));
    assert_eq!(f64_param(&scene, &p.reference_kit, "tx"), -0.072);
    assert_eq!(f64_param(&scene, &p.reference_kit, "ty"), 0.047);
    assert_eq!(f64_param(&scene, &p.reference_kit, "tz"), -0.25);
    assert_eq!(refs.locked.len(), 9);
    assert!(scene.track(&p.reference_kit, "tx").is_none());
}

#[test]
fn control_exposes_offsets_through_expressions() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::ONE);
    let cfg = RigConfig {
        hdri_rotation_offset: 15.0,
        ..fx.config.clone()
    };
    RigAssembler::new(cfg).build(&mut scene, Some(SUBJECT)).unwrap();
    let p = paths();
    let control = scene.node(&p.control).unwrap();
    assert_eq!(control.spare_params.len(), 2);
    assert_eq!(f64_param(&scene, &p.control, "hdri_rotation_offset"), 15.0);
    assert_eq!(f64_param(&scene, &p.control, "camera_height_offset"), 0.0);
    let expression = |node: &str, ch: &str| {
        scene
            .node(node)
            .and_then(|n| n.expressions.get(ch))
            .map(String::as_str)
    };
    assert_eq!(
        expression(&p.hdri_rotation, "ry"),
        Some(r#"ch("../../lookdev_rig_control/hdri_rotation_offset")"#)
    );
    assert_eq!(
        expression(&p.camera_transform, "ty"),
        Some(r#"ch("../../lookdev_rig_control/camera_height_offset")"#)
    );
    assert_eq!(
        scene.node(&p.env_light).unwrap().inputs.get(&0),
        Some(&p.hdri_rotation)
    );
}

#[test]
fn rebuild_replaces_rather_than_stacks() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::new(2.0, 3.0, 1.0));
    let assembler = RigAssembler::new(fx.config.clone());
    assembler.build(&mut scene, Some(SUBJECT)).unwrap();
    let first = all_paths(&scene);
    let first_keys = scene.track(&paths().camera, "tz").unwrap().clone();

    assert!(matches!(
        assembler.build(&mut scene, Some(SUBJECT)),
        Err(RigError::Apply {
            source: SceneError::DuplicateName { .. },
            ..
        })
    ));

    assembler.rebuild(&mut scene, Some(SUBJECT)).unwrap();
    assert_eq!(all_paths(&scene), first);
    let keys = scene.track(&paths().camera, "tz").unwrap();
    assert_eq!(keys.len(), 101);
    assert_eq!(*keys, first_keys);
}

#[test]
fn rebuild_with_unknown_subject_keeps_the_existing_rig() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::new(10.0, 5.0, 10.0));
    let assembler = RigAssembler::new(fx.config.clone());
    assembler.build(&mut scene, Some(SUBJECT)).unwrap();
    let before = all_paths(&scene);
    let keys = scene.track(&paths().camera, "tz").unwrap().clone();

    let err = assembler
        .rebuild(&mut scene, Some("/obj/typo"))
        .unwrap_err();
    assert!(matches!(err, RigError::SubjectNotFound(ref p) if p == "/obj/typo"));
    assert!(matches!(
        assembler.rebuild(&mut scene, None),
        Err(RigError::NoSubject)
    ));

    assert_eq!(all_paths(&scene), before);
    assert_eq!(scene.track(&paths().camera, "tz"), Some(&keys));
}

#[test]
fn rebuild_with_bad_config_keeps_the_existing_rig() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::ONE);
    RigAssembler::new(fx.config.clone())
        .build(&mut scene, Some(SUBJECT))
        .unwrap();
    let before = all_paths(&scene);

    for start_frame in [0, 100_001, i32::MAX - 50] {
        let cfg = RigConfig {
            start_frame,
            ..fx.config.clone()
        };
        let err = RigAssembler::new(cfg)
            .rebuild(&mut scene, Some(SUBJECT))
            .unwrap_err();
        assert!(matches!(err, RigError::InvalidStartFrame(f) if f == start_frame));
    }
    let missing_hdri = RigConfig {
        hdri_path: PathBuf::from("/no/such/map.exr"),
        ..fx.config.clone()
    };
    assert!(matches!(
        RigAssembler::new(missing_hdri).rebuild(&mut scene, Some(SUBJECT)),
        Err(RigError::InvalidHdriPath(_))
    ));
    assert_eq!(all_paths(&scene), before);
}

#[test]
fn disabled_extras_are_empty_but_still_rendered() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::ONE);
    let cfg = RigConfig {
        sweep_enabled: false,
        add_reference_kit: false,
        ..fx.config.clone()
    };
    let rig = RigAssembler::new(cfg).build(&mut scene, Some(SUBJECT)).unwrap();
    let p = &rig.paths;
    assert!(scene.children(&p.sweep).is_empty());
    assert!(scene.children(&p.reference_kit).is_empty());
    assert!(scene.node(&p.sweep).unwrap().inputs.is_empty());
    assert_eq!(
        rig.render_job.forced_objects,
        [p.reference_kit.clone(), p.sweep.clone(), SUBJECT.to_string()]
    );
    assert_eq!(
        scene
            .param(&p.render_node, "forceobject")
            .and_then(ParamValue::as_str),
        Some("/obj/lookdev_rig/lookdev_refs /obj/lookdev_rig/lookdev_sweep /obj/subject")
    );
    assert_eq!(f64_param(&scene, &p.render_node, "f1"), 1001.0);
    assert_eq!(f64_param(&scene, &p.render_node, "f2"), 1200.0);
}

#[test]
fn validation_failures_leave_the_scene_alone() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::ONE);
    let before = scene.len();

    let missing_hdri = RigConfig {
        hdri_path: PathBuf::from("/no/such/map.exr"),
        ..fx.config.clone()
    };
    assert!(matches!(
        RigAssembler::new(missing_hdri).build(&mut scene, Some(SUBJECT)),
        Err(RigError::InvalidHdriPath(_))
    ));
    let bad_frame = RigConfig {
        start_frame: 0,
        ..fx.config.clone()
    };
    assert!(matches!(
        RigAssembler::new(bad_frame).build(&mut scene, Some(SUBJECT)),
        Err(RigError::InvalidStartFrame(0))
    ));

    let assembler = RigAssembler::new(fx.config.clone());
    assert!(matches!(
        assembler.build(&mut scene, None),
        Err(RigError::NoSubject)
    ));
    assert!(matches!(
        assembler.rebuild(&mut scene, None),
        Err(RigError::NoSubject)
    ));
    assert!(matches!(
        assembler.build(&mut scene, Some("/obj/nothing")),
        Err(RigError::SubjectNotFound(_))
    ));
    assert_eq!(scene.len(), before);
}

#[test]
fn degenerate_subject_still_builds() {
    let fx = fixture();
    let mut scene = scene_with(DVec3::ZERO);
    let rig = RigAssembler::new(fx.config.clone())
        .build(&mut scene, Some(SUBJECT))
        .unwrap();
    assert_eq!(rig.bounds.camera_distance, 0.0);
    assert_eq!(position(&scene, &rig.paths.camera, 1050.0), DVec3::ZERO);
}

/// Delegates to a memory scene but fails the n-th node creation.
struct FlakyScene {
    inner: MemorySceneGraph,
    creates_left: usize,
}

impl SceneGraph for FlakyScene {
    fn find_node(&self, path: &str) -> Option<NodeHandle> {
        self.inner.find_node(path)
    }
    fn create_node(
        &mut self,
        parent: &NodeHandle,
        node_type: &str,
        name: &str,
    ) -> Result<NodeHandle, SceneError> {
        if self.creates_left == 0 {
            return Err(SceneError::Host(format!("refused to create {name}")));
        }
        self.creates_left -= 1;
        self.inner.create_node(parent, node_type, name)
    }
    fn destroy_node(&mut self, node: &NodeHandle) -> Result<(), SceneError> {
        self.inner.destroy_node(node)
    }
    fn set_param(
        &mut self,
        node: &NodeHandle,
        name: &str,
        value: ParamValue,
    ) -> Result<(), SceneError> {
        self.inner.set_param(node, name, value)
    }
    fn add_parameter(
        &mut self,
        node: &NodeHandle,
        template: &ParamTemplate,
    ) -> Result<(), SceneError> {
        self.inner.add_parameter(node, template)
    }
    fn set_keyframe(
        &mut self,
        node: &NodeHandle,
        channel: &str,
        frame: i32,
        value: f64,
    ) -> Result<(), SceneError> {
        self.inner.set_keyframe(node, channel, frame, value)
    }
    fn clear_keyframes(&mut self, node: &NodeHandle, channel: &str) -> Result<(), SceneError> {
        self.inner.clear_keyframes(node, channel)
    }
    fn get_bounds(&self, node: &NodeHandle) -> Result<BoundingBox, SceneError> {
        self.inner.get_bounds(node)
    }
    fn set_input(
        &mut self,
        node: &NodeHandle,
        index: usize,
        input: &NodeHandle,
    ) -> Result<(), SceneError> {
        self.inner.set_input(node, index, input)
    }
    fn bind_expression(
        &mut self,
        node: &NodeHandle,
        param: &str,
        expr: &str,
    ) -> Result<(), SceneError> {
        self.inner.bind_expression(node, param, expr)
    }
    fn lock_channel(
        &mut self,
        node: &NodeHandle,
        channel: &str,
        locked: bool,
    ) -> Result<(), SceneError> {
        self.inner.lock_channel(node, channel, locked)
    }
    fn set_display_flag(&mut self, node: &NodeHandle, on: bool) -> Result<(), SceneError> {
        self.inner.set_display_flag(node, on)
    }
    fn set_render_flag(&mut self, node: &NodeHandle, on: bool) -> Result<(), SceneError> {
        self.inner.set_render_flag(node, on)
    }
}

#[test]
fn host_failure_mid_build_rolls_everything_back() {
    let fx = fixture();
    for creates in [0, 1, 7, 20] {
        let mut scene = FlakyScene {
            inner: scene_with(DVec3::ONE),
            creates_left: creates,
        };
        let before = all_paths(&scene.inner);
        let err = RigAssembler::new(fx.config.clone())
            .build(&mut scene, Some(SUBJECT))
            .unwrap_err();
        assert!(
            matches!(
                err,
                RigError::Apply {
                    source: SceneError::Host(_),
                    ..
                }
            ),
            "{err}"
        );
        assert_eq!(all_paths(&scene.inner), before, "after {creates} creates");
    }
}

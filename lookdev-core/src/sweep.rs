//! Curved backdrop ("sweep"): a quarter-arc wall fused to a floor panel.
//!
//! Built in the sweep's local frame, camera on +Z: the floor runs from
//! `z = -floor_length` toward the camera and the arc rises behind it.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::anim::Channel;
use crate::bounds::BoundsAnalysis;
use crate::plan::NodeSpec;
use crate::scene::join_path;
use crate::shading::{material_spec, PrincipledShader};

pub const ARC_RADIUS_FACTOR: f64 = 4.0;
pub const SWEEP_WIDTH_FACTOR: f64 = 10.0;
/// Floor length is the camera distance over this.
pub const FLOOR_LENGTH_DIVISOR: f64 = 4.0;
/// The floor panel is this many floor lengths deep.
pub const FLOOR_DEPTH_FACTOR: f64 = 4.0;
pub const ARC_DIVISIONS: u32 = 16;
pub const ARC_SWEEP_DEG: f64 = 90.0;
pub const FLOOR_ROWS: i64 = 2;
pub const FLOOR_COLS: i64 = 2;
pub const BACKDROP_ALBEDO: f64 = 0.007;
pub const BACKDROP_ROUGHNESS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepGeometryParams {
    pub arc_radius: f64,
    pub sweep_width: f64,
    pub floor_length: f64,
    pub object_base_height: f64,
}

impl SweepGeometryParams {
    pub fn derive(bounds: &BoundsAnalysis) -> Self {
        let extent = bounds.max_extent();
        Self {
            arc_radius: extent * ARC_RADIUS_FACTOR,
            sweep_width: extent * SWEEP_WIDTH_FACTOR,
            floor_length: bounds.camera_distance / FLOOR_LENGTH_DIVISOR,
            object_base_height: bounds.center.y - bounds.size.y / 2.0,
        }
    }

    pub fn floor_depth(&self) -> f64 {
        self.floor_length * FLOOR_DEPTH_FACTOR
    }
}

/// Object-level transform of the sweep under the backdrop control.
pub fn placement(bounds: &BoundsAnalysis) -> DVec3 {
    DVec3::new(bounds.center.x, -bounds.center.y, -bounds.camera_distance)
}

/// Surface network inside the sweep geometry node at `geo`.
///
/// arc -> offset -> extrude -> shift, merged with the floor, fused,
/// subdivided, re-centred, shaded, and terminated by an output null.
pub fn network(geo: &str, params: &SweepGeometryParams, center: DVec3) -> Vec<NodeSpec> {
    let at = |name: &str| join_path(geo, name);
    let matnet = at("matnet");
    let shader = join_path(&matnet, "grey_shader");
    let w = params.sweep_width;

    vec![
        NodeSpec::new(&matnet, "matnet"),
        PrincipledShader::diffuse(BACKDROP_ALBEDO, BACKDROP_ROUGHNESS).to_spec(&shader),
        NodeSpec::new(at("arc"), "circle")
            .param("type", 1)
            .param("arc", true)
            .param("orient", 3)
            .param("beginangle", 0.0)
            .param("endangle", ARC_SWEEP_DEG)
            .param("scale", params.arc_radius)
            .param("divs", ARC_DIVISIONS as i64)
            .param("ry", 90.0)
            .param("rz", -90.0)
            .param("ty", params.object_base_height + params.arc_radius),
        NodeSpec::new(at("offset_arc"), "xform")
            .input(0, at("arc"))
            .param("t", DVec3::new(0.0, 0.0, -params.floor_length)),
        NodeSpec::new(at("extrude"), "polyextrude")
            .input(0, at("offset_arc"))
            .param("translatex", w)
            .param("outputfront", true)
            .param("xformfront", true)
            .param("xformspace", "global"),
        NodeSpec::new(at("shift"), "xform")
            .input(0, at("extrude"))
            .param("tx", -w / 2.0),
        NodeSpec::new(at("floor"), "grid")
            .param("sizex", w)
            .param("sizey", params.floor_depth())
            .param("tz", params.floor_length)
            .param("ty", params.object_base_height)
            .param("rows", FLOOR_ROWS)
            .param("cols", FLOOR_COLS),
        NodeSpec::new(at("merge"), "merge")
            .input(0, at("floor"))
            .input(1, at("shift")),
        NodeSpec::new(at("fuse"), "fuse").input(0, at("merge")),
        NodeSpec::new(at("subdivide"), "subdivide")
            .input(0, at("fuse"))
            .param("iterations", 1),
        NodeSpec::new(at("center"), "xform")
            .input(0, at("subdivide"))
            .param("tx", -center.x)
            .param("tz", -center.z)
            .param("px", -center.x)
            .param("pz", -center.z),
        material_spec(at("material"), &at("center"), &shader),
        NodeSpec::new(at("OUT"), "null")
            .input(0, at("material"))
            .output(),
    ]
}

/// The sweep geometry node itself, parented under the backdrop control and locked.
pub fn object_spec(geo: &str, control: &str, bounds: &BoundsAnalysis) -> NodeSpec {
    let t = placement(bounds);
    NodeSpec::new(geo, "geo")
        .parent_input(control)
        .param(Channel::Tx.as_str(), t.x)
        .param(Channel::Ty.as_str(), t.y)
        .param(Channel::Tz.as_str(), t.z)
        .lock_transform()
}

/// Empty stand-in used when the backdrop is disabled.
pub fn placeholder_spec(geo: &str) -> NodeSpec {
    NodeSpec::new(geo, "geo")
}

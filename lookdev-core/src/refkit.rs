//! Calibration kit: chrome ball, grey ball and a colour chart, framed in the
//! top-left corner of the camera view.
//!
//! The kit is authored at a working scale, shrunk by [`KIT_SCALE`] and placed at
//! [`CAMERA_OFFSET`] in camera space. Both values assume a 16:9 camera; change
//! the aspect and they must be recomputed together.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::anim::Channel;
use crate::bounds::BoundingBox;
use crate::mesh::{self, Mesh};
use crate::plan::NodeSpec;
use crate::scene::join_path;
use crate::shading::{material_spec, PrincipledShader};

pub const BALL_SPACING: f64 = 2.5;
pub const BALL_RADIUS: f64 = 1.0;
pub const CHART_WIDTH: f64 = 2.0;
pub const CHART_HEIGHT: f64 = 1.4;
/// Tilts the chart grid up to face the camera axis.
pub const CHART_TILT_DEG: f64 = -90.0;
pub const KIT_SCALE: f64 = 0.008;
pub const CAMERA_OFFSET: DVec3 = DVec3::new(-0.072, 0.047, -0.25);

pub const CHROME_ROUGHNESS: f64 = 0.02;
pub const GREY_ALBEDO: f64 = 0.18;
pub const GREY_ROUGHNESS: f64 = 0.5;
pub const CHART_ROUGHNESS: f64 = 1.0;

/// Orthographic UV projection fitted to a surface's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvProjection {
    pub translate: DVec3,
    pub scale: DVec3,
}

impl UvProjection {
    pub fn fit(bounds: &BoundingBox) -> Self {
        Self {
            translate: bounds.center,
            scale: bounds.size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceKitLayout {
    pub ball_spacing: f64,
    pub ball_radius: f64,
    pub chart_size: [f64; 2],
    pub scale: f64,
    pub camera_offset: DVec3,
}

impl Default for ReferenceKitLayout {
    fn default() -> Self {
        Self {
            ball_spacing: BALL_SPACING,
            ball_radius: BALL_RADIUS,
            chart_size: [CHART_WIDTH, CHART_HEIGHT],
            scale: KIT_SCALE,
            camera_offset: CAMERA_OFFSET,
        }
    }
}

impl ReferenceKitLayout {
    pub fn chrome_center(&self) -> DVec3 {
        DVec3::new(-self.ball_spacing, 0.0, 0.0)
    }

    pub fn grey_center(&self) -> DVec3 {
        DVec3::new(self.ball_spacing, 0.0, 0.0)
    }

    pub fn chart_mesh(&self) -> Mesh {
        mesh::grid(self.chart_size[0], self.chart_size[1], 2, 2)
            .transformed(DMat4::from_rotation_x(CHART_TILT_DEG.to_radians()))
    }

    /// Bounds of the chart as built, which the UV projection is fitted to.
    pub fn chart_bounds(&self) -> BoundingBox {
        self.chart_mesh()
            .bounds()
            .unwrap_or_else(|| BoundingBox::new(DVec3::ZERO, DVec3::ZERO))
    }

    pub fn uv_projection(&self) -> UvProjection {
        UvProjection::fit(&self.chart_bounds())
    }
}

/// Surface network inside the kit geometry node at `geo`.
pub fn network(geo: &str, layout: &ReferenceKitLayout, chart_texture: &str) -> Vec<NodeSpec> {
    let at = |name: &str| join_path(geo, name);
    let matnet = at("matnet");
    let chrome_shader = join_path(&matnet, "chrome_shader");
    let grey_shader = join_path(&matnet, "grey_shader");
    let chart_shader = join_path(&matnet, "macbeth_shader");
    let uv = layout.uv_projection();

    vec![
        NodeSpec::new(&matnet, "matnet"),
        PrincipledShader::metal(CHROME_ROUGHNESS).to_spec(&chrome_shader),
        PrincipledShader::diffuse(GREY_ALBEDO, GREY_ROUGHNESS).to_spec(&grey_shader),
        PrincipledShader::textured(chart_texture, CHART_ROUGHNESS).to_spec(&chart_shader),
        NodeSpec::new(at("chrome_ball"), "sphere")
            .param("type", 2)
            .param("rad", DVec3::splat(layout.ball_radius))
            .param("t", layout.chrome_center()),
        material_spec(at("chrome_mat"), &at("chrome_ball"), &chrome_shader),
        NodeSpec::new(at("grey_ball"), "sphere")
            .param("type", 2)
            .param("rad", DVec3::splat(layout.ball_radius))
            .param("t", layout.grey_center()),
        material_spec(at("grey_mat"), &at("grey_ball"), &grey_shader),
        NodeSpec::new(at("macbeth_chart"), "grid")
            .param("sizex", layout.chart_size[0])
            .param("sizey", layout.chart_size[1])
            .param("t", DVec3::ZERO)
            .param("r", DVec3::new(CHART_TILT_DEG, 0.0, 0.0)),
        NodeSpec::new(at("uv"), "uvproject")
            .input(0, at("macbeth_chart"))
            .param("projtype", 0)
            .param("t", uv.translate)
            .param("s", uv.scale),
        material_spec(at("chart_mat"), &at("uv"), &chart_shader),
        NodeSpec::new(at("merge_refs"), "merge")
            .input(0, at("chart_mat"))
            .input(1, at("grey_mat"))
            .input(2, at("chrome_mat")),
        NodeSpec::new(at("scale"), "xform")
            .input(0, at("merge_refs"))
            .param("s", DVec3::splat(layout.scale)),
        NodeSpec::new(at("OUT"), "null")
            .input(0, at("scale"))
            .output(),
    ]
}

/// The kit geometry node: parented to the camera, placed, locked.
pub fn object_spec(geo: &str, camera: &str, layout: &ReferenceKitLayout) -> NodeSpec {
    let t = layout.camera_offset;
    NodeSpec::new(geo, "geo")
        .parent_input(camera)
        .param(Channel::Tx.as_str(), t.x)
        .param(Channel::Ty.as_str(), t.y)
        .param(Channel::Tz.as_str(), t.z)
        .lock_transform()
}

pub fn placeholder_spec(geo: &str) -> NodeSpec {
    NodeSpec::new(geo, "geo")
}

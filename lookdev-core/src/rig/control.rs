//! The rig control node and the expressions that let it drive the rig.

use serde::{Deserialize, Serialize};

use crate::anim::Channel;
use crate::scene::{join_path, relative_path, ParamTemplate};

pub const HDRI_ROTATION_OFFSET: &str = "hdri_rotation_offset";
pub const CAMERA_HEIGHT_OFFSET: &str = "camera_height_offset";
pub const HDRI_ROTATION_RANGE: (f64, f64) = (-360.0, 360.0);
pub const CAMERA_HEIGHT_RANGE: (f64, f64) = (-10.0, 50.0);

/// A channel driven by a parameter on the control node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionBinding {
    pub node: String,
    pub channel: Channel,
    pub source: String,
}

impl ExpressionBinding {
    pub fn new(node: &str, channel: Channel, control: &str, param: &str) -> Self {
        Self {
            node: node.to_string(),
            channel,
            source: join_path(control, param),
        }
    }

    /// Host expression reading the source parameter relative to the bound node.
    pub fn expression(&self) -> String {
        format!("ch(\"{}\")", relative_path(&self.node, &self.source))
    }
}

pub fn parameters(hdri_rotation_default: f64) -> [ParamTemplate; 2] {
    [
        ParamTemplate {
            name: HDRI_ROTATION_OFFSET.to_string(),
            label: "HDRI Rotation Offset".to_string(),
            default: hdri_rotation_default,
            min: HDRI_ROTATION_RANGE.0,
            max: HDRI_ROTATION_RANGE.1,
        },
        ParamTemplate {
            name: CAMERA_HEIGHT_OFFSET.to_string(),
            label: "Camera Height Offset".to_string(),
            default: 0.0,
            min: CAMERA_HEIGHT_RANGE.0,
            max: CAMERA_HEIGHT_RANGE.1,
        },
    ]
}

/// HDRI offset rotates the light's parent; height offset lifts the camera's parent.
pub fn bindings(
    control: &str,
    hdri_rotation: &str,
    camera_transform: &str,
) -> [ExpressionBinding; 2] {
    [
        ExpressionBinding::new(hdri_rotation, Channel::Ry, control, HDRI_ROTATION_OFFSET),
        ExpressionBinding::new(camera_transform, Channel::Ty, control, CAMERA_HEIGHT_OFFSET),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_are_relative_to_the_bound_node() {
        let [hdri, height] = bindings(
            "/obj/lookdev_rig_control",
            "/obj/lookdev_rig/hdri_rotation",
            "/obj/lookdev_rig/camera_transform",
        );
        assert_eq!(hdri.channel, Channel::Ry);
        assert_eq!(hdri.expression(), r#"ch("../../lookdev_rig_control/hdri_rotation_offset")"#);
        assert_eq!(height.channel, Channel::Ty);
        assert_eq!(height.expression(), r#"ch("../../lookdev_rig_control/camera_height_offset")"#);
    }

    #[test]
    fn hdri_default_comes_from_config() {
        let [hdri, height] = parameters(15.0);
        assert_eq!(hdri.default, 15.0);
        assert_eq!((hdri.min, hdri.max), (-360.0, 360.0));
        assert_eq!(height.default, 0.0);
        assert_eq!((height.min, height.max), (-10.0, 50.0));
    }
}

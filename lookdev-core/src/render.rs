//! Render job descriptor for the turntable: what is visible, what lights it,
//! which frames.

use serde::{Deserialize, Serialize};

use crate::anim::turntable::FrameRange;
use crate::error::Result;
use crate::plan::NodeSpec;

pub const ROP_NETWORK_TYPE: &str = "ropnet";
pub const RENDER_NODE_TYPE: &str = "ifd";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    pub camera: String,
    /// Objects rendered regardless of the candidate mask.
    pub forced_objects: Vec<String>,
    /// The only light sources; candidate lights are cleared.
    pub forced_lights: Vec<String>,
    pub frames: FrameRange,
}

impl RenderJob {
    /// `reference_kit`, `backdrop` and `subject` are forced visible in that order.
    pub fn new(
        camera: &str,
        reference_kit: &str,
        backdrop: &str,
        subject: &str,
        light: &str,
        start_frame: i32,
    ) -> Result<Self> {
        Ok(Self {
            camera: camera.to_string(),
            forced_objects: vec![
                reference_kit.to_string(),
                backdrop.to_string(),
                subject.to_string(),
            ],
            forced_lights: vec![light.to_string()],
            frames: FrameRange::full(start_frame)?,
        })
    }

    /// Render driver node. Depends on every object it names.
    pub fn to_spec(&self, path: impl Into<String>) -> NodeSpec {
        let mut spec = NodeSpec::new(path, RENDER_NODE_TYPE)
            .param("camera", self.camera.as_str())
            .param("vobject", "")
            .param("forceobject", self.forced_objects.join(" "))
            .param("alights", "")
            .param("forcelights", self.forced_lights.join(" "))
            .param("trange", 1)
            .param("f1", self.frames.start)
            .param("f2", self.frames.end)
            .after(self.camera.as_str());
        for path in self.forced_objects.iter().chain(&self.forced_lights) {
            spec = spec.after(path.as_str());
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RigError;
    use crate::scene::ParamValue;

    #[test]
    fn job_covers_orbit_and_unwind() {
        let job = RenderJob::new("/r/cam", "/r/refs", "/r/sweep", "/obj/subject", "/r/env", 1001)
            .unwrap();
        assert_eq!(
            job.frames,
            FrameRange {
                start: 1001,
                end: 1200,
            }
        );
        let spec = job.to_spec("/obj/lookdev_ropnet/lookdev_mantra");
        assert_eq!(
            spec.get_param("forceobject").and_then(ParamValue::as_str),
            Some("/r/refs /r/sweep /obj/subject")
        );
        assert_eq!(
            spec.get_param("forcelights").and_then(ParamValue::as_str),
            Some("/r/env")
        );
        assert_eq!(spec.get_param("alights").and_then(ParamValue::as_str), Some(""));
        assert_eq!(spec.get_f64("f2"), Some(1200.0));
        assert!(spec.dependencies().contains(&"/obj/subject"));
    }

    #[test]
    fn frame_window_must_fit() {
        let job = RenderJob::new("/c", "/k", "/s", "/o", "/l", i32::MAX - 100);
        assert!(matches!(job, Err(RigError::InvalidStartFrame(_))));
    }
}

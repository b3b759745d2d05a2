//! Orbit and counter-rotation keyers.
//!
//! Frame window, relative to the start frame:
//! - `0..=100`: orbit keys (101 samples, one full turn every 99 frames)
//! - `99..=199`: the env light unwinds while orbiting elements hold

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::{AnimationTrack, Channel};
use crate::bounds::BoundsAnalysis;
use crate::error::{Result, RigError};

/// Frames per full orbit; `t = (f - start) / ORBIT_PERIOD_FRAMES`.
pub const ORBIT_PERIOD_FRAMES: i32 = 99;
/// Last keyed orbit frame, relative to the start frame.
pub const ORBIT_LAST_OFFSET: i32 = 100;
/// Last frame of the unwind segment, relative to the start frame.
pub const UNWIND_END_OFFSET: i32 = 199;
/// The light starts opposite the camera.
pub const LIGHT_PHASE_DEG: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraOrbitParams {
    pub center: DVec3,
    pub radius: f64,
    pub initial_angle_deg: f64,
    pub start_frame: i32,
}

impl CameraOrbitParams {
    pub fn from_bounds(bounds: &BoundsAnalysis, initial_angle_deg: f64, start_frame: i32) -> Self {
        Self {
            center: bounds.center,
            radius: bounds.camera_distance,
            initial_angle_deg,
            start_frame,
        }
    }

    pub fn angle_at(&self, frame: i32) -> f64 {
        let t = (frame - self.start_frame) as f64 / ORBIT_PERIOD_FRAMES as f64;
        self.initial_angle_deg + t * 360.0
    }

    pub fn position_at(&self, frame: i32) -> DVec3 {
        let rad = self.angle_at(frame).to_radians();
        DVec3::new(
            self.center.x + self.radius * rad.sin(),
            self.center.y,
            self.center.z + self.radius * rad.cos(),
        )
    }
}

/// Inclusive frame range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i32,
    pub end: i32,
}

/// `start_frame + offset`, or [`RigError::InvalidStartFrame`] if that leaves `i32`.
pub fn frame_at(start_frame: i32, offset: i32) -> Result<i32> {
    start_frame
        .checked_add(offset)
        .ok_or(RigError::InvalidStartFrame(start_frame))
}

impl FrameRange {
    pub fn orbit(start_frame: i32) -> Result<Self> {
        Ok(Self {
            start: start_frame,
            end: frame_at(start_frame, ORBIT_LAST_OFFSET)?,
        })
    }

    /// Orbit plus unwind; what the render job covers.
    pub fn full(start_frame: i32) -> Result<Self> {
        Ok(Self {
            start: start_frame,
            end: frame_at(start_frame, UNWIND_END_OFFSET)?,
        })
    }

    pub fn frames(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        (i64::from(self.end) - i64::from(self.start) + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Per-channel translation tracks of an orbiting transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateTracks {
    pub tx: AnimationTrack,
    pub ty: AnimationTrack,
    pub tz: AnimationTrack,
}

impl TranslateTracks {
    pub fn channels(&self) -> [(Channel, &AnimationTrack); 3] {
        [
            (Channel::Tx, &self.tx),
            (Channel::Ty, &self.ty),
            (Channel::Tz, &self.tz),
        ]
    }

    pub fn position_at(&self, frame: i32) -> Option<DVec3> {
        Some(DVec3::new(
            self.tx.key_at(frame)?,
            self.ty.key_at(frame)?,
            self.tz.key_at(frame)?,
        ))
    }
}

/// Key the orbit. Camera and backdrop control share this so they match exactly.
pub fn orbit_tracks(params: &CameraOrbitParams) -> Result<TranslateTracks> {
    let range = FrameRange::orbit(params.start_frame)?;
    let mut tracks = TranslateTracks {
        tx: AnimationTrack::with_capacity(range.len()),
        ty: AnimationTrack::with_capacity(range.len()),
        tz: AnimationTrack::with_capacity(range.len()),
    };
    for f in range.frames() {
        let p = params.position_at(f);
        tracks.tx.push(f, p.x)?;
        tracks.ty.push(f, p.y)?;
        tracks.tz.push(f, p.z)?;
    }
    log::debug!(
        "orbit keyed: frames {}..={} radius={} initial={}",
        range.start,
        range.end,
        params.radius,
        params.initial_angle_deg
    );
    Ok(tracks)
}

/// Three-key `ry` track: +360 over the orbit, -360 over the unwind.
pub fn env_light_rotation_track(
    initial_angle_deg: f64,
    start_frame: i32,
) -> Result<AnimationTrack> {
    let base = initial_angle_deg + LIGHT_PHASE_DEG;
    let mut ry = AnimationTrack::with_capacity(3);
    ry.push(start_frame, base - 360.0)?;
    ry.push(frame_at(start_frame, ORBIT_PERIOD_FRAMES)?, base)?;
    ry.push(frame_at(start_frame, UNWIND_END_OFFSET)?, base - 360.0)?;
    Ok(ry)
}

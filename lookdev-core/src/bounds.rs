//! Subject bounds and the camera standoff derived from them.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Multiplier applied to the largest extent when the subject is wider than tall.
pub const WIDE_DISTANCE_MULTIPLIER: f64 = 2.5;
/// Multiplier for narrow or tall subjects.
pub const NARROW_DISTANCE_MULTIPLIER: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub center: DVec3,
    pub size: DVec3,
}

impl BoundingBox {
    pub fn new(center: DVec3, size: DVec3) -> Self {
        Self { center, size }
    }

    pub fn from_min_max(min: DVec3, max: DVec3) -> Self {
        let (lo, hi) = (min.min(max), min.max(max));
        Self {
            center: (lo + hi) * 0.5,
            size: hi - lo,
        }
    }

    /// Axis-aligned box around a point cloud; `None` when empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (lo, hi) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self::from_min_max(lo, hi))
    }

    pub fn min(&self) -> DVec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> DVec3 {
        self.center + self.size * 0.5
    }

    pub fn max_extent(&self) -> f64 {
        self.size.max_element()
    }

    pub fn is_degenerate(&self) -> bool {
        self.max_extent() <= 0.0
    }
}

/// What every downstream builder needs to know about the subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsAnalysis {
    pub center: DVec3,
    pub size: DVec3,
    pub distance_multiplier: f64,
    pub camera_distance: f64,
}

impl BoundsAnalysis {
    pub fn max_extent(&self) -> f64 {
        self.size.max_element()
    }
}

pub fn distance_multiplier(size: DVec3) -> f64 {
    if size.x > size.y {
        WIDE_DISTANCE_MULTIPLIER
    } else {
        NARROW_DISTANCE_MULTIPLIER
    }
}

/// Derive center, extents and camera distance. Zero-size subjects are not
/// rejected: they yield a zero camera distance.
pub fn analyze(bounds: &BoundingBox) -> BoundsAnalysis {
    let distance_multiplier = distance_multiplier(bounds.size);
    let camera_distance = bounds.max_extent() * distance_multiplier;
    if bounds.is_degenerate() {
        log::warn!(
            "subject bounds are degenerate ({:?}); camera distance is {}",
            bounds.size,
            camera_distance
        );
    }
    log::debug!(
        "bounds: center={:?} size={:?} multiplier={} distance={}",
        bounds.center,
        bounds.size,
        distance_multiplier,
        camera_distance
    );
    BoundsAnalysis {
        center: bounds.center,
        size: bounds.size,
        distance_multiplier,
        camera_distance,
    }
}

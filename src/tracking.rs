//! Input types delivered by the hand-tracking provider once per tick.

use serde::{Deserialize, Serialize};
use std::ops::{Div, Sub};

/// Position (or derivative) of the tracked fingertip in tracker space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component along `axis`.
    pub fn component(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// Tracker axis selectable as a feature source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// One tick's worth of tracking data.
///
/// `dt` is the wall-clock time in seconds since the previous sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingSample {
    pub is_tracked: bool,
    pub position: Vec3,
    pub dt: f32,
}

impl TrackingSample {
    pub fn tracked(position: Vec3, dt: f32) -> Self {
        Self {
            is_tracked: true,
            position,
            dt,
        }
    }

    pub fn lost(dt: f32) -> Self {
        Self {
            is_tracked: false,
            position: Vec3::ZERO,
            dt,
        }
    }
}

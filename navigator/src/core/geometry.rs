//! World-space geometry shared across the crate.
//!
//! Positions are `nalgebra` points in simulator units (meters). A [`Pose`]
//! pairs a position with a heading; headings are yaw-only because the
//! supervisor never reasons about pitch or roll.

use nalgebra::{Point3, Vector3};

/// A position in simulator world space.
pub type WorldPoint = Point3<f64>;

/// Position plus yaw heading (radians, counterclockwise from +x).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: WorldPoint,
    pub yaw: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            yaw,
        }
    }

    /// Unit vector pointing along the heading, in the ground plane.
    pub fn forward(&self) -> Vector3<f64> {
        Vector3::new(self.yaw.cos(), self.yaw.sin(), 0.0)
    }
}

/// Straight-line distance between two world points.
pub fn distance(a: &WorldPoint, b: &WorldPoint) -> f64 {
    nalgebra::distance(a, b)
}

/// Total polyline length of a planned route's waypoint positions.
pub fn route_length(positions: &[WorldPoint]) -> f64 {
    positions
        .windows(2)
        .map(|pair| distance(&pair[0], &pair[1]))
        .sum()
}

/// Normalize an angle to `(-pi, pi]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let mut wrapped = angle % std::f64::consts::TAU;
    if wrapped > std::f64::consts::PI {
        wrapped -= std::f64::consts::TAU;
    } else if wrapped <= -std::f64::consts::PI {
        wrapped += std::f64::consts::TAU;
    }
    wrapped
}

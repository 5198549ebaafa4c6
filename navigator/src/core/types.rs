//! Shared deterministic types for the supervisor core.
//!
//! These types define stable contracts between core components and the
//! simulator/agent seams. They hold no I/O state and must remain cheap to
//! copy around the step loop.

use std::fmt;

use crate::core::geometry::WorldPoint;

/// Opaque handle to a vehicle actor owned by the simulator backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VehicleId(pub u64);

/// Opaque handle to a sensor actor owned by the simulator backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorId(pub u64);

/// The fixed sensor suite attached to every provisioned vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Camera,
    Radar,
    Collision,
}

impl SensorKind {
    /// Attach order used by the provisioner. Fixed; rollback and teardown
    /// release in this same order.
    pub const PROVISION_ORDER: [SensorKind; 3] =
        [SensorKind::Camera, SensorKind::Radar, SensorKind::Collision];

    /// Simulator blueprint identifier for this sensor.
    pub fn blueprint(&self) -> &'static str {
        match self {
            SensorKind::Camera => "sensor.camera.rgb",
            SensorKind::Radar => "sensor.other.radar",
            SensorKind::Collision => "sensor.other.collision",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Camera => "camera",
            SensorKind::Radar => "radar",
            SensorKind::Collision => "collision",
        };
        f.write_str(name)
    }
}

/// One control command applied to the vehicle for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    pub throttle: f64,
    pub steer: f64,
    pub brake: f64,
}

impl Control {
    /// The reactive stop override: throttle released, full brake.
    pub fn full_brake() -> Self {
        Self {
            throttle: 0.0,
            steer: 0.0,
            brake: 1.0,
        }
    }

    pub fn coast() -> Self {
        Self {
            throttle: 0.0,
            steer: 0.0,
            brake: 0.0,
        }
    }
}

/// One waypoint of a planned route, as reported by the route agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteWaypoint {
    pub position: WorldPoint,
    pub road_id: i64,
    pub lane_id: i64,
}

/// A collision reported by the backend's collision sensor, surfaced to the
/// step loop through a polled queue. Logged, never acted upon.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    /// Type id of the actor the vehicle collided with.
    pub other: String,
    /// Norm of the collision impulse.
    pub intensity: f64,
}

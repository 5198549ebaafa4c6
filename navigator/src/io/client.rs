//! Simulator client seam.
//!
//! The [`SimulatorClient`] trait decouples the supervisor from the actual
//! simulation backend. The built-in [`crate::io::playground::PlaygroundWorld`]
//! implements it for tests and local runs; a networked backend would
//! implement the same surface. Tests use scripted clients that return
//! predetermined results without any world state.

use anyhow::Result;

use crate::core::geometry::{Pose, WorldPoint};
use crate::core::types::{CollisionEvent, Control, SensorId, SensorKind, VehicleId};

/// Abstraction over simulation backends.
///
/// Spawn calls follow try-spawn semantics: `Ok(None)` means the backend
/// declined (occupied spawn point, unknown parent) while `Err` is a backend
/// fault. Actor handles stay valid until the matching destroy call.
pub trait SimulatorClient {
    /// The map's spawn-point table, used to build the landmark table.
    fn spawn_points(&self) -> Result<Vec<Pose>>;

    /// Project a pose onto the road network.
    fn project_to_road(&self, pose: &Pose) -> Result<Pose>;

    /// Spawn a vehicle actor. `Ok(None)` when the spawn is declined.
    fn try_spawn_vehicle(&mut self, blueprint: &str, at: &Pose) -> Result<Option<VehicleId>>;

    /// Attach a sensor to a vehicle and start listening.
    /// `Ok(None)` when the attach is declined.
    fn attach_sensor(&mut self, vehicle: VehicleId, kind: SensorKind) -> Result<Option<SensorId>>;

    /// Stop a sensor's data feed.
    fn stop_sensor(&mut self, sensor: SensorId) -> Result<()>;

    /// Destroy a sensor actor.
    fn destroy_sensor(&mut self, sensor: SensorId) -> Result<()>;

    /// Destroy a vehicle actor.
    fn destroy_vehicle(&mut self, vehicle: VehicleId) -> Result<()>;

    /// Current pose of a vehicle.
    fn vehicle_pose(&self, vehicle: VehicleId) -> Result<Pose>;

    /// Apply a control command; takes effect on the next tick.
    fn apply_control(&mut self, vehicle: VehicleId, control: &Control) -> Result<()>;

    /// Advance simulation time by one fixed step.
    fn tick(&mut self) -> Result<()>;

    /// Move the spectator viewpoint behind the vehicle. Cosmetic.
    fn follow_with_spectator(&mut self, vehicle: VehicleId) -> Result<()>;

    /// Draw a named debug marker in the world. Cosmetic.
    fn draw_marker(&mut self, location: &WorldPoint, label: &str) -> Result<()>;

    /// Take all collision events reported since the last drain.
    ///
    /// Collision detection runs inside the backend; the supervisor only
    /// polls this queue and logs what it finds.
    fn drain_collisions(&mut self) -> Vec<CollisionEvent>;
}

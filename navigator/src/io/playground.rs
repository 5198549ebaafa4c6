//! Built-in deterministic simulation backend.
//!
//! A small kinematic world implementing [`SimulatorClient`] so the CLI, the
//! evaluation harness, and the integration tests can run real trips without
//! an external simulator process. Physics is deliberately crude: vehicles
//! accelerate against drag, turn at a fixed rate, and move in the ground
//! plane. One tick advances the world by a fixed delta, matching the
//! synchronous mode the supervisor expects.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::core::geometry::{distance, Pose, WorldPoint};
use crate::core::types::{CollisionEvent, Control, SensorId, SensorKind, VehicleId};
use crate::io::client::SimulatorClient;

/// Fixed simulation delta per tick, in seconds.
pub const TICK_DELTA: f64 = 0.05;

const SPAWN_GRID_COLUMNS: usize = 20;
const SPAWN_GRID_ROWS: usize = 15;
const SPAWN_GRID_SPACING: f64 = 25.0;
const ROAD_Z: f64 = 0.3;

const MAX_ACCEL: f64 = 6.0;
const MAX_BRAKE: f64 = 8.0;
const DRAG: f64 = 0.5;
const YAW_RATE: f64 = 2.5;
const SPAWN_CLEARANCE: f64 = 2.0;

#[derive(Debug, Clone)]
struct VehicleState {
    pose: Pose,
    speed: f64,
    control: Control,
}

#[derive(Debug, Clone)]
struct SensorState {
    vehicle: VehicleId,
    kind: SensorKind,
    listening: bool,
    frames: u64,
}

/// A static object vehicles can collide with.
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub label: String,
    pub location: WorldPoint,
    pub radius: f64,
}

/// The built-in kinematic world.
#[derive(Debug)]
pub struct PlaygroundWorld {
    spawn_points: Vec<Pose>,
    vehicles: HashMap<VehicleId, VehicleState>,
    sensors: HashMap<SensorId, SensorState>,
    obstacles: Vec<Obstacle>,
    in_contact: HashMap<(VehicleId, usize), bool>,
    pending_collisions: Vec<CollisionEvent>,
    spectator: Option<Pose>,
    markers: Vec<(WorldPoint, String)>,
    next_actor_id: u64,
    ticks: u64,
}

impl PlaygroundWorld {
    /// A world with the standard spawn grid and no obstacles.
    pub fn new() -> Self {
        let spawn_points = (0..SPAWN_GRID_COLUMNS * SPAWN_GRID_ROWS)
            .map(|i| {
                let x = (i % SPAWN_GRID_COLUMNS) as f64 * SPAWN_GRID_SPACING;
                let y = (i / SPAWN_GRID_COLUMNS) as f64 * SPAWN_GRID_SPACING;
                let yaw = (i % 4) as f64 * std::f64::consts::FRAC_PI_2;
                Pose::new(x, y, ROAD_Z, yaw)
            })
            .collect();
        Self {
            spawn_points,
            vehicles: HashMap::new(),
            sensors: HashMap::new(),
            obstacles: Vec::new(),
            in_contact: HashMap::new(),
            pending_collisions: Vec::new(),
            spectator: None,
            markers: Vec::new(),
            next_actor_id: 1,
            ticks: 0,
        }
    }

    pub fn with_obstacles(obstacles: Vec<Obstacle>) -> Self {
        Self {
            obstacles,
            ..Self::new()
        }
    }

    /// Vehicles plus sensors currently alive. Zero after full teardown.
    pub fn live_actor_count(&self) -> usize {
        self.vehicles.len() + self.sensors.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Frames captured by a sensor so far, if it is still alive.
    pub fn sensor_frames(&self, sensor: SensorId) -> Option<u64> {
        self.sensors.get(&sensor).map(|state| state.frames)
    }

    /// Debug markers drawn so far, oldest first.
    pub fn markers(&self) -> &[(WorldPoint, String)] {
        &self.markers
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_actor_id;
        self.next_actor_id += 1;
        id
    }

    fn step_vehicle(state: &mut VehicleState) {
        let control = state.control;
        let accel = control.throttle.clamp(0.0, 1.0) * MAX_ACCEL
            - control.brake.clamp(0.0, 1.0) * MAX_BRAKE;
        state.speed += accel * TICK_DELTA;
        state.speed -= DRAG * state.speed * TICK_DELTA;
        state.speed = state.speed.max(0.0);

        state.pose.yaw += control.steer.clamp(-1.0, 1.0) * YAW_RATE * TICK_DELTA;
        let step = state.pose.forward() * state.speed * TICK_DELTA;
        state.pose.position += step;
    }

    fn detect_collisions(&mut self) {
        let has_collision_sensor: Vec<VehicleId> = self
            .sensors
            .values()
            .filter(|s| s.kind == SensorKind::Collision && s.listening)
            .map(|s| s.vehicle)
            .collect();

        for vehicle_id in has_collision_sensor {
            let Some(state) = self.vehicles.get(&vehicle_id) else {
                continue;
            };
            for (index, obstacle) in self.obstacles.iter().enumerate() {
                let touching =
                    distance(&state.pose.position, &obstacle.location) < obstacle.radius;
                let key = (vehicle_id, index);
                let was_touching = self.in_contact.get(&key).copied().unwrap_or(false);
                if touching && !was_touching {
                    // Impulse is the momentum lost along the heading.
                    let impulse = state.pose.forward() * state.speed;
                    self.pending_collisions.push(CollisionEvent {
                        other: obstacle.label.clone(),
                        intensity: impulse.norm(),
                    });
                }
                self.in_contact.insert(key, touching);
            }
        }
    }
}

impl Default for PlaygroundWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorClient for PlaygroundWorld {
    fn spawn_points(&self) -> Result<Vec<Pose>> {
        Ok(self.spawn_points.clone())
    }

    fn project_to_road(&self, pose: &Pose) -> Result<Pose> {
        let mut projected = *pose;
        projected.position.z = ROAD_Z;
        Ok(projected)
    }

    fn try_spawn_vehicle(&mut self, _blueprint: &str, at: &Pose) -> Result<Option<VehicleId>> {
        let occupied = self
            .vehicles
            .values()
            .any(|v| distance(&v.pose.position, &at.position) < SPAWN_CLEARANCE);
        if occupied {
            return Ok(None);
        }
        let id = VehicleId(self.next_id());
        self.vehicles.insert(
            id,
            VehicleState {
                pose: *at,
                speed: 0.0,
                control: Control::coast(),
            },
        );
        Ok(Some(id))
    }

    fn attach_sensor(&mut self, vehicle: VehicleId, kind: SensorKind) -> Result<Option<SensorId>> {
        if !self.vehicles.contains_key(&vehicle) {
            return Err(anyhow!("attach {kind}: vehicle {} not found", vehicle.0));
        }
        let id = SensorId(self.next_id());
        self.sensors.insert(
            id,
            SensorState {
                vehicle,
                kind,
                listening: true,
                frames: 0,
            },
        );
        Ok(Some(id))
    }

    fn stop_sensor(&mut self, sensor: SensorId) -> Result<()> {
        let state = self
            .sensors
            .get_mut(&sensor)
            .ok_or_else(|| anyhow!("stop: sensor {} not found", sensor.0))?;
        state.listening = false;
        Ok(())
    }

    fn destroy_sensor(&mut self, sensor: SensorId) -> Result<()> {
        self.sensors
            .remove(&sensor)
            .map(|_| ())
            .ok_or_else(|| anyhow!("destroy: sensor {} not found", sensor.0))
    }

    fn destroy_vehicle(&mut self, vehicle: VehicleId) -> Result<()> {
        self.vehicles
            .remove(&vehicle)
            .map(|_| ())
            .ok_or_else(|| anyhow!("destroy: vehicle {} not found", vehicle.0))
    }

    fn vehicle_pose(&self, vehicle: VehicleId) -> Result<Pose> {
        self.vehicles
            .get(&vehicle)
            .map(|state| state.pose)
            .ok_or_else(|| anyhow!("pose: vehicle {} not found", vehicle.0))
    }

    fn apply_control(&mut self, vehicle: VehicleId, control: &Control) -> Result<()> {
        let state = self
            .vehicles
            .get_mut(&vehicle)
            .ok_or_else(|| anyhow!("control: vehicle {} not found", vehicle.0))?;
        state.control = *control;
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        for state in self.vehicles.values_mut() {
            Self::step_vehicle(state);
        }
        for sensor in self.sensors.values_mut() {
            if sensor.listening && sensor.kind != SensorKind::Collision {
                sensor.frames += 1;
            }
        }
        self.detect_collisions();
        self.ticks += 1;
        Ok(())
    }

    fn follow_with_spectator(&mut self, vehicle: VehicleId) -> Result<()> {
        let state = self
            .vehicles
            .get(&vehicle)
            .ok_or_else(|| anyhow!("spectator: vehicle {} not found", vehicle.0))?;
        let mut pose = state.pose;
        pose.position += nalgebra::Vector3::new(0.0, 0.0, 40.0) - state.pose.forward() * 10.0;
        self.spectator = Some(pose);
        Ok(())
    }

    fn draw_marker(&mut self, location: &WorldPoint, label: &str) -> Result<()> {
        self.markers.push((*location, label.to_string()));
        Ok(())
    }

    fn drain_collisions(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.pending_collisions)
    }
}

//! Test-only scripted collaborators for supervisor tests.
//!
//! `ScriptedSimulator` and `ScriptedAgent` return predetermined results
//! without any world state, recording what was asked of them.
//! `ManualClock` advances only when slept on, so stagnation and timeout
//! paths run instantly.

use std::cell::Cell;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};

use crate::core::geometry::Pose;
use crate::core::landmarks::LandmarkTable;
use crate::core::types::{
    CollisionEvent, Control, RouteWaypoint, SensorId, SensorKind, VehicleId,
};
use crate::io::agent::RouteAgent;
use crate::io::client::SimulatorClient;
use crate::io::clock::Clock;

/// Build a landmark table from `(name, x)` pairs on the x axis.
pub fn table_with(entries: &[(&str, f64)]) -> LandmarkTable {
    LandmarkTable::from_entries(
        entries
            .iter()
            .map(|(name, x)| (name.to_string(), Pose::new(*x, 0.0, 0.3, 0.0))),
    )
}

pub fn waypoint(x: f64, y: f64) -> RouteWaypoint {
    RouteWaypoint {
        position: nalgebra::Point3::new(x, y, 0.3),
        road_id: 0,
        lane_id: 1,
    }
}

/// Scriptable simulator backend that records every operation.
#[derive(Debug, Default)]
pub struct ScriptedSimulator {
    /// Every backend call, in order, in a stable text form.
    pub op_log: Vec<String>,
    /// Decline the vehicle spawn (try-spawn returns no actor).
    pub decline_spawn: bool,
    /// Fail the vehicle spawn with a backend fault.
    pub fail_spawn: bool,
    /// Decline attaching this sensor kind.
    pub decline_attach: Option<SensorKind>,
    /// Fail attaching this sensor kind with a backend fault.
    pub fail_attach: Option<SensorKind>,
    /// Fail the tick with this index (0-based) with a backend fault.
    pub fail_tick_at: Option<u64>,
    /// Poses returned by `vehicle_pose`, one per call; the last entry
    /// repeats once the script runs out.
    pub poses: Vec<Pose>,
    /// Collision events handed out by the next `drain_collisions`.
    pub collisions: Vec<CollisionEvent>,
    /// Every control command applied, in order.
    pub applied_controls: Vec<Control>,

    vehicles: HashSet<u64>,
    sensors: HashSet<u64>,
    next_id: u64,
    ticks: u64,
    pose_calls: Cell<usize>,
}

impl ScriptedSimulator {
    pub fn new() -> Self {
        Self {
            poses: vec![Pose::new(0.0, 0.0, 0.3, 0.0)],
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn live_actor_count(&self) -> usize {
        self.vehicles.len() + self.sensors.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl SimulatorClient for ScriptedSimulator {
    fn spawn_points(&self) -> Result<Vec<Pose>> {
        Ok((0..300)
            .map(|i| Pose::new(i as f64, 0.0, 0.3, 0.0))
            .collect())
    }

    fn project_to_road(&self, pose: &Pose) -> Result<Pose> {
        Ok(*pose)
    }

    fn try_spawn_vehicle(&mut self, blueprint: &str, _at: &Pose) -> Result<Option<VehicleId>> {
        self.op_log.push(format!("spawn_vehicle {blueprint}"));
        if self.fail_spawn {
            return Err(anyhow!("scripted spawn fault"));
        }
        if self.decline_spawn {
            return Ok(None);
        }
        let id = self.next_id();
        self.vehicles.insert(id);
        Ok(Some(VehicleId(id)))
    }

    fn attach_sensor(&mut self, _vehicle: VehicleId, kind: SensorKind) -> Result<Option<SensorId>> {
        self.op_log.push(format!("attach_sensor {kind}"));
        if self.fail_attach == Some(kind) {
            return Err(anyhow!("scripted attach fault for {kind}"));
        }
        if self.decline_attach == Some(kind) {
            return Ok(None);
        }
        let id = self.next_id();
        self.sensors.insert(id);
        Ok(Some(SensorId(id)))
    }

    fn stop_sensor(&mut self, sensor: SensorId) -> Result<()> {
        self.op_log.push(format!("stop_sensor {}", sensor.0));
        if self.sensors.contains(&sensor.0) {
            Ok(())
        } else {
            Err(anyhow!("scripted: sensor {} not found", sensor.0))
        }
    }

    fn destroy_sensor(&mut self, sensor: SensorId) -> Result<()> {
        self.op_log.push(format!("destroy_sensor {}", sensor.0));
        if self.sensors.remove(&sensor.0) {
            Ok(())
        } else {
            Err(anyhow!("scripted: sensor {} not found", sensor.0))
        }
    }

    fn destroy_vehicle(&mut self, vehicle: VehicleId) -> Result<()> {
        self.op_log.push(format!("destroy_vehicle {}", vehicle.0));
        if self.vehicles.remove(&vehicle.0) {
            Ok(())
        } else {
            Err(anyhow!("scripted: vehicle {} not found", vehicle.0))
        }
    }

    fn vehicle_pose(&self, _vehicle: VehicleId) -> Result<Pose> {
        let call = self.pose_calls.get();
        self.pose_calls.set(call + 1);
        let index = call.min(self.poses.len().saturating_sub(1));
        self.poses
            .get(index)
            .copied()
            .ok_or_else(|| anyhow!("scripted: no poses configured"))
    }

    fn apply_control(&mut self, _vehicle: VehicleId, control: &Control) -> Result<()> {
        self.op_log.push(format!(
            "apply_control throttle={:.1} brake={:.1}",
            control.throttle, control.brake
        ));
        self.applied_controls.push(*control);
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        self.op_log.push("tick".to_string());
        if self.fail_tick_at == Some(self.ticks) {
            return Err(anyhow!("scripted tick fault at {}", self.ticks));
        }
        self.ticks += 1;
        Ok(())
    }

    fn follow_with_spectator(&mut self, _vehicle: VehicleId) -> Result<()> {
        self.op_log.push("spectator".to_string());
        Ok(())
    }

    fn draw_marker(&mut self, _location: &crate::core::geometry::WorldPoint, label: &str) -> Result<()> {
        self.op_log.push(format!("draw_marker {label}"));
        Ok(())
    }

    fn drain_collisions(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.collisions)
    }
}

/// Scriptable route agent.
#[derive(Debug)]
pub struct ScriptedAgent {
    /// Route returned by `plan`.
    pub route: Vec<RouteWaypoint>,
    /// Fail `plan` with a backend fault.
    pub fail_plan: bool,
    /// Fail `run_step` with a backend fault.
    pub fail_run_step: bool,
    /// Scripted per-step commands; once exhausted, `fallback` repeats.
    pub controls: VecDeque<Option<Control>>,
    /// Command repeated after the script runs out.
    pub fallback: Control,
    /// Target speeds forwarded by the supervisor, in order.
    pub target_speeds: Vec<f64>,
    /// Number of `plan` calls observed.
    pub plan_calls: usize,
    /// Number of `run_step` calls observed.
    pub run_step_calls: usize,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self {
            route: vec![waypoint(0.0, 0.0), waypoint(100.0, 0.0)],
            fail_plan: false,
            fail_run_step: false,
            controls: VecDeque::new(),
            fallback: Control {
                throttle: 0.5,
                steer: 0.0,
                brake: 0.0,
            },
            target_speeds: Vec::new(),
            plan_calls: 0,
            run_step_calls: 0,
        }
    }
}

impl Default for ScriptedAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteAgent for ScriptedAgent {
    fn plan(&mut self, _from: &Pose, _to: &Pose) -> Result<Vec<RouteWaypoint>> {
        self.plan_calls += 1;
        if self.fail_plan {
            return Err(anyhow!("scripted planning fault"));
        }
        Ok(self.route.clone())
    }

    fn run_step(&mut self, _observed: &Pose) -> Result<Option<Control>> {
        self.run_step_calls += 1;
        if self.fail_run_step {
            return Err(anyhow!("scripted run_step fault"));
        }
        match self.controls.pop_front() {
            Some(control) => Ok(control),
            None => Ok(Some(self.fallback)),
        }
    }

    fn set_target_speed(&mut self, speed: f64) {
        self.target_speeds.push(speed);
    }
}

/// Deterministic clock: time advances only through `sleep` or `advance`.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.offset.set(self.offset.get() + duration);
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

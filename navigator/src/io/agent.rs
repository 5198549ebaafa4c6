//! Route agent seam and the built-in waypoint follower.
//!
//! The [`RouteAgent`] trait decouples the supervisor from the path planner.
//! The agent observes the vehicle through the pose the supervisor hands it
//! each step; it holds no simulator state of its own.

use anyhow::Result;

use crate::core::geometry::{distance, wrap_angle, Pose};
use crate::core::types::{Control, RouteWaypoint};

/// Abstraction over path-planning agents.
pub trait RouteAgent {
    /// Trace a route between two road-projected poses.
    ///
    /// The returned waypoint list is used for feasibility checking and the
    /// route report; a list with fewer than two waypoints means the
    /// destination is unreachable.
    fn plan(&mut self, from: &Pose, to: &Pose) -> Result<Vec<RouteWaypoint>>;

    /// Produce the control command for this step.
    ///
    /// `Ok(None)` means the agent has exhausted its route and has nothing
    /// left to follow.
    fn run_step(&mut self, observed: &Pose) -> Result<Option<Control>>;

    /// Adjust the speed the agent steers toward. Takes effect on the next
    /// `run_step`.
    fn set_target_speed(&mut self, speed: f64);
}

const DEFAULT_TARGET_SPEED: f64 = 40.0;
const LOOKAHEAD: f64 = 5.0;
const SLOWDOWN_RADIUS: f64 = 15.0;
const SLOWDOWN_THROTTLE: f64 = 0.25;

/// Straight-segment waypoint follower used as the built-in route agent.
///
/// Plans by sampling the line between the endpoints at a fixed resolution
/// and steers toward the next unreached waypoint. It keeps steering toward
/// the final waypoint rather than reporting exhaustion, so arrival is always
/// decided by the supervisor's own arrival check.
#[derive(Debug)]
pub struct WaypointAgent {
    resolution: f64,
    route: Vec<RouteWaypoint>,
    next: usize,
    target_speed: f64,
}

impl WaypointAgent {
    pub fn new() -> Self {
        Self {
            resolution: 2.0,
            route: Vec::new(),
            next: 0,
            target_speed: DEFAULT_TARGET_SPEED,
        }
    }

    /// Move the target forward to the first waypoint at least the lookahead
    /// distance away. The index never regresses, so the agent cannot end up
    /// steering toward a point behind the vehicle.
    fn advance_target(&mut self, observed: &Pose) {
        while self.next + 1 < self.route.len() {
            let waypoint = &self.route[self.next];
            if distance(&observed.position, &waypoint.position) < LOOKAHEAD {
                self.next += 1;
            } else {
                break;
            }
        }
    }
}

impl Default for WaypointAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteAgent for WaypointAgent {
    fn plan(&mut self, from: &Pose, to: &Pose) -> Result<Vec<RouteWaypoint>> {
        let span = distance(&from.position, &to.position);
        let samples = (span / self.resolution).ceil().max(1.0) as usize;
        let mut route = Vec::with_capacity(samples + 1);
        for i in 0..=samples {
            let t = i as f64 / samples as f64;
            let position = from.position + (to.position - from.position) * t;
            route.push(RouteWaypoint {
                position,
                road_id: (i / 10) as i64,
                lane_id: 1,
            });
        }
        self.route = route.clone();
        self.next = 0;
        Ok(route)
    }

    fn run_step(&mut self, observed: &Pose) -> Result<Option<Control>> {
        if self.route.is_empty() {
            return Ok(None);
        }
        self.advance_target(observed);

        let target = &self.route[self.next];
        let to_target = target.position - observed.position;
        let desired_yaw = to_target.y.atan2(to_target.x);
        let yaw_error = wrap_angle(desired_yaw - observed.yaw);
        let steer = (yaw_error / std::f64::consts::FRAC_PI_2).clamp(-1.0, 1.0);

        let final_position = self.route[self.route.len() - 1].position;
        let remaining = distance(&observed.position, &final_position);
        let throttle = if remaining < SLOWDOWN_RADIUS {
            SLOWDOWN_THROTTLE
        } else {
            (self.target_speed / DEFAULT_TARGET_SPEED).clamp(0.2, 1.0)
        };

        Ok(Some(Control {
            throttle,
            steer,
            brake: 0.0,
        }))
    }

    fn set_target_speed(&mut self, speed: f64) {
        self.target_speed = speed;
    }
}

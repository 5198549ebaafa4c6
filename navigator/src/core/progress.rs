//! Per-step trip progress tracking and the exit evaluator.
//!
//! Pure logic: the step loop feeds in observed locations and elapsed time,
//! and gets back the decision for that step. Arrival is checked before
//! stagnation and timeout, in that fixed priority order.

use std::time::Duration;

use crate::core::geometry::{distance, WorldPoint};

/// Decision for one step of the loop. Terminal values end the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDecision {
    Continue,
    Arrived,
    Stuck,
    TimedOut,
    /// The route agent reported an exhausted route before arrival.
    PlanningFailed,
}

impl StepDecision {
    pub fn is_terminal(&self) -> bool {
        *self != StepDecision::Continue
    }
}

/// Mutable per-trip movement state. Created fresh for every trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripProgress {
    last_location: WorldPoint,
    stalled_steps: u32,
    steps: u32,
}

impl TripProgress {
    pub fn new(start: WorldPoint) -> Self {
        Self {
            last_location: start,
            stalled_steps: 0,
            steps: 0,
        }
    }

    /// Record the location observed this step.
    ///
    /// Movement below `stall_distance` increments the consecutive-stall
    /// counter; any larger move resets it to zero. Returns the distance
    /// moved since the previous step.
    pub fn observe(&mut self, current: &WorldPoint, stall_distance: f64) -> f64 {
        let moved = distance(current, &self.last_location);
        if moved < stall_distance {
            self.stalled_steps += 1;
        } else {
            self.stalled_steps = 0;
        }
        self.last_location = *current;
        self.steps += 1;
        moved
    }

    pub fn stalled_steps(&self) -> u32 {
        self.stalled_steps
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

/// Exit thresholds for one trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitCriteria {
    /// Distance to destination below which the trip has arrived.
    pub arrival_radius: f64,
    /// Consecutive stalled steps after which the trip is stuck.
    pub stall_window: u32,
    /// Wall-clock budget for the whole trip.
    pub timeout: Duration,
}

/// Decide the outcome of one step.
///
/// Arrival wins over stagnation and timeout when several conditions hold on
/// the same step.
pub fn evaluate_exit(
    criteria: &ExitCriteria,
    distance_to_goal: f64,
    stalled_steps: u32,
    elapsed: Duration,
) -> StepDecision {
    if distance_to_goal < criteria.arrival_radius {
        return StepDecision::Arrived;
    }
    if stalled_steps >= criteria.stall_window {
        return StepDecision::Stuck;
    }
    if elapsed > criteria.timeout {
        return StepDecision::TimedOut;
    }
    StepDecision::Continue
}

//! Orchestration for a single supervised trip.
//!
//! [`Navigator::run_trip`] is the one entry point callers use: it validates
//! the request, provisions the vehicle and sensor suite, drives the
//! synchronous step loop, and releases every provisioned actor on every
//! exit path before reporting the outcome. The interactive CLI and the
//! batch evaluator are both thin adapters over this function.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::geometry::{distance, Pose};
use crate::core::landmarks::LandmarkTable;
use crate::core::progress::{evaluate_exit, ExitCriteria, StepDecision, TripProgress};
use crate::core::signals::{FiredSignals, SignalDefinition, SignalKind, SignalMonitor};
use crate::core::types::{Control, VehicleId};
use crate::core::validate::{check_separation, resolve_endpoints, ValidationError};
use crate::io::agent::RouteAgent;
use crate::io::client::SimulatorClient;
use crate::io::clock::Clock;
use crate::io::config::SupervisorConfig;
use crate::io::route_report::{write_route_report, RouteReport};
use crate::provision::{provision, ProvisionError};
use crate::teardown::TeardownGuard;

/// A navigation request: where to go and how long the trip may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub start: String,
    pub end: String,
    /// Trip budget; `None` falls back to the configured default.
    pub timeout: Option<Duration>,
}

impl TripRequest {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Why a trip ended in [`TripOutcome::Aborted`].
#[derive(Debug, Clone, PartialEq)]
pub enum AbortCause {
    /// Spawn or attach failed; everything already created was rolled back.
    Provisioning(ProvisionError),
    /// The route agent gave up mid-trip.
    Planning(String),
    /// Unexpected fault inside the step loop.
    Runtime(String),
}

impl fmt::Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortCause::Provisioning(err) => write!(f, "provisioning failed: {err}"),
            AbortCause::Planning(msg) => write!(f, "planning failed: {msg}"),
            AbortCause::Runtime(msg) => write!(f, "runtime fault: {msg}"),
        }
    }
}

/// Terminal outcome of one trip, as reported to callers.
///
/// `Arrived`, `Stuck`, and `TimedOut` are ordinary ends of a trip, not
/// errors. `Aborted` is the only operational failure; the rejected variants
/// mean no resource was ever touched.
#[derive(Debug, Clone, PartialEq)]
pub enum TripOutcome {
    Arrived,
    Stuck,
    TimedOut,
    Aborted { cause: AbortCause },
    RejectedUnknownLandmark { name: String },
    RejectedTripTooShort { distance: f64 },
    RejectedUnreachable,
}

impl TripOutcome {
    /// Stable machine-readable tag, used by the evaluation harness.
    pub fn label(&self) -> &'static str {
        match self {
            TripOutcome::Arrived => "arrived",
            TripOutcome::Stuck => "stuck",
            TripOutcome::TimedOut => "timed_out",
            TripOutcome::Aborted { .. } => "aborted",
            TripOutcome::RejectedUnknownLandmark { .. } => "rejected_unknown_landmark",
            TripOutcome::RejectedTripTooShort { .. } => "rejected_trip_too_short",
            TripOutcome::RejectedUnreachable => "rejected_unreachable",
        }
    }
}

impl fmt::Display for TripOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripOutcome::Arrived => write!(f, "vehicle has reached the destination"),
            TripOutcome::Stuck => write!(f, "vehicle stopped making progress; navigation ended"),
            TripOutcome::TimedOut => write!(f, "trip exceeded its time budget"),
            TripOutcome::Aborted { cause } => write!(f, "trip aborted: {cause}"),
            TripOutcome::RejectedUnknownLandmark { name } => {
                write!(f, "unknown landmark '{name}'")
            }
            TripOutcome::RejectedTripTooShort { distance } => {
                write!(f, "start and end are too close ({distance:.2} units apart)")
            }
            TripOutcome::RejectedUnreachable => {
                write!(f, "destination unreachable: route planning found no usable route")
            }
        }
    }
}

/// Summary of one `run_trip` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TripReport {
    pub outcome: TripOutcome,
    /// Steps the loop executed; zero when the trip never started driving.
    pub steps: u32,
    pub elapsed: Duration,
}

/// The navigation supervisor.
///
/// Landmark and signal tables are read-only construction inputs; one
/// instance supervises one trip at a time and keeps no state between trips.
#[derive(Debug)]
pub struct Navigator {
    config: SupervisorConfig,
    landmarks: LandmarkTable,
    signals: Vec<SignalDefinition>,
}

impl Navigator {
    pub fn new(
        config: SupervisorConfig,
        landmarks: LandmarkTable,
        signals: Vec<SignalDefinition>,
    ) -> Self {
        Self {
            config,
            landmarks,
            signals,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn landmarks(&self) -> &LandmarkTable {
        &self.landmarks
    }

    /// Run one trip from request to terminal outcome.
    ///
    /// Every actor provisioned for the trip is released before this
    /// returns, whatever the outcome.
    #[instrument(skip_all, fields(start = %request.start, end = %request.end))]
    pub fn run_trip<S: SimulatorClient, A: RouteAgent, C: Clock>(
        &self,
        sim: &mut S,
        agent: &mut A,
        clock: &C,
        request: &TripRequest,
    ) -> TripReport {
        let started = clock.now();
        let mut steps = 0u32;
        let outcome = self.run_trip_inner(sim, agent, clock, started, request, &mut steps);
        let report = TripReport {
            outcome,
            steps,
            elapsed: clock.now().saturating_duration_since(started),
        };
        info!(
            outcome = report.outcome.label(),
            steps = report.steps,
            "trip finished"
        );
        report
    }

    fn run_trip_inner<S: SimulatorClient, A: RouteAgent, C: Clock>(
        &self,
        sim: &mut S,
        agent: &mut A,
        clock: &C,
        started: Instant,
        request: &TripRequest,
        steps: &mut u32,
    ) -> TripOutcome {
        let (start_pose, end_pose) =
            match resolve_endpoints(&self.landmarks, &request.start, &request.end) {
                Ok((start, end)) => (*start, *end),
                Err(err) => return rejection(err),
            };

        let start_road = match sim.project_to_road(&start_pose) {
            Ok(pose) => pose,
            Err(err) => return runtime_abort("project start pose onto road", err),
        };
        let end_road = match sim.project_to_road(&end_pose) {
            Ok(pose) => pose,
            Err(err) => return runtime_abort("project end pose onto road", err),
        };

        if let Err(err) =
            check_separation(&start_road, &end_road, self.config.min_trip_separation)
        {
            return rejection(err);
        }

        let route = match agent.plan(&start_road, &end_road) {
            Ok(route) => route,
            Err(err) => {
                warn!("route planning failed: {err:#}");
                return TripOutcome::RejectedUnreachable;
            }
        };
        if route.len() < 2 {
            info!(waypoints = route.len(), "planned route has no usable leg");
            return TripOutcome::RejectedUnreachable;
        }

        let report = RouteReport {
            start: &request.start,
            end: &request.end,
            remaining_distance: distance(&start_road.position, &end_road.position),
            route: &route,
        };
        if let Err(err) = write_route_report(&self.config.route_report_path, &report) {
            // Diagnostic artifact only; the trip goes on without it.
            warn!("route report not written: {err:#}");
        }

        let resources = match provision(sim, &self.config.vehicle_blueprint, &start_road) {
            Ok(resources) => resources,
            Err(err) => {
                return TripOutcome::Aborted {
                    cause: AbortCause::Provisioning(err),
                };
            }
        };
        let vehicle = resources.vehicle;
        let mut guard = TeardownGuard::new(resources);

        let timeout = request.timeout.unwrap_or_else(|| self.config.default_timeout());
        let mut progress = TripProgress::new(start_road.position);
        let drive_result = self.drive(
            sim,
            agent,
            clock,
            started,
            timeout,
            vehicle,
            &end_road,
            &mut progress,
        );
        guard.release(sim);
        *steps = progress.steps();

        match drive_result {
            Ok(StepDecision::Arrived) => TripOutcome::Arrived,
            Ok(StepDecision::Stuck) => TripOutcome::Stuck,
            Ok(StepDecision::TimedOut) => TripOutcome::TimedOut,
            Ok(StepDecision::PlanningFailed) => TripOutcome::Aborted {
                cause: AbortCause::Planning(
                    "route agent exhausted its route before arrival".to_string(),
                ),
            },
            Ok(StepDecision::Continue) => TripOutcome::Aborted {
                cause: AbortCause::Runtime(
                    "step loop stopped without a terminal decision".to_string(),
                ),
            },
            Err(err) => TripOutcome::Aborted {
                cause: AbortCause::Runtime(format!("{err:#}")),
            },
        }
    }

    /// The synchronous step loop. Returns the terminal decision, or an error
    /// for faults the caller reports as `Aborted`.
    #[allow(clippy::too_many_arguments)]
    fn drive<S: SimulatorClient, A: RouteAgent, C: Clock>(
        &self,
        sim: &mut S,
        agent: &mut A,
        clock: &C,
        started: Instant,
        timeout: Duration,
        vehicle: VehicleId,
        destination: &Pose,
        progress: &mut TripProgress,
    ) -> Result<StepDecision> {
        let monitor = SignalMonitor::new(&self.signals, self.config.signal_trigger_radius);
        let mut fired = FiredSignals::new();
        let criteria = ExitCriteria {
            arrival_radius: self.config.arrival_radius,
            stall_window: self.config.stall_window,
            timeout,
        };

        loop {
            let pose = sim.vehicle_pose(vehicle).context("query vehicle pose")?;

            for event in sim.drain_collisions() {
                warn!(other = %event.other, intensity = event.intensity, "collision detected");
            }

            match monitor.evaluate(&mut fired, &pose.position) {
                Some(signal) => match signal.kind {
                    SignalKind::Stop => {
                        info!(signal = %signal.name, "stop signal in range; braking");
                        sim.apply_control(vehicle, &Control::full_brake())
                            .context("apply brake override")?;
                        sim.tick().context("advance simulator tick")?;
                        clock.sleep(self.config.brake_hold());
                    }
                    SignalKind::SpeedLimit { limit } => {
                        info!(signal = %signal.name, limit, "speed limit in range");
                        agent.set_target_speed(limit);
                        if !self.apply_agent_control(sim, agent, vehicle, &pose)? {
                            return Ok(StepDecision::PlanningFailed);
                        }
                    }
                },
                None => {
                    if !self.apply_agent_control(sim, agent, vehicle, &pose)? {
                        return Ok(StepDecision::PlanningFailed);
                    }
                }
            }

            // Cosmetic; a camera glitch must not end the trip.
            if let Err(err) = sim.follow_with_spectator(vehicle) {
                debug!("spectator update failed: {err:#}");
            }

            let distance_to_goal = distance(&pose.position, &destination.position);
            let moved = progress.observe(&pose.position, self.config.stall_distance);
            let elapsed = clock.now().saturating_duration_since(started);
            let decision = evaluate_exit(
                &criteria,
                distance_to_goal,
                progress.stalled_steps(),
                elapsed,
            );
            debug!(
                step = progress.steps(),
                distance_to_goal,
                moved,
                stalled = progress.stalled_steps(),
                "step evaluated"
            );
            if decision.is_terminal() {
                return Ok(decision);
            }

            sim.tick().context("advance simulator tick")?;
            clock.sleep(self.config.tick_pause());
        }
    }

    /// Pull the agent's command and apply it. `Ok(false)` means the agent
    /// reported an exhausted route.
    fn apply_agent_control<S: SimulatorClient, A: RouteAgent>(
        &self,
        sim: &mut S,
        agent: &mut A,
        vehicle: VehicleId,
        pose: &Pose,
    ) -> Result<bool> {
        let Some(control) = agent
            .run_step(pose)
            .context("pull control command from route agent")?
        else {
            return Ok(false);
        };
        sim.apply_control(vehicle, &control)
            .context("apply agent control")?;
        Ok(true)
    }
}

fn rejection(err: ValidationError) -> TripOutcome {
    match err {
        ValidationError::UnknownLandmark { name } => TripOutcome::RejectedUnknownLandmark { name },
        ValidationError::TripTooShort { distance, .. } => {
            TripOutcome::RejectedTripTooShort { distance }
        }
    }
}

fn runtime_abort(what: &str, err: anyhow::Error) -> TripOutcome {
    TripOutcome::Aborted {
        cause: AbortCause::Runtime(format!("{what}: {err:#}")),
    }
}

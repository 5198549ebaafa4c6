//! Drives one supervised trip per pair and collects the results.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use navigator::core::geometry::{distance, route_length, WorldPoint};
use navigator::core::landmarks::LandmarkTable;
use navigator::core::signals::canonical_signals;
use navigator::core::validate::resolve_endpoints;
use navigator::io::agent::{RouteAgent, WaypointAgent};
use navigator::io::client::SimulatorClient;
use navigator::io::clock::SystemClock;
use navigator::io::config::SupervisorConfig;
use navigator::io::playground::PlaygroundWorld;
use navigator::trip::{Navigator, TripRequest};

/// Result of one evaluated pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairResult {
    pub start: String,
    pub end: String,
    /// Straight-line separation of the road-projected endpoints.
    pub straight_m: f64,
    /// Polyline length of the planned route.
    pub planned_m: f64,
    pub outcome: String,
    pub steps: u32,
}

impl PairResult {
    /// How much longer the planned route is than the straight line, percent.
    pub fn detour_percent(&self) -> f64 {
        (self.planned_m - self.straight_m) / self.straight_m.max(1e-6) * 100.0
    }
}

/// Run every pair through the supervisor against a fresh world.
///
/// Pairs with unknown landmark names are skipped with a log line. Route
/// report artifacts land under `report_dir`, one file per pair.
pub fn run_pairs(pairs: &[(String, String)], report_dir: &Path) -> Result<Vec<PairResult>> {
    let mut results = Vec::new();
    for (start, end) in pairs {
        // Fresh world per trip so no actor or signal state leaks between pairs.
        let mut world = PlaygroundWorld::new();
        let spawn_points = world.spawn_points().context("query spawn points")?;
        let landmarks =
            LandmarkTable::from_spawn_points(&spawn_points).context("build landmark table")?;

        let (start_pose, end_pose) = match resolve_endpoints(&landmarks, start, end) {
            Ok(poses) => poses,
            Err(err) => {
                warn!(%start, %end, "skipping pair: {err}");
                continue;
            }
        };
        let start_road = world.project_to_road(start_pose)?;
        let end_road = world.project_to_road(end_pose)?;

        let mut agent = WaypointAgent::new();
        let route = agent
            .plan(&start_road, &end_road)
            .with_context(|| format!("plan {start} -> {end}"))?;
        let positions: Vec<WorldPoint> =
            route.iter().map(|waypoint| waypoint.position).collect();
        let straight_m = distance(&start_road.position, &end_road.position);
        let planned_m = route_length(&positions);

        // Evaluation runs unpaced; the trip loop is still tick-for-tick the
        // same as an interactive run.
        let config = SupervisorConfig {
            tick_pause_secs: 0.0,
            route_report_path: report_dir.join(format!("route_{start}_{end}.txt")),
            ..SupervisorConfig::default()
        };
        let navigator = Navigator::new(config, landmarks, canonical_signals());
        let report = navigator.run_trip(
            &mut world,
            &mut agent,
            &SystemClock,
            &TripRequest::new(start.clone(), end.clone()),
        );
        info!(
            %start,
            %end,
            outcome = report.outcome.label(),
            steps = report.steps,
            "pair evaluated"
        );

        results.push(PairResult {
            start: start.clone(),
            end: end.clone(),
            straight_m,
            planned_m,
            outcome: report.outcome.label().to_string(),
            steps: report.steps,
        });
    }
    Ok(results)
}

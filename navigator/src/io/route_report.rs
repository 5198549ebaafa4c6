//! Human-readable planned-route report.
//!
//! Written once per trip after planning succeeds. Diagnostic side output
//! only; the supervisor never reads it back.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::types::RouteWaypoint;

/// Inputs for one route report.
#[derive(Debug, Clone)]
pub struct RouteReport<'a> {
    pub start: &'a str,
    pub end: &'a str,
    /// Straight-line distance from the start pose to the goal.
    pub remaining_distance: f64,
    pub route: &'a [RouteWaypoint],
}

/// Write the report as a small CSV-style text file.
pub fn write_route_report(path: &Path, report: &RouteReport<'_>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create route report dir {}", parent.display()))?;
        }
    }
    let mut buf = String::new();
    buf.push_str(&format!("route: {} -> {}\n", report.start, report.end));
    buf.push_str(&format!(
        "remaining distance to goal: {:.2}\n",
        report.remaining_distance
    ));
    buf.push_str("x,y,z,road_id,lane_id\n");
    for waypoint in report.route {
        buf.push_str(&format!(
            "{:.2},{:.2},{:.2},{},{}\n",
            waypoint.position.x,
            waypoint.position.y,
            waypoint.position.z,
            waypoint.road_id,
            waypoint.lane_id
        ));
    }
    fs::write(path, buf).with_context(|| format!("write route report {}", path.display()))
}

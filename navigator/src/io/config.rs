//! Supervisor configuration stored as a TOML file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Supervisor configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to the session-map values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Distance to destination below which a trip has arrived.
    pub arrival_radius: f64,

    /// Minimum straight-line separation between trip endpoints.
    pub min_trip_separation: f64,

    /// Distance within which a reactive signal fires.
    pub signal_trigger_radius: f64,

    /// Per-step movement below this counts as a stalled step.
    pub stall_distance: f64,

    /// Consecutive stalled steps after which a trip is stuck.
    pub stall_window: u32,

    /// How long the full-brake override is held after a stop signal.
    pub brake_hold_secs: f64,

    /// Real-time pacing delay after each simulator tick.
    pub tick_pause_secs: f64,

    /// Trip timeout used when the request does not carry one.
    pub default_timeout_secs: u64,

    /// Blueprint selector for the trip vehicle.
    pub vehicle_blueprint: String,

    /// Where the planned-route report is written.
    pub route_report_path: PathBuf,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            arrival_radius: 5.0,
            min_trip_separation: 10.0,
            signal_trigger_radius: 8.0,
            stall_distance: 0.1,
            stall_window: 600,
            brake_hold_secs: 3.0,
            tick_pause_secs: 0.1,
            default_timeout_secs: 300,
            vehicle_blueprint: "vehicle.tesla.model3".to_string(),
            route_report_path: PathBuf::from("planned_route.txt"),
        }
    }
}

impl SupervisorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.arrival_radius <= 0.0 {
            return Err(anyhow!("arrival_radius must be > 0"));
        }
        if self.min_trip_separation <= 0.0 {
            return Err(anyhow!("min_trip_separation must be > 0"));
        }
        if self.signal_trigger_radius <= 0.0 {
            return Err(anyhow!("signal_trigger_radius must be > 0"));
        }
        if self.stall_distance <= 0.0 {
            return Err(anyhow!("stall_distance must be > 0"));
        }
        if self.stall_window == 0 {
            return Err(anyhow!("stall_window must be > 0"));
        }
        if self.brake_hold_secs < 0.0 {
            return Err(anyhow!("brake_hold_secs must be >= 0"));
        }
        if self.tick_pause_secs < 0.0 {
            return Err(anyhow!("tick_pause_secs must be >= 0"));
        }
        if self.default_timeout_secs == 0 {
            return Err(anyhow!("default_timeout_secs must be > 0"));
        }
        if self.vehicle_blueprint.trim().is_empty() {
            return Err(anyhow!("vehicle_blueprint must be non-empty"));
        }
        Ok(())
    }

    pub fn brake_hold(&self) -> Duration {
        Duration::from_secs_f64(self.brake_hold_secs)
    }

    pub fn tick_pause(&self) -> Duration {
        Duration::from_secs_f64(self.tick_pause_secs)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SupervisorConfig::default()`.
pub fn load_config(path: &Path) -> Result<SupervisorConfig> {
    if !path.exists() {
        let cfg = SupervisorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SupervisorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SupervisorConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, SupervisorConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        let cfg = SupervisorConfig {
            stall_window: 50,
            tick_pause_secs: 0.0,
            ..SupervisorConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn zero_stall_window_is_rejected() {
        let cfg = SupervisorConfig {
            stall_window: 0,
            ..SupervisorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_blueprint_is_rejected() {
        let cfg = SupervisorConfig {
            vehicle_blueprint: "  ".to_string(),
            ..SupervisorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn defaults_match_the_session_thresholds() {
        let cfg = SupervisorConfig::default();
        assert_eq!(cfg.arrival_radius, 5.0);
        assert_eq!(cfg.min_trip_separation, 10.0);
        assert_eq!(cfg.signal_trigger_radius, 8.0);
        assert_eq!(cfg.stall_window, 600);
        assert_eq!(cfg.default_timeout(), Duration::from_secs(300));
    }
}

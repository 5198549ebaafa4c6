//! Reactive proximity signals and the monitor that fires them.
//!
//! Signals are evaluated in their fixed list order, and each fires at most
//! once per trip. The fired set lives with the trip state, not with the
//! monitor, so a fresh trip never inherits fired signals.

use std::collections::HashSet;

use crate::core::geometry::{distance, WorldPoint};
use nalgebra::Point3;

/// What a fired signal asks the supervisor to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalKind {
    /// Full-brake override held for the configured settle duration.
    Stop,
    /// Target-speed adjustment forwarded to the route agent.
    SpeedLimit { limit: f64 },
}

/// A proximity-triggered event fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDefinition {
    pub name: String,
    pub kind: SignalKind,
    pub location: WorldPoint,
}

/// The signal list for the session map. The stop signal comes first, so it
/// wins the tie-break against the speed limit at equal distance.
pub fn canonical_signals() -> Vec<SignalDefinition> {
    vec![
        SignalDefinition {
            name: "Stop".to_string(),
            kind: SignalKind::Stop,
            location: Point3::new(123.0, 45.0, 0.5),
        },
        SignalDefinition {
            name: "SpeedLimit30".to_string(),
            kind: SignalKind::SpeedLimit { limit: 30.0 },
            location: Point3::new(200.0, 78.0, 0.5),
        },
    ]
}

/// Indices of signals that already fired during the current trip.
///
/// A fired signal stays fired for the remainder of the trip, even if the
/// vehicle leaves and re-enters its trigger radius.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiredSignals {
    fired: HashSet<usize>,
}

impl FiredSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fired(&self, index: usize) -> bool {
        self.fired.contains(&index)
    }

    pub fn count(&self) -> usize {
        self.fired.len()
    }

    fn mark(&mut self, index: usize) {
        self.fired.insert(index);
    }
}

/// Evaluates signal proximity once per step.
#[derive(Debug, Clone, Copy)]
pub struct SignalMonitor<'a> {
    signals: &'a [SignalDefinition],
    trigger_radius: f64,
}

impl<'a> SignalMonitor<'a> {
    pub fn new(signals: &'a [SignalDefinition], trigger_radius: f64) -> Self {
        Self {
            signals,
            trigger_radius,
        }
    }

    /// Fire the first not-yet-fired signal within the trigger radius, if any.
    ///
    /// At most one signal fires per step; the returned signal is marked fired
    /// before this returns, so the same signal never fires twice.
    pub fn evaluate(
        &self,
        fired: &mut FiredSignals,
        location: &WorldPoint,
    ) -> Option<&'a SignalDefinition> {
        for (index, signal) in self.signals.iter().enumerate() {
            if fired.is_fired(index) {
                continue;
            }
            if distance(location, &signal.location) < self.trigger_radius {
                fired.mark(index);
                return Some(signal);
            }
        }
        None
    }
}

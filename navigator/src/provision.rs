//! All-or-nothing provisioning of a trip's vehicle and sensor suite.

use thiserror::Error;
use tracing::{debug, info};

use crate::core::geometry::Pose;
use crate::core::types::{SensorId, SensorKind, VehicleId};
use crate::io::client::SimulatorClient;
use crate::teardown::{ProvisionedResources, TeardownGuard};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("vehicle spawn returned no actor for blueprint '{blueprint}'")]
    SpawnFailed { blueprint: String },
    #[error("{kind} attach failed after vehicle spawn; released {released} sensors and the vehicle")]
    SensorAttach { kind: SensorKind, released: usize },
    #[error("simulator fault while provisioning: {0}")]
    Backend(String),
}

/// Spawn the vehicle and attach the fixed sensor suite at `at`.
///
/// On any failure after the vehicle exists, everything already created is
/// released before the error returns: the backend never ends up with an
/// orphaned actor. On success the returned set is fully populated.
pub fn provision<S: SimulatorClient>(
    sim: &mut S,
    blueprint: &str,
    at: &Pose,
) -> Result<ProvisionedResources, ProvisionError> {
    let vehicle = match sim.try_spawn_vehicle(blueprint, at) {
        Ok(Some(vehicle)) => vehicle,
        Ok(None) => {
            return Err(ProvisionError::SpawnFailed {
                blueprint: blueprint.to_string(),
            });
        }
        Err(err) => return Err(ProvisionError::Backend(format!("{err:#}"))),
    };
    debug!(vehicle = vehicle.0, blueprint, "vehicle spawned");

    let mut sensors: Vec<(SensorKind, SensorId)> = Vec::new();
    for kind in SensorKind::PROVISION_ORDER {
        match sim.attach_sensor(vehicle, kind) {
            Ok(Some(sensor)) => {
                debug!(sensor = sensor.0, %kind, "sensor attached");
                sensors.push((kind, sensor));
            }
            Ok(None) => {
                let released = rollback(sim, vehicle, sensors);
                return Err(ProvisionError::SensorAttach { kind, released });
            }
            Err(err) => {
                rollback(sim, vehicle, sensors);
                return Err(ProvisionError::Backend(format!("{err:#}")));
            }
        }
    }

    info!(
        vehicle = vehicle.0,
        sensors = sensors.len(),
        "trip resources provisioned"
    );
    Ok(ProvisionedResources { vehicle, sensors })
}

/// Release a half-built actor set through the same path full teardown uses.
fn rollback<S: SimulatorClient>(
    sim: &mut S,
    vehicle: VehicleId,
    sensors: Vec<(SensorKind, SensorId)>,
) -> usize {
    let released = sensors.len();
    let mut guard = TeardownGuard::new(ProvisionedResources { vehicle, sensors });
    guard.release(sim);
    released
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::playground::PlaygroundWorld;
    use crate::test_support::ScriptedSimulator;

    const BLUEPRINT: &str = "vehicle.tesla.model3";

    fn start_pose() -> Pose {
        Pose::new(0.0, 0.0, 0.3, 0.0)
    }

    #[test]
    fn success_attaches_the_full_suite_in_order() {
        let mut world = PlaygroundWorld::new();
        let resources = provision(&mut world, BLUEPRINT, &start_pose()).expect("provision");
        assert_eq!(resources.sensors.len(), 3);
        let kinds: Vec<SensorKind> = resources.sensors.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, SensorKind::PROVISION_ORDER);
        assert_eq!(world.live_actor_count(), 4);
    }

    #[test]
    fn declined_spawn_reports_spawn_failed_with_no_sensors() {
        let mut world = PlaygroundWorld::new();
        // Occupy the spawn point so the second spawn is declined.
        world
            .try_spawn_vehicle(BLUEPRINT, &start_pose())
            .expect("spawn")
            .expect("vehicle");
        let before = world.live_actor_count();

        let err = provision(&mut world, BLUEPRINT, &start_pose()).expect_err("declined");
        assert_eq!(
            err,
            ProvisionError::SpawnFailed {
                blueprint: BLUEPRINT.to_string()
            }
        );
        assert_eq!(world.live_actor_count(), before);
    }

    #[test]
    fn declined_attach_rolls_back_vehicle_and_earlier_sensors() {
        let mut sim = ScriptedSimulator::new();
        sim.decline_attach = Some(SensorKind::Radar);

        let err = provision(&mut sim, BLUEPRINT, &start_pose()).expect_err("attach declined");
        assert_eq!(
            err,
            ProvisionError::SensorAttach {
                kind: SensorKind::Radar,
                released: 1,
            }
        );
        // Camera was attached before radar failed; both it and the vehicle
        // must be gone.
        assert_eq!(sim.live_actor_count(), 0);
        assert!(sim.op_log.iter().any(|op| op == "stop_sensor 2"));
        assert!(sim.op_log.iter().any(|op| op == "destroy_sensor 2"));
        assert!(sim.op_log.iter().any(|op| op == "destroy_vehicle 1"));
    }

    #[test]
    fn backend_fault_during_attach_still_rolls_back() {
        let mut sim = ScriptedSimulator::new();
        sim.fail_attach = Some(SensorKind::Collision);

        let err = provision(&mut sim, BLUEPRINT, &start_pose()).expect_err("attach fault");
        assert!(matches!(err, ProvisionError::Backend(_)));
        assert_eq!(sim.live_actor_count(), 0);
    }
}

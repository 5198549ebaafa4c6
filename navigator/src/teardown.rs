//! Guaranteed release of everything a trip provisioned.
//!
//! The guard takes ownership of the provisioned actors and releases them at
//! most once, in a fixed order: stop every sensor, destroy every sensor,
//! destroy the vehicle. Each release step is independently guarded so one
//! backend failure never blocks the remaining releases.

use tracing::debug;

use crate::core::types::{SensorId, SensorKind, VehicleId};
use crate::io::client::SimulatorClient;

/// The actors provisioned for one trip: exactly one vehicle and the full
/// sensor suite. Constructed only once every attach has succeeded, so a
/// partially-populated value is never observable.
#[derive(Debug)]
pub struct ProvisionedResources {
    pub vehicle: VehicleId,
    pub sensors: Vec<(SensorKind, SensorId)>,
}

/// Owns [`ProvisionedResources`] from provisioning until release.
///
/// Ownership transfers into the guard when the trip starts; callers keep
/// only the vehicle handle for the loop. `release` consumes the resources
/// internally, so calling it a second time is a no-op.
#[derive(Debug)]
pub struct TeardownGuard {
    resources: Option<ProvisionedResources>,
}

impl TeardownGuard {
    pub fn new(resources: ProvisionedResources) -> Self {
        Self {
            resources: Some(resources),
        }
    }

    pub fn is_released(&self) -> bool {
        self.resources.is_none()
    }

    /// Release every held actor, best-effort, exactly once.
    pub fn release<S: SimulatorClient>(&mut self, sim: &mut S) {
        let Some(resources) = self.resources.take() else {
            return;
        };
        for (kind, sensor) in &resources.sensors {
            if let Err(err) = sim.stop_sensor(*sensor) {
                debug!(sensor = sensor.0, %kind, "ignoring sensor stop failure: {err:#}");
            }
        }
        for (kind, sensor) in &resources.sensors {
            if let Err(err) = sim.destroy_sensor(*sensor) {
                debug!(sensor = sensor.0, %kind, "ignoring sensor destroy failure: {err:#}");
            }
        }
        if let Err(err) = sim.destroy_vehicle(resources.vehicle) {
            debug!(
                vehicle = resources.vehicle.0,
                "ignoring vehicle destroy failure: {err:#}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Pose;
    use crate::io::playground::PlaygroundWorld;

    fn provisioned(world: &mut PlaygroundWorld) -> ProvisionedResources {
        let vehicle = world
            .try_spawn_vehicle("vehicle.tesla.model3", &Pose::new(0.0, 0.0, 0.3, 0.0))
            .expect("spawn")
            .expect("vehicle");
        let sensors = SensorKind::PROVISION_ORDER
            .iter()
            .map(|kind| {
                let id = world
                    .attach_sensor(vehicle, *kind)
                    .expect("attach")
                    .expect("sensor");
                (*kind, id)
            })
            .collect();
        ProvisionedResources { vehicle, sensors }
    }

    #[test]
    fn release_empties_the_backend() {
        let mut world = PlaygroundWorld::new();
        let resources = provisioned(&mut world);
        assert_eq!(world.live_actor_count(), 4);

        let mut guard = TeardownGuard::new(resources);
        guard.release(&mut world);
        assert_eq!(world.live_actor_count(), 0);
        assert!(guard.is_released());
    }

    #[test]
    fn second_release_is_a_no_op() {
        let mut world = PlaygroundWorld::new();
        let resources = provisioned(&mut world);
        let mut guard = TeardownGuard::new(resources);

        guard.release(&mut world);
        let ticks_before = world.ticks();
        guard.release(&mut world);
        assert_eq!(world.live_actor_count(), 0);
        assert_eq!(world.ticks(), ticks_before);
    }

    #[test]
    fn release_survives_actors_already_gone() {
        let mut world = PlaygroundWorld::new();
        let resources = provisioned(&mut world);
        // Someone else already destroyed the camera; release must still
        // clear the rest.
        let (_, camera) = resources.sensors[0];
        world.destroy_sensor(camera).expect("destroy");

        let mut guard = TeardownGuard::new(resources);
        guard.release(&mut world);
        assert_eq!(world.live_actor_count(), 0);
    }
}

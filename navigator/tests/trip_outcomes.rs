//! End-to-end trip outcomes through the public supervisor entry point.

use std::time::Duration;

use nalgebra::Point3;

use navigator::core::geometry::Pose;
use navigator::core::signals::{SignalDefinition, SignalKind};
use navigator::io::agent::WaypointAgent;
use navigator::io::config::SupervisorConfig;
use navigator::io::client::SimulatorClient;
use navigator::io::playground::PlaygroundWorld;
use navigator::test_support::{table_with, ManualClock, ScriptedAgent, ScriptedSimulator};
use navigator::trip::{AbortCause, Navigator, TripOutcome, TripRequest};

fn quick_config(route_report: &std::path::Path) -> SupervisorConfig {
    SupervisorConfig {
        tick_pause_secs: 0.05,
        route_report_path: route_report.to_path_buf(),
        ..SupervisorConfig::default()
    }
}

fn scripted_navigator(config: SupervisorConfig, signals: Vec<SignalDefinition>) -> Navigator {
    Navigator::new(
        config,
        table_with(&[("home", 0.0), ("school", 100.0)]),
        signals,
    )
}

#[test]
fn playground_trip_arrives_and_releases_everything() {
    let temp = tempfile::tempdir().expect("tempdir");
    let report_path = temp.path().join("route.txt");
    let mut world = PlaygroundWorld::new();
    let spawn_points = world.spawn_points().expect("spawn points");
    let landmarks = navigator::core::landmarks::LandmarkTable::from_spawn_points(&spawn_points)
        .expect("landmarks");
    let navigator = Navigator::new(
        quick_config(&report_path),
        landmarks,
        navigator::core::signals::canonical_signals(),
    );
    let mut agent = WaypointAgent::new();
    let clock = ManualClock::new();

    let report = navigator.run_trip(
        &mut world,
        &mut agent,
        &clock,
        &TripRequest::new("school", "home"),
    );

    assert_eq!(report.outcome, TripOutcome::Arrived);
    assert!(report.steps > 0);
    assert_eq!(world.live_actor_count(), 0);

    // The planned-route artifact is written before driving starts.
    let contents = std::fs::read_to_string(&report_path).expect("route report");
    assert!(contents.starts_with("route: school -> home"));
    assert!(contents.contains("x,y,z,road_id,lane_id"));
}

#[test]
fn stalled_vehicle_ends_stuck_with_actors_released() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = SupervisorConfig {
        stall_window: 5,
        ..quick_config(&temp.path().join("route.txt"))
    };
    let navigator = scripted_navigator(config, Vec::new());
    // Default scripted pose never moves.
    let mut sim = ScriptedSimulator::new();
    let mut agent = ScriptedAgent::new();
    let clock = ManualClock::new();

    let report = navigator.run_trip(
        &mut sim,
        &mut agent,
        &clock,
        &TripRequest::new("home", "school"),
    );

    assert_eq!(report.outcome, TripOutcome::Stuck);
    assert_eq!(report.steps, 5);
    assert_eq!(sim.live_actor_count(), 0);
    assert!(sim.op_log.iter().any(|op| op.starts_with("destroy_vehicle")));
}

#[test]
fn moving_vehicle_still_times_out_past_its_budget() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = SupervisorConfig {
        tick_pause_secs: 1.0,
        ..quick_config(&temp.path().join("route.txt"))
    };
    let navigator = scripted_navigator(config, Vec::new());
    let mut sim = ScriptedSimulator::new();
    // Steady forward motion, far from the destination.
    sim.poses = (0..100)
        .map(|i| Pose::new(i as f64, 0.0, 0.3, 0.0))
        .collect();
    let mut agent = ScriptedAgent::new();
    let clock = ManualClock::new();

    let report = navigator.run_trip(
        &mut sim,
        &mut agent,
        &clock,
        &TripRequest::new("home", "school").with_timeout(Duration::from_secs_f64(2.5)),
    );

    assert_eq!(report.outcome, TripOutcome::TimedOut);
    assert_eq!(sim.live_actor_count(), 0);
}

#[test]
fn backend_fault_mid_loop_aborts_and_still_releases() {
    let temp = tempfile::tempdir().expect("tempdir");
    let navigator = scripted_navigator(quick_config(&temp.path().join("route.txt")), Vec::new());
    let mut sim = ScriptedSimulator::new();
    sim.fail_tick_at = Some(2);
    sim.poses = (0..100)
        .map(|i| Pose::new(i as f64, 0.0, 0.3, 0.0))
        .collect();
    let mut agent = ScriptedAgent::new();
    let clock = ManualClock::new();

    let report = navigator.run_trip(
        &mut sim,
        &mut agent,
        &clock,
        &TripRequest::new("home", "school"),
    );

    match &report.outcome {
        TripOutcome::Aborted {
            cause: AbortCause::Runtime(cause),
        } => assert!(cause.contains("advance simulator tick")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(sim.live_actor_count(), 0);
    assert!(sim.op_log.iter().any(|op| op.starts_with("destroy_vehicle")));
}

#[test]
fn exhausted_agent_route_aborts_with_a_planning_cause() {
    let temp = tempfile::tempdir().expect("tempdir");
    let navigator = scripted_navigator(quick_config(&temp.path().join("route.txt")), Vec::new());
    let mut sim = ScriptedSimulator::new();
    sim.poses = (0..100)
        .map(|i| Pose::new(i as f64, 0.0, 0.3, 0.0))
        .collect();
    let mut agent = ScriptedAgent::new();
    agent.controls.push_back(Some(agent.fallback));
    agent.controls.push_back(None);
    let clock = ManualClock::new();

    let report = navigator.run_trip(
        &mut sim,
        &mut agent,
        &clock,
        &TripRequest::new("home", "school"),
    );

    match &report.outcome {
        TripOutcome::Aborted {
            cause: AbortCause::Planning(_),
        } => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(sim.live_actor_count(), 0);
}

#[test]
fn stop_signal_brakes_in_place_of_the_agent_command() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = SupervisorConfig {
        stall_window: 3,
        ..quick_config(&temp.path().join("route.txt"))
    };
    let signals = vec![SignalDefinition {
        name: "Stop".to_string(),
        kind: SignalKind::Stop,
        location: Point3::new(10.0, 0.0, 0.3),
    }];
    let navigator = scripted_navigator(config, signals);
    let mut sim = ScriptedSimulator::new();
    // Step 1 outside the radius, step 2 inside, then the vehicle stalls.
    sim.poses = vec![
        Pose::new(0.0, 0.0, 0.3, 0.0),
        Pose::new(6.0, 0.0, 0.3, 0.0),
        Pose::new(6.0, 0.0, 0.3, 0.0),
    ];
    let mut agent = ScriptedAgent::new();
    let clock = ManualClock::new();

    let report = navigator.run_trip(
        &mut sim,
        &mut agent,
        &clock,
        &TripRequest::new("home", "school"),
    );

    assert_eq!(report.outcome, TripOutcome::Stuck);
    let brakes: Vec<_> = sim
        .applied_controls
        .iter()
        .filter(|control| control.brake == 1.0)
        .collect();
    assert_eq!(brakes.len(), 1);
    // One agent pull per non-override step: the brake step skipped the agent.
    assert_eq!(agent.run_step_calls as u32, report.steps - 1);
    // The settle hold shows up as elapsed time.
    assert!(clock.elapsed() >= Duration::from_secs(3));
}

#[test]
fn speed_limit_signal_forwards_to_the_agent_and_keeps_its_command() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = SupervisorConfig {
        stall_window: 3,
        ..quick_config(&temp.path().join("route.txt"))
    };
    let signals = vec![SignalDefinition {
        name: "SpeedLimit30".to_string(),
        kind: SignalKind::SpeedLimit { limit: 30.0 },
        location: Point3::new(6.0, 0.0, 0.3),
    }];
    let navigator = scripted_navigator(config, signals);
    let mut sim = ScriptedSimulator::new();
    sim.poses = vec![
        Pose::new(0.0, 0.0, 0.3, 0.0),
        Pose::new(6.0, 0.0, 0.3, 0.0),
        Pose::new(6.0, 0.0, 0.3, 0.0),
    ];
    let mut agent = ScriptedAgent::new();
    let clock = ManualClock::new();

    let report = navigator.run_trip(
        &mut sim,
        &mut agent,
        &clock,
        &TripRequest::new("home", "school"),
    );

    assert_eq!(report.outcome, TripOutcome::Stuck);
    assert_eq!(agent.target_speeds, vec![30.0]);
    // Every step pulled the agent's command; no brake override was applied.
    assert_eq!(agent.run_step_calls as u32, report.steps);
    assert!(sim.applied_controls.iter().all(|control| control.brake == 0.0));
}

#[test]
fn collision_events_are_logged_not_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = SupervisorConfig {
        stall_window: 3,
        ..quick_config(&temp.path().join("route.txt"))
    };
    let navigator = scripted_navigator(config, Vec::new());
    let mut sim = ScriptedSimulator::new();
    sim.collisions = vec![navigator::core::types::CollisionEvent {
        other: "static.prop.barrel".to_string(),
        intensity: 12.5,
    }];
    let mut agent = ScriptedAgent::new();
    let clock = ManualClock::new();

    let report = navigator.run_trip(
        &mut sim,
        &mut agent,
        &clock,
        &TripRequest::new("home", "school"),
    );

    // The collision is drained and logged; the trip still runs to its
    // ordinary stuck outcome.
    assert_eq!(report.outcome, TripOutcome::Stuck);
    assert!(sim.collisions.is_empty());
}

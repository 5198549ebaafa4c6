//! Navigation supervisor for a simulated vehicle.
//!
//! This crate drives a vehicle from a named start landmark to a named end
//! landmark inside a driving simulator: it validates the request, provisions
//! the vehicle and its sensor suite with all-or-nothing rollback, runs a
//! synchronous step loop with reactive signal overrides, and guarantees that
//! every actor it created is released on every exit path. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (validation, signal monitoring,
//!   exit evaluation). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations and seams to external
//!   collaborators (simulator client, route agent, wall clock, config,
//!   route report). Isolated to enable scripting in tests.
//!
//! Orchestration modules ([`trip`], [`provision`], [`teardown`]) coordinate
//! core logic with I/O; [`trip::Navigator::run_trip`] is the single entry
//! point callers use.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod provision;
pub mod teardown;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod trip;

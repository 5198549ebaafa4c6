//! Side-effecting operations and seams to external collaborators.
//!
//! Everything that touches the simulator, the route agent, the wall clock,
//! or the filesystem lives here, behind traits where tests need to script
//! behavior.

pub mod agent;
pub mod client;
pub mod clock;
pub mod config;
pub mod playground;
pub mod route_report;

//! Stand-in gateway for local development
//!
//! Serves the same exposition text and admin API shape as the real gateway
//! so the console can be exercised without one.

pub mod counters;
pub mod server;
pub mod traffic;

pub use counters::GatewayCounters;
pub use server::{create_mock_router, MockGatewayState};
pub use traffic::{run_traffic, simulate_tick};

//! Synthetic traffic that keeps the mock gateway's counters moving

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::counters::GatewayCounters;
use crate::signals::ShutdownSignal;

/// `(method, path, backend)` served by the simulated gateway
pub const SIMULATED_ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/api/users", "http://user-service:8002"),
    ("POST", "/api/users", "http://user-service:8002"),
    ("POST", "/api/auth/login", "http://auth-service:8001"),
    ("GET", "/api/orders", "http://order-service:8003"),
    ("GET", "/health", "http://auth-service:8001"),
];

/// Upper bound (exclusive) on requests generated per tick
const MAX_REQUESTS_PER_TICK: u32 = 6;

pub fn register_backends(counters: &GatewayCounters) {
    for (_, _, backend) in SIMULATED_ROUTES {
        counters.register_backend(backend);
    }
}

fn pick_status<R: Rng>(rng: &mut R) -> u16 {
    let roll: f64 = rng.gen();
    if roll < 0.80 {
        200
    } else if roll < 0.85 {
        201
    } else if roll < 0.92 {
        404
    } else if roll < 0.96 {
        401
    } else if roll < 0.98 {
        500
    } else {
        502
    }
}

/// Generate one tick's worth of requests
pub fn simulate_tick<R: Rng>(counters: &GatewayCounters, rng: &mut R) -> u32 {
    let requests = rng.gen_range(0..MAX_REQUESTS_PER_TICK);

    for _ in 0..requests {
        let (method, path, backend) = SIMULATED_ROUTES[rng.gen_range(0..SIMULATED_ROUTES.len())];
        let status = pick_status(rng);

        counters.record_request(method, path, status);
        counters.record_auth(status != 401);
        counters.record_cache(rng.gen_bool(0.6));
        counters.record_rate_limit(rng.gen_bool(0.97));
        counters.record_backend_latency(backend, rng.gen_range(0.005..0.250));
        if status >= 500 {
            counters.record_backend_error(backend);
        }
    }

    // Clients connect with each burst and drift away at a similar rate
    for _ in 0..requests {
        counters.connection_opened();
    }
    for _ in 0..rng.gen_range(0..=requests + 1) {
        counters.connection_closed();
    }
    requests
}

/// Tick until a shutdown signal arrives
pub async fn run_traffic(
    counters: Arc<GatewayCounters>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<ShutdownSignal>,
) {
    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(interval);
    register_backends(&counters);
    info!(interval_ms = interval.as_millis() as u64, "Simulating gateway traffic");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let generated = simulate_tick(&counters, &mut rng);
                debug!(generated, total = counters.total_requests(), "Traffic tick");
            }
            _ = shutdown.recv() => break,
        }
    }
}

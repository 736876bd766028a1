//! Gateway metrics engine
//!
//! Parses the gateway's exposition text and derives dashboard statistics.
//!
//! ```text
//! raw text ─► sample::parse_exposition ─► Vec<MetricSample>
//!                                            │
//!                           query::{value_of, sum_matching, ...}
//!                                            │
//!              ┌─────────────────────────────┴──────────────┐
//!  endpoints::aggregate_endpoints            summary::build_summary
//! ```
//!
//! Everything except [`fetcher`] is pure and holds no state between calls.

pub mod endpoints;
pub mod fetcher;
pub mod names;
pub mod query;
pub mod sample;
pub mod summary;

pub use endpoints::{aggregate_endpoint_samples, aggregate_endpoints, EndpointStats, StatusClass};
pub use fetcher::GatewayClient;
pub use query::{distinct_label_values, sum_matching, value_of, NamePattern};
pub use sample::{parse_exposition, parse_line, Exposition, LineError, MetricSample};
pub use summary::{
    build_summary, summarize, BackendHealth, MetricsSummary, StatusCodes, SummaryOptions,
    TotalRequestsPolicy,
};

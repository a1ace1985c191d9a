//! Per-request outcomes, the shared result aggregator, and latency percentiles.
mod aggregator;
mod histogram;
mod outcome;


pub use aggregator::{AggregateResults, ErrorRecord, ResultAggregator};
pub use histogram::{LatencyHistogram, Percentiles};
pub use outcome::{OutcomeDetail, RequestOutcome};

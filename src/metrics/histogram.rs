use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

const SIGNIFICANT_FIGURES: u8 = 3;

/// Informational latency percentiles in whole milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Percentiles {
    pub p50_ms: u64,
    pub p90_ms: u64,
    pub p99_ms: u64,
}

/// Millisecond-resolution latency distribution of one run.
#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, String> {
        Histogram::<u64>::new(SIGNIFICANT_FIGURES)
            .map(|hist| Self { hist })
            .map_err(|err| format!("Failed to create latency histogram: {}", err))
    }

    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created or a latency
    /// cannot be recorded.
    pub fn from_latencies(latencies: &[Duration]) -> Result<Self, String> {
        let mut histogram = Self::new()?;
        for latency in latencies {
            histogram.record(*latency)?;
        }
        Ok(histogram)
    }

    /// Sub-millisecond latencies count as 1ms so fast responses stay visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency: Duration) -> Result<(), String> {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX).max(1);
        self.hist
            .record(millis)
            .map_err(|err| format!("Failed to record latency {}ms: {}", millis, err))
    }

    #[must_use]
    pub fn percentiles(&self) -> Percentiles {
        if self.hist.is_empty() {
            return Percentiles::default();
        }
        Percentiles {
            p50_ms: self.hist.value_at_quantile(0.5),
            p90_ms: self.hist.value_at_quantile(0.9),
            p99_ms: self.hist.value_at_quantile(0.99),
        }
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}

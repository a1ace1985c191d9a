use std::sync::Arc;
use std::time::Duration;

use crate::args::EndpointSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeDetail {
    /// The server answered; the status may or may not be the expected one.
    Status(u16),
    /// No usable response: connect failure, timeout, or a broken body.
    Transport { message: String, timed_out: bool },
}

/// The result of one logical request, after any retries.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub endpoint: Arc<EndpointSpec>,
    /// Latency of the final attempt.
    pub latency: Duration,
    pub detail: OutcomeDetail,
    pub attempts: u32,
}

impl RequestOutcome {
    #[must_use]
    pub const fn new(
        endpoint: Arc<EndpointSpec>,
        latency: Duration,
        detail: OutcomeDetail,
    ) -> Self {
        Self {
            endpoint,
            latency,
            detail,
            attempts: 1,
        }
    }

    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self.detail {
            OutcomeDetail::Status(code) => Some(code),
            OutcomeDetail::Transport { .. } => None,
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status() == Some(self.endpoint.expected_status)
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Method};
use tokio::time::Instant;
use url::Url;

use crate::args::{EndpointSpec, HttpMethod};
use crate::metrics::{OutcomeDetail, RequestOutcome};

use super::{PayloadGenerator, endpoint_url};

/// Issues one logical request and classifies the result. Failures are
/// reported in the outcome, never as errors.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, endpoint: Arc<EndpointSpec>) -> RequestOutcome;
}

/// Retries apply to transport failures only; an unexpected status is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

pub struct HttpExecutor {
    client: Client,
    base_url: Url,
    payloads: Arc<dyn PayloadGenerator>,
    retry: RetryPolicy,
}

impl HttpExecutor {
    #[must_use]
    pub const fn new(
        client: Client,
        base_url: Url,
        payloads: Arc<dyn PayloadGenerator>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url,
            payloads,
            retry,
        }
    }

    const fn reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    async fn attempt(&self, endpoint: &EndpointSpec, url: &Url) -> (Duration, OutcomeDetail) {
        let mut builder = self
            .client
            .request(Self::reqwest_method(endpoint.method), url.clone());
        if let Some(body) = self.payloads.generate(endpoint) {
            builder = builder.json(&body);
        }

        let start = Instant::now();
        let detail = match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match drain_response_body(response).await {
                    Ok(_) => OutcomeDetail::Status(status),
                    Err(err) => transport_detail(&err),
                }
            }
            Err(err) => transport_detail(&err),
        };
        (start.elapsed(), detail)
    }
}

fn transport_detail(err: &reqwest::Error) -> OutcomeDetail {
    OutcomeDetail::Transport {
        message: err.to_string(),
        timed_out: err.is_timeout(),
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, endpoint: Arc<EndpointSpec>) -> RequestOutcome {
        // A path that cannot be joined fails identically on every attempt.
        let url = match endpoint_url(&self.base_url, &endpoint.path) {
            Ok(url) => url,
            Err(err) => {
                let detail = OutcomeDetail::Transport {
                    message: err.to_string(),
                    timed_out: false,
                };
                return RequestOutcome::new(endpoint, Duration::ZERO, detail);
            }
        };

        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            let (latency, detail) = self.attempt(&endpoint, &url).await;
            let retryable = matches!(detail, OutcomeDetail::Transport { .. });
            if !retryable || attempts > self.retry.max_retries {
                return RequestOutcome::new(endpoint, latency, detail).with_attempts(attempts);
            }
            tracing::debug!(
                "Retrying {} after transport failure (attempt {}/{})",
                endpoint,
                attempts,
                self.retry.max_retries.saturating_add(1)
            );
            tokio::time::sleep(self.retry.retry_delay).await;
        }
    }
}

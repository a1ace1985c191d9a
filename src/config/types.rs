use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{
    AuthMode, EndpointSpec, OutputFormat, PercentX100, Preset, ShutdownPolicy, parse_duration_value,
};
use crate::error::ValidationError;
use crate::http::PayloadTemplates;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub auth: Option<AuthSection>,
    pub endpoints: Option<Vec<EndpointSpec>>,
    pub concurrency: Option<usize>,
    pub rate: Option<u64>,
    pub duration: Option<DurationValue>,
    pub preset: Option<Preset>,
    pub max_pending: Option<usize>,
    pub shutdown_policy: Option<ShutdownPolicy>,
    pub seed: Option<u64>,
    pub http: Option<HttpSection>,
    pub criteria: Option<CriteriaSection>,
    pub payload_templates: Option<PayloadTemplates>,
    pub logging: Option<LoggingSection>,
    pub output: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub error_limit: Option<usize>,
    pub run_stress_test: Option<bool>,
    pub run_cleanup: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthSection {
    pub mode: Option<AuthMode>,
    pub token: Option<String>,
    pub api_key: Option<String>,
    pub api_key_header: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpSection {
    pub timeout: Option<DurationValue>,
    pub max_retries: Option<u32>,
    pub retry_delay: Option<DurationValue>,
    pub user_agent: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CriteriaSection {
    pub success_rate_percent: Option<PercentX100>,
    /// Maximum average latency in milliseconds.
    pub response_time_ms: Option<u64>,
    pub max_error_rate_percent: Option<PercentX100>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<String>,
}

/// A duration given as whole seconds or as text with a unit (`"500ms"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}

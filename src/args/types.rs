use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// POST and PUT carry a generated JSON payload; GET and DELETE do not.
    #[must_use]
    pub const fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ValidationError::InvalidHttpMethod {
                value: s.to_owned(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse::<HttpMethod>().map_err(serde::de::Error::custom)
    }
}

impl Serialize for HttpMethod {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

const fn default_expected_status() -> u16 {
    200
}

/// One target endpoint: the method, the path relative to the base URL, and
/// the status code that counts as success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
}

impl EndpointSpec {
    #[must_use]
    pub fn new(method: HttpMethod, path: &str, expected_status: u16) -> Self {
        Self {
            method,
            path: path.to_owned(),
            expected_status,
        }
    }

    /// Rejects paths that cannot be appended to the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the path does not start with `/`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.starts_with('/') {
            Ok(())
        } else {
            Err(ValidationError::EndpointPathNotAbsolute {
                path: self.path.clone(),
            })
        }
    }
}

impl std::fmt::Display for EndpointSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Parses `METHOD /path` or `METHOD /path STATUS`.
impl std::str::FromStr for EndpointSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
            return Err(ValidationError::InvalidEndpointFormat {
                value: s.to_owned(),
            });
        };
        let expected_status = match parts.next() {
            Some(status) => {
                status
                    .parse::<u16>()
                    .map_err(|err| ValidationError::InvalidEndpointStatus {
                        value: s.to_owned(),
                        source: err,
                    })?
            }
            None => default_expected_status(),
        };
        if parts.next().is_some() {
            return Err(ValidationError::InvalidEndpointFormat {
                value: s.to_owned(),
            });
        }
        let spec = EndpointSpec {
            method: method.parse()?,
            path: path.to_owned(),
            expected_status,
        };
        spec.validate()?;
        Ok(spec)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    #[default]
    None,
    Bearer,
    #[serde(alias = "api_key")]
    #[value(alias = "api_key")]
    ApiKey,
    Basic,
}

impl AuthMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AuthMode::None => "none",
            AuthMode::Bearer => "bearer",
            AuthMode::ApiKey => "api-key",
            AuthMode::Basic => "basic",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// What happens to in-flight requests when the run is cancelled externally.
/// Wall-clock expiry always drains.
#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPolicy {
    /// Abort in-flight requests and discard their outcomes.
    #[default]
    Abandon,
    /// Let in-flight requests finish and record them.
    Drain,
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Light,
    Medium,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetProfile {
    pub concurrency: usize,
    pub rate: u64,
    pub duration: Duration,
}

impl Preset {
    #[must_use]
    pub const fn profile(self) -> PresetProfile {
        match self {
            Preset::Light => PresetProfile {
                concurrency: 5,
                rate: 10,
                duration: Duration::from_secs(60),
            },
            Preset::Medium => PresetProfile {
                concurrency: 25,
                rate: 50,
                duration: Duration::from_secs(5 * 60),
            },
            Preset::Heavy => PresetProfile {
                concurrency: 100,
                rate: 200,
                duration: Duration::from_secs(10 * 60),
            },
        }
    }
}

/// A percentage stored as hundredths (`9950` is 99.50%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PercentX100(u64);

impl PercentX100 {
    pub const MAX: u64 = 10_000;

    #[must_use]
    pub const fn from_whole(percent: u64) -> Option<Self> {
        match percent.checked_mul(100) {
            Some(value) if value <= Self::MAX => Some(Self(value)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PercentX100 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

impl std::str::FromStr for PercentX100 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidPercent {
            value: s.to_owned(),
        };
        let value = s.trim().trim_end_matches('%');
        let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
        let digits_only = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if whole.is_empty() || !digits_only(whole) || !digits_only(frac) || frac.len() > 2 {
            return Err(invalid());
        }
        let whole: u64 = whole.parse().ok().ok_or_else(invalid)?;
        let frac_x100: u64 = match frac.len() {
            0 => 0,
            1 => frac
                .parse::<u64>()
                .ok()
                .and_then(|tenths| tenths.checked_mul(10))
                .ok_or_else(invalid)?,
            _ => frac.parse().ok().ok_or_else(invalid)?,
        };
        let total = whole
            .checked_mul(100)
            .and_then(|scaled| scaled.checked_add(frac_x100))
            .ok_or_else(invalid)?;
        if total > Self::MAX {
            return Err(invalid());
        }
        Ok(Self(total))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PercentValue {
    Whole(u64),
    Fraction(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for PercentX100 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = match PercentValue::deserialize(deserializer)? {
            PercentValue::Whole(value) => value.to_string(),
            PercentValue::Fraction(value) => value.to_string(),
            PercentValue::Text(value) => value,
        };
        text.parse::<PercentX100>()
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveU64(NonZeroU64);

impl PositiveU64 {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for PositiveU64 {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(value)
            .map(PositiveU64)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveU64 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveU64::try_from(value)
    }
}

impl From<PositiveU64> for u64 {
    fn from(value: PositiveU64) -> Self {
        value.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for PositiveUsize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveUsize::try_from(value)
    }
}

impl From<PositiveUsize> for usize {
    fn from(value: PositiveUsize) -> Self {
        value.get()
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid percentage '{value}'. Expected a value between 0 and 100 with at most two decimals.")]
    InvalidPercent { value: String },
    #[error("Unsupported HTTP method '{value}'. Use GET, POST, PUT, or DELETE.")]
    InvalidHttpMethod { value: String },
    #[error("Invalid endpoint '{value}'. Expected 'METHOD /path [expected_status]'.")]
    InvalidEndpointFormat { value: String },
    #[error("Endpoint path '{path}' must start with '/'.")]
    EndpointPathNotAbsolute { path: String },
    #[error("Invalid expected status in endpoint '{value}': {source}")]
    InvalidEndpointStatus {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Missing base URL (set --base-url or provide base_url in config).")]
    MissingBaseUrl,
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Base URL '{url}' must use http or https.")]
    UnsupportedScheme { url: String },
    #[error("No endpoints configured (use --endpoint or the endpoints list in config).")]
    NoEndpoints,
    #[error("`--output` requires `--output-format json`.")]
    OutputRequiresJson,
}

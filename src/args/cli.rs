use clap::{Parser, Subcommand};
use std::time::Duration;

use crate::http::PayloadTemplates;

use super::defaults::{DEFAULT_API_KEY_HEADER, DEFAULT_USER_AGENT};
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_endpoint, parse_header, parse_percent,
    parse_positive_u64, parse_positive_usize,
};
use super::types::{
    AuthMode, EndpointSpec, OutputFormat, PercentX100, PositiveU64, PositiveUsize, Preset,
    ShutdownPolicy,
};

#[derive(Debug, Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Delete synthetic test records from the configured POST/PUT endpoints and exit
    Cleanup,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Configurable HTTP API stress tester - paced concurrent load, latency/success statistics, pass/fail criteria gates, and synthetic test-data cleanup.",
    next_help_heading = "Advanced Options"
)]
pub struct TesterArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to config file (TOML/JSON). Defaults to ./apistress.toml or ./apistress.json if present.
    #[arg(long, short = 'c', help_heading = "Common Options")]
    pub config: Option<String>,

    /// Base URL of the API under test (endpoint paths are appended to it)
    #[arg(
        long = "base-url",
        short = 'u',
        env = "APISTRESS_BASE_URL",
        help_heading = "Common Options"
    )]
    pub base_url: Option<String>,

    /// Endpoint as 'METHOD /path [expected_status]' (repeatable)
    #[arg(
        long = "endpoint",
        short = 'e',
        value_parser = parse_endpoint,
        help_heading = "Common Options"
    )]
    pub endpoints: Vec<EndpointSpec>,

    /// Number of requests allowed to execute at the same time
    #[arg(
        long = "concurrency",
        short = 'C',
        default_value = "5",
        value_parser = parse_positive_usize,
        help_heading = "Common Options"
    )]
    pub concurrency: PositiveUsize,

    /// Target requests per second
    #[arg(
        long = "rate",
        short = 'q',
        default_value = "10",
        value_parser = parse_positive_u64,
        help_heading = "Common Options"
    )]
    pub rate: PositiveU64,

    /// Test duration (supports ms/s/m/h)
    #[arg(
        long = "duration",
        short = 't',
        default_value = "60s",
        value_parser = parse_duration_arg,
        help_heading = "Common Options"
    )]
    pub duration: Duration,

    /// Load preset (sets concurrency, rate, and duration unless given explicitly)
    #[arg(long = "preset", short = 'p', value_enum, help_heading = "Common Options")]
    pub preset: Option<Preset>,

    /// Authentication mode
    #[arg(long = "auth", default_value = "none", value_enum)]
    pub auth: AuthMode,

    /// Bearer token (auth mode 'bearer')
    #[arg(long = "auth-token", env = "APISTRESS_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// API key (auth mode 'api-key')
    #[arg(long = "api-key", env = "APISTRESS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Header name carrying the API key
    #[arg(long = "api-key-header", default_value = DEFAULT_API_KEY_HEADER)]
    pub api_key_header: String,

    /// Username (auth mode 'basic')
    #[arg(long = "username", env = "APISTRESS_USERNAME")]
    pub username: Option<String>,

    /// Password (auth mode 'basic')
    #[arg(long = "password", env = "APISTRESS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Extra HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long, short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// User-Agent header sent with every request
    #[arg(long = "user-agent", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Retries after a transport failure (timeouts, connection errors)
    #[arg(long = "max-retries", default_value = "0")]
    pub max_retries: u32,

    /// Delay between retry attempts (supports ms/s/m/h)
    #[arg(long = "retry-delay", default_value = "1s", value_parser = parse_duration_arg)]
    pub retry_delay: Duration,

    /// Cap on submitted-but-unfinished requests (defaults to twice the rate)
    #[arg(long = "max-pending", value_parser = parse_positive_usize)]
    pub max_pending: Option<PositiveUsize>,

    /// What to do with in-flight requests on Ctrl+C/SIGTERM
    #[arg(long = "on-shutdown", default_value = "abandon", value_enum)]
    pub shutdown_policy: ShutdownPolicy,

    /// Seed for endpoint selection and payload generation
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Minimum success rate in percent
    #[arg(
        long = "min-success-rate",
        default_value = "99",
        value_parser = parse_percent,
        help_heading = "Success Criteria"
    )]
    pub min_success_rate: PercentX100,

    /// Maximum average latency (supports ms/s/m/h)
    #[arg(
        long = "max-avg-latency",
        default_value = "2000ms",
        value_parser = parse_duration_arg,
        help_heading = "Success Criteria"
    )]
    pub max_avg_latency: Duration,

    /// Maximum error rate in percent
    #[arg(
        long = "max-error-rate",
        default_value = "1",
        value_parser = parse_percent,
        help_heading = "Success Criteria"
    )]
    pub max_error_rate: PercentX100,

    /// Number of error records included in the summary
    #[arg(long = "error-limit", default_value = "10")]
    pub error_limit: usize,

    /// Summary output format
    #[arg(long = "output-format", default_value = "text", value_enum)]
    pub output_format: OutputFormat,

    /// Write the JSON summary to this path instead of stdout
    #[arg(long = "output", short = 'o')]
    pub output: Option<String>,

    /// Skip the stress test phase
    #[arg(long = "no-stress-test")]
    pub no_stress_test: bool,

    /// Delete synthetic test data after the stress test
    #[arg(long = "cleanup")]
    pub cleanup: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by APISTRESS_LOG/RUST_LOG)
    #[arg(long, short = 'v', alias = "debug", help_heading = "Common Options")]
    pub verbose: bool,

    /// Log level when no env filter is set (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,

    /// Also append log output to this file
    #[arg(long = "log-file")]
    pub log_file: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,

    #[arg(skip)]
    pub payload_templates: PayloadTemplates,
}

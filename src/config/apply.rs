use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;
use tracing::debug;

use crate::args::{PositiveU64, PositiveUsize, TesterArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

/// Which load-shape fields the config file set, so a preset does not
/// override them.
#[derive(Debug, Default, Clone, Copy)]
struct ExplicitLoad {
    concurrency: bool,
    rate: bool,
    duration: bool,
}

/// Applies configuration values to CLI arguments. Flags given on the command
/// line always win; a preset only fills load fields nobody set explicitly.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "base_url")
        && let Some(base_url) = config.base_url.clone()
    {
        args.base_url = Some(base_url);
    }

    if !is_cli(matches, "endpoints")
        && let Some(endpoints) = config.endpoints.clone()
    {
        args.endpoints = endpoints;
    }

    let explicit = apply_load(args, matches, config)?;
    apply_auth(args, matches, config);
    apply_http(args, matches, config)?;
    apply_criteria(args, matches, config);
    apply_control(args, matches, config);

    if let Some(templates) = config.payload_templates.clone() {
        args.payload_templates = templates;
    }

    apply_preset(args, matches, explicit);
    Ok(())
}

fn apply_load(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<ExplicitLoad> {
    let mut explicit = ExplicitLoad::default();

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = ensure_positive_usize(concurrency, "concurrency")?;
        explicit.concurrency = true;
    }

    if !is_cli(matches, "rate")
        && let Some(rate) = config.rate
    {
        args.rate = ensure_positive_u64(rate, "rate")?;
        explicit.rate = true;
    }

    if !is_cli(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = to_duration(duration, "duration")?;
        explicit.duration = true;
    }

    if !is_cli(matches, "preset")
        && let Some(preset) = config.preset
    {
        args.preset = Some(preset);
    }

    if !is_cli(matches, "max_pending")
        && let Some(max_pending) = config.max_pending
    {
        args.max_pending = Some(ensure_positive_usize(max_pending, "max_pending")?);
    }

    if !is_cli(matches, "shutdown_policy")
        && let Some(policy) = config.shutdown_policy
    {
        args.shutdown_policy = policy;
    }

    if !is_cli(matches, "seed")
        && let Some(seed) = config.seed
    {
        args.seed = Some(seed);
    }

    Ok(explicit)
}

fn apply_auth(args: &mut TesterArgs, matches: &ArgMatches, config: &ConfigFile) {
    let Some(auth) = config.auth.as_ref() else {
        return;
    };
    if !is_cli(matches, "auth")
        && let Some(mode) = auth.mode
    {
        args.auth = mode;
    }
    if !is_cli(matches, "auth_token")
        && let Some(token) = auth.token.clone()
    {
        args.auth_token = Some(token);
    }
    if !is_cli(matches, "api_key")
        && let Some(api_key) = auth.api_key.clone()
    {
        args.api_key = Some(api_key);
    }
    if !is_cli(matches, "api_key_header")
        && let Some(header) = auth.api_key_header.clone()
    {
        args.api_key_header = header;
    }
    if !is_cli(matches, "username")
        && let Some(username) = auth.username.clone()
    {
        args.username = Some(username);
    }
    if !is_cli(matches, "password")
        && let Some(password) = auth.password.clone()
    {
        args.password = Some(password);
    }
}

fn apply_http(args: &mut TesterArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    let Some(http) = config.http.as_ref() else {
        return Ok(());
    };
    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = http.timeout.as_ref()
    {
        args.request_timeout = to_duration(timeout, "http.timeout")?;
    }
    if !is_cli(matches, "max_retries")
        && let Some(retries) = http.max_retries
    {
        args.max_retries = retries;
    }
    if !is_cli(matches, "retry_delay")
        && let Some(delay) = http.retry_delay.as_ref()
    {
        args.retry_delay = to_duration(delay, "http.retry_delay")?;
    }
    if !is_cli(matches, "user_agent")
        && let Some(user_agent) = http.user_agent.clone()
    {
        args.user_agent = user_agent;
    }
    if !is_cli(matches, "headers")
        && let Some(headers) = http.headers.as_ref()
    {
        args.headers = headers
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
    }
    Ok(())
}

fn apply_criteria(args: &mut TesterArgs, matches: &ArgMatches, config: &ConfigFile) {
    if !is_cli(matches, "error_limit")
        && let Some(limit) = config.error_limit
    {
        args.error_limit = limit;
    }
    let Some(criteria) = config.criteria.as_ref() else {
        return;
    };
    if !is_cli(matches, "min_success_rate")
        && let Some(rate) = criteria.success_rate_percent
    {
        args.min_success_rate = rate;
    }
    if !is_cli(matches, "max_avg_latency")
        && let Some(millis) = criteria.response_time_ms
    {
        args.max_avg_latency = Duration::from_millis(millis);
    }
    if !is_cli(matches, "max_error_rate")
        && let Some(rate) = criteria.max_error_rate_percent
    {
        args.max_error_rate = rate;
    }
}

fn apply_control(args: &mut TesterArgs, matches: &ArgMatches, config: &ConfigFile) {
    if !is_cli(matches, "no_stress_test")
        && let Some(run) = config.run_stress_test
    {
        args.no_stress_test = !run;
    }
    if !is_cli(matches, "cleanup")
        && let Some(cleanup) = config.run_cleanup
    {
        args.cleanup = cleanup;
    }
    if !is_cli(matches, "output")
        && let Some(output) = config.output.clone()
    {
        args.output = Some(output);
    }
    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }
    if let Some(logging) = config.logging.as_ref() {
        if !is_cli(matches, "log_level")
            && let Some(level) = logging.level.clone()
        {
            args.log_level = level;
        }
        if !is_cli(matches, "log_file")
            && let Some(file) = logging.file.clone()
        {
            args.log_file = Some(file);
        }
    }
}

fn apply_preset(args: &mut TesterArgs, matches: &ArgMatches, explicit: ExplicitLoad) {
    let Some(preset) = args.preset else {
        return;
    };
    let profile = preset.profile();
    debug!("Applying {:?} preset", preset);
    if !is_cli(matches, "concurrency")
        && !explicit.concurrency
        && let Ok(concurrency) = PositiveUsize::try_from(profile.concurrency)
    {
        args.concurrency = concurrency;
    }
    if !is_cli(matches, "rate")
        && !explicit.rate
        && let Ok(rate) = PositiveU64::try_from(profile.rate)
    {
        args.rate = rate;
    }
    if !is_cli(matches, "duration") && !explicit.duration {
        args.duration = profile.duration;
    }
}

use url::Url;

use crate::args::{OutputFormat, TesterArgs};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::parse_base_url;

/// Checks the merged arguments before anything is sent and returns the
/// parsed base URL.
///
/// # Errors
///
/// Returns an error for a missing or malformed base URL, an empty endpoint
/// list, a relative endpoint path, or `--output` without JSON output.
pub fn validate_args(args: &TesterArgs) -> AppResult<Url> {
    let base_url = args
        .base_url
        .as_deref()
        .ok_or(ValidationError::MissingBaseUrl)?;
    let base_url = parse_base_url(base_url)?;

    if args.endpoints.is_empty() {
        return Err(AppError::validation(ValidationError::NoEndpoints));
    }
    for endpoint in &args.endpoints {
        endpoint.validate()?;
    }

    if args.output.is_some() && args.output_format != OutputFormat::Json {
        return Err(AppError::validation(ValidationError::OutputRequiresJson));
    }
    Ok(base_url)
}

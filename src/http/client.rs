use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::args::TesterArgs;
use crate::error::{AppError, AppResult, HttpError, ValidationError};

use super::AuthConfig;

/// Parses and checks the base URL of the API under test.
///
/// # Errors
///
/// Returns an error for malformed URLs or schemes other than http/https.
pub fn parse_base_url(value: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(value).map_err(|err| ValidationError::InvalidBaseUrl {
        url: value.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ValidationError::UnsupportedScheme {
            url: value.to_owned(),
        }),
    }
}

/// Appends an endpoint path to the base URL, keeping any base path prefix
/// (`http://host/api` + `/posts` is `http://host/api/posts`).
///
/// # Errors
///
/// Returns an error when the combined string is not a valid URL.
pub fn endpoint_url(base: &Url, path: &str) -> Result<Url, HttpError> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|err| HttpError::JoinUrlFailed {
        base: base.to_string(),
        path: path.to_owned(),
        source: err,
    })
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpError> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|err| HttpError::InvalidHeader {
            name: name.to_owned(),
            message: err.to_string(),
        })?;
    let header_value = HeaderValue::from_str(value).map_err(|err| HttpError::InvalidHeader {
        name: name.to_owned(),
        message: err.to_string(),
    })?;
    Ok((header_name, header_value))
}

/// Builds the shared client: JSON accept/content-type, user agent, extra
/// headers, auth headers, and the per-request timeout.
///
/// # Errors
///
/// Returns an error when a header is invalid or the client cannot be built.
pub fn build_client(args: &TesterArgs, auth: &AuthConfig) -> AppResult<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in args.headers.iter().chain(auth.headers().iter()) {
        let (header_name, header_value) = header_pair(name, value)?;
        headers.insert(header_name, header_value);
    }

    Client::builder()
        .default_headers(headers)
        .user_agent(args.user_agent.as_str())
        .timeout(args.request_timeout)
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}

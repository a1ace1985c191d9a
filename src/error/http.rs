use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },
    #[error("Failed to join URL '{base}' with '{path}': {source}")]
    JoinUrlFailed {
        base: String,
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Listing '{url}' returned status {status}.")]
    ListStatus { url: String, status: u16 },
    #[error("Listing '{url}' did not return a JSON array.")]
    ListNotArray { url: String },
    #[error("Request to '{url}' failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

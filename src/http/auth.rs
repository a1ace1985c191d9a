use base64::Engine as _;

use crate::args::{AuthMode, TesterArgs};
use crate::error::{AppError, AppResult, ConfigError};

/// Resolved credentials for the configured auth mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthConfig {
    #[default]
    None,
    Bearer {
        token: String,
    },
    ApiKey {
        header: String,
        key: String,
    },
    Basic {
        username: String,
        password: String,
    },
}

impl AuthConfig {
    /// Builds the auth configuration from the merged arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when the selected mode is missing a credential.
    pub fn from_args(args: &TesterArgs) -> AppResult<Self> {
        let mode = args.auth;
        let required = |value: Option<&String>, field: &'static str| {
            value
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or_else(|| {
                    AppError::config(ConfigError::AuthMissingCredential {
                        mode: mode.as_str(),
                        field,
                    })
                })
        };

        match mode {
            AuthMode::None => Ok(AuthConfig::None),
            AuthMode::Bearer => Ok(AuthConfig::Bearer {
                token: required(args.auth_token.as_ref(), "auth_token")?,
            }),
            AuthMode::ApiKey => Ok(AuthConfig::ApiKey {
                header: args.api_key_header.clone(),
                key: required(args.api_key.as_ref(), "api_key")?,
            }),
            AuthMode::Basic => Ok(AuthConfig::Basic {
                username: required(args.username.as_ref(), "username")?,
                password: args.password.clone().unwrap_or_default(),
            }),
        }
    }

    /// Headers that carry the credentials on every request.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        match self {
            AuthConfig::None => Vec::new(),
            AuthConfig::Bearer { token } => {
                vec![("Authorization".to_owned(), format!("Bearer {}", token))]
            }
            AuthConfig::ApiKey { header, key } => vec![(header.clone(), key.clone())],
            AuthConfig::Basic { username, password } => {
                let token = format!("{}:{}", username, password);
                let encoded = base64::engine::general_purpose::STANDARD.encode(token.as_bytes());
                vec![("Authorization".to_owned(), format!("Basic {}", encoded))]
            }
        }
    }

    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        match self {
            AuthConfig::None => AuthMode::None,
            AuthConfig::Bearer { .. } => AuthMode::Bearer,
            AuthConfig::ApiKey { .. } => AuthMode::ApiKey,
            AuthConfig::Basic { .. } => AuthMode::Basic,
        }
    }
}

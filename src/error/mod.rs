mod app;
mod config;
mod criteria;
mod http;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use criteria::CriteriaError;
pub use http::HttpError;
pub use validation::ValidationError;

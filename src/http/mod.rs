mod auth;
mod client;
mod executor;
mod payload;


pub use auth::AuthConfig;
pub use client::{build_client, endpoint_url, parse_base_url};
pub use executor::{HttpExecutor, RequestExecutor, RetryPolicy};
pub use payload::{
    FieldKind, PayloadGenerator, PayloadTemplates, RandomPayloadGenerator,
    TemplatePayloadGenerator, payload_generator,
};

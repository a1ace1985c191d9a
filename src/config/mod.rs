//! Configuration loading, layering under CLI flags, and final validation.
mod apply;
mod loader;
pub mod types;
mod validate;

#[cfg(test)]
mod tests;

pub use apply::apply_config;
pub use loader::load_config;
pub use validate::validate_args;

#[cfg(test)]
pub(crate) use loader::load_config_file;

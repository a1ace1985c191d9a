//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{Command, TesterArgs};
pub use types::{
    AuthMode, EndpointSpec, HttpMethod, OutputFormat, PercentX100, PositiveU64, PositiveUsize,
    Preset, PresetProfile, ShutdownPolicy,
};

pub(crate) use defaults::DEFAULT_CONFIG_FILES;
pub(crate) use parsers::parse_duration_value;

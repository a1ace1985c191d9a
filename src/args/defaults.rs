pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!("apistress/", env!("CARGO_PKG_VERSION"), " (stress-test-tool)");

pub(crate) const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Default config filenames checked when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["apistress.toml", "apistress.json"];

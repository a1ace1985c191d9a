pub(crate) mod logger;
pub(crate) mod resources;
pub(crate) mod shutdown_handlers;

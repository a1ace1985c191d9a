mod app;
mod args;
mod cleanup;
mod config;
mod criteria;
mod entry;
mod error;
mod http;
mod metrics;
mod scheduler;
mod shutdown;
mod system;
#[cfg(test)]
mod test_server;

use std::process::ExitCode;

use error::AppResult;

fn main() -> AppResult<ExitCode> {
    entry::run()
}

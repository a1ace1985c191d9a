use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::error;

use crate::app::run_app;
use crate::args::{DEFAULT_CONFIG_FILES, TesterArgs};
use crate::config::{apply_config, load_config, validate_args};
use crate::error::AppResult;
use crate::shutdown::shutdown_channel;
use crate::system::logger::{LogSettings, init_logging};
use crate::system::shutdown_handlers::setup_signal_shutdown_handler;

pub(crate) fn run() -> AppResult<ExitCode> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(ExitCode::SUCCESS);
    };

    let config = load_config(args.config.as_deref())?.unwrap_or_default();
    apply_config(&mut args, &matches, &config)?;

    init_logging(&LogSettings {
        verbose: args.verbose,
        level: &args.log_level,
        file: args.log_file.as_deref(),
        no_color: args.no_color,
    })?;

    let base_url = match validate_args(&args) {
        Ok(base_url) => base_url,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            return Err(err);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        // The run's receiver exists before the handler can broadcast.
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
        let result = run_app(&args, base_url, shutdown_rx).await;
        drop(shutdown_tx.send(()));
        if let Err(err) = signal_handle.await {
            error!("Signal handler task failed: {}", err);
        }
        if let Err(err) = result.as_ref() {
            error!("Run failed: {}", err);
        }
        result
    })
}

fn parse_args() -> AppResult<Option<(TesterArgs, ArgMatches)>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

/// A bare invocation prints help unless a default config file is present.
fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

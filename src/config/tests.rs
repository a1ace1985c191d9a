use super::*;
use crate::args::{AuthMode, EndpointSpec, HttpMethod, OutputFormat, Preset, ShutdownPolicy, TesterArgs};
use crate::http::FieldKind;
use clap::{CommandFactory, FromArgMatches};
use std::time::Duration;
use tempfile::tempdir;

fn write_config(name: &str, content: &str) -> Result<(tempfile::TempDir, std::path::PathBuf), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join(name);
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;
    Ok((dir, path))
}

fn merged_args(argv: &[&str], config: &types::ConfigFile) -> Result<TesterArgs, String> {
    let mut full = vec!["apistress"];
    full.extend_from_slice(argv);
    let matches = TesterArgs::command()
        .try_get_matches_from(full)
        .map_err(|err| format!("matches failed: {}", err))?;
    let mut args =
        TesterArgs::from_arg_matches(&matches).map_err(|err| format!("args failed: {}", err))?;
    apply_config(&mut args, &matches, config).map_err(|err| format!("apply failed: {}", err))?;
    Ok(args)
}

fn parse_toml(content: &str) -> Result<types::ConfigFile, String> {
    toml::from_str(content).map_err(|err| format!("toml failed: {}", err))
}

#[test]
fn parse_toml_config_sections() -> Result<(), String> {
    let (_dir, path) = write_config(
        "apistress.toml",
        r#"
base_url = "https://api.example.com/v1"
concurrency = 8
rate = 40
duration = "2m"
run_cleanup = true

[[endpoints]]
method = "GET"
path = "/posts"

[[endpoints]]
method = "post"
path = "/posts"
expected_status = 201

[auth]
mode = "api_key"
api_key = "secret"

[http]
timeout = "5s"
max_retries = 3
retry_delay = 2
headers = { "X-Env" = "staging" }

[criteria]
success_rate_percent = 99.5
response_time_ms = 750
max_error_rate_percent = "0.5"

[payload_templates."/users"]
name = "string"
email = "email"
age = "integer"

[logging]
level = "debug"
file = "run.log"
"#,
    )?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let endpoints = config.endpoints.as_ref().ok_or("Expected endpoints")?;
    let expected = vec![
        EndpointSpec::new(HttpMethod::Get, "/posts", 200),
        EndpointSpec::new(HttpMethod::Post, "/posts", 201),
    ];
    if *endpoints != expected {
        return Err(format!("Unexpected endpoints: {:?}", endpoints));
    }
    let auth = config.auth.as_ref().ok_or("Expected auth section")?;
    if auth.mode != Some(AuthMode::ApiKey) {
        return Err("Expected api-key mode".to_owned());
    }
    let criteria = config.criteria.as_ref().ok_or("Expected criteria")?;
    if criteria.success_rate_percent.map(|rate| rate.get()) != Some(9950)
        || criteria.max_error_rate_percent.map(|rate| rate.get()) != Some(50)
    {
        return Err("Unexpected criteria percentages".to_owned());
    }
    let templates = config.payload_templates.as_ref().ok_or("Expected templates")?;
    let users = templates.get("/users").ok_or("Expected /users template")?;
    if users.get("age") != Some(&FieldKind::Integer) || users.len() != 3 {
        return Err(format!("Unexpected template: {:?}", users));
    }

    let args = merged_args(&[], &config)?;
    let checks = [
        (args.concurrency.get() == 8, "concurrency"),
        (args.rate.get() == 40, "rate"),
        (args.duration == Duration::from_secs(120), "duration"),
        (args.request_timeout == Duration::from_secs(5), "timeout"),
        (args.max_retries == 3, "max_retries"),
        (args.retry_delay == Duration::from_secs(2), "retry_delay"),
        (args.max_avg_latency == Duration::from_millis(750), "latency"),
        (args.api_key.as_deref() == Some("secret"), "api_key"),
        (args.cleanup, "run_cleanup"),
        (args.log_level == "debug", "log level"),
        (args.log_file.as_deref() == Some("run.log"), "log file"),
        (
            args.headers == vec![("X-Env".to_owned(), "staging".to_owned())],
            "headers",
        ),
        (!args.payload_templates.is_empty(), "payload templates"),
    ];
    for (ok, field) in checks {
        if !ok {
            return Err(format!("Config value not applied: {}", field));
        }
    }
    Ok(())
}

#[test]
fn parse_json_config() -> Result<(), String> {
    let (_dir, path) = write_config(
        "apistress.json",
        r#"{
  "base_url": "http://localhost:3000",
  "endpoints": [{"method": "DELETE", "path": "/items/1", "expected_status": 204}],
  "shutdown_policy": "drain",
  "run_stress_test": false,
  "output_format": "json"
}"#,
    )?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let args = merged_args(&[], &config)?;
    if args.shutdown_policy != ShutdownPolicy::Drain
        || !args.no_stress_test
        || args.output_format != OutputFormat::Json
    {
        return Err(format!("Unexpected merged args: {:?}", args));
    }
    if args.endpoints != vec![EndpointSpec::new(HttpMethod::Delete, "/items/1", 204)] {
        return Err(format!("Unexpected endpoints: {:?}", args.endpoints));
    }
    Ok(())
}

#[test]
fn cli_flags_override_config() -> Result<(), String> {
    let config = parse_toml("rate = 20\nconcurrency = 7\n[auth]\nmode = \"basic\"\nusername = \"cfg\"")?;
    let args = merged_args(&["--rate", "50", "--username", "cli"], &config)?;
    if args.rate.get() != 50 {
        return Err(format!("Expected CLI rate, got {}", args.rate.get()));
    }
    if args.concurrency.get() != 7 {
        return Err(format!("Expected config concurrency, got {}", args.concurrency.get()));
    }
    if args.username.as_deref() != Some("cli") || args.auth != AuthMode::Basic {
        return Err("Expected CLI username with config auth mode".to_owned());
    }
    Ok(())
}

#[test]
fn preset_fills_only_unset_load_fields() -> Result<(), String> {
    let config = parse_toml("preset = \"medium\"\nconcurrency = 3")?;
    let args = merged_args(&["--duration", "10s"], &config)?;
    if args.preset != Some(Preset::Medium) {
        return Err("Expected medium preset".to_owned());
    }
    if args.concurrency.get() != 3 || args.rate.get() != 50 {
        return Err(format!(
            "Unexpected load: {} / {}",
            args.concurrency.get(),
            args.rate.get()
        ));
    }
    if args.duration != Duration::from_secs(10) {
        return Err(format!("Expected CLI duration, got {:?}", args.duration));
    }

    let args = merged_args(&["--preset", "heavy"], &types::ConfigFile::default())?;
    if args.concurrency.get() != 100 || args.rate.get() != 200 || args.duration != Duration::from_secs(600) {
        return Err("Heavy preset not applied".to_owned());
    }
    Ok(())
}

#[test]
fn zero_values_in_config_are_rejected() -> Result<(), String> {
    for content in ["rate = 0", "concurrency = 0", "duration = 0", "max_pending = 0"] {
        let config = parse_toml(content)?;
        if merged_args(&[], &config).is_ok() {
            return Err(format!("Expected '{}' to be rejected", content));
        }
    }
    Ok(())
}

#[test]
fn unknown_method_in_config_is_rejected() -> Result<(), String> {
    let result = parse_toml("[[endpoints]]\nmethod = \"PATCH\"\npath = \"/x\"");
    if result.is_ok() {
        return Err("Expected PATCH to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let (_dir, path) = write_config("apistress.yaml", "base_url: x")?;
    if load_config_file(&path).is_ok() {
        return Err("Expected yaml to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn validation_catches_missing_pieces() -> Result<(), String> {
    let valid = ["-u", "http://localhost:8080", "-e", "GET /health"];
    let args = merged_args(&valid, &types::ConfigFile::default())?;
    let url = validate_args(&args).map_err(|err| err.to_string())?;
    if url.as_str() != "http://localhost:8080/" {
        return Err(format!("Unexpected url: {}", url));
    }

    let cases: [&[&str]; 3] = [
        &["-u", "http://localhost:8080"],
        &["-u", "ftp://localhost", "-e", "GET /health"],
        &["-u", "http://localhost", "-e", "GET /health", "-o", "out.json"],
    ];
    for argv in cases {
        let args = merged_args(argv, &types::ConfigFile::default())?;
        if validate_args(&args).is_ok() {
            return Err(format!("Expected {:?} to fail validation", argv));
        }
    }

    let mut args = merged_args(&["-e", "GET /health"], &types::ConfigFile::default())?;
    args.base_url = None;
    if validate_args(&args).is_ok() {
        return Err("Expected missing base url to fail".to_owned());
    }
    Ok(())
}

//! freeze-resource - freeze calendar resource for CD pipelines
//!
//! Reads a JSON request on stdin and writes a JSON response on stdout:
//! - `check` lists calendar revisions
//! - `in <destination>` fetches the calendar and fails (fuse) or waits
//!   (gate) while a freeze window is active
//! - `out <source>` does nothing
//!
//! Logs go to stderr. When installed as `check`, `in` or `out` the program
//! name selects the verb.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use freeze_api::{decode_request, CheckRequest, GetRequest, PutRequest, Request};
use freeze_core::{CancelHandle, Cancellation, Resource};
use freeze_git::GitSource;
use freeze_util::{parse_duration, parse_mock_time, Clock, OffsetClock, SystemClock, MOCK_TIME_ENV_VAR};
use serde::Serialize;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// freeze-resource - Deployment freeze gate for CD pipelines
#[derive(Parser, Debug)]
#[command(name = "freeze-resource")]
#[command(about = "Deployment freeze gate for CD pipelines", long_about = None)]
struct Args {
    #[command(subcommand)]
    verb: Verb,

    /// Log level (debug when the request asks for it)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Give up after this long, e.g. `30m` (or set FREEZE_TIMEOUT)
    #[arg(long, env = "FREEZE_TIMEOUT", global = true, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Evaluate against a clock starting at this RFC 3339 instant (debug builds only)
    #[arg(long, env = MOCK_TIME_ENV_VAR, global = true)]
    mock_time: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Verb {
    /// List calendar revisions, oldest first
    Check,

    /// Fetch the calendar into DESTINATION and apply the freeze mode
    In { destination: PathBuf },

    /// Publish nothing and echo the version
    Out { source: PathBuf },
}

/// Command line with the verb taken from the program name when installed
/// as `check`, `in` or `out`
fn command_line(mut argv: Vec<OsString>) -> Vec<OsString> {
    let verb = argv
        .first()
        .and_then(|program| Path::new(program).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| matches!(*name, "check" | "in" | "out"))
        .map(OsString::from);

    if let Some(verb) = verb {
        argv.insert(1, verb);
    }
    argv
}

/// Whether the raw request asks for debug output (`source.debug` or
/// `params.verbose`). Decoding errors are reported later, with logging up.
fn request_wants_debug(input: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(input) else {
        return false;
    };
    let flag = |pointer: &str| value.pointer(pointer).and_then(|v| v.as_bool()).unwrap_or(false);
    flag("/source/debug") || flag("/params/verbose")
}

fn init_logging(args: &Args, debug: bool) {
    let level = if debug { "debug" } else { args.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the response
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_clock(mock_time: Option<&str>) -> Result<Arc<dyn Clock>> {
    let Some(value) = mock_time else {
        return Ok(Arc::new(SystemClock));
    };

    if !cfg!(debug_assertions) {
        warn!("Mock time is only honored in debug builds, using the system clock");
        return Ok(Arc::new(SystemClock));
    }

    let start = parse_mock_time(value)
        .with_context(|| format!("Invalid mock time {:?}, expected RFC 3339", value))?;
    Ok(Arc::new(OffsetClock::starting_at(start)))
}

/// Stop the operation on SIGTERM or SIGINT
fn watch_signals(handle: CancelHandle) -> Result<()> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, stopping"),
            _ = sigint.recv() => info!("Received SIGINT, stopping"),
        }
        handle.cancel();
    });

    Ok(())
}

fn emit<T: Serialize>(response: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, response).context("Failed to write response")?;
    writeln!(stdout).context("Failed to write response")?;
    Ok(())
}

fn decode<R: Request>(input: &str) -> Result<R> {
    decode_request(input).context("Invalid request")
}

async fn run(args: Args, input: String) -> Result<()> {
    let clock = build_clock(args.mock_time.as_deref())?;

    let (handle, mut cancel) = Cancellation::new();
    if let Some(timeout) = args.timeout {
        cancel = cancel.with_timeout(timeout);
    }
    watch_signals(handle)?;

    let resource = Resource::new(Arc::new(GitSource::new()), clock).with_cancellation(cancel);

    match &args.verb {
        Verb::Check => {
            let request: CheckRequest = decode(&input)?;
            let versions = resource.check(&request).await?;
            info!(count = versions.len(), "Found versions");
            emit(&versions)
        }
        Verb::In { destination } => {
            let request: GetRequest = decode(&input)?;
            tokio::fs::create_dir_all(destination)
                .await
                .with_context(|| format!("Failed to create destination {:?}", destination))?;
            let response = resource.get(&request, destination).await?;
            emit(&response)
        }
        Verb::Out { source } => {
            let request: PutRequest = decode(&input)?;
            debug!(source = %source.display(), "Ignoring build output");
            let response = resource.put(&request).await?;
            emit(&response)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_from(command_line(std::env::args_os().collect()));

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read request from stdin")?;

    init_logging(&args, request_wants_debug(&input));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        verb = ?args.verb,
        "freeze-resource starting"
    );

    run(args, input).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_verb_from_program_name() {
        let line = command_line(argv(&["/opt/resource/in", "/tmp/build"]));
        assert_eq!(line, argv(&["/opt/resource/in", "in", "/tmp/build"]));

        let args = Args::parse_from(line);
        assert_eq!(args.verb, Verb::In { destination: "/tmp/build".into() });
    }

    #[test]
    fn test_verb_from_subcommand() {
        let line = command_line(argv(&["freeze-resource", "check"]));
        assert_eq!(line, argv(&["freeze-resource", "check"]));

        let args = Args::parse_from(line);
        assert_eq!(args.verb, Verb::Check);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_timeout_uses_duration_syntax() {
        let args = Args::parse_from(argv(&["freeze-resource", "check", "--timeout", "1h30m"]));
        assert_eq!(args.timeout, Some(Duration::from_secs(5400)));

        let err = Args::try_parse_from(argv(&["freeze-resource", "check", "--timeout", "soon"]));
        assert!(err.is_err());
    }

    #[test]
    fn test_request_wants_debug() {
        assert!(request_wants_debug(r#"{ "source": { "debug": true } }"#));
        assert!(request_wants_debug(r#"{ "source": {}, "params": { "verbose": true } }"#));
        assert!(!request_wants_debug(r#"{ "source": { "debug": "yes" } }"#));
        assert!(!request_wants_debug(r#"{ "source": {} }"#));
        assert!(!request_wants_debug("not json"));
    }

    #[test]
    fn test_mock_time_clock() {
        let clock = build_clock(Some("2023-08-11T19:00:00Z")).unwrap();
        let start = parse_mock_time("2023-08-11T19:00:00Z").unwrap();
        let now = clock.now();
        assert!(now >= start);
        assert!((now - start).num_seconds() < 60);

        assert!(build_clock(Some("yesterday")).is_err());
    }
}

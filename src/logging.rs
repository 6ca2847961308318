//! Tracing configuration and log routing.
//!
//! Console output goes to stderr so it shares the terminal with the progress bar, and a second
//! ANSI-free layer appends to a log file. `CORDINDEX_LOG_FILE` picks the file (`off` disables
//! it); the default is `logs/cordindex.log`.
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_NAME: &str = "cordindex.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber.
///
/// `RUST_LOG` controls filtering and defaults to `info`. Call once, before any other work.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    match file_writer(std::env::var("CORDINDEX_LOG_FILE").ok().as_deref()) {
        Some(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
}

fn file_writer(setting: Option<&str>) -> Option<NonBlocking> {
    let (non_blocking, guard) = match setting.map(str::trim) {
        Some("off") | Some("") => return None,
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| eprintln!("Failed to open log file {path}: {err}"))
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        None => {
            let dir = Path::new(DEFAULT_LOG_DIR);
            if let Err(err) = std::fs::create_dir_all(dir) {
                eprintln!("Failed to create {} directory: {err}", dir.display());
                return None;
            }
            tracing_appender::non_blocking(tracing_appender::rolling::never(
                dir,
                DEFAULT_LOG_NAME,
            ))
        }
    };
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}

//! Logger module
//!
//! Thin facade over `tracing`:
//! - Subscriber setup from the `[logging]` config section
//! - Server lifecycle and error logging
//! - Access logging with multiple formats, optionally to its own file

mod format;

pub use format::AccessLogEntry;

use std::fs::{File, OpenOptions};
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::auth::Identity;
use crate::config::Config;

/// Target used for access log lines
pub const ACCESS_TARGET: &str = "access";

/// Install the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` overrides
/// `logging.level` when set.
pub fn init(config: &Config) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let access_file = config
        .logging
        .access_log_file
        .as_deref()
        .map(open_log_file)
        .transpose()?;
    let split_access = access_file.is_some();

    let console = fmt::layer()
        .with_target(false)
        .with_filter(filter_fn(move |meta| {
            !(split_access && meta.target() == ACCESS_TARGET)
        }));

    let access = access_file.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(access)
        .try_init()
        .map_err(io::Error::other)
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Bike shop API started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Database: {}", config.database.path);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!("Access log: {path}");
    }
    tracing::info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_authenticated(identity: &Identity) {
    tracing::debug!(subject = %identity.subject, roles = ?identity.roles, "caller authenticated");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!("{signal} received, no longer accepting connections");
}

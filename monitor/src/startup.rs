//! Process-level wiring for the `spread-alert` binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use common::logger::{TraceId, run_span};
use common::time::now_ms;
use store::{JsonFileStore, StateStore};
use tracing::Instrument;

use crate::config::{AppConfig, ConfigError};
use crate::runner::{Monitor, sink_from_config};

/// Configuration, environment or wiring failed before any run started.
pub const EXIT_STARTUP_FAILURE: u8 = 1;

/// Load `explicit`, or `./.env` when none is given.
///
/// A missing default file is fine; a missing or malformed explicit one is not.
pub fn load_env_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, dotenvy::Error> {
    match explicit {
        Some(path) => dotenvy::from_path(path).map(|()| Some(path.to_path_buf())),
        None => Ok(dotenvy::dotenv().ok()),
    }
}

/// Exit status for the outcome of [`run`].
pub fn exit_status(outcome: &anyhow::Result<u8>) -> u8 {
    match outcome {
        Ok(code) => *code,
        Err(_) => EXIT_STARTUP_FAILURE,
    }
}

/// Build everything from `config` and run exactly once under a fresh trace id.
pub async fn run(config: Result<AppConfig, ConfigError>) -> anyhow::Result<u8> {
    let cfg = config.context("invalid configuration")?;
    tracing::info!(
        traded = ?cfg.traded_sources,
        reference = ?cfg.reference_sources,
        watched = ?cfg.watch_sources,
        state_dir = %cfg.state_dir.display(),
        "configuration loaded"
    );

    let http = market::http::build_client(cfg.source_timeout).context("building http client")?;
    let store: Arc<dyn StateStore> = Arc::new(JsonFileStore::new(&cfg.state_dir));
    let sink = sink_from_config(cfg.telegram.as_ref());

    let monitor = Monitor::from_config(&cfg, &http, store, sink);

    let trace_id = TraceId::new();
    let span = run_span("spread-alert", &trace_id);

    let report = monitor.run_once(now_ms()).instrument(span.clone()).await;
    span.record("alert", report.alerted());

    Ok(report.exit_code())
}

#![forbid(unsafe_code)]
//! Page analyzer: track sites by canonical URL and record point-in-time
//! checks of their status code, `<h1>`, `<title>` and meta description.

pub mod config;
pub mod web;
pub mod workflow;

use anyhow::{Context, Result};
use config::Settings;
use page_inspector::{InspectOptions, PageInspector, PageSnapshot};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use urls_sqlite::Store;
use web::{build_router, AppState, FlashKey};
use workflow::CheckWorkflow;

/// Install the fmt subscriber on stderr, filtered by `RUST_LOG` (default
/// `info`). Stdout stays free for command output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn inspect_options(settings: &Settings) -> InspectOptions {
    InspectOptions { timeout_ms: settings.fetch_timeout_ms, ..InspectOptions::default() }
}

/// One line of `inspect` output: the canonical URL and what a check would
/// record for it.
#[derive(Debug, Serialize)]
pub struct InspectReport<'a> {
    pub url: &'a str,
    #[serde(flatten)]
    pub snapshot: PageSnapshot,
}

/// Wire store, inspector and flash signing into the application state.
pub fn app_state(settings: &Settings) -> Result<AppState> {
    let store = Store::open(&settings.database_path)?;
    let inspector = PageInspector::new(&inspect_options(settings)).context("building http client")?;
    let flash = FlashKey::new(settings.require_secret()?.as_bytes())?;
    Ok(AppState::new(CheckWorkflow::new(store, inspector), flash))
}

pub async fn serve(settings: Settings) -> Result<()> {
    let app = build_router(app_state(&settings)?);
    let listener = TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("binding {}", settings.bind))?;
    info!(
        addr = %listener.local_addr()?,
        database = %settings.database_path.display(),
        "page analyzer listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

//! HTML front end: a landing form, the list of tracked sites and a detail
//! page per site with its check history.

pub mod flash;
mod handlers;
mod render;
mod request_tracing;

use crate::workflow::CheckWorkflow;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub use flash::{Flash, FlashKey, Level};

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<CheckWorkflow>,
    pub flash: FlashKey,
}

impl AppState {
    pub fn new(workflow: CheckWorkflow, flash: FlashKey) -> Self {
        AppState { workflow: Arc::new(workflow), flash }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/urls", get(handlers::list_urls).post(handlers::create_url))
        .route("/urls/:id", get(handlers::show_url))
        .route("/urls/:id/checks", post(handlers::run_check))
        .fallback(handlers::not_found)
        .layer(axum::middleware::from_fn(request_tracing::request_tracing_middleware))
        .with_state(state)
}

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use page_analyzer::workflow::CheckWorkflow;
use page_inspector::{InspectOptions, PageInspector};
use urls_sqlite::Store;

pub const FIXTURE_PAGE: &str = r#"<html><head><title>T</title><meta name="description" content="D"></head><body><h1>H</h1></body></html>"#;

pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    addr
}

/// A site whose root page is `html`.
pub async fn serve_page(html: &'static str) -> String {
    let addr = serve(Router::new().route("/", get(move || async move { Html(html) }))).await;
    format!("http://{addr}")
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let l = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    l.local_addr().expect("addr")
}

pub fn workflow(dir: &Path) -> CheckWorkflow {
    let store = Store::open(dir.join("analyzer.sqlite3")).expect("open store");
    let opts = InspectOptions { timeout_ms: 2_000, ..InspectOptions::default() };
    let inspector = PageInspector::new(&opts).expect("client");
    CheckWorkflow::new(store, inspector)
}

pub async fn check_count(store: &Store) -> i64 {
    store
        .call(|db| Ok(db.conn.query_row("SELECT COUNT(1) FROM url_checks", [], |r| r.get(0))?))
        .await
        .expect("count checks")
}

pub async fn url_count(store: &Store) -> i64 {
    store
        .call(|db| Ok(db.conn.query_row("SELECT COUNT(1) FROM urls", [], |r| r.get(0))?))
        .await
        .expect("count urls")
}

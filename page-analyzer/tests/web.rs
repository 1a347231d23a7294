mod support;

use std::net::SocketAddr;

use page_analyzer::web::{build_router, AppState, FlashKey};
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use support::{closed_addr, serve, serve_page, workflow, FIXTURE_PAGE};
use tempfile::TempDir;
use urls_sqlite::Store;

struct App {
    base: String,
    client: Client,
    store: Store,
    _dir: TempDir,
}

async fn start() -> App {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = AppState::new(workflow(dir.path()), FlashKey::new(b"web-test-secret").expect("key"));
    let store = state.workflow.store().clone();
    let addr: SocketAddr = serve(build_router(state)).await;
    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("client");
    App { base: format!("http://{addr}"), client, store, _dir: dir }
}

impl App {
    async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut req = self.client.get(format!("{}{path}", self.base));
        if let Some(c) = cookie {
            req = req.header(COOKIE, c);
        }
        req.send().await.expect("get")
    }

    async fn submit(&self, url: &str) -> Response {
        self.client
            .post(format!("{}/urls", self.base))
            .form(&[("url", url)])
            .send()
            .await
            .expect("post /urls")
    }

    async fn check(&self, id: &str) -> Response {
        self.client
            .post(format!("{}/urls/{id}/checks", self.base))
            .send()
            .await
            .expect("post checks")
    }
}

fn location(resp: &Response) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header")
        .to_string()
}

/// The `name=value` part of the flash cookie set by `resp`.
fn flash_cookie(resp: &Response) -> String {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("flash="))
        .and_then(|v| v.split(';').next())
        .expect("flash cookie")
        .to_string()
}

#[tokio::test]
async fn landing_page_has_the_form() {
    let app = start().await;
    let resp = app.get("/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body = resp.text().await.unwrap();
    assert!(body.contains(r#"<form action="/urls" method="post">"#));
    assert!(body.contains(r#"name="url""#));
}

#[tokio::test]
async fn submission_redirects_to_detail_with_one_shot_flash() {
    let app = start().await;

    let resp = app.submit("https://example.com/some/page").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/urls/1");
    let cookie = flash_cookie(&resp);

    let detail = app.get("/urls/1", Some(&cookie)).await;
    assert_eq!(detail.status(), StatusCode::OK);
    let cleared = detail
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cleared.contains("Max-Age=0"), "{cleared}");
    let body = detail.text().await.unwrap();
    assert!(body.contains("Page successfully added"));
    assert!(body.contains("Site: https://example.com"));

    // without the cookie the message is gone
    let again = app.get("/urls/1", None).await.text().await.unwrap();
    assert!(!again.contains("Page successfully added"));
}

#[tokio::test]
async fn duplicate_submission_points_at_existing_row() {
    let app = start().await;
    app.submit("https://example.com/a").await;
    let resp = app.submit("https://example.com/b").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/urls/1");

    let body = app.get("/urls/1", Some(&flash_cookie(&resp))).await.text().await.unwrap();
    assert!(body.contains("Page already exists"));

    let list = app.get("/urls", None).await.text().await.unwrap();
    assert_eq!(list.matches("href=\"/urls/").count(), 1);
}

#[tokio::test]
async fn invalid_submission_is_422_with_input_kept() {
    let app = start().await;
    let resp = app.submit("not a <url>").await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid URL"));
    assert!(body.contains(r#"value="not a &lt;url&gt;""#));

    let empty = app.submit("").await;
    assert_eq!(empty.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(empty.text().await.unwrap().contains("URL is required"));

    let list = app.get("/urls", None).await.text().await.unwrap();
    assert!(!list.contains("href=\"/urls/"));
}

#[tokio::test]
async fn unknown_pages_are_404() {
    let app = start().await;
    for path in ["/urls/999", "/urls/abc", "/urls/0", "/nowhere"] {
        assert_eq!(app.get(path, None).await.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn running_a_check_records_it_on_the_detail_page() {
    let app = start().await;
    let site = serve_page(FIXTURE_PAGE).await;
    app.submit(&site).await;

    let resp = app.check("1").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/urls/1");

    let body = app.get("/urls/1", Some(&flash_cookie(&resp))).await.text().await.unwrap();
    assert!(body.contains("Page successfully checked"));
    assert!(body.contains("<td>200</td><td>H</td><td>T</td><td>D</td>"));

    let list = app.get("/urls", None).await.text().await.unwrap();
    assert!(list.contains("<td>200</td>"));
}

#[tokio::test]
async fn failed_check_flashes_an_error_and_records_nothing() {
    let app = start().await;
    app.submit(&format!("http://{}", closed_addr())).await;

    let resp = app.check("1").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/urls/1");

    let body = app.get("/urls/1", Some(&flash_cookie(&resp))).await.text().await.unwrap();
    assert!(body.contains("An error occurred during the check"));
    assert!(body.contains("alert-danger"));
    assert!(!body.contains("<td>200</td>"));
}

#[tokio::test]
async fn check_of_unknown_site_goes_back_to_the_list() {
    let app = start().await;
    let resp = app.check("77").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/urls");

    let body = app.get("/urls", Some(&flash_cookie(&resp))).await.text().await.unwrap();
    assert!(body.contains("Site not found"));
}

#[tokio::test]
async fn forged_flash_cookie_is_ignored() {
    let app = start().await;
    let forged = "flash=eyJsZXZlbCI6InN1Y2Nlc3MiLCJtZXNzYWdlIjoiaGkifQ.AAAA";
    let resp = app.get("/", Some(forged)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cleared.starts_with("flash=;") && cleared.contains("Max-Age=0"), "{cleared}");
    assert!(!resp.text().await.unwrap().contains("alert"));

    let plain = app.get("/", None).await;
    assert!(plain.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn broken_store_renders_500() {
    let app = start().await;
    app.submit("https://example.com").await;
    app.store
        .call(|db| {
            db.conn.execute_batch("DROP TABLE url_checks")?;
            Ok(())
        })
        .await
        .expect("drop table");

    for path in ["/urls", "/urls/1"] {
        let resp = app.get(path, None).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{path}");
    }
}

#[tokio::test]
async fn listing_is_newest_first() {
    let app = start().await;
    app.submit("https://first.example").await;
    app.submit("https://second.example").await;
    let body = app.get("/urls", None).await.text().await.unwrap();
    let first = body.find("https://first.example").expect("first listed");
    let second = body.find("https://second.example").expect("second listed");
    assert!(second < first);
}

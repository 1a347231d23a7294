use crate::web::flash::{has_flash_cookie, set_flash_cookie, Flash, CLEAR_FLASH_COOKIE};
use crate::web::render;
use crate::web::AppState;
use crate::workflow::Outcome;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{error, warn};
use urls_sqlite::UrlId;

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitForm {
    #[serde(default)]
    url: String,
}

fn page(status: StatusCode, html: String, clear_flash: bool) -> Response {
    let mut resp = (status, Html(html)).into_response();
    if clear_flash {
        resp.headers_mut()
            .insert(SET_COOKIE, HeaderValue::from_static(CLEAR_FLASH_COOKIE));
    }
    resp
}

fn not_found_response() -> Response {
    page(StatusCode::NOT_FOUND, render::not_found_page(), false)
}

fn server_error_response() -> Response {
    page(StatusCode::INTERNAL_SERVER_ERROR, render::server_error_page(), false)
}

fn redirect_with_flash(state: &AppState, to: &str, flash: &Flash) -> Response {
    let mut resp = Redirect::to(to).into_response();
    match state.flash.seal(flash) {
        Ok(token) => match HeaderValue::from_str(&set_flash_cookie(&token)) {
            Ok(v) => {
                resp.headers_mut().insert(SET_COOKIE, v);
            }
            Err(e) => warn!(error = %e, "flash cookie is not a valid header"),
        },
        Err(e) => warn!(error = %e, "sealing flash failed"),
    }
    resp
}

// Non-numeric ids are treated like unknown ones.
fn parse_id(raw: &str) -> Option<UrlId> {
    raw.parse::<UrlId>().ok().filter(|id| *id > 0)
}

pub(crate) async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let flash = state.flash.take(&headers);
    page(StatusCode::OK, render::index_page(flash.as_ref(), "", None), has_flash_cookie(&headers))
}

pub(crate) async fn list_urls(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.workflow.store().call(|db| db.list_urls()).await {
        Ok(urls) => {
            let flash = state.flash.take(&headers);
            page(StatusCode::OK, render::urls_page(flash.as_ref(), &urls), has_flash_cookie(&headers))
        }
        Err(e) => {
            error!(error = ?e, "listing urls failed");
            server_error_response()
        }
    }
}

pub(crate) async fn show_url(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return not_found_response();
    };
    let found = state
        .workflow
        .store()
        .call(move |db| {
            let Some(url) = db.find_url(id)? else {
                return Ok(None);
            };
            let checks = db.checks_for(id)?;
            Ok(Some((url, checks)))
        })
        .await;
    match found {
        Ok(Some((url, checks))) => {
            let flash = state.flash.take(&headers);
            page(StatusCode::OK, render::url_page(flash.as_ref(), &url, &checks), has_flash_cookie(&headers))
        }
        Ok(None) => not_found_response(),
        Err(e) => {
            error!(error = ?e, url_id = id, "loading url detail failed");
            server_error_response()
        }
    }
}

pub(crate) async fn create_url(State(state): State<AppState>, Form(form): Form<SubmitForm>) -> Response {
    let outcome = state.workflow.submit(&form.url).await;
    let to = match &outcome {
        Outcome::Rejected { input, error } => {
            let html = render::index_page(None, input, Some(&error.to_string()));
            return page(StatusCode::UNPROCESSABLE_ENTITY, html, false);
        }
        Outcome::Created(id) | Outcome::AlreadyExists(id) => format!("/urls/{id}"),
        _ => "/".to_string(),
    };
    redirect_with_flash(&state, &to, &Flash::from_outcome(&outcome))
}

pub(crate) async fn run_check(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return not_found_response();
    };
    let outcome = state.workflow.run_check(id).await;
    let to = match &outcome {
        Outcome::NotFound(_) => "/urls".to_string(),
        _ => format!("/urls/{id}"),
    };
    redirect_with_flash(&state, &to, &Flash::from_outcome(&outcome))
}

pub(crate) async fn not_found() -> Response {
    not_found_response()
}

//! One-shot page inspection: GET a canonical URL and pull out the status
//! code, first `<h1>`, `<title>` and meta description.

mod extract;

pub use extract::{extract, Extracted};

use analyzer_core::CanonicalUrl;
use reqwest::{redirect::Policy, Client};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct InspectOptions {
    pub timeout_ms: u64,
    pub redirects: usize,
    pub user_agent: String,
}

impl Default for InspectOptions {
    fn default() -> Self {
        InspectOptions {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            redirects: DEFAULT_REDIRECTS,
            user_agent: format!("page-analyzer/{}", analyzer_core::version()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    pub status_code: u16,
    pub h1: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// No response at all: DNS, connect, TLS or timeout.
    #[error("could not reach {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    BadStatus { url: String, status: u16 },
    #[error("failed to read the body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// The status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::BadStatus { status, .. } => Some(*status),
            FetchError::Unreachable { .. } | FetchError::Body { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageInspector {
    client: Client,
}

impl PageInspector {
    pub fn new(opts: &InspectOptions) -> reqwest::Result<Self> {
        let client = Client::builder()
            .redirect(Policy::limited(opts.redirects))
            .timeout(Duration::from_millis(opts.timeout_ms))
            .user_agent(opts.user_agent.clone())
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .build()?;
        Ok(PageInspector { client })
    }

    /// Fetch `url` once. Any non-2xx answer is a [`FetchError::BadStatus`]
    /// and the body is not looked at.
    pub async fn inspect(&self, url: &CanonicalUrl) -> Result<PageSnapshot, FetchError> {
        let resp = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Unreachable { url: url.to_string(), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus { url: url.to_string(), status: status.as_u16() });
        }

        let body = resp
            .text()
            .await
            .map_err(|source| FetchError::Body { url: url.to_string(), source })?;
        tracing::debug!(url = %url, status = status.as_u16(), bytes = body.len(), "fetched page");

        let found = extract(&body);
        Ok(PageSnapshot {
            status_code: status.as_u16(),
            h1: found.h1,
            title: found.title,
            description: found.description,
        })
    }
}

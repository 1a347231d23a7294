use analyzer_core::{normalize, ValidationError};
use page_inspector::{FetchError, PageInspector};
use time::OffsetDateTime;
use tracing::{error, info, warn};
use urls_sqlite::{CheckId, NewCheck, Store, UrlId, UrlInsert};

/// What a workflow step ended with. Carries enough to tell the user what
/// happened; rendering it is up to the caller.
#[derive(Debug)]
pub enum Outcome {
    Rejected { input: String, error: ValidationError },
    Created(UrlId),
    AlreadyExists(UrlId),
    CheckSucceeded { url_id: UrlId, check_id: CheckId },
    CheckFailed { url_id: UrlId, error: FetchError },
    NotFound(UrlId),
    StorageError { url_id: Option<UrlId>, error: anyhow::Error },
}

impl Outcome {
    pub fn url_id(&self) -> Option<UrlId> {
        match self {
            Outcome::Created(id) | Outcome::AlreadyExists(id) | Outcome::NotFound(id) => Some(*id),
            Outcome::CheckSucceeded { url_id, .. } | Outcome::CheckFailed { url_id, .. } => Some(*url_id),
            Outcome::StorageError { url_id, .. } => *url_id,
            Outcome::Rejected { .. } => None,
        }
    }
}

pub struct CheckWorkflow {
    store: Store,
    inspector: PageInspector,
}

impl CheckWorkflow {
    pub fn new(store: Store, inspector: PageInspector) -> Self {
        CheckWorkflow { store, inspector }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Normalize `raw` and start tracking it, or point at the existing row
    /// for the same canonical URL.
    pub async fn submit(&self, raw: &str) -> Outcome {
        let canonical = match normalize(raw) {
            Ok(c) => c,
            Err(error) => {
                info!(%error, "rejected url submission");
                return Outcome::Rejected { input: raw.trim().to_string(), error };
            }
        };

        let name = canonical.into_string();
        let stored = {
            let name = name.clone();
            self.store
                .call(move |db| db.insert_url_or_find(&name, OffsetDateTime::now_utc()))
                .await
        };
        match stored {
            Ok(UrlInsert::Created(id)) => {
                info!(url_id = id, %name, "tracking new url");
                Outcome::Created(id)
            }
            Ok(UrlInsert::Existing(id)) => {
                info!(url_id = id, %name, "url already tracked");
                Outcome::AlreadyExists(id)
            }
            Err(error) => {
                error!(error = ?error, %name, "storing url failed");
                Outcome::StorageError { url_id: None, error }
            }
        }
    }

    /// Fetch a tracked URL and record what was found. Nothing is written
    /// unless the fetch produced a successful response.
    pub async fn run_check(&self, url_id: UrlId) -> Outcome {
        let url = match self.store.call(move |db| db.find_url(url_id)).await {
            Ok(Some(url)) => url,
            Ok(None) => return Outcome::NotFound(url_id),
            Err(error) => {
                error!(error = ?error, url_id, "loading url failed");
                return Outcome::StorageError { url_id: Some(url_id), error };
            }
        };

        // names are stored canonical; re-parsing only guards against a hand-edited row
        let canonical = match normalize(&url.name) {
            Ok(c) => c,
            Err(e) => {
                let error = anyhow::anyhow!("stored url {:?} is not canonical: {e}", url.name);
                error!(error = ?error, url_id, "loading url failed");
                return Outcome::StorageError { url_id: Some(url_id), error };
            }
        };

        let snapshot = match self.inspector.inspect(&canonical).await {
            Ok(s) => s,
            Err(error) => {
                warn!(%error, url_id, "check failed");
                return Outcome::CheckFailed { url_id, error };
            }
        };

        let check = NewCheck {
            status_code: Some(snapshot.status_code),
            h1: snapshot.h1,
            title: snapshot.title,
            description: snapshot.description,
            created_at: OffsetDateTime::now_utc(),
        };
        match self.store.call(move |db| db.add_check(url_id, &check)).await {
            Ok(check_id) => {
                info!(url_id, check_id, status = snapshot.status_code, "check recorded");
                Outcome::CheckSucceeded { url_id, check_id }
            }
            Err(error) => {
                error!(error = ?error, url_id, "storing check failed");
                Outcome::StorageError { url_id: Some(url_id), error }
            }
        }
    }
}

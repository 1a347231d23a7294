use crate::Db;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to the database file. Every [`Store::call`] opens its own
/// connection on the blocking pool and closes it when the closure returns,
/// whether it succeeded or not.
#[derive(Clone, Debug)]
pub struct Store {
    path: Arc<PathBuf>,
}

impl Store {
    /// Create the database if needed, migrate it, and return a handle.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        Db::open_or_create(&path)?;
        Ok(Store { path: Arc::new(path) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Db) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || {
            let mut db = Db::open(path.as_path())?;
            f(&mut db)
        })
        .await?
    }
}

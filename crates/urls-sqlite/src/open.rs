use crate::schema::MIG_0001_INIT;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Concurrent writers wait this long for the lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Open the database at `path`, creating it and applying migrations.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        apply_pragmas(&conn)?;
        let db = Db { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an already migrated database; used for per-request connections.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        apply_pragmas(&conn)?;
        Ok(Db { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_pragmas(&conn)?;
        let db = Db { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        // naive: if urls table doesn't exist, apply 0001
        if !self.table_exists("urls")? {
            self.conn
                .execute_batch(MIG_0001_INIT)
                .context("applying migration 0001")?;
            tracing::info!("applied schema migration 0001");
        }
        Ok(())
    }
}

fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}

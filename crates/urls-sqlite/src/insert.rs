use crate::models::{to_ms, CheckId, NewCheck, UrlId, UrlInsert};
use crate::Db;
use analyzer_core::{truncate_chars, FIELD_MAX_CHARS};
use anyhow::Result;
use rusqlite::{ffi, params, TransactionBehavior};
use time::OffsetDateTime;

impl Db {
    /// Insert a tracked URL, or return the id of the row that already owns
    /// `name`. Conflicts are detected by the UNIQUE constraint, not a pre-check.
    pub fn insert_url_or_find(&mut self, name: &str, created_at: OffsetDateTime) -> Result<UrlInsert> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            "INSERT INTO urls(name, created_at) VALUES (?,?)",
            params![name, to_ms(created_at)],
        );
        match inserted {
            Ok(_) => {
                let id = tx.last_insert_rowid();
                tx.commit()?;
                Ok(UrlInsert::Created(id))
            }
            Err(e) if is_unique_violation(&e) => {
                tx.rollback()?;
                let id: UrlId = self.conn.query_row(
                    "SELECT id FROM urls WHERE name=?",
                    [name],
                    |r| r.get(0),
                )?;
                Ok(UrlInsert::Existing(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn add_check(&mut self, url_id: UrlId, check: &NewCheck) -> Result<CheckId> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO url_checks(url_id,status_code,h1,title,description,created_at) VALUES (?,?,?,?,?,?)",
            params![
                url_id,
                check.status_code.map(i64::from),
                fit(check.h1.as_deref()),
                fit(check.title.as_deref()),
                fit(check.description.as_deref()),
                to_ms(check.created_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }
}

fn fit(field: Option<&str>) -> Option<&str> {
    field.map(|s| truncate_chars(s, FIELD_MAX_CHARS))
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _) if f.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

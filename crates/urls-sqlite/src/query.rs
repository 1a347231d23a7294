use crate::models::{from_ms, status_from_sql, TrackedUrl, UrlCheck, UrlId, UrlListing};
use crate::Db;
use anyhow::Result;
use rusqlite::{OptionalExtension, Row};

impl Db {
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let cnt: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name=?",
            [name],
            |r| r.get(0),
        )?;
        Ok(cnt > 0)
    }

    pub fn find_url(&self, id: UrlId) -> Result<Option<TrackedUrl>> {
        let url = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM urls WHERE id=?",
                [id],
                tracked_url,
            )
            .optional()?;
        Ok(url)
    }

    pub fn find_url_by_name(&self, name: &str) -> Result<Option<TrackedUrl>> {
        let url = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM urls WHERE name=?",
                [name],
                tracked_url,
            )
            .optional()?;
        Ok(url)
    }

    /// Checks of one URL, most recent first.
    pub fn checks_for(&self, url_id: UrlId) -> Result<Vec<UrlCheck>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url_id, status_code, h1, title, description, created_at
             FROM url_checks WHERE url_id=?
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([url_id], |r| {
            Ok(UrlCheck {
                id: r.get(0)?,
                url_id: r.get(1)?,
                status_code: status_from_sql(r.get(2)?),
                h1: r.get(3)?,
                title: r.get(4)?,
                description: r.get(5)?,
                created_at: from_ms(r.get(6)?)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Every tracked URL once, newest first, with its latest check.
    pub fn list_urls(&self) -> Result<Vec<UrlListing>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.name, u.created_at, c.created_at, c.status_code
             FROM urls u
             LEFT JOIN url_checks c ON c.id = (
               SELECT id FROM url_checks
               WHERE url_id = u.id
               ORDER BY created_at DESC, id DESC
               LIMIT 1
             )
             ORDER BY u.created_at DESC, u.id DESC",
        )?;
        let rows = stmt.query_map([], |r| {
            let last_check_at: Option<i64> = r.get(3)?;
            Ok(UrlListing {
                id: r.get(0)?,
                name: r.get(1)?,
                created_at: from_ms(r.get(2)?)?,
                last_check_at: last_check_at.map(from_ms).transpose()?,
                last_status: status_from_sql(r.get(4)?),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn tracked_url(r: &Row<'_>) -> rusqlite::Result<TrackedUrl> {
    Ok(TrackedUrl {
        id: r.get(0)?,
        name: r.get(1)?,
        created_at: from_ms(r.get(2)?)?,
    })
}

use time::OffsetDateTime;

pub type UrlId = i64;
pub type CheckId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedUrl {
    pub id: UrlId,
    pub name: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCheck {
    pub id: CheckId,
    pub url_id: UrlId,
    pub status_code: Option<u16>,
    pub h1: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Fields of a check about to be written. Text is truncated on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheck {
    pub status_code: Option<u16>,
    pub h1: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

/// One row of the `/urls` listing: a URL and its most recent check, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlListing {
    pub id: UrlId,
    pub name: String,
    pub created_at: OffsetDateTime,
    pub last_check_at: Option<OffsetDateTime>,
    pub last_status: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlInsert {
    Created(UrlId),
    Existing(UrlId),
}

impl UrlInsert {
    pub fn id(self) -> UrlId {
        match self {
            UrlInsert::Created(id) | UrlInsert::Existing(id) => id,
        }
    }
}

pub(crate) fn to_ms(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub(crate) fn from_ms(ms: i64) -> rusqlite::Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Integer, Box::new(e))
    })
}

pub(crate) fn status_from_sql(raw: Option<i64>) -> Option<u16> {
    raw.and_then(|v| u16::try_from(v).ok())
}

pub const MIG_0001_INIT: &str = r#"
BEGIN;

CREATE TABLE urls (
  id              INTEGER PRIMARY KEY AUTOINCREMENT,
  name            TEXT NOT NULL UNIQUE CHECK (length(name) BETWEEN 1 AND 255),
  created_at      INTEGER NOT NULL
);

CREATE TABLE url_checks (
  id              INTEGER PRIMARY KEY AUTOINCREMENT,
  url_id          INTEGER NOT NULL REFERENCES urls(id) ON DELETE CASCADE,
  status_code     INTEGER CHECK (status_code BETWEEN 100 AND 999),
  h1              TEXT CHECK (length(h1) <= 255),
  title           TEXT CHECK (length(title) <= 255),
  description     TEXT CHECK (length(description) <= 255),
  created_at      INTEGER NOT NULL
);

CREATE INDEX idx_urls_created ON urls(created_at);
CREATE INDEX idx_checks_url_created ON url_checks(url_id, created_at);

COMMIT;
"#
;

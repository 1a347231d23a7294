use anyhow::{bail, Context, Result};
use page_inspector::DEFAULT_TIMEOUT_MS;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "page-analyzer.yaml";
pub const DEFAULT_DATABASE: &str = "page_analyzer.sqlite3";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Optional YAML file; every key may be overridden from the environment.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub secret_key: Option<String>,
    pub bind: Option<String>,
    pub fetch_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub secret_key: Option<String>,
    pub bind: String,
    pub fetch_timeout_ms: u64,
}

/// Read `path`, or `./page-analyzer.yaml` when no path is given and the file
/// exists. An explicitly named file must exist.
pub fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG_FILE);
            if p.exists() { p.to_path_buf() } else { return Ok(FileConfig::default()); }
        }
    };
    let s = fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_yaml::from_str(&s).with_context(|| format!("parsing config {}", path.display()))
}

impl Settings {
    /// File config plus process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = load_config(config_path)?;
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge `file` with variables looked up through `env`; env wins.
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = env("DATABASE_URL")
            .or(file.database_url)
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let fetch_timeout_ms = match env("FETCH_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("FETCH_TIMEOUT_MS is not a number: {raw}"))?,
            None => file.fetch_timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        };
        Ok(Settings {
            database_path: database_path(&database_url)?,
            secret_key: env("SECRET_KEY").or(file.secret_key).filter(|s| !s.is_empty()),
            bind: env("BIND_ADDR").or(file.bind).unwrap_or_else(|| DEFAULT_BIND.to_string()),
            fetch_timeout_ms,
        })
    }

    pub fn require_secret(&self) -> Result<&str> {
        match self.secret_key.as_deref() {
            Some(s) => Ok(s),
            None => bail!("SECRET_KEY must be set to sign flash messages"),
        }
    }
}

/// Map a `DATABASE_URL` onto a SQLite file path. Accepts `sqlite://path`,
/// `sqlite:path` or a bare path.
pub fn database_path(url: &str) -> Result<PathBuf> {
    let url = url.trim();
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    if path.contains("://") {
        bail!("unsupported DATABASE_URL {url:?}: only sqlite databases are supported");
    }
    if path.is_empty() {
        bail!("DATABASE_URL names no database file");
    }
    Ok(PathBuf::from(path))
}

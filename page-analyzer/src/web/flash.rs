use crate::workflow::Outcome;
use anyhow::{anyhow, bail, Result};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const FLASH_COOKIE: &str = "flash";
pub const CLEAR_FLASH_COOKIE: &str = "flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax";
const MAX_TOKEN_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Danger,
}

impl Level {
    pub fn css_class(self) -> &'static str {
        match self {
            Level::Success => "alert-success",
            Level::Info => "alert-info",
            Level::Danger => "alert-danger",
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Flash { level, message: message.into() }
    }

    pub fn from_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Rejected { error, .. } => Flash::new(Level::Danger, error.to_string()),
            Outcome::Created(_) => Flash::new(Level::Success, "Page successfully added"),
            Outcome::AlreadyExists(_) => Flash::new(Level::Info, "Page already exists"),
            Outcome::CheckSucceeded { .. } => Flash::new(Level::Success, "Page successfully checked"),
            Outcome::CheckFailed { .. } => Flash::new(Level::Danger, "An error occurred during the check"),
            Outcome::NotFound(_) => Flash::new(Level::Danger, "Site not found"),
            Outcome::StorageError { .. } => {
                Flash::new(Level::Danger, "Something went wrong while saving, please try again")
            }
        }
    }
}

/// Signs flash cookies so a client cannot forge messages.
/// Token layout: `base64url(json) "." base64url(hmac_sha256(json_part))`.
#[derive(Clone)]
pub struct FlashKey {
    mac: HmacSha256,
}

impl FlashKey {
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            bail!("flash signing secret is empty");
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|e| anyhow!(e.to_string()))?;
        Ok(FlashKey { mac })
    }

    pub fn seal(&self, flash: &Flash) -> serde_json::Result<String> {
        let payload_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(flash)?);
        let mut mac = self.mac.clone();
        mac.update(payload_part.as_bytes());
        let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{payload_part}.{sig_part}"))
    }

    pub fn open(&self, token: &str) -> Option<Flash> {
        if token.len() > MAX_TOKEN_LEN {
            return None;
        }
        let (payload_part, sig_part) = token.split_once('.')?;
        let sig = URL_SAFE_NO_PAD.decode(sig_part).ok()?;
        let mut mac = self.mac.clone();
        mac.update(payload_part.as_bytes());
        mac.verify_slice(&sig).ok()?;
        let payload = URL_SAFE_NO_PAD.decode(payload_part).ok()?;
        serde_json::from_slice(&payload).ok()
    }

    /// The verified flash carried by the request's cookies, if any.
    pub fn take(&self, headers: &HeaderMap) -> Option<Flash> {
        flash_cookie(headers).and_then(|value| self.open(value))
    }
}

/// Whether the request sent a flash cookie at all, verified or not.
pub fn has_flash_cookie(headers: &HeaderMap) -> bool {
    flash_cookie(headers).is_some()
}

fn flash_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .map(|(_, value)| value)
}

pub fn set_flash_cookie(token: &str) -> String {
    format!("{FLASH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

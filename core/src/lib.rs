//! Core types shared by the page analyzer crates: canonical URLs and the
//! column-width rules the store enforces.

mod normalize;

pub use normalize::{normalize, CanonicalUrl, ValidationError, URL_MAX_CHARS};

/// Widest string any persisted text column accepts.
pub const FIELD_MAX_CHARS: usize = 255;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Cut `s` to at most `max` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

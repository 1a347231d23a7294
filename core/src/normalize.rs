use std::fmt;

use thiserror::Error;
use url::{Host, Url};

/// Longest submission accepted, counted in characters of the trimmed input
/// and again on the canonical form.
pub const URL_MAX_CHARS: usize = 255;

/// DNS limit on a single label, applied after punycode conversion.
const LABEL_MAX_BYTES: usize = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL is required")]
    EmptyInput,
    #[error("URL exceeds 255 characters")]
    TooLong { len: usize },
    #[error("Invalid URL")]
    Malformed,
}

/// A URL reduced to `scheme://host[:port]`, the identity of a tracked site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a submitted URL and keep only its scheme and network location.
///
/// Path, query, fragment and credentials are dropped. A non-default port is
/// part of the network location and survives; the default port for the
/// scheme is elided by the parser.
pub fn normalize(raw: &str) -> Result<CanonicalUrl, ValidationError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    let len = input.chars().count();
    if len > URL_MAX_CHARS {
        return Err(ValidationError::TooLong { len });
    }

    let parsed = Url::parse(input).map_err(|_| ValidationError::Malformed)?;
    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ValidationError::Malformed);
    }
    let host = match parsed.host() {
        Some(Host::Domain(d)) if is_dotted_domain(d) => d.to_string(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => format!("[{ip}]"),
        _ => return Err(ValidationError::Malformed),
    };

    let canonical = match parsed.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    };
    // punycode can make the canonical form longer than what was typed
    let len = canonical.chars().count();
    if len > URL_MAX_CHARS {
        return Err(ValidationError::TooLong { len });
    }
    Ok(CanonicalUrl(canonical))
}

// The parser has already lowercased and punycoded the host.
fn is_dotted_domain(domain: &str) -> bool {
    let mut labels = 0;
    for label in domain.split('.') {
        if label.is_empty() || label.len() > LABEL_MAX_BYTES {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return false;
        }
        labels += 1;
    }
    labels >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(raw: &str) -> String {
        normalize(raw).map(CanonicalUrl::into_string).unwrap()
    }

    #[test]
    fn keeps_scheme_and_host_only() {
        assert_eq!(canon("https://example.com/a/b?q=1#frag"), "https://example.com");
        assert_eq!(canon("http://example.com"), "http://example.com");
        assert_eq!(canon("  https://sub.example.org/path  "), "https://sub.example.org");
    }

    #[test]
    fn lowercases_host_and_scheme() {
        assert_eq!(canon("HTTPS://Example.COM/Path"), "https://example.com");
    }

    #[test]
    fn keeps_explicit_port_and_drops_default_port() {
        assert_eq!(canon("http://example.com:8080/x"), "http://example.com:8080");
        assert_eq!(canon("http://example.com:80/x"), "http://example.com");
        assert_eq!(canon("https://example.com:443"), "https://example.com");
    }

    #[test]
    fn drops_credentials() {
        assert_eq!(canon("https://user:pw@example.com/"), "https://example.com");
    }

    #[test]
    fn accepts_ip_hosts() {
        assert_eq!(canon("http://127.0.0.1:3000/health"), "http://127.0.0.1:3000");
        assert_eq!(canon("http://[::1]/"), "http://[::1]");
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(normalize(""), Err(ValidationError::EmptyInput));
        assert_eq!(normalize("   \t"), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn rejects_overlong_input_before_parsing() {
        let raw = format!("https://example.com/{}", "a".repeat(URL_MAX_CHARS));
        assert!(matches!(normalize(&raw), Err(ValidationError::TooLong { .. })));

        let junk = "x".repeat(URL_MAX_CHARS + 1);
        assert_eq!(
            normalize(&junk),
            Err(ValidationError::TooLong { len: URL_MAX_CHARS + 1 })
        );
    }

    #[test]
    fn accepts_input_at_the_limit() {
        let prefix = "https://example.com/";
        let raw = format!("{prefix}{}", "a".repeat(URL_MAX_CHARS - prefix.len()));
        assert_eq!(raw.chars().count(), URL_MAX_CHARS);
        assert_eq!(canon(&raw), "https://example.com");
    }

    #[test]
    fn rejects_labels_longer_than_dns_allows() {
        let ok = format!("https://{}.com", "a".repeat(LABEL_MAX_BYTES));
        assert!(normalize(&ok).is_ok());
        let long = format!("https://{}.com", "a".repeat(LABEL_MAX_BYTES + 1));
        assert_eq!(normalize(&long), Err(ValidationError::Malformed));
    }

    #[test]
    fn rejects_idn_host_that_grows_past_the_limit() {
        // every "ü." becomes "xn--tda." once converted
        let raw = format!("https://{}com", "ü.".repeat(120));
        assert!(raw.chars().count() <= URL_MAX_CHARS);
        match normalize(&raw) {
            Err(ValidationError::TooLong { len }) => assert!(len > URL_MAX_CHARS),
            other => panic!("expected TooLong, got {other:?}"),
        }
    }

    #[test]
    fn idn_host_is_stored_as_punycode() {
        assert_eq!(canon("https://münchen.de/"), "https://xn--mnchen-3ya.de");
    }

    #[test]
    fn rejects_missing_scheme_or_host() {
        for raw in [
            "example.com",
            "www.example.com/path",
            "http://",
            "https:///path",
            "mailto:someone@example.com",
            "ftp://example.com",
            "http://localhost",
            "http://exa mple.com",
            "http://-bad-.com",
            "http://example..com",
            "not a url",
        ] {
            assert_eq!(normalize(raw), Err(ValidationError::Malformed), "{raw}");
        }
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert_eq!(ValidationError::EmptyInput.to_string(), "URL is required");
        assert_eq!(
            ValidationError::TooLong { len: 300 }.to_string(),
            "URL exceeds 255 characters"
        );
        assert_eq!(ValidationError::Malformed.to_string(), "Invalid URL");
    }
}

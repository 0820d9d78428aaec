//! Source identifier validation.
//!
//! Included/excluded sources may be bare domains, http(s) URLs, or
//! `provider/dataset-name` tokens. Validation collects every offending entry
//! so callers can report all problems at once.

use regex::Regex;
use std::sync::LazyLock;

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid domain regex")
});

static DATASET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+/[A-Za-z0-9_-]+$").expect("valid dataset regex"));

/// Country codes accepted by the `country_code` parameter.
pub const SUPPORTED_COUNTRY_CODES: [&str; 37] = [
    "ALL", "AR", "AT", "AU", "BE", "BR", "CA", "CH", "CL", "CN", "DE", "DK", "ES", "FI", "FR",
    "GB", "HK", "ID", "IN", "IT", "JP", "KR", "MX", "MY", "NL", "NO", "NZ", "PH", "PL", "PT",
    "RU", "SA", "SE", "TR", "TW", "US", "ZA",
];

/// Check a single source identifier.
pub fn is_valid_source(source: &str) -> bool {
    DOMAIN_RE.is_match(source) || is_http_url(source) || DATASET_RE.is_match(source)
}

fn is_http_url(s: &str) -> bool {
    match url::Url::parse(s) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.has_host(),
        Err(_) => false,
    }
}

/// Validate a list of source identifiers.
///
/// Whitespace-only entries are treated as absent and filtered rather than
/// rejected. Returns `(valid, offending)` where `offending` holds the
/// complete set of invalid entries, not just the first.
pub fn validate_sources<S: AsRef<str>>(sources: &[S]) -> (bool, Vec<String>) {
    let mut invalid = Vec::new();
    for raw in sources {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            continue;
        }
        if !is_valid_source(s) {
            invalid.push(s.to_string());
        }
    }
    (invalid.is_empty(), invalid)
}

/// Build the human-readable message for invalid sources.
pub fn format_validation_error(invalid: &[String]) -> String {
    format!(
        "Invalid source(s): {}. Sources must be a domain (e.g. 'example.com'), \
         a URL (e.g. 'https://example.com/page'), or a dataset name \
         (e.g. 'provider/dataset-name')",
        invalid.join(", ")
    )
}

/// Case-insensitive country code check.
pub fn is_supported_country_code(code: &str) -> bool {
    let up = code.trim().to_ascii_uppercase();
    SUPPORTED_COUNTRY_CODES.contains(&up.as_str())
}

/// Error message for an unsupported country code.
pub fn country_code_error() -> String {
    format!(
        "Invalid country_code. Must be one of: {}",
        SUPPORTED_COUNTRY_CODES.join(", ")
    )
}

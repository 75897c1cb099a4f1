//! src/url.rs
//!
//! Purpose (component C1 of the scan engine):
//!   - Normalize an arbitrary user-supplied string into an absolute
//!     `http://`/`https://` URL.
//!   - Format byte counts in human-readable binary units.
//!   - Extract the filesystem-safe `host[_port]` slug used for log file
//!     names.
//!
//! Notes:
//!   - Normalization mirrors the original implementation's
//!     `urllib.parse.urlparse`/`urlunparse` round trip: if the input lacks
//!     a scheme, any leading `/` is stripped and `http://` is prefixed,
//!     then the whole thing is parsed and re-serialized through the `url`
//!     crate so the output is always a canonical absolute URL.

use crate::error::DirhoundError;
use url::Url;

/// Normalize an input string into an absolute, re-serialized URL.
///
/// If the input does not already start with `http://` or `https://`, any
/// leading `/` is stripped and `http://` is prefixed before parsing. The
/// result is idempotent: `normalize_url(normalize_url(u)?)? == normalize_url(u)?`.
///
/// Errors:
///   - `DirhoundError::InvalidBaseUrl` if the (possibly prefixed) string
///     does not parse as a URL, or parses with a non-http(s) scheme.
pub fn normalize_url(input: &str) -> Result<String, DirhoundError> {
    let trimmed = input.trim();

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed.trim_start_matches('/'))
    };

    let parsed = Url::parse(&candidate).map_err(|_| DirhoundError::InvalidBaseUrl(input.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        _ => Err(DirhoundError::InvalidBaseUrl(input.to_string())),
    }
}

/// Strip a single trailing `/` from an otherwise-normalized URL, so it can
/// be used as a `Target::base_url` per the data model (§3: "no trailing
/// slash"). Leaves a bare `scheme://host` (which `Url` always serializes
/// with a trailing `/`) as `scheme://host` with the slash removed.
pub fn strip_trailing_slash(normalized: &str) -> String {
    match normalized.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => normalized.to_string(),
    }
}

/// Extract the `host[_port]` slug used in log file names: the URL's
/// authority, lowercased, with any `:` replaced by `_`.
///
/// Grounded on the original's
/// `urlparse(self.target_url).netloc.replace(':', '_')`.
pub fn host_port_slug(absolute_url: &str) -> String {
    match Url::parse(absolute_url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("unknown");
            match parsed.port() {
                Some(port) => format!("{host}_{port}").to_lowercase(),
                None => host.to_lowercase(),
            }
        }
        Err(_) => "unknown".to_string(),
    }
}

const BINARY_UNITS: [&str; 9] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// Format a byte count using binary prefixes (1024-based), one decimal
/// place, e.g. `1536` -> `"1.5KiB"`.
///
/// Grounded on the original's `sizeof_fmt`.
pub fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in &BINARY_UNITS[..BINARY_UNITS.len() - 1] {
        if value.abs() < 1024.0 {
            return format!("{value:.1}{unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1}{}", BINARY_UNITS[BINARY_UNITS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_missing_scheme() {
        assert_eq!(normalize_url("example.com/a").unwrap(), "http://example.com/a");
    }

    #[test]
    fn strips_leading_slash_before_prefixing() {
        assert_eq!(normalize_url("/example.com").unwrap(), "http://example.com/");
    }

    #[test]
    fn preserves_https_scheme() {
        assert_eq!(normalize_url("https://x/").unwrap(), "https://x/");
    }

    #[test]
    fn is_idempotent() {
        let once = normalize_url("example.com/a").unwrap();
        let twice = normalize_url(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(normalize_url("ftp://example.com").is_err());
    }

    #[test]
    fn strips_single_trailing_slash() {
        assert_eq!(strip_trailing_slash("http://example.com/"), "http://example.com");
        assert_eq!(strip_trailing_slash("http://example.com"), "http://example.com");
    }

    #[test]
    fn slug_lowercases_and_replaces_colon() {
        assert_eq!(host_port_slug("http://Example.COM:8080/"), "example.com_8080");
        assert_eq!(host_port_slug("http://example.com/"), "example.com");
    }

    #[test]
    fn human_size_thresholds() {
        assert_eq!(human_size(0), "0.0B");
        assert_eq!(human_size(10), "10.0B");
        assert_eq!(human_size(1536), "1.5KiB");
        assert_eq!(human_size(1024 * 1024), "1.0MiB");
    }

    #[test]
    fn human_size_round_trips_within_5_percent() {
        // human_size is lossy by design (one decimal place); verify the
        // relative error implied by the rounding stays under 5%, per spec.
        for size in [1u64, 100, 1023, 1025, 10_000, 1_048_576, 5_000_000_000] {
            let formatted = human_size(size);
            let numeric: f64 = formatted
                .trim_end_matches(|c: char| c.is_alphabetic())
                .parse()
                .unwrap();
            let unit = formatted.trim_start_matches(|c: char| c == '.' || c.is_numeric() || c == '-');
            let exp = BINARY_UNITS.iter().position(|u| *u == unit).unwrap();
            let reconstructed = numeric * 1024f64.powi(exp as i32);
            let relative_error = (size as f64 - reconstructed).abs() / size as f64;
            assert!(relative_error < 0.05, "size={size} formatted={formatted} error={relative_error}");
        }
    }
}

//! src/classifier.rs
//!
//! Component C6: decides what a finished fetch attempt means for the
//! progress counter, the target's log, and the error budget (spec §4.6).
//!
//! Grounded on `original_source/lib/scan_manager.py::handle_response` and
//! `fetch_callback` (the warning-tagging-by-exception-kind logic).

use crate::target::Target;
use crate::url::human_size;
use reqwest::StatusCode;

/// Sum type over the three possible fetch outcomes (spec §3 Data model).
/// A tagged `enum`, never a runtime-checked union (spec §9 Design Notes).
pub enum Outcome {
    Response {
        status: StatusCode,
        content_length: Option<u64>,
        final_url: String,
        location: Option<String>,
    },
    Error(FetchError),
    Cancelled,
}

/// Coarse error kind used only to pick a warning message (spec §4.6); the
/// retry/error-budget policy treats every kind identically.
pub enum FetchError {
    ServerDisconnected(String),
    ClientOs(String),
    Timeout(String),
    Other(String),
}

impl FetchError {
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_connect() {
            FetchError::ServerDisconnected(err.to_string())
        } else if err.is_request() || err.is_body() {
            FetchError::ClientOs(err.to_string())
        } else {
            FetchError::Other(err.to_string())
        }
    }

    fn kind_str(&self) -> &'static str {
        match self {
            FetchError::ServerDisconnected(_) => "server-disconnected",
            FetchError::ClientOs(_) => "client-os",
            FetchError::Timeout(_) => "timeout",
            FetchError::Other(_) => "other",
        }
    }

    fn message(&self) -> &str {
        match self {
            FetchError::ServerDisconnected(m)
            | FetchError::ClientOs(m)
            | FetchError::Timeout(m)
            | FetchError::Other(m) => m,
        }
    }
}

/// What the dispatcher should do after the classifier has looked at an
/// outcome: whether to charge the target's error budget.
pub enum ClassificationEffect {
    None,
    ChargeError,
}

/// Classify one outcome for `target`: write a hit line if warranted, emit
/// a warning for errors, and report whether the error budget should be
/// charged (spec §4.6). Progress-counter advancement is the dispatcher's
/// job (every outcome advances it exactly once, per spec §4.5/§4.8), so it
/// is not done here.
pub fn classify(target: &Target, outcome: &Outcome) -> ClassificationEffect {
    if !target.is_running() {
        return ClassificationEffect::None;
    }

    match outcome {
        Outcome::Cancelled => ClassificationEffect::None,
        Outcome::Error(err) => {
            tracing::warn!(
                target_netloc = %target.netloc(),
                kind = err.kind_str(),
                message = %err.message(),
                "request error"
            );
            ClassificationEffect::ChargeError
        }
        Outcome::Response { status, .. } if *status == StatusCode::NOT_FOUND => {
            ClassificationEffect::None
        }
        Outcome::Response {
            status,
            content_length,
            final_url,
            location,
        } => {
            let line = format_hit_line(*status, content_length.unwrap_or(0), final_url, location.as_deref());
            target.save_hit(&line);
            tracing::info!(url = %final_url, status = %status.as_u16(), "{line}");
            ClassificationEffect::None
        }
    }
}

/// Format one hit line per spec §4.6:
///   `"<status> - <human_size>\t-\t<final_url> -> <Location>"` when a
///   `Location` header is present on a 301/302, otherwise
///   `"<status> - <human_size>\t-\t<final_url>"`.
fn format_hit_line(status: StatusCode, content_length: u64, final_url: &str, location: Option<&str>) -> String {
    let size = human_size(content_length);
    let is_redirect = status == StatusCode::MOVED_PERMANENTLY || status == StatusCode::FOUND;
    match (is_redirect, location) {
        (true, Some(loc)) => format!("{} - {}\t-\t{} -> {}", status.as_u16(), size, final_url, loc),
        _ => format!("{} - {}\t-\t{}", status.as_u16(), size, final_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_plain_hit() {
        let line = format_hit_line(StatusCode::OK, 10, "http://h/a", None);
        assert_eq!(line, "200 - 10.0B\t-\thttp://h/a");
    }

    #[test]
    fn formats_redirect_with_location() {
        let line = format_hit_line(StatusCode::MOVED_PERMANENTLY, 0, "http://h/c", Some("/d"));
        assert_eq!(line, "301 - 0.0B\t-\thttp://h/c -> /d");
    }

    #[test]
    fn formats_redirect_without_location_like_any_other_status() {
        let line = format_hit_line(StatusCode::FOUND, 0, "http://h/c", None);
        assert_eq!(line, "302 - 0.0B\t-\thttp://h/c");
    }

    #[test]
    fn content_length_defaults_to_zero() {
        let line = format_hit_line(StatusCode::OK, 0, "http://h/empty", None);
        assert!(line.contains("0.0B"));
    }
}

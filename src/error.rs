//! src/error.rs
//!
//! Central error type for Dirhound.
//!
//! Why have our own error enum?
//! - It keeps public function signatures simple: `Result<T, DirhoundError>`.
//! - It lets us print friendly messages (`Display`) while still keeping debug info (`Debug`).
//! - It allows the `?` operator to convert common error types into `DirhoundError` via `From`.

use std::{error::Error, fmt};

/// Top-level error type for the application.
///
/// Each variant wraps a concrete error from another library (e.g., `std::io`, `reqwest`),
/// or represents an application-specific condition (e.g., invalid base URL).
#[derive(Debug)]
pub enum DirhoundError {
    /// The provided base URL is invalid for our use: it must start with
    /// `http://` or `https://` and parse as an absolute URL.
    InvalidBaseUrl(String),

    /// `--url` and `--url-list` were both given, or neither was given.
    MutuallyExclusiveTarget,

    /// Wrapper for file/stream I/O errors (wordlist, url-list, config, logs).
    Io(std::io::Error),

    /// Wrapper for HTTP client errors (DNS/TLS/connect/timeouts/protocol) from `reqwest`.
    Http(reqwest::Error),

    /// Header value could not be interpreted as UTF-8 text (`to_str()` failed).
    HeaderToStr(reqwest::header::ToStrError),

    /// An async task failed to join (panic/cancellation surfaced as `JoinError`).
    Join(tokio::task::JoinError),

    /// The config file could not be parsed, or a required key had a bad value.
    Config(String),

    /// The `--proxy`/`connection.proxy` value is not a supported SOCKS URL.
    InvalidProxy(String),
}

/// Human-readable error messages.
///
/// `Display` is what gets shown to users by default (e.g., when you `println!("{}", err)`).
impl fmt::Display for DirhoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirhoundError::InvalidBaseUrl(u) => {
                write!(f, "invalid base url: {u} (must start with http:// or https://)")
            }
            DirhoundError::MutuallyExclusiveTarget => {
                write!(f, "exactly one of --url or --url-list must be given")
            }
            DirhoundError::Io(e) => write!(f, "io error: {e}"),
            DirhoundError::Http(e) => write!(f, "http error: {e}"),
            DirhoundError::HeaderToStr(e) => write!(f, "header to_str error: {e}"),
            DirhoundError::Join(e) => write!(f, "task join error: {e}"),
            DirhoundError::Config(msg) => write!(f, "config error: {msg}"),
            DirhoundError::InvalidProxy(p) => write!(f, "invalid proxy url: {p}"),
        }
    }
}

/// Implementing `std::error::Error` integrates with the wider error ecosystem:
/// - lets you use `Box<dyn Error>` if you choose
/// - enables source chaining (`source()`) if you add it later
impl Error for DirhoundError {}

/// Allow `std::io::Error` to be converted into `DirhoundError::Io` automatically.
impl From<std::io::Error> for DirhoundError {
    fn from(e: std::io::Error) -> Self {
        DirhoundError::Io(e)
    }
}

/// Convert `reqwest::Error` into `DirhoundError::Http`.
impl From<reqwest::Error> for DirhoundError {
    fn from(e: reqwest::Error) -> Self {
        DirhoundError::Http(e)
    }
}

/// Convert header UTF-8 conversion errors into `DirhoundError::HeaderToStr`.
impl From<reqwest::header::ToStrError> for DirhoundError {
    fn from(e: reqwest::header::ToStrError) -> Self {
        DirhoundError::HeaderToStr(e)
    }
}

/// Convert Tokio task join failures into `DirhoundError::Join`.
impl From<tokio::task::JoinError> for DirhoundError {
    fn from(e: tokio::task::JoinError) -> Self {
        DirhoundError::Join(e)
    }
}

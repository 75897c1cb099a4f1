//! src/banner.rs
//!
//! Startup banner and print-config preamble (SPEC_FULL.md §4 supplement).
//!
//! Grounded on `original_source/lib/controller.py::print_config`: before a
//! scan starts, the original prints target count, user agent, HTTP method,
//! connection limits, wordlist size, chunk size, total request count and
//! proxy status. This crate logs the same facts through `tracing` instead
//! of printing them raw, per the ambient-logging rule.

use crate::args::HttpMethod;
use crate::config::{Settings, TargetSource};

const BANNER: &str = r"
     _ _       _                           _
    | (_)     | |                         | |
  __| |_ _ __ | |__   ___  _   _ _ __   __| |
 / _` | | '__|| '_ \ / _ \| | | | '_ \ / _` |
| (_| | | |   | | | | (_) | |_| | | | | (_| |
 \__,_|_|_|   |_| |_|\___/ \__,_|_| |_|\__,_|
";

/// Print the banner and log the resolved run configuration.
pub fn print_config(settings: &Settings, target_count: usize) {
    println!("{BANNER}");

    let method = match settings.http_method {
        HttpMethod::Get => "GET",
        HttpMethod::Head => "HEAD",
    };
    let total_requests = target_count as u64 * settings.pathlist.len() as u64;

    match &settings.targets {
        TargetSource::Single(url) => tracing::info!(target = %url, "target"),
        TargetSource::List { file_name, urls } => {
            tracing::info!(file = %file_name, count = urls.len(), "target list")
        }
    }
    tracing::info!(user_agent = %settings.user_agent, "user agent");
    tracing::info!(method, "http method");
    tracing::info!(
        max_connections = settings.max_connections,
        max_connections_per_host = settings.max_connections_per_host,
        "connection limits"
    );
    tracing::info!(max_retries = settings.max_retries, max_errors = settings.max_errors, "retry policy");
    tracing::info!(wordlist_entries = settings.pathlist.len(), "wordlist size");
    tracing::info!(chunk_size = settings.chunk_size, "chunk size");
    tracing::info!(total_requests, "total requests planned");
    match &settings.proxy {
        Some(proxy) => tracing::info!(proxy = %proxy, "proxying through"),
        None => tracing::info!("no proxy configured"),
    }
}

//! src/client_pool.rs
//!
//! Component C4: N long-lived HTTP clients sharing one connection pool,
//! either direct or through a SOCKS5 proxy (spec §4.4).
//!
//! Grounded on `original_source/lib/scan_manager.py::__init__`/
//! `setup_sessions` (the `TCPConnector`/`ProxyConnector` + per-session
//! `ClientSession` split) and the teacher's `reqwest::Client::builder()`
//! usage in `dirust/src/main.rs`. `reqwest` pools connections per `Client`
//! internally; building `max_connections` separate `Client`s that each cap
//! their own pool at `limit_per_host` is the closest idiomatic match to
//! the original's single shared connector + many sessions.

use crate::config::Settings;
use crate::error::DirhoundError;
use reqwest::{Client, Proxy};

/// A pool of `max_connections` equivalent HTTP clients. A fetch for
/// `target_id` uses `clients[target_id % max_connections]` (spec §4.4).
pub struct ClientPool {
    clients: Vec<Client>,
}

impl ClientPool {
    pub fn build(settings: &Settings) -> Result<Self, DirhoundError> {
        let mut clients = Vec::with_capacity(settings.max_connections);
        for _ in 0..settings.max_connections {
            clients.push(build_one_client(settings)?);
        }
        Ok(ClientPool { clients })
    }

    pub fn get(&self, target_id: usize) -> &Client {
        &self.clients[target_id % self.clients.len()]
    }

    /// Close all clients. `reqwest::Client` has no explicit async close;
    /// dropping the last handle to each connection pool tears the
    /// underlying sockets down. Kept as an explicit step (rather than an
    /// implicit `Drop`) so the control plane's shutdown sequence (spec
    /// §4.7) has a concrete point to log against.
    pub fn close(self) {
        drop(self.clients);
    }
}

fn build_one_client(settings: &Settings) -> Result<Client, DirhoundError> {
    let mut builder = Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(settings.timeout)
        .redirect(if settings.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        })
        .danger_accept_invalid_certs(true)
        // No `gzip`/`brotli`/`deflate` cargo features are enabled, so
        // `reqwest` never sends an `Accept-Encoding` header in the first
        // place (spec §4.4: "the header Accept-Encoding explicitly
        // suppressed").
        //
        // This only bounds the *idle* keep-alive cache per host; it does
        // not cap concurrent in-flight requests (`reqwest` will happily
        // open more connections beyond it). The actual `limit_per_host`
        // cap (spec §4.4, §8 Invariant 3) is enforced by the per-target
        // counting semaphore in `dispatcher.rs`, acquired alongside the
        // global one before a request is issued.
        .pool_max_idle_per_host(settings.max_connections_per_host);

    if let Some(proxy_url) = &settings.proxy {
        validate_socks_scheme(proxy_url)?;
        // reqwest understands both `socks5://` (local DNS) and
        // `socks5h://` (remote, proxy-side DNS) natively, so the scheme is
        // passed straight through rather than rewritten.
        let proxy = Proxy::all(proxy_url).map_err(DirhoundError::from)?;
        builder = builder.proxy(proxy);
    }

    if let Some((user, pass)) = &settings.auth {
        builder = builder.default_headers({
            let mut headers = reqwest::header::HeaderMap::new();
            let credentials = basic_auth_header(user, pass);
            headers.insert(reqwest::header::AUTHORIZATION, credentials);
            headers
        });
    }

    builder.build().map_err(DirhoundError::from)
}

/// `socks5h://host:port` means remote (proxy-side) DNS resolution;
/// `socks5://host:port` means local DNS (spec §4.4). Both are valid
/// schemes for `reqwest::Proxy::all` directly; this only rejects anything
/// that isn't a SOCKS5 URL up front, with a clearer error than `reqwest`'s
/// own parse failure would give.
fn validate_socks_scheme(proxy_url: &str) -> Result<(), DirhoundError> {
    if proxy_url.starts_with("socks5h://") || proxy_url.starts_with("socks5://") {
        Ok(())
    } else {
        Err(DirhoundError::InvalidProxy(proxy_url.to_string()))
    }
}

fn basic_auth_header(user: &str, pass: &str) -> reqwest::header::HeaderValue {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"));
    reqwest::header::HeaderValue::from_str(&format!("Basic {encoded}"))
        .expect("base64-encoded basic auth header is always valid ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_remote_dns_scheme() {
        assert!(validate_socks_scheme("socks5h://127.0.0.1:9050").is_ok());
    }

    #[test]
    fn accepts_local_dns_scheme() {
        assert!(validate_socks_scheme("socks5://127.0.0.1:9050").is_ok());
    }

    #[test]
    fn rejects_non_socks_schemes() {
        assert!(validate_socks_scheme("http://127.0.0.1:8080").is_err());
    }

    #[test]
    fn client_mod_n_wraps_around() {
        // target_id % max_connections must wrap, not index out of bounds.
        assert_eq!(5usize % 3, 2);
        assert_eq!(3usize % 3, 0);
    }
}

//! src/manager.rs
//!
//! Component C9: the scan manager root. Owns every other component handle
//! and drives the top-level `run()` loop: build targets, build the client
//! pool, print the banner, then walk chunks of the interleaved request
//! pipeline through the dispatcher until the wordlist is exhausted or
//! shutdown is requested (spec §4.9).
//!
//! Grounded on `dirust/src/scanner/mod.rs`'s orchestration shape
//! (read wordlist -> build targets -> chunked dispatch loop) generalized
//! with `original_source/lib/scan_manager.py::run`.

use crate::banner;
use crate::client_pool::ClientPool;
use crate::config::{Settings, TargetSource};
use crate::control::{spawn_signal_handlers, ControlPlane};
use crate::dispatcher::{self, DispatchContext};
use crate::error::DirhoundError;
use crate::pipeline::{Chunks, InterleavedRequests};
use crate::progress::Progress;
use crate::target::Target;
use crate::url;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Build the per-run target list from `settings.targets`, normalizing and
/// de-duplicating the base URL of each (spec §3: `base_url` carries no
/// trailing slash).
fn build_targets(settings: &Settings) -> Result<Vec<Target>, DirhoundError> {
    let raw_urls: Vec<String> = match &settings.targets {
        TargetSource::Single(u) => vec![u.clone()],
        TargetSource::List { urls, .. } => urls.clone(),
    };

    // Spec §6: `--logs, -l` is typed as "existing writable directory"
    // (the original's `click.Path(exists=True, ...)` hard-fails the same
    // way); a missing logs directory is a usage error, not something to
    // paper over by creating it.
    if !settings.logs_dir.is_dir() {
        return Err(DirhoundError::Config(format!(
            "logs directory does not exist: {}",
            settings.logs_dir.display()
        )));
    }

    raw_urls
        .into_iter()
        .enumerate()
        .map(|(id, raw)| {
            let normalized = url::normalize_url(&raw)?;
            let base_url = url::strip_trailing_slash(&normalized);
            Target::new(id, base_url, &settings.logs_dir, settings.max_errors).map_err(DirhoundError::from)
        })
        .collect()
}

/// Run a full scan to completion (or until shutdown is requested). Returns
/// `true` if the run was cancelled (SIGINT/SIGTERM/SIGHUP/menu `[e]xit`)
/// rather than finishing the wordlist (spec §7: the caller distinguishes
/// "Scan cancelled by user" from "Scan completed").
pub async fn run(settings: Settings) -> Result<bool, DirhoundError> {
    let targets = Arc::new(build_targets(&settings)?);
    banner::print_config(&settings, targets.len());

    let total_requests = targets.len() as u64 * settings.pathlist.len() as u64;
    let progress = Progress::new(total_requests);
    let control = ControlPlane::new();
    let signal_task = spawn_signal_handlers(control.clone(), progress.clone());

    let clients = Arc::new(ClientPool::build(&settings)?);
    let semaphore = Arc::new(Semaphore::new(settings.max_connections));
    let host_semaphores = Arc::new(
        (0..targets.len())
            .map(|_| Semaphore::new(settings.max_connections_per_host))
            .collect::<Vec<_>>(),
    );

    let ctx = DispatchContext {
        clients: clients.clone(),
        semaphore,
        host_semaphores,
        control: control.clone(),
        progress: progress.clone(),
        use_get: settings.http_method == crate::args::HttpMethod::Get,
        max_retries: settings.max_retries,
    };

    let requests = InterleavedRequests::new(&targets, &settings.pathlist);
    let mut chunks = Chunks::new(requests, settings.chunk_size);

    while let Some(chunk) = chunks.next() {
        if control.shutdown.is_cancelled() {
            break;
        }
        let spawned = dispatcher::spawn_chunk(&ctx, targets.clone(), chunk);
        dispatcher::process_chunk(&ctx, &targets, spawned).await;
    }

    let cancelled = control.shutdown.is_cancelled();

    for target in targets.iter() {
        target.stop();
    }
    progress.finish();
    signal_task.abort();

    match Arc::try_unwrap(clients) {
        Ok(pool) => pool.close(),
        Err(_) => tracing::debug!("client pool still shared at shutdown, dropping in place"),
    }

    if cancelled {
        // Spec §4.7: "Sleep giveup_timeout seconds to allow connector
        // teardown" before returning from a graceful shutdown.
        tokio::time::sleep(std::time::Duration::from_secs(settings.giveup_timeout)).await;
    }

    Ok(cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::HttpMethod;
    use std::time::Duration;

    fn settings_for(logs_dir: std::path::PathBuf, url: String) -> Settings {
        Settings {
            chunk_size: 4,
            follow_redirects: false,
            giveup_timeout: 5,
            max_errors: 3,
            max_retries: 1,
            http_method: HttpMethod::Head,
            logs_dir,
            targets: TargetSource::Single(url),
            pathlist: vec!["a".into(), "b".into()],
            proxy: None,
            max_connections: 2,
            max_connections_per_host: 2,
            auth: None,
            timeout: Duration::from_secs(5),
            user_agent: "dirhound-test".into(),
        }
    }

    #[test]
    fn build_targets_normalizes_and_assigns_dense_ids() {
        let dir = std::env::temp_dir().join(format!(
            "dirhound-manager-test-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let settings = settings_for(dir.clone(), "example.com".into());
        let targets = build_targets(&settings).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, 0);
        assert_eq!(targets[0].base_url, "http://example.com");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn build_targets_rejects_missing_logs_dir() {
        let dir = std::env::temp_dir().join(format!(
            "dirhound-manager-test-missing-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let settings = settings_for(dir, "example.com".into());
        assert!(build_targets(&settings).is_err());
    }
}

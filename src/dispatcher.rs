//! src/dispatcher.rs
//!
//! Component C5: the bounded-concurrency fetch-with-retries dispatcher
//! (spec §4.5).
//!
//! Grounded on `dirust/src/scanner/mod.rs::scan` (semaphore-gated spawn +
//! join loop) generalized with `original_source/lib/scan_manager.py::fetch`
//! (the retry-until-`max_retries` loop) and `create_task_group`/
//! `process_task_group`/`cleanup_task_group` (per-chunk task bookkeeping).

use crate::classifier::{self, ClassificationEffect, FetchError, Outcome};
use crate::client_pool::ClientPool;
use crate::control::ControlPlane;
use crate::pipeline::RequestSlot;
use crate::progress::Progress;
use crate::target::Target;
use reqwest::header::LOCATION;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Everything a fetch needs, bundled so it can be moved into a spawned
/// task without threading a dozen separate clones through call sites
/// (spec §9 Design Notes: pass the needed slices of the manager by
/// explicit handle).
#[derive(Clone)]
pub struct DispatchContext {
    pub clients: Arc<ClientPool>,
    pub semaphore: Arc<Semaphore>,
    /// One counting semaphore per target, capacity `max_connections_per_host`
    /// (spec §4.4 `limit_per_host`, §9 Design Notes: "per-host caps become a
    /// map of host -> counting semaphore checked at dispatch"). One target
    /// is one base URL/host, so this is indexed by `target_id` directly
    /// rather than by a separately-tracked hostname.
    pub host_semaphores: Arc<Vec<Semaphore>>,
    pub control: ControlPlane,
    pub progress: Progress,
    pub use_get: bool,
    pub max_retries: u32,
}

/// One chunk's worth of spawned fetch tasks, grouped by target so a
/// blocked target's remaining tasks in the chunk can be found and
/// cancelled (spec §4.2, §4.5 "register it in the target's task list").
pub struct ChunkTasks {
    by_target: HashMap<usize, Vec<JoinHandle<(usize, Outcome)>>>,
}

/// Perform one fetch: acquire a global permit and a per-host permit, await
/// the pause gate, retry up to `max_retries` times, release both permits on
/// every exit path (spec §4.5 steps 1-5; §4.4/§8 Invariant 3 "per-host
/// in-flight count <= max_connections_per_host").
async fn fetch(ctx: &DispatchContext, targets: &[Target], target_id: usize, url: String) -> Outcome {
    let permit = tokio::select! {
        biased;
        _ = ctx.control.shutdown.cancelled() => return Outcome::Cancelled,
        permit = ctx.semaphore.acquire() => permit,
    };
    let _permit = match permit {
        Ok(p) => p,
        Err(_) => return Outcome::Cancelled,
    };

    let host_permit = tokio::select! {
        biased;
        _ = ctx.control.shutdown.cancelled() => return Outcome::Cancelled,
        permit = ctx.host_semaphores[target_id].acquire() => permit,
    };
    let _host_permit = match host_permit {
        Ok(p) => p,
        Err(_) => return Outcome::Cancelled,
    };

    tokio::select! {
        biased;
        _ = ctx.control.shutdown.cancelled() => return Outcome::Cancelled,
        _ = ctx.control.pause_gate.wait_open() => {}
    }

    let client = ctx.clients.get(target_id);
    let mut last_error: Option<reqwest::Error> = None;

    for _attempt in 0..ctx.max_retries.max(1) {
        if ctx.control.shutdown.is_cancelled() {
            return Outcome::Cancelled;
        }
        if !targets[target_id].is_running() {
            return Outcome::Cancelled;
        }

        let request = if ctx.use_get {
            client.get(url.as_str())
        } else {
            client.head(url.as_str())
        };

        let attempt_result = tokio::select! {
            biased;
            _ = ctx.control.shutdown.cancelled() => return Outcome::Cancelled,
            result = request.send() => result,
        };

        match attempt_result {
            Ok(response) => {
                let status = response.status();
                let final_url = response.url().to_string();
                let content_length = response.content_length();
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                return Outcome::Response {
                    status,
                    content_length,
                    final_url,
                    location,
                };
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    match last_error {
        Some(e) => Outcome::Error(FetchError::from_reqwest(&e)),
        None => Outcome::Error(FetchError::Other("no attempts were made".to_string())),
    }
}

/// Spawn one task per non-dropped slot in `chunk`; advance progress by one
/// immediately for every dropped (`⊥`) slot (spec §4.5 "Chunk processing").
pub fn spawn_chunk(ctx: &DispatchContext, targets: Arc<Vec<Target>>, chunk: Vec<RequestSlot>) -> ChunkTasks {
    let mut by_target: HashMap<usize, Vec<JoinHandle<(usize, Outcome)>>> = HashMap::new();

    for slot in chunk {
        let Some(url) = slot.url else {
            ctx.progress.advance();
            continue;
        };

        let ctx = ctx.clone();
        let targets = targets.clone();
        let target_id = slot.target_id;
        let handle = tokio::spawn(async move {
            let outcome = fetch(&ctx, &targets, target_id, url).await;
            (target_id, outcome)
        });
        by_target.entry(target_id).or_default().push(handle);
    }

    ChunkTasks { by_target }
}

/// A pending fetch tagged with the target it belongs to, so blocking one
/// target can find and abort exactly its own handles without disturbing
/// any other target's in-flight requests in the same chunk.
struct Tagged {
    target_id: usize,
    handle: JoinHandle<(usize, Outcome)>,
}

/// Drain a chunk's tasks in completion order, classifying each outcome and
/// charging/blocking the owning target as needed (spec §4.5
/// "completion order, not submission order").
pub async fn process_chunk(ctx: &DispatchContext, targets: &[Target], mut chunk: ChunkTasks) {
    let mut pending: Vec<Tagged> = chunk
        .by_target
        .drain()
        .flat_map(|(target_id, handles)| {
            handles
                .into_iter()
                .map(move |handle| Tagged { target_id, handle })
        })
        .collect();

    while !pending.is_empty() {
        let (result, remaining) = select_first(pending).await;
        pending = remaining;

        let (target_id, outcome) = match result {
            Ok(pair) => pair,
            Err(_join_err) => {
                // A panicked/cancelled task counts as a dropped slot; it
                // was never charged to the error budget (spec §4.5/§4.8).
                ctx.progress.advance();
                continue;
            }
        };

        ctx.progress.advance();
        let effect = classifier::classify(&targets[target_id], &outcome);
        if let ClassificationEffect::ChargeError = effect {
            if targets[target_id].increment_errors() {
                block_target(ctx, targets, target_id, &mut pending).await;
            }
        }
    }
}

/// Cancel every still-pending task belonging to `target_id`, counting each
/// as a completed progress slot, per spec §4.2: "the dispatcher MUST
/// cancel all in-flight fetches belonging to this target, count each
/// cancelled fetch as a completed slot in the progress counter." Tasks
/// belonging to other targets in the same chunk are left untouched.
async fn block_target(ctx: &DispatchContext, targets: &[Target], target_id: usize, pending: &mut Vec<Tagged>) {
    let target = &targets[target_id];
    tracing::warn!(target_netloc = %target.netloc(), "giving up on target");
    target.stop();

    let mut mine = Vec::new();
    let mut rest = Vec::with_capacity(pending.len());
    for tagged in pending.drain(..) {
        if tagged.target_id == target_id {
            mine.push(tagged.handle);
        } else {
            rest.push(tagged);
        }
    }
    *pending = rest;

    let dropped = mine.len() as u64;
    for handle in mine {
        handle.abort();
        let _ = handle.await;
    }
    tracing::warn!(target_netloc = %target.netloc(), dropped, "dropping requests");
    ctx.progress.advance_by(dropped);
}

/// `futures::future::select_all` without pulling in the `futures` crate
/// for one call site: race every pending handle and return the first to
/// complete along with the rest, unchanged order otherwise.
async fn select_first(mut pending: Vec<Tagged>) -> (Result<(usize, Outcome), tokio::task::JoinError>, Vec<Tagged>) {
    use std::future::Future;
    use std::pin::Pin;
    use std::task::Poll;

    struct SelectAll<'a> {
        handles: &'a mut [Tagged],
    }

    impl<'a> Future for SelectAll<'a> {
        type Output = (usize, Result<(usize, Outcome), tokio::task::JoinError>);

        fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
            let this = self.get_mut();
            for (i, tagged) in this.handles.iter_mut().enumerate() {
                if let Poll::Ready(result) = Pin::new(&mut tagged.handle).poll(cx) {
                    return Poll::Ready((i, result));
                }
            }
            Poll::Pending
        }
    }

    let (index, result) = SelectAll { handles: &mut pending }.await;
    pending.remove(index);
    (result, pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn select_returns_first_finished_and_rest() {
        let h1 = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            (0usize, Outcome::Cancelled)
        });
        let h2 = tokio::spawn(async { (1usize, Outcome::Cancelled) });

        let pending = vec![
            Tagged { target_id: 0, handle: h1 },
            Tagged { target_id: 1, handle: h2 },
        ];
        let (result, remaining) = select_first(pending).await;
        let (target_id, _) = result.unwrap();
        assert_eq!(target_id, 1);
        assert_eq!(remaining.len(), 1);
    }

    /// Spec §8 Invariant 3: per-host in-flight count <= max_connections_per_host.
    /// Exercises the same `host_semaphores[target_id]` gate `fetch()` uses,
    /// without a live HTTP server: a capacity-2 semaphore admits exactly 2
    /// concurrent holders and blocks a 3rd until one is released.
    #[tokio::test]
    async fn host_semaphore_caps_concurrent_holders() {
        let sem = Arc::new(Semaphore::new(2));

        let p1 = sem.clone().acquire_owned().await.unwrap();
        let p2 = sem.clone().acquire_owned().await.unwrap();
        assert_eq!(sem.available_permits(), 0);

        let waiter = tokio::spawn({
            let sem = sem.clone();
            async move { sem.acquire_owned().await.unwrap() }
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!waiter.is_finished(), "3rd acquire must block while 2 permits are held");

        drop(p1);
        tokio::time::timeout(std::time::Duration::from_millis(100), waiter)
            .await
            .expect("waiter should finish once a permit is released")
            .unwrap()
            .unwrap();
        drop(p2);
    }
}

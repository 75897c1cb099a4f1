//! src/control.rs
//!
//! Component C7: the pause gate, signal handlers, interactive pause menu
//! and graceful shutdown (spec §4.7).
//!
//! Grounded on `original_source/lib/scan_manager.py::setup_sighandler`,
//! `interrupt_menu` and `shutdown`. Signals map onto `tokio::signal::unix`
//! (already available since `tokio` carries the `signal` feature); the
//! pause latch is a `tokio::sync::watch::Sender<bool>` (open=`true`,
//! closed=`false`); graceful shutdown is a `tokio_util::sync::
//! CancellationToken`, the idiomatic analogue of cooperative task
//! cancellation in the wider pack.

use crate::progress::Progress;
use std::io::IsTerminal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// A latch with two states that every fetch awaits between semaphore
/// acquire and request issue (spec §4.7).
#[derive(Clone)]
pub struct PauseGate {
    tx: watch::Sender<bool>,
}

impl PauseGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        PauseGate { tx }
    }

    pub fn close(&self) {
        let _ = self.tx.send(false);
    }

    pub fn open(&self) {
        let _ = self.tx.send(true);
    }

    /// Suspend until the gate is open. Returns immediately if already open.
    pub async fn wait_open(&self) {
        let mut rx = self.tx.subscribe();
        if *rx.borrow() {
            return;
        }
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared control-plane handles passed explicitly to every fetch and to
/// the manager (spec §9 Design Notes: no module-level singletons).
#[derive(Clone)]
pub struct ControlPlane {
    pub pause_gate: PauseGate,
    pub shutdown: CancellationToken,
}

impl ControlPlane {
    pub fn new() -> Self {
        ControlPlane {
            pause_gate: PauseGate::new(),
            shutdown: CancellationToken::new(),
        }
    }
}

impl Default for ControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the task that owns all of `SIGHUP`/`SIGTERM`/`SIGINT` handling for
/// the life of the run. Returns its `JoinHandle` so `manager.rs` can abort
/// it once shutdown completes.
pub fn spawn_signal_handlers(control: ControlPlane, progress: Progress) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGHUP handler");
                return;
            }
        };
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGINT handler");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = control.shutdown.cancelled() => return,
                _ = sighup.recv() => {
                    tracing::warn!("received SIGHUP, shutting down");
                    control.shutdown.cancel();
                    return;
                }
                _ = sigterm.recv() => {
                    tracing::warn!("received SIGTERM, shutting down");
                    control.shutdown.cancel();
                    return;
                }
                _ = sigint.recv() => {
                    handle_sigint(&control, &progress, &mut sigint).await;
                    if control.shutdown.is_cancelled() {
                        return;
                    }
                }
            }
        }
    })
}

/// First Ctrl-C: close the gate and run the interactive `[e]xit / [c]ontinue`
/// menu. A second Ctrl-C while inside the menu is treated as a hard
/// interrupt (spec §4.7: "a second Ctrl-C propagates as hard interrupt").
async fn handle_sigint(
    control: &ControlPlane,
    progress: &Progress,
    sigint: &mut tokio::signal::unix::Signal,
) {
    control.pause_gate.close();
    progress.println("CTRL+C detected: Pausing dirhound...");

    if !std::io::stdin().is_terminal() {
        // spec §9 Open Questions: behavior on non-TTY stdin is undefined
        // in the original; degrade to immediate shutdown.
        progress.println("stdin is not a terminal, shutting down");
        control.shutdown.cancel();
        return;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        progress.println("[e]xit / [c]ontinue: ");
        tokio::select! {
            _ = sigint.recv() => {
                progress.println("second interrupt received, shutting down");
                control.shutdown.cancel();
                return;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(input)) => {
                        match input.trim().to_lowercase().as_str() {
                            "e" => {
                                control.shutdown.cancel();
                                return;
                            }
                            "c" => {
                                progress.println("Resuming dirhound...");
                                control.pause_gate.open();
                                return;
                            }
                            _ => continue,
                        }
                    }
                    _ => {
                        // EOF or read error on stdin: degrade to shutdown.
                        control.shutdown.cancel();
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gate_starts_open() {
        let gate = PauseGate::new();
        tokio::time::timeout(std::time::Duration::from_millis(50), gate.wait_open())
            .await
            .expect("wait_open should return immediately when open");
    }

    #[tokio::test]
    async fn closed_gate_blocks_until_reopened() {
        let gate = PauseGate::new();
        gate.close();

        let waiter_gate = gate.clone();
        let waiter = tokio::spawn(async move {
            waiter_gate.wait_open().await;
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        gate.open();
        tokio::time::timeout(std::time::Duration::from_millis(100), waiter)
            .await
            .expect("waiter should finish shortly after gate reopens")
            .unwrap();
    }

    #[tokio::test]
    async fn shutdown_token_cancels_all_clones() {
        let control = ControlPlane::new();
        let clone = control.clone();
        assert!(!clone.shutdown.is_cancelled());
        control.shutdown.cancel();
        assert!(clone.shutdown.is_cancelled());
    }
}

//! src/progress.rs
//!
//! Component C8: a single monotonically-advancing counter of
//! finished+dropped requests (spec §4.8).
//!
//! Grounded on the original's `tqdm` progress bar usage in
//! `lib/scan_manager.py` (`self.pbar.update()`); `indicatif` is its direct
//! Rust analogue and is used the same way in `other_examples` (`lychee`,
//! `cheburcheck`). The counter itself is an `Arc<AtomicU64>` pair with the
//! bar so progress can be read back (e.g. for the end-of-run summary and
//! tests) without depending on `indicatif`'s internal state.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct Progress {
    bar: ProgressBar,
    finished: Arc<AtomicU64>,
}

impl Progress {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{wide_bar} {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Progress {
            bar,
            finished: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance the counter by one. Used for: a completed fetch (success or
    /// terminal error), a dropped (`⊥`) slot, and a cancelled in-flight
    /// task when a target blocks (spec §4.8).
    pub fn advance(&self) {
        self.advance_by(1);
    }

    pub fn advance_by(&self, n: u64) {
        self.finished.fetch_add(n, Ordering::SeqCst);
        self.bar.inc(n);
    }

    pub fn finished_count(&self) -> u64 {
        self.finished.load(Ordering::SeqCst)
    }

    /// Write a line above the bar without corrupting its render (spec
    /// §4.7: the pause menu prompt is written "through the progress
    /// reporter").
    pub fn println(&self, line: &str) {
        self.bar.println(line);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_by_one_per_call() {
        let progress = Progress::new(10);
        progress.advance();
        progress.advance();
        assert_eq!(progress.finished_count(), 2);
    }

    #[test]
    fn advance_by_n_for_cancelled_batches() {
        let progress = Progress::new(10);
        progress.advance_by(4);
        assert_eq!(progress.finished_count(), 4);
    }

    #[test]
    fn total_matches_wordlist_times_targets_invariant() {
        let wordlist_len = 3u64;
        let targets = 2u64;
        let progress = Progress::new(wordlist_len * targets);
        for _ in 0..(wordlist_len * targets) {
            progress.advance();
        }
        assert_eq!(progress.finished_count(), wordlist_len * targets);
    }
}

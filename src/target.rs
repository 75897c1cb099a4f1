//! src/target.rs
//!
//! Component C2 of the scan engine: per-target state, log sink and lazy
//! path enumerator, plus the error-budget state machine (spec §4.1, §4.2).
//!
//! Grounded on `original_source/lib/scan_target.py::ScanTarget`. The log
//! file is opened eagerly at construction time (as the original does in
//! `init_log`), not lazily on first write.

use crate::url::host_port_slug;
use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Dense integer index assigned at construction, per spec §3.
pub type TargetId = usize;

/// Per-target state: counters, log sink, running flag, wordlist cursor
/// (the cursor itself lives in `pipeline.rs`; `Target` only tracks what
/// the rest of the engine needs to read/write concurrently).
pub struct Target {
    pub id: TargetId,
    pub base_url: String,
    error_count: AtomicU32,
    running: AtomicBool,
    log_sink: std::sync::Mutex<Option<BufWriter<File>>>,
    max_errors: u32,
}

impl Target {
    /// Construct a target and eagerly open its log sink.
    ///
    /// `base_url` must already be normalized with no trailing slash (spec
    /// §3 Data model). The log file name is
    /// `<DD-MM-YY_HH_MM>_<host[_port]>.txt`, timestamp captured now (spec
    /// §4.1: "Timestamp captured at construction (not at close)").
    pub fn new(
        id: TargetId,
        base_url: String,
        logs_dir: &Path,
        max_errors: u32,
    ) -> std::io::Result<Self> {
        let file_name = log_file_name(&base_url, Local::now());
        let file = File::create(logs_dir.join(file_name))?;
        Ok(Target {
            id,
            base_url,
            error_count: AtomicU32::new(0),
            running: AtomicBool::new(true),
            log_sink: std::sync::Mutex::new(Some(BufWriter::new(file))),
            max_errors,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Netloc used in warning messages (spec §7: "a warning line per error
    /// with the target's netloc").
    pub fn netloc(&self) -> String {
        host_port_slug(&self.base_url)
    }

    /// Append a line to the log sink. Precondition: `running == true`; a
    /// write attempted after `stop()` is silently dropped (spec §4.1
    /// invariant: "once false ... no further writes occur").
    pub fn save_hit(&self, line: &str) {
        if !self.is_running() {
            return;
        }
        let mut guard = self.log_sink.lock().expect("log sink mutex poisoned");
        if let Some(writer) = guard.as_mut() {
            let _ = writeln!(writer, "{line}");
        }
    }

    /// Increment the error counter. Returns `true` if this increment just
    /// pushed the target over budget (`error_count > max_errors`, strict),
    /// i.e. the caller must now block the target (spec §4.2).
    pub fn increment_errors(&self) -> bool {
        let new_count = self.error_count.fetch_add(1, Ordering::SeqCst) + 1;
        new_count > self.max_errors
    }

    pub fn error_budget_exceeded(&self) -> bool {
        self.error_count.load(Ordering::SeqCst) > self.max_errors
    }

    /// Set `running := false`, flush and close the log sink. Idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let mut guard = self.log_sink.lock().expect("log sink mutex poisoned");
        if let Some(mut writer) = guard.take() {
            let _ = writer.flush();
        }
    }
}

/// `<DD-MM-YY_HH_MM>_<host[_port]>.txt`, host lowercased with `:` -> `_`.
///
/// Grounded on the original's `datetime.now().strftime('%d-%m-%y_%H_%M')`
/// (local time, not UTC); `chrono` is the pack-wide idiom for this
/// (e.g. `maithanhduyan-rust-code/bibank`'s `entry.timestamp.format(...)`).
fn log_file_name(base_url: &str, now: chrono::DateTime<Local>) -> String {
    format!("{}_{}.txt", now.format("%d-%m-%y_%H_%M"), host_port_slug(base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_budget_blocks_on_first_exceeding_increment() {
        let dir = tempdir();
        let target = Target::new(0, "http://example.com".into(), &dir, 1).unwrap();
        assert!(!target.increment_errors()); // 1st error, count=1, not > 1
        assert!(target.increment_errors()); // 2nd error, count=2, 2 > 1 -> block
        assert!(target.error_budget_exceeded());
    }

    #[test]
    fn stop_is_idempotent_and_blocks_further_writes() {
        let dir = tempdir();
        let target = Target::new(0, "http://example.com".into(), &dir, 5).unwrap();
        target.save_hit("200 - 0.0B\t-\thttp://example.com/a");
        target.stop();
        target.stop(); // idempotent
        assert!(!target.is_running());
        target.save_hit("should not appear");

        let mut entries = std::fs::read_dir(&dir).unwrap();
        let log_path = entries.next().unwrap().unwrap().path();
        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains("200 - 0.0B"));
        assert!(!contents.contains("should not appear"));
    }

    #[test]
    fn log_file_name_lowercases_host_and_replaces_colon() {
        let name = log_file_name("http://Example.COM:8080", Local::now());
        assert!(name.ends_with("_example.com_8080.txt"));
    }

    fn tempdir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "dirhound-target-test-{:?}-{}",
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

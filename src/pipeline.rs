//! src/pipeline.rs
//!
//! Component C3: the lazy interleaved request generator and its chunking
//! into bounded batches (spec §4.3).
//!
//! Grounded on `original_source/lib/scan_manager.py::generate_links`
//! (`zip(*generators)` round-robin across targets) and
//! `lib/util.py::chunks` (prefix-of-size-N splitting of an arbitrary
//! iterator). Implemented as a pull-based `Iterator`, per spec §9 Design
//! Notes: "Do NOT pre-materialize; the stream can be millions of entries."

use crate::target::{Target, TargetId};

/// One request slot: `url = None` signals a dropped slot (spec §3:
/// "a `⊥` url signals a dropped slot ... contributes only to progress
/// accounting").
pub struct RequestSlot {
    pub target_id: TargetId,
    pub url: Option<String>,
}

/// Lazily interleaves `targets[0..k]` round-robin over path index
/// `j in [0, W)`, consulting each target's `running` flag at yield time
/// (spec §4.3, §9: "consults target[i].running at yield time to decide
/// url vs ⊥").
pub struct InterleavedRequests<'a> {
    targets: &'a [Target],
    pathlist: &'a [String],
    path_index: usize,
    target_index: usize,
}

impl<'a> InterleavedRequests<'a> {
    pub fn new(targets: &'a [Target], pathlist: &'a [String]) -> Self {
        InterleavedRequests {
            targets,
            pathlist,
            path_index: 0,
            target_index: 0,
        }
    }
}

impl<'a> Iterator for InterleavedRequests<'a> {
    type Item = RequestSlot;

    fn next(&mut self) -> Option<RequestSlot> {
        if self.path_index >= self.pathlist.len() || self.targets.is_empty() {
            return None;
        }

        let target = &self.targets[self.target_index];
        let path = &self.pathlist[self.path_index];

        let slot = RequestSlot {
            target_id: target.id,
            url: if target.is_running() {
                Some(format!("{}/{}", target.base_url, path))
            } else {
                None
            },
        };

        self.target_index += 1;
        if self.target_index == self.targets.len() {
            self.target_index = 0;
            self.path_index += 1;
        }

        Some(slot)
    }
}

/// Split a (lazy) iterator into successive chunks of at most `chunk_size`
/// items. The final chunk may be shorter. A chunk is materialized (into a
/// `Vec`) only when requested, preserving the "strictly lazy" property at
/// the chunk-stream level (spec §4.3: "a chunk is materialized only when
/// the previous chunk has completed" — enforced by the caller driving this
/// iterator one `next()` at a time rather than collecting it eagerly).
pub struct Chunks<I> {
    inner: I,
    chunk_size: usize,
}

impl<I> Chunks<I> {
    pub fn new(inner: I, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        Chunks { inner, chunk_size }
    }
}

impl<I: Iterator> Iterator for Chunks<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Vec<I::Item>> {
        let mut chunk = Vec::with_capacity(self.chunk_size);
        for _ in 0..self.chunk_size {
            match self.inner.next() {
                Some(item) => chunk.push(item),
                None => break,
            }
        }
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_at(id: TargetId, base: &str) -> Target {
        let dir = std::env::temp_dir().join(format!(
            "dirhound-pipeline-test-{:?}-{id}-{}",
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        Target::new(id, base.to_string(), &dir, 5).unwrap()
    }

    #[test]
    fn interleaves_round_robin_across_targets() {
        let targets = vec![target_at(0, "http://t0"), target_at(1, "http://t1"), target_at(2, "http://t2")];
        let pathlist: Vec<String> = vec!["a".into(), "b".into()];

        let slots: Vec<(TargetId, Option<String>)> = InterleavedRequests::new(&targets, &pathlist)
            .map(|s| (s.target_id, s.url))
            .collect();

        assert_eq!(
            slots,
            vec![
                (0, Some("http://t0/a".to_string())),
                (1, Some("http://t1/a".to_string())),
                (2, Some("http://t2/a".to_string())),
                (0, Some("http://t0/b".to_string())),
                (1, Some("http://t1/b".to_string())),
                (2, Some("http://t2/b".to_string())),
            ]
        );
    }

    #[test]
    fn stopped_target_yields_dropped_slots_but_preserves_alignment() {
        let targets = vec![target_at(0, "http://t0"), target_at(1, "http://t1")];
        targets[0].stop();
        let pathlist: Vec<String> = vec!["a".into(), "b".into(), "c".into()];

        let slots: Vec<(TargetId, Option<String>)> = InterleavedRequests::new(&targets, &pathlist)
            .map(|s| (s.target_id, s.url))
            .collect();

        assert_eq!(slots.len(), 6);
        for (target_id, url) in &slots {
            if *target_id == 0 {
                assert!(url.is_none());
            } else {
                assert!(url.is_some());
            }
        }
    }

    #[test]
    fn empty_pathlist_produces_zero_requests() {
        let targets = vec![target_at(0, "http://t0")];
        let pathlist: Vec<String> = vec![];
        let slots: Vec<_> = InterleavedRequests::new(&targets, &pathlist).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn chunk_size_one_splits_every_item() {
        let items: Vec<i32> = (0..5).collect();
        let chunks: Vec<Vec<i32>> = Chunks::new(items.into_iter(), 1).collect();
        assert_eq!(chunks, vec![vec![0], vec![1], vec![2], vec![3], vec![4]]);
    }

    #[test]
    fn chunk_size_larger_than_total_yields_one_chunk() {
        let items: Vec<i32> = (0..5).collect();
        let chunks: Vec<Vec<i32>> = Chunks::new(items.into_iter(), 100).collect();
        assert_eq!(chunks, vec![vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn last_chunk_may_be_shorter() {
        let items: Vec<i32> = (0..5).collect();
        let chunks: Vec<Vec<i32>> = Chunks::new(items.into_iter(), 2).collect();
        assert_eq!(chunks, vec![vec![0, 1], vec![2, 3], vec![4]]);
    }
}

//! src/wordlist.rs
//!
//! Out of scope per spec.md §1 ("the wordlist/user-agent file readers" are
//! named as external collaborators, specified only at their boundary) but
//! still needed as thin glue so the binary is runnable. Grounded on
//! `lib/config.py::parse_arguments`'s `rstrip()`-only semantics:
//! `tuple((x.rstrip() for x in kwargs['pathlist'].readlines()))`, applied
//! identically to `url_list`. No blank-line filtering happens there, so a
//! blank line in either file becomes a real empty-string entry (a real
//! `base_url + "/" + ""` request slot for the pathlist case) rather than
//! being dropped.

use crate::error::DirhoundError;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Read every line from `path`, right-trimming each but keeping blank
/// lines as empty-string entries (matches the original's `rstrip()` with
/// no emptiness filter).
pub fn read_lines(path: &Path) -> Result<Vec<String>, DirhoundError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for line_result in reader.lines() {
        let line = line_result?;
        out.push(line.trim_end().to_string());
    }
    Ok(out)
}

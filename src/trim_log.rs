//! Tab-separated trim log.
//!
//! The trim log is an append-only audit trail: one row per trimming
//! operation, recording how many positions were forced to missing at
//! each end. In single-target mode that is one row per alignment; in
//! "ALL" mode, one row per taxon per alignment, so a locus can
//! contribute several rows.
//!
//! Rows follow processing order, which follows directory discovery
//! order, which is not sorted and not guaranteed stable across
//! filesystems.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One trimming operation, immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimRecord {
    /// Locus (input file stem) the operation applied to
    pub locus: String,
    /// Positions forced to missing at the left end
    pub trim_left: usize,
    /// Positions forced to missing at the right end
    pub trim_right: usize,
}

/// Append-only sink for trim records.
///
/// Opened once per batch. Every appended row is flushed immediately,
/// so rows written before a later fatal error survive it; the
/// underlying handle is also flushed and closed on drop.
pub struct TrimLog {
    writer: BufWriter<File>,
}

impl TrimLog {
    /// Creates the log file and writes the fixed header row.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "locus\ttrim_left\ttrim_right")?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Appends one record as a tab-separated row.
    pub fn append(&mut self, record: &TrimRecord) -> io::Result<()> {
        writeln!(
            self.writer,
            "{}\t{}\t{}",
            record.locus, record.trim_left, record.trim_right
        )?;
        self.writer.flush()
    }
}

//! Alignment file I/O.
//!
//! The trimming pipeline works on NEXUS files, one locus per file.
//! This module wraps the parser/writer with filesystem plumbing:
//! reading a single file, writing one back, and loading a whole input
//! directory as a batch of `(locus, Alignment)` pairs.

pub mod nexus;

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::Alignment;
use nexus::NexusError;

/// Errors that can occur while reading or writing alignment files.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Nexus {
        path: PathBuf,
        #[source]
        source: NexusError,
    },
}

/// Result type for file I/O operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Reads and parses one NEXUS alignment file.
pub fn read_nexus_file<P: AsRef<Path>>(path: P) -> FormatResult<Alignment> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    nexus::parse_nexus_str(&content).map_err(|source| FormatError::Nexus {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes an alignment to one NEXUS file.
pub fn write_nexus_file<P: AsRef<Path>>(path: P, alignment: &Alignment) -> FormatResult<()> {
    let path = path.as_ref();
    fs::write(path, nexus::write_nexus_str(alignment)).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every `*.nexus` file in a directory as `(locus, Alignment)`
/// pairs, where the locus is the file stem.
///
/// Pairs come back in directory discovery order, deliberately not
/// sorted, matching downstream trim-log row order. Entries without a
/// `.nexus` extension are skipped.
pub fn load_directory<P: AsRef<Path>>(dir: P) -> FormatResult<Vec<(String, Alignment)>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| FormatError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut batch = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| FormatError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension() != Some(OsStr::new("nexus")) {
            continue;
        }
        let locus = path
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_string();
        let alignment = read_nexus_file(&path)?;
        batch.push((locus, alignment));
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Sequence, DEFAULT_GAP, DEFAULT_MISSING};
    use std::fs::File;
    use std::io::Write;

    const SIMPLE: &str = "#NEXUS\nBEGIN DATA;\n  DIMENSIONS NTAX=1 NCHAR=4;\n  \
                          FORMAT DATATYPE=DNA MISSING=? GAP=-;\n  MATRIX\n    seq1 ACGT\n  ;\nEND;\n";

    #[test]
    fn test_read_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locus.nexus");
        let alignment = Alignment::new(
            vec![Sequence::new("seq1", "AC-?")],
            DEFAULT_MISSING,
            DEFAULT_GAP,
            "DNA",
        );
        write_nexus_file(&path, &alignment).unwrap();
        let read_back = read_nexus_file(&path).unwrap();
        assert_eq!(read_back, alignment);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_nexus_file(dir.path().join("absent.nexus"));
        assert!(matches!(result, Err(FormatError::Io { .. })));
    }

    #[test]
    fn test_load_directory_skips_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["uce-1.nexus", "uce-2.nexus"] {
            let mut f = File::create(dir.path().join(name)).unwrap();
            f.write_all(SIMPLE.as_bytes()).unwrap();
        }
        File::create(dir.path().join("notes.txt")).unwrap();

        let mut loci: Vec<String> = load_directory(dir.path())
            .unwrap()
            .into_iter()
            .map(|(locus, _)| locus)
            .collect();
        loci.sort();
        assert_eq!(loci, vec!["uce-1", "uce-2"]);
    }

    #[test]
    fn test_load_directory_propagates_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = File::create(dir.path().join("bad.nexus")).unwrap();
        f.write_all(b">seq1\nACGT\n").unwrap();
        assert!(matches!(
            load_directory(dir.path()),
            Err(FormatError::Nexus { .. })
        ));
    }
}

//! Data model for alignment trimming.
//!
//! This module contains the value types the pipeline operates on:
//! - `Sequence`: one taxon's residues
//! - `Alignment`: a set of equal-length sequences for one locus
//!
//! Pipeline stages never mutate an `Alignment` in place; each stage
//! consumes one and produces a new value, so edge-case behavior is
//! visible at every stage boundary.

use std::borrow::Cow;

/// Default NEXUS missing-data symbol.
pub const DEFAULT_MISSING: u8 = b'?';

/// Default NEXUS gap symbol.
pub const DEFAULT_GAP: u8 = b'-';

/// A single named sequence (one taxon) within an alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The taxon label (from the NEXUS matrix, unquoted)
    pub id: String,
    /// The residues, one byte per alignment column
    pub data: Vec<u8>,
}

impl Sequence {
    /// Creates a new sequence from string-like parts.
    pub fn new(id: impl Into<String>, data: impl AsRef<str>) -> Self {
        Self {
            id: id.into(),
            data: data.as_ref().as_bytes().to_vec(),
        }
    }

    /// Creates a new sequence from raw bytes.
    pub fn from_bytes(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the residues as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the residues as text (lossy for non-UTF8 input).
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// An alignment of multiple same-length sequences for one locus.
///
/// Sequence order is the NEXUS matrix order. Taxon labels are unique
/// within an alignment (the parser rejects duplicates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// All sequences, in matrix order
    pub sequences: Vec<Sequence>,
    /// Number of columns; every sequence has exactly this length
    pub nchar: usize,
    /// Missing-data symbol declared by the FORMAT command
    pub missing: u8,
    /// Gap symbol declared by the FORMAT command
    pub gap: u8,
    /// Datatype token declared by the FORMAT command (e.g. "DNA")
    pub datatype: String,
}

impl Alignment {
    /// Creates a new alignment. `nchar` is taken from the first
    /// sequence; callers are responsible for length uniformity (the
    /// parser validates it against the declared NCHAR).
    pub fn new(
        sequences: Vec<Sequence>,
        missing: u8,
        gap: u8,
        datatype: impl Into<String>,
    ) -> Self {
        let nchar = sequences.first().map(Sequence::len).unwrap_or(0);
        Self {
            sequences,
            nchar,
            missing,
            gap,
            datatype: datatype.into(),
        }
    }

    /// Returns the number of taxa.
    pub fn taxon_count(&self) -> usize {
        self.sequences.len()
    }

    /// Returns true if the alignment holds no taxa.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Iterates over the taxon labels in matrix order.
    pub fn taxa(&self) -> impl Iterator<Item = &str> {
        self.sequences.iter().map(|s| s.id.as_str())
    }

    /// Looks up a sequence by taxon label.
    pub fn get(&self, taxon: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.id == taxon)
    }

    /// Returns true if the given taxon is present.
    pub fn contains_taxon(&self, taxon: &str) -> bool {
        self.get(taxon).is_some()
    }
}

//! Boundary detection and end trimming.
//!
//! The reference taxon's leading and trailing runs of missing data
//! define a trim boundary; applying that boundary to a target sequence
//! overwrites the same number of positions at each end with the
//! missing-data symbol. Sequence length never changes, so the
//! alignment stays rectangular.

use crate::model::Sequence;

/// Measures the trim boundary of a reference sequence.
///
/// Returns `(left, right)`: the length of the longest all-missing
/// prefix and the longest all-missing suffix. Both runs are measured
/// against the full sequence independently, so a wholly-missing
/// reference reports its full length on both sides.
pub fn compute_trim(reference: &[u8], missing: u8) -> (usize, usize) {
    let left = reference.iter().take_while(|&&b| b == missing).count();
    let right = reference.iter().rev().take_while(|&&b| b == missing).count();
    (left, right)
}

/// Applies a trim boundary to a target sequence.
///
/// The first `left` and last `right` positions are overwritten with
/// the missing-data symbol; everything strictly between is copied
/// unchanged. The two ends are applied independently against the
/// original length, so `left + right >= len` yields an entirely
/// missing sequence. The taxon label carries over to the result.
pub fn trim_target(target: &Sequence, left: usize, right: usize, missing: u8) -> Sequence {
    let len = target.len();
    let mut data = target.data.clone();
    for b in &mut data[..left.min(len)] {
        *b = missing;
    }
    for b in &mut data[len - right.min(len)..] {
        *b = missing;
    }
    Sequence::from_bytes(target.id.clone(), data)
}

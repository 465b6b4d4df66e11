//! Taxon and column pruning.
//!
//! After trimming, two reductions run over each alignment:
//! - unwanted taxa are dropped, using one delete set shared by the
//!   whole batch;
//! - columns that carry no information for any remaining taxon (only
//!   gap or missing symbols) are removed.

use std::collections::BTreeSet;

use crate::model::{Alignment, Sequence};

/// Computes the set of taxa to delete from every alignment.
///
/// Exactly one of `exclude` / `include` may be non-empty (the CLI
/// enforces mutual exclusion):
/// - `exclude` non-empty: delete the excluded taxa that actually occur
///   in the universe;
/// - `include` non-empty: delete everything outside the included set;
/// - both empty: delete nothing.
pub fn samples_to_delete(
    universe: &BTreeSet<String>,
    exclude: &[String],
    include: &[String],
) -> BTreeSet<String> {
    if !exclude.is_empty() {
        universe
            .iter()
            .filter(|name| exclude.iter().any(|e| e == *name))
            .cloned()
            .collect()
    } else if !include.is_empty() {
        universe
            .iter()
            .filter(|name| !include.iter().any(|i| i == *name))
            .cloned()
            .collect()
    } else {
        BTreeSet::new()
    }
}

/// Removes every taxon in `delete` from the alignment.
///
/// Column count is untouched; matrix order of the survivors is
/// preserved.
pub fn remove_taxa(alignment: Alignment, delete: &BTreeSet<String>) -> Alignment {
    if delete.is_empty() {
        return alignment;
    }
    let sequences: Vec<Sequence> = alignment
        .sequences
        .into_iter()
        .filter(|s| !delete.contains(&s.id))
        .collect();
    Alignment {
        sequences,
        ..alignment
    }
}

/// Removes columns where every remaining taxon holds only gap or
/// missing data, recomputing `nchar`.
///
/// All doomed columns are identified first and removed in one pass, so
/// indices never shift mid-removal. An alignment with no taxa left is
/// returned unchanged: there is no remaining-taxon evidence to judge
/// columns by.
pub fn drop_gap_only_columns(alignment: Alignment) -> Alignment {
    if alignment.is_empty() {
        return alignment;
    }
    let (missing, gap) = (alignment.missing, alignment.gap);
    let keep: Vec<bool> = (0..alignment.nchar)
        .map(|col| {
            alignment.sequences.iter().any(|s| {
                let b = s.data[col];
                b != missing && b != gap
            })
        })
        .collect();
    if keep.iter().all(|&k| k) {
        return alignment;
    }
    let nchar = keep.iter().filter(|&&k| k).count();
    let sequences: Vec<Sequence> = alignment
        .sequences
        .iter()
        .map(|s| {
            let data: Vec<u8> = s
                .data
                .iter()
                .zip(&keep)
                .filter(|(_, &k)| k)
                .map(|(&b, _)| b)
                .collect();
            Sequence::from_bytes(s.id.clone(), data)
        })
        .collect();
    Alignment {
        sequences,
        nchar,
        ..alignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_GAP, DEFAULT_MISSING};

    fn universe(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn alignment(rows: &[(&str, &str)]) -> Alignment {
        let sequences = rows
            .iter()
            .map(|(id, data)| Sequence::new(*id, *data))
            .collect();
        Alignment::new(sequences, DEFAULT_MISSING, DEFAULT_GAP, "DNA")
    }

    #[test]
    fn test_delete_set_exclude_intersects_universe() {
        let delete = samples_to_delete(&universe(&["a", "b", "c"]), &owned(&["b", "z"]), &[]);
        assert_eq!(delete, universe(&["b"]));
    }

    #[test]
    fn test_delete_set_include_complements_universe() {
        let delete = samples_to_delete(&universe(&["a", "b", "c"]), &[], &owned(&["a"]));
        assert_eq!(delete, universe(&["b", "c"]));
    }

    #[test]
    fn test_delete_set_neither_is_empty() {
        assert!(samples_to_delete(&universe(&["a", "b"]), &[], &[]).is_empty());
    }

    #[test]
    fn test_delete_set_exclude_whole_universe() {
        let all = universe(&["a", "b", "c"]);
        let delete = samples_to_delete(&all, &owned(&["a", "b", "c"]), &[]);
        assert_eq!(delete, all);
    }

    #[test]
    fn test_delete_set_include_whole_universe() {
        let delete = samples_to_delete(&universe(&["a", "b"]), &[], &owned(&["a", "b"]));
        assert!(delete.is_empty());
    }

    #[test]
    fn test_remove_taxa() {
        let aln = alignment(&[("a", "ACGT"), ("b", "TGCA"), ("c", "GGGG")]);
        let pruned = remove_taxa(aln, &universe(&["b"]));
        assert_eq!(pruned.taxa().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(pruned.nchar, 4);
    }

    #[test]
    fn test_remove_taxa_can_empty_alignment() {
        let aln = alignment(&[("a", "ACGT")]);
        let pruned = remove_taxa(aln, &universe(&["a"]));
        assert!(pruned.is_empty());
    }

    #[test]
    fn test_drop_gap_only_columns() {
        // Column 0 is all-missing, column 3 mixes gap and missing:
        // both go. Column 2 keeps real data in one taxon: it stays.
        let aln = alignment(&[("a", "?C-?A"), ("b", "?-G-C")]);
        let pruned = drop_gap_only_columns(aln);
        assert_eq!(pruned.nchar, 3);
        assert_eq!(pruned.get("a").unwrap().as_str(), "C-A");
        assert_eq!(pruned.get("b").unwrap().as_str(), "-GC");
    }

    #[test]
    fn test_drop_gap_only_columns_none_to_drop() {
        let aln = alignment(&[("a", "AC"), ("b", "?C")]);
        let pruned = drop_gap_only_columns(aln.clone());
        assert_eq!(pruned, aln);
    }

    #[test]
    fn test_drop_gap_only_columns_invariants() {
        let aln = alignment(&[("a", "??AC??"), ("b", "?-CG-?")]);
        let pruned = drop_gap_only_columns(aln);
        let (missing, gap) = (pruned.missing, pruned.gap);
        for seq in &pruned.sequences {
            assert_eq!(seq.len(), pruned.nchar);
        }
        for col in 0..pruned.nchar {
            assert!(pruned.sequences.iter().any(|s| {
                let b = s.data[col];
                b != missing && b != gap
            }));
        }
    }

    #[test]
    fn test_drop_gap_only_columns_idempotent() {
        let aln = alignment(&[("a", "??AC??"), ("b", "?-CG-?")]);
        let once = drop_gap_only_columns(aln);
        let twice = drop_gap_only_columns(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_drop_gap_only_columns_empty_alignment_unchanged() {
        let aln = Alignment::new(Vec::new(), DEFAULT_MISSING, DEFAULT_GAP, "DNA");
        let pruned = drop_gap_only_columns(aln.clone());
        assert_eq!(pruned, aln);
    }
}

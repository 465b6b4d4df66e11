//! Batch trimming pipeline.
//!
//! Every alignment moves through the same fixed stages, one alignment
//! at a time, in directory discovery order:
//!
//! ```text
//! Loaded -> Trimmed -> Pruned(taxa) -> Pruned(columns) -> Written
//! ```
//!
//! There are no backward transitions and no retries. The batch shares
//! a single read-only delete set and a single trim log; a failure in
//! any stage aborts the whole batch, leaving the output directory and
//! trim log holding exactly the alignments that reached `Written`.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{error, info, warn};
use thiserror::Error;

use crate::formats;
use crate::model::Alignment;
use crate::prune::{drop_gap_only_columns, remove_taxa, samples_to_delete};
use crate::trim::{compute_trim, trim_target};
use crate::trim_log::{TrimLog, TrimRecord};

/// Which taxa receive the reference boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetMode {
    /// Trim every taxon in each alignment
    All,
    /// Trim one named taxon
    Taxon(String),
}

impl TargetMode {
    /// Interprets the CLI target value; the literal `ALL`
    /// (case-sensitive) selects every taxon.
    pub fn from_arg(target: &str) -> Self {
        if target == "ALL" {
            TargetMode::All
        } else {
            TargetMode::Taxon(target.to_string())
        }
    }
}

/// Batch configuration, assembled by the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the input `*.nexus` files
    pub input: PathBuf,
    /// Directory receiving one trimmed file per input locus
    pub output: PathBuf,
    /// Taxon whose missing-data ends define the trim boundary
    pub reference: String,
    /// Taxa the boundary is applied to
    pub target: TargetMode,
    /// Taxa to drop from every alignment (mutually exclusive with
    /// `include`)
    pub exclude: Vec<String>,
    /// Taxa to keep; everything else is dropped
    pub include: Vec<String>,
    /// Path of the tab-separated trim log
    pub trim_file: PathBuf,
}

/// A taxon the pipeline needs is absent from an alignment. Fatal for
/// the whole batch: there is no per-alignment isolation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("reference taxon '{taxon}' not found in alignment '{locus}'")]
    MissingReference { taxon: String, locus: String },

    #[error("target taxon '{taxon}' not found in alignment '{locus}'")]
    MissingTarget { taxon: String, locus: String },
}

/// Collects every taxon label appearing anywhere in the batch.
pub fn taxon_universe(batch: &[(String, Alignment)]) -> BTreeSet<String> {
    let mut universe = BTreeSet::new();
    for (_, alignment) in batch {
        for taxon in alignment.taxa() {
            universe.insert(taxon.to_string());
        }
    }
    universe
}

/// Runs the whole batch: load, trim, prune, write.
///
/// `status` receives one `.` per alignment written, then a newline;
/// diagnostics go to the log. Trim-log rows for completed operations
/// survive a mid-batch failure (the log flushes per row).
pub fn run(config: &Config, status: &mut impl Write) -> Result<()> {
    info!("Reading input alignments in NEXUS format");
    let batch = formats::load_directory(&config.input)?;
    info!("{} alignments read", batch.len());

    let universe = taxon_universe(&batch);
    let delete = samples_to_delete(&universe, &config.exclude, &config.include);
    if let TargetMode::Taxon(target) = &config.target {
        // Configuration conflict: the trim result will be deleted
        // right after. Logged, not fatal.
        if delete.contains(target) {
            error!("Target taxon {} is in delete list {:?}", target, delete);
        }
    }

    let mut trim_log = TrimLog::create(&config.trim_file).with_context(|| {
        format!("failed to create trim log {}", config.trim_file.display())
    })?;

    info!("Trimming in progress");
    for (locus, alignment) in batch {
        let trimmed = apply_reference_trim(&locus, alignment, config, &mut trim_log)?;
        let kept = remove_taxa(trimmed, &delete);
        let pruned = if kept.is_empty() {
            warn!("All taxa removed from alignment {}", locus);
            kept
        } else {
            drop_gap_only_columns(kept)
        };
        formats::write_nexus_file(config.output.join(format!("{locus}.nexus")), &pruned)?;
        status.write_all(b".")?;
        status.flush()?;
    }
    writeln!(status)?;

    Ok(())
}

/// `Loaded -> Trimmed`: applies the reference boundary to the target
/// taxon (or to every taxon in "ALL" mode), appending one trim-log
/// record per trimmed taxon.
fn apply_reference_trim(
    locus: &str,
    alignment: Alignment,
    config: &Config,
    trim_log: &mut TrimLog,
) -> Result<Alignment> {
    let reference =
        alignment
            .get(&config.reference)
            .ok_or_else(|| PipelineError::MissingReference {
                taxon: config.reference.clone(),
                locus: locus.to_string(),
            })?;
    let (left, right) = compute_trim(reference.as_bytes(), alignment.missing);

    match &config.target {
        TargetMode::All => {
            let mut sequences = Vec::with_capacity(alignment.taxon_count());
            for seq in &alignment.sequences {
                sequences.push(trim_target(seq, left, right, alignment.missing));
                trim_log.append(&TrimRecord {
                    locus: locus.to_string(),
                    trim_left: left,
                    trim_right: right,
                })?;
            }
            Ok(Alignment {
                sequences,
                ..alignment
            })
        }
        TargetMode::Taxon(target) => {
            if !alignment.contains_taxon(target) {
                return Err(PipelineError::MissingTarget {
                    taxon: target.clone(),
                    locus: locus.to_string(),
                }
                .into());
            }
            let sequences = alignment
                .sequences
                .iter()
                .map(|seq| {
                    if seq.id == *target {
                        trim_target(seq, left, right, alignment.missing)
                    } else {
                        seq.clone()
                    }
                })
                .collect();
            trim_log.append(&TrimRecord {
                locus: locus.to_string(),
                trim_left: left,
                trim_right: right,
            })?;
            Ok(Alignment {
                sequences,
                ..alignment
            })
        }
    }
}

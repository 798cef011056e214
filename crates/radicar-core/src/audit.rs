//! # Sequence Audit Engine
//!
//! Reconstructs the expected dense sequence for a counter bucket and
//! reports every missing or duplicated value. The counter watermark is the
//! authoritative upper bound: every integer in `[1, last_sequence]` must be
//! represented by exactly one persisted filing.
//!
//! The engine is pure — the API layer feeds it [`BucketSnapshot`]s read
//! from storage and aggregates the output into a [`SequenceReport`] fit for
//! legal audit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::filing::FilingYear;
use crate::identity::EntityId;
use crate::numbering::NumberingType;

/// The kind of sequence defect found in a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemKind {
    /// A value in `[1, last_sequence]` has no persisted filing.
    Gap,
    /// A value is carried by more than one persisted filing.
    Duplicate,
}

impl ProblemKind {
    /// The kind name as reported on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gap => "GAP",
            Self::Duplicate => "DUPLICATE",
        }
    }
}

impl std::fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One defect in a bucket's sequence, with enough context to locate the
/// affected filing number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceProblem {
    /// The numbering regime of the affected bucket.
    pub numbering_type: NumberingType,
    /// The filing year of the affected bucket.
    pub year: FilingYear,
    /// The sequence value that is missing or duplicated.
    pub sequence: u32,
    /// Defect classification.
    pub kind: ProblemKind,
    /// Human-readable description for the audit report.
    pub description: String,
}

/// Storage snapshot of one counter bucket, as read by the API layer.
#[derive(Debug, Clone)]
pub struct BucketSnapshot {
    /// The bucket's numbering regime.
    pub numbering_type: NumberingType,
    /// The counter watermark, `None` when the bucket has never issued.
    pub last_sequence: Option<u32>,
    /// Sequence components of every persisted filing in the bucket,
    /// duplicates included.
    pub issued: Vec<u32>,
}

/// Enumerate `1..=last_sequence` and report every value not represented by
/// exactly one persisted filing.
///
/// Missing values become [`ProblemKind::Gap`]; multiply-represented values
/// become [`ProblemKind::Duplicate`]. Output is ordered by sequence value.
pub fn detect_problems(
    numbering_type: NumberingType,
    year: FilingYear,
    last_sequence: u32,
    issued: &[u32],
) -> Vec<SequenceProblem> {
    let mut occurrences: HashMap<u32, u32> = HashMap::new();
    for &sequence in issued {
        *occurrences.entry(sequence).or_insert(0) += 1;
    }

    let mut problems = Vec::new();
    for sequence in 1..=last_sequence {
        match occurrences.get(&sequence).copied().unwrap_or(0) {
            0 => problems.push(SequenceProblem {
                numbering_type,
                year,
                sequence,
                kind: ProblemKind::Gap,
                description: format!(
                    "sequence {sequence:04} was consumed by the counter but no filing carries it"
                ),
            }),
            1 => {}
            count => problems.push(SequenceProblem {
                numbering_type,
                year,
                sequence,
                kind: ProblemKind::Duplicate,
                description: format!("sequence {sequence:04} is carried by {count} filings"),
            }),
        }
    }
    problems
}

/// Aggregate validity report for an entity's filing year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceReport {
    /// The audited entity.
    pub entity_id: EntityId,
    /// The audited filing year.
    pub year: FilingYear,
    /// Number of persisted filings across both numbering regimes.
    pub total_filings: usize,
    /// Filings whose sequence value is represented exactly once within the
    /// watermark — the provably-correct portion.
    pub valid_filings: usize,
    /// Every defect found, ordered by numbering regime then sequence.
    pub problems: Vec<SequenceProblem>,
    /// `valid_filings / total_filings` as a percentage; 100 for an empty
    /// year.
    pub validity_percentage: f64,
}

/// Build the validity report for one entity-year from per-bucket snapshots.
///
/// A filing counts as valid when its sequence value lies within the
/// bucket's watermark and no other filing shares it. Filings in a bucket
/// with no counter row cannot be valid — the watermark is the authority.
pub fn build_report(
    entity_id: EntityId,
    year: FilingYear,
    buckets: &[BucketSnapshot],
) -> SequenceReport {
    let mut total_filings = 0;
    let mut valid_filings = 0;
    let mut problems = Vec::new();

    for bucket in buckets {
        total_filings += bucket.issued.len();

        let Some(last_sequence) = bucket.last_sequence else {
            continue;
        };

        let mut occurrences: HashMap<u32, u32> = HashMap::new();
        for &sequence in &bucket.issued {
            *occurrences.entry(sequence).or_insert(0) += 1;
        }
        valid_filings += occurrences
            .iter()
            .filter(|(&sequence, &count)| {
                count == 1 && (1..=last_sequence).contains(&sequence)
            })
            .count();

        problems.extend(detect_problems(
            bucket.numbering_type,
            year,
            last_sequence,
            &bucket.issued,
        ));
    }

    let validity_percentage = if total_filings == 0 {
        100.0
    } else {
        (valid_filings as f64 / total_filings as f64) * 100.0
    };

    SequenceReport {
        entity_id,
        year,
        total_filings,
        valid_filings,
        problems,
        validity_percentage,
    }
}

//! # Analysis Report
//!
//! Structured output of the conflict/collision engine.
//!
//! The report is plain data: per-member conflict records, per-band
//! collision records, and per-band metrics. Absence of an entry always
//! means "clean"; every accessor is safe to call with any id.

use crate::model::{BandId, BandMeta, MemberId};
use crate::roles::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why an assignment violates the concurrency policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictReason {
    /// Concurrency is disabled and the member holds more than one slot.
    DuplicateAssignment,
    /// The member's skill at this assignment's role is below the floor.
    InsufficientLevel {
        /// The configured minimum level.
        required: u8,
    },
    /// The member holds more slots than the configured maximum.
    TooManyAssignments {
        /// The configured maximum.
        max: u8,
    },
}

impl ConflictReason {
    /// Short human-readable description for badges and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            ConflictReason::DuplicateAssignment => String::from("duplicate assignment"),
            ConflictReason::InsufficientLevel { required } => {
                format!("insufficient level for concurrency (Lv{required} required)")
            }
            ConflictReason::TooManyAssignments { max } => {
                format!("concurrency limit exceeded (max {max})")
            }
        }
    }
}

/// One flagged assignment, cross-referenced to one co-assigned band.
///
/// A member assigned to three bands with two violations yields several
/// of these: one per (flagged assignment, other band) pair, so the
/// presentation layer can annotate each slot with the bands it clashes
/// with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// The band holding the flagged assignment.
    pub band: BandId,
    /// The role of the flagged assignment.
    pub role: Role,
    /// Another band the same member is assigned to.
    pub other_band: BandId,
    /// Cosmetic metadata of the other band, when it carries any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_meta: Option<BandMeta>,
    /// Why the assignment is flagged.
    pub reason: ConflictReason,
}

/// A new band recreating a previously-seen lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collision {
    /// The historical band the lineup overlaps with.
    pub historical_band: BandId,
    /// Cosmetic metadata of the historical band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BandMeta>,
    /// The overlapping members, sorted by id.
    pub members: Vec<MemberId>,
}

/// Derived metrics for one new band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandMetrics {
    /// Filled slots whose member appears in the conflict index.
    pub duplicate_count: usize,
    /// Max minus min of the at-assigned-role skill levels; 0 when fewer
    /// than two levels exist.
    pub skill_gap: u8,
}

/// The complete analysis report.
///
/// Deterministic given identical inputs; re-derivable at any time from
/// the current state with no engine-side memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Flagged assignments per member. Members without entries are clean.
    pub conflicts: BTreeMap<MemberId, Vec<Conflict>>,
    /// Collision records per new band. Bands without entries are clean.
    pub collisions: BTreeMap<BandId, Vec<Collision>>,
    /// Metrics per new band.
    pub metrics: BTreeMap<BandId, BandMetrics>,
}

impl Report {
    /// Flagged assignments for `member`; empty when clean or unknown.
    #[must_use]
    pub fn conflicts_for(&self, member: MemberId) -> &[Conflict] {
        self.conflicts.get(&member).map_or(&[], Vec::as_slice)
    }

    /// Collision records for `band`; empty when clean or unknown.
    #[must_use]
    pub fn collisions_for(&self, band: BandId) -> &[Collision] {
        self.collisions.get(&band).map_or(&[], Vec::as_slice)
    }

    /// Metrics for `band`; zeroed when unknown.
    #[must_use]
    pub fn metrics_for(&self, band: BandId) -> BandMetrics {
        self.metrics.get(&band).copied().unwrap_or_default()
    }

    /// Whether `member` has any flagged assignment.
    #[must_use]
    pub fn is_conflicted(&self, member: MemberId) -> bool {
        !self.conflicts_for(member).is_empty()
    }

    /// Whether the report contains no findings at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.collisions.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_are_safe_for_unknown_ids() {
        let report = Report::default();
        assert!(report.conflicts_for(MemberId(99)).is_empty());
        assert!(report.collisions_for(BandId(99)).is_empty());
        assert_eq!(report.metrics_for(BandId(99)), BandMetrics::default());
        assert!(!report.is_conflicted(MemberId(99)));
        assert!(report.is_clean());
    }

    #[test]
    fn reason_descriptions_name_the_threshold() {
        let reason = ConflictReason::InsufficientLevel { required: 5 };
        assert!(reason.describe().contains("Lv5"));

        let reason = ConflictReason::TooManyAssignments { max: 2 };
        assert!(reason.describe().contains("max 2"));
    }
}

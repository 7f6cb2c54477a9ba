//! # Concurrency Policy
//!
//! Tunable thresholds consumed by the analysis engine.
//!
//! Out-of-range values are clamped to their documented bounds, never
//! rejected. Clamping happens both on construction and after
//! deserialization, so a snapshot with bad values still loads.

use serde::{Deserialize, Serialize};

/// Lower bound for `max_assignments`.
pub const MIN_MAX_ASSIGNMENTS: u8 = 2;
/// Upper bound for `max_assignments`.
pub const MAX_MAX_ASSIGNMENTS: u8 = 10;
/// Lower bound for `min_collision_threshold`.
pub const MIN_COLLISION_THRESHOLD: u8 = 2;
/// Upper bound for `min_collision_threshold` (a band has at most 6 slots;
/// the cap only guards against nonsense input).
pub const MAX_COLLISION_THRESHOLD: u8 = 16;
/// Skill levels run from 1 to 5 inclusive.
pub const MIN_SKILL_LEVEL: u8 = 1;
/// Skill levels run from 1 to 5 inclusive.
pub const MAX_SKILL_LEVEL: u8 = 5;

/// The concurrency policy for new-band assignments.
///
/// Process-wide configuration: loaded once, mutable via a settings
/// command, persisted as a single opaque blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    /// Whether one member may fill slots in more than one new band.
    pub allow_concurrent: bool,
    /// Minimum skill level (at the assignment's own role) required for
    /// a concurrent assignment.
    pub concurrent_min_level: u8,
    /// Maximum number of new-band assignments per member.
    pub max_assignments: u8,
    /// Minimum member overlap with one historical band before a
    /// collision is reported.
    pub min_collision_threshold: u8,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allow_concurrent: true,
            concurrent_min_level: 5,
            max_assignments: 2,
            min_collision_threshold: 3,
        }
    }
}

impl Policy {
    /// Build a policy from raw values, clamping each to its bounds.
    #[must_use]
    pub fn new(
        allow_concurrent: bool,
        concurrent_min_level: u8,
        max_assignments: u8,
        min_collision_threshold: u8,
    ) -> Self {
        Self {
            allow_concurrent,
            concurrent_min_level,
            max_assignments,
            min_collision_threshold,
        }
        .clamped()
    }

    /// Return a copy with every field clamped to its documented bounds.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            allow_concurrent: self.allow_concurrent,
            concurrent_min_level: self
                .concurrent_min_level
                .clamp(MIN_SKILL_LEVEL, MAX_SKILL_LEVEL),
            max_assignments: self
                .max_assignments
                .clamp(MIN_MAX_ASSIGNMENTS, MAX_MAX_ASSIGNMENTS),
            min_collision_threshold: self
                .min_collision_threshold
                .clamp(MIN_COLLISION_THRESHOLD, MAX_COLLISION_THRESHOLD),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

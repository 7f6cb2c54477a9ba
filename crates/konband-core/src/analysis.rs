//! # Conflict & Collision Engine
//!
//! Pure analysis over the assignment model plus policy parameters.
//!
//! `analyze` is deterministic, side-effect-free, and infallible: it is
//! re-run from scratch after every mutation and holds no incremental
//! state. Slot iteration order never changes which findings exist, only
//! the (already deterministic) ordering of the result lists.
//!
//! A slot referencing a nonexistent member is a data-integrity bug in
//! the caller; the engine treats it as "no member" and keeps going.

use crate::model::{AppState, BandId, MemberId};
use crate::policy::Policy;
use crate::report::{BandMetrics, Collision, Conflict, ConflictReason, Report};
use crate::roles::Role;
use std::collections::{BTreeMap, BTreeSet};

/// One (band, role) assignment of a member within the new bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Assignment {
    band: BandId,
    role: Role,
}

/// Run the full analysis over the current state.
///
/// This is the single entry point the host invokes after every
/// mutation. The policy is clamped defensively so a caller bypassing
/// the settings path still gets bounded thresholds.
#[must_use]
pub fn analyze(state: &AppState, policy: &Policy) -> Report {
    let policy = policy.clamped();

    let assignments = collect_assignments(state);
    let conflicts = classify_conflicts(state, &policy, &assignments);
    let collisions = detect_collisions(state, &policy);
    let metrics = compute_metrics(state, &conflicts);

    Report {
        conflicts,
        collisions,
        metrics,
    }
}

// =============================================================================
// STEP 1 - PER-MEMBER ASSIGNMENT LISTS
// =============================================================================

/// Group every filled new-band slot by member, in band then role order.
fn collect_assignments(state: &AppState) -> BTreeMap<MemberId, Vec<Assignment>> {
    let mut assignments: BTreeMap<MemberId, Vec<Assignment>> = BTreeMap::new();
    for band in &state.new_bands {
        for (role, member) in &band.slots {
            assignments.entry(*member).or_default().push(Assignment {
                band: band.id,
                role: *role,
            });
        }
    }
    assignments
}

// =============================================================================
// STEP 2 - CONFLICT CLASSIFICATION
// =============================================================================

/// Classify each assignment of every over-assigned member.
///
/// Pass/fail is evaluated independently per assignment: the level floor
/// applies to the skill at that assignment's own role, not to the
/// member's whole skill set. A member who clears the floor on every
/// assigned role and stays within the count limit produces no record.
fn classify_conflicts(
    state: &AppState,
    policy: &Policy,
    assignments: &BTreeMap<MemberId, Vec<Assignment>>,
) -> BTreeMap<MemberId, Vec<Conflict>> {
    let mut conflicts: BTreeMap<MemberId, Vec<Conflict>> = BTreeMap::new();

    for (member_id, entries) in assignments {
        if entries.len() < 2 {
            continue;
        }
        let Some(member) = state.member(*member_id) else {
            continue;
        };

        for (index, entry) in entries.iter().enumerate() {
            let reason = if !policy.allow_concurrent {
                Some(ConflictReason::DuplicateAssignment)
            } else if member.skill_at(entry.role).unwrap_or(0) < policy.concurrent_min_level {
                Some(ConflictReason::InsufficientLevel {
                    required: policy.concurrent_min_level,
                })
            } else if entries.len() > usize::from(policy.max_assignments) {
                Some(ConflictReason::TooManyAssignments {
                    max: policy.max_assignments,
                })
            } else {
                None
            };

            let Some(reason) = reason else {
                continue;
            };

            // One record per other co-assigned band, so the slot badge can
            // point at every band it clashes with.
            for (other_index, other) in entries.iter().enumerate() {
                if other_index == index {
                    continue;
                }
                conflicts.entry(*member_id).or_default().push(Conflict {
                    band: entry.band,
                    role: entry.role,
                    other_band: other.band,
                    other_meta: state.band(other.band).and_then(|band| band.meta.clone()),
                    reason: reason.clone(),
                });
            }
        }
    }

    conflicts
}

// =============================================================================
// STEP 3 - HISTORICAL COLLISION DETECTION
// =============================================================================

/// Find new bands that recreate a historical lineup above the threshold.
fn detect_collisions(state: &AppState, policy: &Policy) -> BTreeMap<BandId, Vec<Collision>> {
    let threshold = usize::from(policy.min_collision_threshold);

    // Reverse index: member -> the historical bands it appeared in.
    let mut past_bands: BTreeMap<MemberId, BTreeSet<BandId>> = BTreeMap::new();
    for band in &state.historical_bands {
        for member in band.slots.values() {
            past_bands.entry(*member).or_default().insert(band.id);
        }
    }

    let mut collisions: BTreeMap<BandId, Vec<Collision>> = BTreeMap::new();
    for band in &state.new_bands {
        // Fewer filled slots than the threshold cannot collide at all.
        if band.filled_slots() < threshold {
            continue;
        }

        let lineup: BTreeSet<MemberId> = band.slots.values().copied().collect();
        let mut overlap: BTreeMap<BandId, Vec<MemberId>> = BTreeMap::new();
        for member in &lineup {
            if let Some(historical) = past_bands.get(member) {
                for historical_id in historical {
                    overlap.entry(*historical_id).or_default().push(*member);
                }
            }
        }

        // Every qualifying historical band is reported, not just the first.
        for (historical_id, members) in overlap {
            if members.len() >= threshold {
                collisions.entry(band.id).or_default().push(Collision {
                    historical_band: historical_id,
                    meta: state.band(historical_id).and_then(|b| b.meta.clone()),
                    members,
                });
            }
        }
    }

    collisions
}

// =============================================================================
// STEP 4 - PER-BAND METRICS
// =============================================================================

/// Duplicate counts and skill gaps for every new band.
fn compute_metrics(
    state: &AppState,
    conflicts: &BTreeMap<MemberId, Vec<Conflict>>,
) -> BTreeMap<BandId, BandMetrics> {
    let mut metrics = BTreeMap::new();
    for band in &state.new_bands {
        let duplicate_count = band
            .slots
            .values()
            .filter(|member| conflicts.contains_key(*member))
            .count();

        let levels: Vec<u8> = band
            .slots
            .iter()
            .filter_map(|(role, member)| {
                state
                    .member(*member)
                    .and_then(|member| member.skill_at(*role))
            })
            .collect();
        let skill_gap = if levels.len() < 2 {
            0
        } else {
            let max = levels.iter().copied().max().unwrap_or(0);
            let min = levels.iter().copied().min().unwrap_or(0);
            max - min
        };

        metrics.insert(
            band.id,
            BandMetrics {
                duplicate_count,
                skill_gap,
            },
        );
    }
    metrics
}

// =============================================================================
// TESTS
// =============================================================================

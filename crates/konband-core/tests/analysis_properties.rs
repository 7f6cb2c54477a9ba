//! Property tests for the conflict/collision engine.
//!
//! Random states are built through the session command layer, so these
//! also exercise the mutation paths the host uses.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use konband_core::{AppState, BandId, MemberId, Policy, Role, Session, analyze};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn arb_role() -> impl Strategy<Value = Role> {
    (0usize..Role::ALL.len()).prop_map(|index| Role::ALL[index])
}

fn arb_skills() -> impl Strategy<Value = BTreeMap<Role, u8>> {
    prop::collection::btree_map(arb_role(), 1u8..=5, 0..=6)
}

prop_compose! {
    fn arb_policy()(
        allow in any::<bool>(),
        level in 0u8..8,
        max in 0u8..13,
        threshold in 0u8..20,
    ) -> Policy {
        Policy::new(allow, level, max, threshold)
    }
}

/// A randomly-populated session: members with random skill sets, random
/// band count, and a pile of fill attempts (invalid ones are ignored,
/// exactly as an interactive host would ignore a rejected drop).
fn arb_session() -> impl Strategy<Value = Session> {
    (
        prop::collection::vec(arb_skills(), 0..8),
        1usize..=6,
        0usize..=3,
        prop::collection::vec((0usize..16, 0usize..6, 0usize..8), 0..40),
    )
        .prop_map(|(skill_sets, band_count, historical_count, fills)| {
            let mut session = Session::new();
            session.set_band_count(band_count);
            let members: Vec<MemberId> = skill_sets
                .into_iter()
                .enumerate()
                .map(|(index, skills)| session.add_member(format!("m{index}"), skills, None))
                .collect();
            for _ in 0..historical_count {
                session.add_historical_band();
            }
            if members.is_empty() {
                return session;
            }

            let bands: Vec<BandId> = session
                .state()
                .new_bands
                .iter()
                .chain(session.state().historical_bands.iter())
                .map(|band| band.id)
                .collect();
            for (band_index, role_index, member_index) in fills {
                let band = bands[band_index % bands.len()];
                let role = Role::ALL[role_index];
                let member = members[member_index % members.len()];
                // Rejected fills (member cannot play the role) are dropped.
                let _ = session.fill_slot(band, role, member);
            }
            session
        })
}

fn new_band_assignments(state: &AppState, member: MemberId) -> Vec<(BandId, Role)> {
    state
        .new_bands
        .iter()
        .flat_map(|band| {
            band.slots
                .iter()
                .filter(move |(_, occupant)| **occupant == member)
                .map(move |(role, _)| (band.id, *role))
        })
        .collect()
}

proptest! {
    #[test]
    fn members_with_at_most_one_assignment_never_conflict(
        session in arb_session(),
        policy in arb_policy(),
    ) {
        let report = analyze(session.state(), &policy);
        for member in session.state().members.keys() {
            if new_band_assignments(session.state(), *member).len() <= 1 {
                prop_assert!(!report.is_conflicted(*member));
            }
        }
    }

    #[test]
    fn concurrency_disabled_flags_every_assignment_of_over_assigned_members(
        session in arb_session(),
        mut policy in arb_policy(),
    ) {
        policy.allow_concurrent = false;
        let report = analyze(session.state(), &policy);

        for member in session.state().members.keys() {
            let assignments = new_band_assignments(session.state(), *member);
            if assignments.len() < 2 {
                continue;
            }
            let flagged: BTreeSet<(BandId, Role)> = report
                .conflicts_for(*member)
                .iter()
                .map(|conflict| (conflict.band, conflict.role))
                .collect();
            let expected: BTreeSet<(BandId, Role)> = assignments.into_iter().collect();
            prop_assert_eq!(flagged, expected);
        }
    }

    #[test]
    fn concurrency_gate_is_pass_fail_per_member(
        session in arb_session(),
        mut policy in arb_policy(),
    ) {
        policy.allow_concurrent = true;
        let policy = policy.clamped();
        let report = analyze(session.state(), &policy);

        for (id, member) in &session.state().members {
            let assignments = new_band_assignments(session.state(), *id);
            if assignments.len() < 2 {
                continue;
            }
            let every_level_ok = assignments.iter().all(|(_, role)| {
                member.skill_at(*role).unwrap_or(0) >= policy.concurrent_min_level
            });
            let within_limit = assignments.len() <= usize::from(policy.max_assignments);

            if every_level_ok && within_limit {
                prop_assert!(!report.is_conflicted(*id));
            } else {
                prop_assert!(report.is_conflicted(*id));
            }
        }
    }

    #[test]
    fn under_threshold_bands_never_collide(
        session in arb_session(),
        policy in arb_policy(),
    ) {
        let policy = policy.clamped();
        let report = analyze(session.state(), &policy);
        for band in &session.state().new_bands {
            if band.filled_slots() < usize::from(policy.min_collision_threshold) {
                prop_assert!(report.collisions_for(band.id).is_empty());
            }
        }
    }

    #[test]
    fn collision_members_are_a_subset_of_the_lineup(
        session in arb_session(),
        policy in arb_policy(),
    ) {
        let report = analyze(session.state(), &policy);
        for band in &session.state().new_bands {
            let lineup: BTreeSet<MemberId> = band.slots.values().copied().collect();
            for collision in report.collisions_for(band.id) {
                prop_assert!(
                    collision.members.len() >= usize::from(policy.clamped().min_collision_threshold)
                );
                for member in &collision.members {
                    prop_assert!(lineup.contains(member));
                }
            }
        }
    }

    #[test]
    fn policy_values_are_always_within_bounds(policy in arb_policy()) {
        prop_assert!((1..=5).contains(&policy.concurrent_min_level));
        prop_assert!((2..=10).contains(&policy.max_assignments));
        prop_assert!(policy.min_collision_threshold >= 2);
    }

    #[test]
    fn skill_gap_is_invariant_under_swapping_identical_members(
        skills in arb_skills().prop_filter("need two playable roles", |s| s.len() >= 2),
        extras in prop::collection::vec(arb_skills(), 0..4),
    ) {
        let mut session = Session::new();
        let twin_a = session.add_member("twin-a", skills.clone(), None);
        let twin_b = session.add_member("twin-b", skills.clone(), None);
        let extra_members: Vec<MemberId> = extras
            .iter()
            .enumerate()
            .map(|(index, extra)| session.add_member(format!("x{index}"), extra.clone(), None))
            .collect();

        let band = session.state().new_bands[0].id;
        let roles: Vec<Role> = skills.keys().copied().collect();
        session.fill_slot(band, roles[0], twin_a).unwrap();
        session.fill_slot(band, roles[1], twin_b).unwrap();
        for (index, member) in extra_members.iter().enumerate() {
            if let Some(extra) = extras.get(index) {
                if let Some(role) = extra.keys().find(|role| !roles[..2].contains(*role)) {
                    let _ = session.fill_slot(band, *role, *member);
                }
            }
        }

        let before = analyze(session.state(), &Policy::default()).metrics_for(band).skill_gap;
        session
            .swap_slots((band, roles[0]), (band, roles[1]))
            .unwrap();
        let after = analyze(session.state(), &Policy::default()).metrics_for(band).skill_gap;
        prop_assert_eq!(before, after);
    }

    #[test]
    fn analysis_never_panics_on_dangling_references(
        session in arb_session(),
        policy in arb_policy(),
        victim_index in 0usize..8,
    ) {
        let mut session = session;
        let members: Vec<MemberId> = session.state().members.keys().copied().collect();
        if !members.is_empty() {
            // Deleting cascades, so analysis after deletion stays clean too.
            let victim = members[victim_index % members.len()];
            session.delete_member(victim).unwrap();
            let report = analyze(session.state(), &policy);
            prop_assert!(!report.is_conflicted(victim));
        }
        let _ = analyze(session.state(), &policy);
    }
}

//! # State Snapshot
//!
//! The full-state bundle used for export/import and peer replication.
//!
//! One serde document carries the roster, both band collections, the
//! band count, and the policy settings. Every field except the roster
//! and bands is optional on the way in: a partial document still loads,
//! with documented defaults filled in.

use crate::model::{AppState, Band, Member};
use crate::policy::Policy;
use serde::{Deserialize, Serialize};

/// Snapshot format version, bumped on breaking layout changes.
pub const SNAPSHOT_FORMAT: u32 = 1;

fn default_format() -> u32 {
    SNAPSHOT_FORMAT
}

/// The complete exportable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Format version of this document.
    #[serde(default = "default_format")]
    pub format: u32,
    /// The member roster.
    #[serde(default)]
    pub members: Vec<Member>,
    /// The proposed bands.
    #[serde(default)]
    pub bands: Vec<Band>,
    /// The historical bands.
    #[serde(default)]
    pub current_bands: Vec<Band>,
    /// Configured proposed-band count. Defaults to `bands.len()` when
    /// absent, then gets clamped on restore.
    #[serde(default)]
    pub band_count: Option<usize>,
    /// Policy settings; missing fields take their documented defaults.
    #[serde(default)]
    pub settings: Policy,
}

impl Snapshot {
    /// Capture the current state and policy.
    #[must_use]
    pub fn capture(state: &AppState, policy: Policy) -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            members: state.members.values().cloned().collect(),
            bands: state.new_bands.clone(),
            current_bands: state.historical_bands.clone(),
            band_count: Some(state.band_count),
            settings: policy,
        }
    }

    /// Rebuild state and policy from the snapshot.
    ///
    /// Ids are preserved; id counters restart past the highest imported
    /// id. Out-of-range counts and policy values are clamped silently.
    #[must_use]
    pub fn into_parts(self) -> (AppState, Policy) {
        let band_count = self.band_count.unwrap_or(self.bands.len().max(1));
        let state = AppState::from_parts(self.members, self.bands, self.current_bands, band_count);
        (state, self.settings.clamped())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use std::collections::BTreeMap;

    #[test]
    fn capture_then_restore_round_trips() {
        let mut state = AppState::new();
        let member = state.add_member(
            "Aki",
            BTreeMap::from([(Role::Vocal, 5), (Role::Bass, 3)]),
            Some(Role::Vocal),
        );
        let historical = state.add_historical_band();
        if let Some(band) = state.band_mut(historical) {
            band.slots.insert(Role::Vocal, member);
        }
        let policy = Policy::new(false, 4, 3, 2);

        let snapshot = Snapshot::capture(&state, policy);
        let (restored, restored_policy) = snapshot.into_parts();

        assert_eq!(restored, state);
        assert_eq!(restored_policy, policy);
    }

    #[test]
    fn band_count_defaults_to_band_list_length() {
        let mut state = AppState::new();
        state.set_band_count(4);
        let mut snapshot = Snapshot::capture(&state, Policy::default());
        snapshot.band_count = None;

        let (restored, _) = snapshot.into_parts();
        assert_eq!(restored.band_count, 4);
        assert_eq!(restored.new_bands.len(), 4);
    }

    #[test]
    fn restore_clamps_band_count_and_policy() {
        let state = AppState::new();
        let mut snapshot = Snapshot::capture(&state, Policy::default());
        snapshot.band_count = Some(99);
        snapshot.settings.max_assignments = 99;

        let (restored, policy) = snapshot.into_parts();
        assert_eq!(restored.band_count, crate::model::MAX_BAND_COUNT);
        assert_eq!(policy.max_assignments, crate::policy::MAX_MAX_ASSIGNMENTS);
    }
}

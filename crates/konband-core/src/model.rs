//! # Assignment Model
//!
//! Members, bands, and the application state the engine analyzes.
//!
//! All keyed collections use `BTreeMap` for deterministic ordering.
//! Identifiers come from monotonic counters, never from wall clock or
//! randomness, so two sessions replaying the same commands produce
//! identical state.

use crate::policy::{MAX_SKILL_LEVEL, MIN_SKILL_LEVEL};
use crate::roles::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque member identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct MemberId(pub u64);

/// Opaque band identifier, unique across new and historical bands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct BandId(pub u64);

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m{}", self.0)
    }
}

impl std::fmt::Display for BandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "b{}", self.0)
    }
}

// =============================================================================
// BAND COUNT BOUNDS
// =============================================================================

/// Minimum number of new bands.
pub const MIN_BAND_COUNT: usize = 1;
/// Maximum number of new bands.
pub const MAX_BAND_COUNT: usize = 10;
/// Number of new bands in a fresh state.
pub const DEFAULT_BAND_COUNT: usize = 3;

// =============================================================================
// MEMBER
// =============================================================================

/// A person with per-role skill levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique identifier.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Skill level (1-5) per role. A role absent from the map means the
    /// member cannot perform it.
    pub skills: BTreeMap<Role, u8>,
    /// Preferred role, if any. Always one of the skill roles.
    pub main_role: Option<Role>,
}

impl Member {
    /// Skill level at `role`, or `None` if the member cannot perform it.
    #[must_use]
    pub fn skill_at(&self, role: Role) -> Option<u8> {
        self.skills.get(&role).copied()
    }

    /// Whether the member can perform `role` at all.
    #[must_use]
    pub fn can_play(&self, role: Role) -> bool {
        self.skills.contains_key(&role)
    }

    /// The skill role with the highest level, first in role order on ties.
    #[must_use]
    pub fn strongest_role(&self) -> Option<Role> {
        let best = self.skills.values().copied().max()?;
        Role::ALL
            .into_iter()
            .find(|role| self.skills.get(role) == Some(&best))
    }
}

/// Drop skill entries outside the 1-5 range.
///
/// Mirrors form entry and tabular import: an out-of-range value means
/// "no skill for that role", not an error.
#[must_use]
pub fn sanitize_skills(skills: BTreeMap<Role, u8>) -> BTreeMap<Role, u8> {
    skills
        .into_iter()
        .filter(|(_, level)| (MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL).contains(level))
        .collect()
}

// =============================================================================
// BAND
// =============================================================================

/// Cosmetic metadata carried by historical bands.
///
/// Used purely for display and grouping labels; analysis only echoes it
/// back so the presentation layer can say "conflicts with band X".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandMeta {
    /// Display name.
    pub name: String,
    /// CSS-style hex color.
    pub color: String,
    /// Single-glyph label.
    pub glyph: String,
}

/// Color palette cycled when creating historical bands.
pub const COLOR_PALETTE: [&str; 10] = [
    "#ff7675", "#74b9ff", "#55efc4", "#ffeaa7", "#a29bfe", "#fab1a0", "#fd79a8", "#fdcb6e",
    "#00cec9", "#d63031",
];

/// Glyph palette cycled when creating historical bands.
pub const GLYPH_PALETTE: [&str; 10] = ["🎸", "🎹", "🥁", "🎤", "🎷", "🎺", "🎻", "🌟", "🍀", "🔥"];

/// A role → member assignment grouping.
///
/// The same shape serves both collections: new bands (proposed lineups,
/// no metadata) and historical bands (past lineups with metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// Unique identifier.
    pub id: BandId,
    /// Cosmetic metadata; present on historical bands only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BandMeta>,
    /// Slot map. An absent role is an empty slot; a role maps to at most
    /// one member.
    pub slots: BTreeMap<Role, MemberId>,
}

impl Band {
    /// Create an empty band with no metadata.
    #[must_use]
    pub fn new(id: BandId) -> Self {
        Self {
            id,
            meta: None,
            slots: BTreeMap::new(),
        }
    }

    /// The member filling `role`, if any.
    #[must_use]
    pub fn slot(&self, role: Role) -> Option<MemberId> {
        self.slots.get(&role).copied()
    }

    /// Number of filled slots.
    #[must_use]
    pub fn filled_slots(&self) -> usize {
        self.slots.len()
    }

    /// Clear every slot referencing `member`. Returns how many were cleared.
    pub fn clear_member(&mut self, member: MemberId) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, occupant| *occupant != member);
        before - self.slots.len()
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// The complete assignment state: roster, proposed bands, historical bands.
///
/// Owned by a single `Session`; the analysis engine takes it by shared
/// reference and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Member roster, keyed by id (registration order == id order).
    pub members: BTreeMap<MemberId, Member>,
    /// Proposed bands, always exactly `band_count` entries.
    pub new_bands: Vec<Band>,
    /// Historical bands, arbitrary count.
    pub historical_bands: Vec<Band>,
    /// Configured number of proposed bands.
    pub band_count: usize,
    next_member_id: u64,
    next_band_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create an empty state padded to the default band count.
    #[must_use]
    pub fn new() -> Self {
        let mut state = Self {
            members: BTreeMap::new(),
            new_bands: Vec::new(),
            historical_bands: Vec::new(),
            band_count: DEFAULT_BAND_COUNT,
            next_member_id: 0,
            next_band_id: 0,
        };
        state.ensure_band_count();
        state
    }

    // -------------------------------------------------------------------------
    // Roster
    // -------------------------------------------------------------------------

    /// Add a member. Out-of-range skill levels are dropped.
    pub fn add_member(
        &mut self,
        name: impl Into<String>,
        skills: BTreeMap<Role, u8>,
        main_role: Option<Role>,
    ) -> MemberId {
        let id = MemberId(self.next_member_id);
        self.next_member_id = self.next_member_id.saturating_add(1);

        let skills = sanitize_skills(skills);
        let main_role = main_role.filter(|role| skills.contains_key(role));
        self.members.insert(
            id,
            Member {
                id,
                name: name.into(),
                skills,
                main_role,
            },
        );
        id
    }

    /// Look up a member.
    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    /// Whether any member already carries `name` (exact match).
    #[must_use]
    pub fn has_member_named(&self, name: &str) -> bool {
        self.members.values().any(|member| member.name == name)
    }

    /// Replace a member's name, skills, and main role. Returns false if
    /// the member does not exist.
    pub fn edit_member(
        &mut self,
        id: MemberId,
        name: impl Into<String>,
        skills: BTreeMap<Role, u8>,
        main_role: Option<Role>,
    ) -> bool {
        let Some(member) = self.members.get_mut(&id) else {
            return false;
        };
        let skills = sanitize_skills(skills);
        member.name = name.into();
        member.main_role = main_role.filter(|role| skills.contains_key(role));
        member.skills = skills;
        true
    }

    /// Delete a member, clearing every slot that references it first.
    ///
    /// Returns false if the member does not exist. After this call no
    /// band, new or historical, holds a reference to the id.
    pub fn delete_member(&mut self, id: MemberId) -> bool {
        if !self.members.contains_key(&id) {
            return false;
        }
        for band in &mut self.new_bands {
            band.clear_member(id);
        }
        for band in &mut self.historical_bands {
            band.clear_member(id);
        }
        self.members.remove(&id);
        true
    }

    // -------------------------------------------------------------------------
    // Bands
    // -------------------------------------------------------------------------

    /// Set the proposed-band count (clamped to 1-10) and pad/trim the
    /// collection to match. Trimming drops the trailing bands wholesale.
    pub fn set_band_count(&mut self, count: usize) {
        self.band_count = count.clamp(MIN_BAND_COUNT, MAX_BAND_COUNT);
        self.ensure_band_count();
    }

    /// Pad or trim `new_bands` to exactly `band_count` entries.
    pub fn ensure_band_count(&mut self) {
        while self.new_bands.len() < self.band_count {
            let id = self.alloc_band_id();
            self.new_bands.push(Band::new(id));
        }
        self.new_bands.truncate(self.band_count);
    }

    /// Add a historical band, cycling the name/color/glyph palettes.
    pub fn add_historical_band(&mut self) -> BandId {
        let id = self.alloc_band_id();
        let index = self.historical_bands.len();
        self.historical_bands.push(Band {
            id,
            meta: Some(BandMeta {
                name: format!("Band {}", index + 1),
                color: COLOR_PALETTE[index % COLOR_PALETTE.len()].to_owned(),
                glyph: GLYPH_PALETTE[index % GLYPH_PALETTE.len()].to_owned(),
            }),
            slots: BTreeMap::new(),
        });
        id
    }

    /// Remove a historical band. Returns false if the id is not historical.
    pub fn remove_historical_band(&mut self, id: BandId) -> bool {
        let before = self.historical_bands.len();
        self.historical_bands.retain(|band| band.id != id);
        before != self.historical_bands.len()
    }

    /// Look up any band, new or historical.
    #[must_use]
    pub fn band(&self, id: BandId) -> Option<&Band> {
        self.new_bands
            .iter()
            .chain(self.historical_bands.iter())
            .find(|band| band.id == id)
    }

    /// Mutable band lookup across both collections.
    pub fn band_mut(&mut self, id: BandId) -> Option<&mut Band> {
        self.new_bands
            .iter_mut()
            .chain(self.historical_bands.iter_mut())
            .find(|band| band.id == id)
    }

    fn alloc_band_id(&mut self) -> BandId {
        let id = BandId(self.next_band_id);
        self.next_band_id = self.next_band_id.saturating_add(1);
        id
    }

    // -------------------------------------------------------------------------
    // Import support
    // -------------------------------------------------------------------------

    /// Rebuild a state from snapshot parts, preserving original ids.
    ///
    /// Counters restart past the highest imported id so later additions
    /// never collide.
    #[must_use]
    pub fn from_parts(
        members: Vec<Member>,
        new_bands: Vec<Band>,
        historical_bands: Vec<Band>,
        band_count: usize,
    ) -> Self {
        let next_member_id = members
            .iter()
            .map(|member| member.id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        let next_band_id = new_bands
            .iter()
            .chain(historical_bands.iter())
            .map(|band| band.id.0.saturating_add(1))
            .max()
            .unwrap_or(0);

        let mut state = Self {
            members: members.into_iter().map(|m| (m.id, m)).collect(),
            new_bands,
            historical_bands,
            band_count: band_count.clamp(MIN_BAND_COUNT, MAX_BAND_COUNT),
            next_member_id,
            next_band_id,
        };
        state.ensure_band_count();
        state
    }
}

// =============================================================================
// TESTS
// =============================================================================

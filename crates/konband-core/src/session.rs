//! # Session
//!
//! The single mutation point over the assignment state.
//!
//! A session owns the `AppState` and the `Policy` and exposes a closed
//! set of mutation commands. Every command leaves the state consistent;
//! the host re-runs `analyze()` after each one. The engine itself never
//! mutates anything.

use crate::analysis;
use crate::model::{AppState, BandId, MemberId};
use crate::policy::Policy;
use crate::report::Report;
use crate::roles::Role;
use crate::snapshot::Snapshot;
use std::collections::BTreeMap;
use thiserror::Error;

/// A slot address: which band, which role.
pub type SlotRef = (BandId, Role);

/// Failures of individual mutation commands.
///
/// None of these are fatal: the state is left untouched when a command
/// fails, and the host reports the failure to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The referenced band does not exist.
    #[error("unknown band: {0}")]
    UnknownBand(BandId),

    /// The referenced member does not exist.
    #[error("unknown member: {0}")]
    UnknownMember(MemberId),

    /// The member has no skill entry for the target role.
    #[error("member {member} cannot play {role}")]
    MemberLacksRole {
        /// The member being assigned.
        member: MemberId,
        /// The role it cannot fill.
        role: Role,
    },

    /// The source slot of a swap/move is empty.
    #[error("slot {role} of band {band} is empty")]
    EmptySlot {
        /// The band holding the empty slot.
        band: BandId,
        /// The empty role.
        role: Role,
    },

    /// Metadata edits apply to historical bands only.
    #[error("band {0} is not a historical band")]
    NotHistorical(BandId),
}

/// How a swap command resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Both occupants qualified for each other's role and were exchanged.
    Exchanged,
    /// The member moved; any previous occupant returned to the pool.
    Moved,
}

/// Owns the state and dispatches mutation commands.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: AppState,
    policy: Policy,
}

impl Session {
    /// Create a fresh session with default state and policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a session from previously persisted parts.
    #[must_use]
    pub fn from_parts(state: AppState, policy: Policy) -> Self {
        Self {
            state,
            policy: policy.clamped(),
        }
    }

    /// The current state, read-only.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The current policy.
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Re-run the engine from scratch on the current state.
    #[must_use]
    pub fn analyze(&self) -> Report {
        analysis::analyze(&self.state, &self.policy)
    }

    // -------------------------------------------------------------------------
    // Roster commands
    // -------------------------------------------------------------------------

    /// Add a member to the roster.
    pub fn add_member(
        &mut self,
        name: impl Into<String>,
        skills: BTreeMap<Role, u8>,
        main_role: Option<Role>,
    ) -> MemberId {
        self.state.add_member(name, skills, main_role)
    }

    /// Replace a member's name, skills, and main role.
    pub fn edit_member(
        &mut self,
        id: MemberId,
        name: impl Into<String>,
        skills: BTreeMap<Role, u8>,
        main_role: Option<Role>,
    ) -> Result<(), CommandError> {
        if self.state.edit_member(id, name, skills, main_role) {
            Ok(())
        } else {
            Err(CommandError::UnknownMember(id))
        }
    }

    /// Bulk-import tab-separated roster rows.
    pub fn import_roster(&mut self, input: &str) -> crate::import::ImportOutcome {
        crate::import::import_roster(&mut self.state, input)
    }

    /// Delete a member, cascading the clear of its slots first.
    pub fn delete_member(&mut self, id: MemberId) -> Result<(), CommandError> {
        if self.state.delete_member(id) {
            Ok(())
        } else {
            Err(CommandError::UnknownMember(id))
        }
    }

    // -------------------------------------------------------------------------
    // Band commands
    // -------------------------------------------------------------------------

    /// Set the proposed-band count (clamped 1-10).
    pub fn set_band_count(&mut self, count: usize) {
        self.state.set_band_count(count);
    }

    /// Add an empty historical band.
    pub fn add_historical_band(&mut self) -> BandId {
        self.state.add_historical_band()
    }

    /// Remove a historical band.
    pub fn remove_historical_band(&mut self, id: BandId) -> Result<(), CommandError> {
        if self.state.remove_historical_band(id) {
            Ok(())
        } else {
            Err(CommandError::UnknownBand(id))
        }
    }

    /// Rename a historical band or change its color/glyph.
    pub fn edit_band_meta(
        &mut self,
        id: BandId,
        name: Option<String>,
        color: Option<String>,
        glyph: Option<String>,
    ) -> Result<(), CommandError> {
        let band = self
            .state
            .band_mut(id)
            .ok_or(CommandError::UnknownBand(id))?;
        let meta = band.meta.as_mut().ok_or(CommandError::NotHistorical(id))?;
        if let Some(name) = name {
            meta.name = name;
        }
        if let Some(color) = color {
            meta.color = color;
        }
        if let Some(glyph) = glyph {
            meta.glyph = glyph;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Slot commands
    // -------------------------------------------------------------------------

    /// Assign a member to a slot, overwriting any previous occupant.
    ///
    /// The member must have a skill entry for the role.
    pub fn fill_slot(
        &mut self,
        band: BandId,
        role: Role,
        member: MemberId,
    ) -> Result<(), CommandError> {
        let can_play = self
            .state
            .member(member)
            .ok_or(CommandError::UnknownMember(member))?
            .can_play(role);
        if !can_play {
            return Err(CommandError::MemberLacksRole { member, role });
        }
        let target = self
            .state
            .band_mut(band)
            .ok_or(CommandError::UnknownBand(band))?;
        target.slots.insert(role, member);
        Ok(())
    }

    /// Empty a slot, returning the previous occupant.
    pub fn clear_slot(&mut self, band: BandId, role: Role) -> Result<Option<MemberId>, CommandError> {
        let target = self
            .state
            .band_mut(band)
            .ok_or(CommandError::UnknownBand(band))?;
        Ok(target.slots.remove(&role))
    }

    /// Move the occupant of `from` onto `to`.
    ///
    /// When `to` is occupied and both members can play each other's
    /// role, the two are exchanged. When the target occupant cannot play
    /// the source role, the move still happens and the occupant returns
    /// to the pool, matching the interactive drop behaviour.
    pub fn swap_slots(&mut self, from: SlotRef, to: SlotRef) -> Result<SwapOutcome, CommandError> {
        let (from_band, from_role) = from;
        let (to_band, to_role) = to;

        let moving = self
            .state
            .band(from_band)
            .ok_or(CommandError::UnknownBand(from_band))?
            .slot(from_role)
            .ok_or(CommandError::EmptySlot {
                band: from_band,
                role: from_role,
            })?;
        let occupant = self
            .state
            .band(to_band)
            .ok_or(CommandError::UnknownBand(to_band))?
            .slot(to_role);

        let moving_qualifies = self
            .state
            .member(moving)
            .is_some_and(|member| member.can_play(to_role));
        if !moving_qualifies {
            return Err(CommandError::MemberLacksRole {
                member: moving,
                role: to_role,
            });
        }

        let occupant_qualifies = occupant.is_some_and(|id| {
            self.state
                .member(id)
                .is_some_and(|member| member.can_play(from_role))
        });

        if let (Some(occupant), true) = (occupant, occupant_qualifies) {
            if let Some(band) = self.state.band_mut(from_band) {
                band.slots.insert(from_role, occupant);
            }
            if let Some(band) = self.state.band_mut(to_band) {
                band.slots.insert(to_role, moving);
            }
            return Ok(SwapOutcome::Exchanged);
        }

        if let Some(band) = self.state.band_mut(to_band) {
            band.slots.insert(to_role, moving);
        }
        // Self-move onto the same slot must not clear what was just placed.
        if from != to {
            if let Some(band) = self.state.band_mut(from_band) {
                if band.slot(from_role) == Some(moving) {
                    band.slots.remove(&from_role);
                }
            }
        }
        Ok(SwapOutcome::Moved)
    }

    // -------------------------------------------------------------------------
    // Policy and replication commands
    // -------------------------------------------------------------------------

    /// Replace the policy (values clamped silently).
    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy.clamped();
    }

    /// Replace the entire state from an inbound snapshot.
    ///
    /// Last snapshot wins: there is no merging with local edits.
    pub fn replace_state(&mut self, snapshot: Snapshot) {
        let (state, policy) = snapshot.into_parts();
        self.state = state;
        self.policy = policy;
    }

    /// Capture the full state as a snapshot for export or broadcast.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.policy)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(entries: &[(Role, u8)]) -> BTreeMap<Role, u8> {
        entries.iter().copied().collect()
    }

    #[test]
    fn fill_requires_the_role_skill() {
        let mut session = Session::new();
        let member = session.add_member("Aki", skills(&[(Role::Vocal, 4)]), None);
        let band = session.state().new_bands[0].id;

        assert_eq!(
            session.fill_slot(band, Role::Drums, member),
            Err(CommandError::MemberLacksRole {
                member,
                role: Role::Drums
            })
        );
        assert_eq!(session.fill_slot(band, Role::Vocal, member), Ok(()));
        assert_eq!(
            session.state().band(band).and_then(|b| b.slot(Role::Vocal)),
            Some(member)
        );
    }

    #[test]
    fn clear_returns_the_previous_occupant() {
        let mut session = Session::new();
        let member = session.add_member("Aki", skills(&[(Role::Vocal, 4)]), None);
        let band = session.state().new_bands[0].id;

        assert_eq!(session.fill_slot(band, Role::Vocal, member), Ok(()));
        assert_eq!(session.clear_slot(band, Role::Vocal), Ok(Some(member)));
        assert_eq!(session.clear_slot(band, Role::Vocal), Ok(None));
    }

    #[test]
    fn swap_exchanges_mutually_qualified_members() {
        let mut session = Session::new();
        let a = session.add_member("A", skills(&[(Role::Vocal, 4), (Role::Bass, 3)]), None);
        let b = session.add_member("B", skills(&[(Role::Vocal, 2), (Role::Bass, 5)]), None);
        let first = session.state().new_bands[0].id;
        let second = session.state().new_bands[1].id;
        assert_eq!(session.fill_slot(first, Role::Vocal, a), Ok(()));
        assert_eq!(session.fill_slot(second, Role::Bass, b), Ok(()));

        let outcome = session.swap_slots((first, Role::Vocal), (second, Role::Bass));
        assert_eq!(outcome, Ok(SwapOutcome::Exchanged));
        assert_eq!(
            session.state().band(first).and_then(|x| x.slot(Role::Vocal)),
            Some(b)
        );
        assert_eq!(
            session.state().band(second).and_then(|x| x.slot(Role::Bass)),
            Some(a)
        );
    }

    #[test]
    fn swap_displaces_an_unqualified_occupant() {
        let mut session = Session::new();
        let a = session.add_member("A", skills(&[(Role::Vocal, 4), (Role::Bass, 3)]), None);
        // B cannot sing, so it cannot take A's vocal slot.
        let b = session.add_member("B", skills(&[(Role::Bass, 5)]), None);
        let first = session.state().new_bands[0].id;
        let second = session.state().new_bands[1].id;
        assert_eq!(session.fill_slot(first, Role::Vocal, a), Ok(()));
        assert_eq!(session.fill_slot(second, Role::Bass, b), Ok(()));

        let outcome = session.swap_slots((first, Role::Vocal), (second, Role::Bass));
        assert_eq!(outcome, Ok(SwapOutcome::Moved));
        assert_eq!(
            session.state().band(first).and_then(|x| x.slot(Role::Vocal)),
            None
        );
        assert_eq!(
            session.state().band(second).and_then(|x| x.slot(Role::Bass)),
            Some(a)
        );
    }

    #[test]
    fn swap_from_empty_slot_fails() {
        let mut session = Session::new();
        let first = session.state().new_bands[0].id;
        let second = session.state().new_bands[1].id;
        let outcome = session.swap_slots((first, Role::Vocal), (second, Role::Bass));
        assert_eq!(
            outcome,
            Err(CommandError::EmptySlot {
                band: first,
                role: Role::Vocal
            })
        );
    }

    #[test]
    fn meta_edits_reject_new_bands() {
        let mut session = Session::new();
        let new_band = session.state().new_bands[0].id;
        assert_eq!(
            session.edit_band_meta(new_band, Some("X".into()), None, None),
            Err(CommandError::NotHistorical(new_band))
        );

        let historical = session.add_historical_band();
        assert_eq!(
            session.edit_band_meta(historical, Some("Old Crew".into()), None, None),
            Ok(())
        );
        let name = session
            .state()
            .band(historical)
            .and_then(|band| band.meta.as_ref())
            .map(|meta| meta.name.clone());
        assert_eq!(name, Some(String::from("Old Crew")));
    }

    #[test]
    fn replace_state_is_last_snapshot_wins() {
        let mut source = Session::new();
        source.add_member("Aki", skills(&[(Role::Vocal, 5)]), Some(Role::Vocal));
        source.set_policy(Policy::new(false, 4, 3, 2));
        let snapshot = source.snapshot();

        let mut target = Session::new();
        target.add_member("Local Edit", skills(&[(Role::Drums, 1)]), None);
        target.replace_state(snapshot);

        assert_eq!(target.state(), source.state());
        assert_eq!(target.policy(), source.policy());
    }
}

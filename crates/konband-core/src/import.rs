//! # Tabular Roster Import
//!
//! Parses rows of tab-separated values pasted out of a spreadsheet:
//! column 0 is the member name, columns 1..=6 the per-role skill levels
//! in catalog order, and an optional trailing column the main-role
//! label.
//!
//! Import is row-tolerant: incomplete rows and duplicate names are
//! skipped individually and the import continues. The outcome reports
//! how many rows were actually added.

use crate::model::{AppState, MemberId};
use crate::policy::{MAX_SKILL_LEVEL, MIN_SKILL_LEVEL};
use crate::roles::Role;
use std::collections::BTreeMap;

/// Result of one roster import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Members added, in row order.
    pub added: Vec<MemberId>,
    /// Rows skipped (incomplete, empty name, or duplicate name).
    pub skipped_rows: usize,
}

impl ImportOutcome {
    /// Number of rows actually added.
    #[must_use]
    pub fn added_count(&self) -> usize {
        self.added.len()
    }
}

/// Import tab-separated roster rows into the state.
///
/// A first row whose name column reads `name` (case-insensitive) is
/// treated as a header and skipped without counting.
pub fn import_roster(state: &mut AppState, input: &str) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();

    for (index, line) in input.lines().enumerate() {
        let cols: Vec<&str> = line.split('\t').map(str::trim).collect();

        if index == 0 && is_header(&cols) {
            continue;
        }
        if cols.len() < 2 {
            outcome.skipped_rows += 1;
            continue;
        }
        let name = cols[0];
        if name.is_empty() || state.has_member_named(name) {
            outcome.skipped_rows += 1;
            continue;
        }

        let skills = parse_skill_columns(&cols);
        let main_role = cols
            .get(7)
            .and_then(|label| Role::parse_label(label))
            .filter(|role| skills.contains_key(role))
            .or_else(|| strongest(&skills));

        let id = state.add_member(name, skills, main_role);
        outcome.added.push(id);
    }

    outcome
}

fn is_header(cols: &[&str]) -> bool {
    cols.first()
        .is_some_and(|first| first.eq_ignore_ascii_case("name"))
}

/// Columns 1..=6 in catalog order. Blank, `-`, non-numeric, and
/// out-of-1-5-range cells all mean "no skill for that role".
fn parse_skill_columns(cols: &[&str]) -> BTreeMap<Role, u8> {
    let mut skills = BTreeMap::new();
    for (offset, role) in Role::ALL.into_iter().enumerate() {
        let Some(cell) = cols.get(offset + 1) else {
            continue;
        };
        if cell.is_empty() || *cell == "-" {
            continue;
        }
        if let Ok(level) = cell.parse::<u8>() {
            if (MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL).contains(&level) {
                skills.insert(role, level);
            }
        }
    }
    skills
}

fn strongest(skills: &BTreeMap<Role, u8>) -> Option<Role> {
    let best = skills.values().copied().max()?;
    Role::ALL
        .into_iter()
        .find(|role| skills.get(role) == Some(&best))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_rows_with_skills_and_main_role() {
        let mut state = AppState::new();
        let input = "Aki\t5\t-\t\t3\t\t\tVo\nRen\t\t4\t4\t\t\t2\tdrums";
        let outcome = import_roster(&mut state, input);

        assert_eq!(outcome.added_count(), 2);
        assert_eq!(outcome.skipped_rows, 0);

        let aki = state.member(outcome.added[0]);
        assert_eq!(aki.and_then(|m| m.skill_at(Role::Vocal)), Some(5));
        assert_eq!(aki.and_then(|m| m.skill_at(Role::Bass)), Some(3));
        assert_eq!(aki.and_then(|m| m.skill_at(Role::RhythmGuitar)), None);
        assert_eq!(aki.and_then(|m| m.main_role), Some(Role::Vocal));

        // "drums" is a recognized label but Ren has no drum skill, so the
        // main role falls back to the highest-skill role.
        let ren = state.member(outcome.added[1]);
        assert_eq!(ren.and_then(|m| m.main_role), Some(Role::RhythmGuitar));
    }

    #[test]
    fn header_row_is_skipped_without_counting() {
        let mut state = AppState::new();
        let input = "Name\tVo\tBaGt\tLeGt\tBa\tDr\tKey\nAki\t5";
        let outcome = import_roster(&mut state, input);

        assert_eq!(outcome.added_count(), 1);
        assert_eq!(outcome.skipped_rows, 0);
    }

    #[test]
    fn bad_rows_are_skipped_individually() {
        let mut state = AppState::new();
        state.add_member("Aki", BTreeMap::from([(Role::Vocal, 5)]), None);

        // Duplicate name, too few columns, empty name, then a good row.
        let input = "Aki\t4\nsolo-column\n\t3\nRen\t\t\t\t2";
        let outcome = import_roster(&mut state, input);

        assert_eq!(outcome.added_count(), 1);
        assert_eq!(outcome.skipped_rows, 3);
        assert!(state.has_member_named("Ren"));
    }

    #[test]
    fn duplicates_within_one_batch_are_skipped() {
        let mut state = AppState::new();
        let input = "Aki\t5\nAki\t4";
        let outcome = import_roster(&mut state, input);

        assert_eq!(outcome.added_count(), 1);
        assert_eq!(outcome.skipped_rows, 1);
    }

    #[test]
    fn out_of_range_cells_mean_no_skill() {
        let mut state = AppState::new();
        let input = "Aki\t0\t6\tx\t5";
        let outcome = import_roster(&mut state, input);

        let aki = state.member(outcome.added[0]);
        assert_eq!(aki.and_then(|m| m.skill_at(Role::Vocal)), None);
        assert_eq!(aki.and_then(|m| m.skill_at(Role::RhythmGuitar)), None);
        assert_eq!(aki.and_then(|m| m.skill_at(Role::LeadGuitar)), None);
        assert_eq!(aki.and_then(|m| m.skill_at(Role::Bass)), Some(5));
        assert_eq!(aki.and_then(|m| m.main_role), Some(Role::Bass));
    }
}

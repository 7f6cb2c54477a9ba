//! # Role Catalog
//!
//! The fixed, closed set of musical roles a member can fill.
//!
//! Roles are never created or destroyed at runtime. Their declaration
//! order is the canonical display/sort order used everywhere else.

use serde::{Deserialize, Serialize};

/// A musical role slot in a band.
///
/// The variant order is the fixed total order used for display and
/// sorting. Serialized with the short wire codes (`Vo`, `BaGt`, ...)
/// so snapshots stay compact and stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Lead vocal.
    #[serde(rename = "Vo")]
    Vocal,
    /// Rhythm (backing) guitar.
    #[serde(rename = "BaGt")]
    RhythmGuitar,
    /// Lead guitar.
    #[serde(rename = "LeGt")]
    LeadGuitar,
    /// Bass guitar.
    #[serde(rename = "Ba")]
    Bass,
    /// Drums.
    #[serde(rename = "Dr")]
    Drums,
    /// Keyboard.
    #[serde(rename = "Key")]
    Keyboard,
}

impl Role {
    /// All roles in canonical order.
    pub const ALL: [Role; 6] = [
        Role::Vocal,
        Role::RhythmGuitar,
        Role::LeadGuitar,
        Role::Bass,
        Role::Drums,
        Role::Keyboard,
    ];

    /// Short wire code, also used as the column label in tabular import.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Role::Vocal => "Vo",
            Role::RhythmGuitar => "BaGt",
            Role::LeadGuitar => "LeGt",
            Role::Bass => "Ba",
            Role::Drums => "Dr",
            Role::Keyboard => "Key",
        }
    }

    /// Human-readable display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Vocal => "Vocal",
            Role::RhythmGuitar => "Rhythm Guitar",
            Role::LeadGuitar => "Lead Guitar",
            Role::Bass => "Bass",
            Role::Drums => "Drums",
            Role::Keyboard => "Keyboard",
        }
    }

    /// Normalize a free-text label to a canonical role.
    ///
    /// Accepts the wire codes plus a fixed synonym table (case-insensitive).
    /// Returns `None` for unrecognized labels.
    #[must_use]
    pub fn parse_label(label: &str) -> Option<Role> {
        match label.trim().to_ascii_lowercase().as_str() {
            "vo" | "vocal" | "vocals" => Some(Role::Vocal),
            "bagt" | "bg" | "rhythm" | "rhythm guitar" => Some(Role::RhythmGuitar),
            "legt" | "lg" | "lead" | "lead guitar" => Some(Role::LeadGuitar),
            "ba" | "bass" => Some(Role::Bass),
            "dr" | "drum" | "drums" => Some(Role::Drums),
            "key" | "kb" | "keys" | "keyboard" => Some(Role::Keyboard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_roles_are_distinct_and_ordered() {
        for window in Role::ALL.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn parse_label_accepts_codes_and_synonyms() {
        assert_eq!(Role::parse_label("Vo"), Some(Role::Vocal));
        assert_eq!(Role::parse_label("vocal"), Some(Role::Vocal));
        assert_eq!(Role::parse_label("bg"), Some(Role::RhythmGuitar));
        assert_eq!(Role::parse_label("lead"), Some(Role::LeadGuitar));
        assert_eq!(Role::parse_label(" BASS "), Some(Role::Bass));
        assert_eq!(Role::parse_label("drums"), Some(Role::Drums));
        assert_eq!(Role::parse_label("kb"), Some(Role::Keyboard));
    }

    #[test]
    fn parse_label_rejects_unknown() {
        assert_eq!(Role::parse_label("triangle"), None);
        assert_eq!(Role::parse_label(""), None);
    }

    #[test]
    fn codes_round_trip_through_parse() {
        for role in Role::ALL {
            assert_eq!(Role::parse_label(role.code()), Some(role));
        }
    }
}

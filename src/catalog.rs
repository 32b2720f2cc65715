//! Team catalog.
//!
//! An ordered, read-only list of teams that the pickers select from.
//! Built once from config (or the built-in defaults) and shared between
//! cards behind an `Arc`.

use std::collections::HashSet;

use crate::types::{MatchdayError, Team};

#[derive(Debug, Clone, Default)]
pub struct TeamCatalog {
    teams: Vec<Team>,
}

impl TeamCatalog {
    /// Build a catalog, rejecting duplicate ids. Order is preserved.
    pub fn new(teams: Vec<Team>) -> Result<Self, MatchdayError> {
        let mut seen = HashSet::new();
        for team in &teams {
            if !seen.insert(team.id) {
                return Err(MatchdayError::DuplicateTeam(team.id));
            }
        }
        Ok(Self { teams })
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn get(&self, id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Look up a team, erroring when the id is unknown.
    pub fn require(&self, id: u32) -> Result<&Team, MatchdayError> {
        self.get(id).ok_or(MatchdayError::TeamNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// The catalog used when config supplies no `[[teams]]`.
    pub fn builtin() -> Self {
        let raw: &[(u32, &str, &str, u32)] = &[
            (1, "Arsenal", "WWDWW", 1),
            (2, "Manchester City", "WDWWL", 2),
            (3, "Liverpool", "WWLDW", 3),
            (4, "Aston Villa", "DWWLW", 4),
            (5, "Tottenham", "LWWDL", 5),
            (6, "Chelsea", "WDLWD", 6),
            (7, "Newcastle", "DLWWW", 7),
            (8, "Manchester United", "LDLWW", 8),
        ];

        let teams = raw
            .iter()
            .map(|&(id, name, form, position)| Team {
                id,
                name: name.to_string(),
                logo: format!("/static/logos/{id}.png"),
                form: crate::types::FormResult::parse_sequence(form).unwrap_or_default(),
                position,
            })
            .collect();

        Self { teams }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

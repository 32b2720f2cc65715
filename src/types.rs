//! Shared types for MATCHDAY.
//!
//! Teams, matches, predictions and the domain error enum. These are the
//! passive records the prediction card reads; nothing here mutates state.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// A team from the catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    /// Badge image URL
    pub logo: String,
    /// Recent results, most-recent-last
    pub form: Vec<FormResult>,
    /// League rank (1 = top)
    pub position: u32,
}

impl Team {
    /// Build a team, parsing its form from a string such as `"WWDLW"`.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        logo: impl Into<String>,
        form: &str,
        position: u32,
    ) -> Result<Self, MatchdayError> {
        let name = name.into();
        if position == 0 {
            return Err(MatchdayError::InvalidPosition { team: name });
        }
        Ok(Self {
            id,
            name,
            logo: logo.into(),
            form: FormResult::parse_sequence(form)?,
            position,
        })
    }

    /// Form rendered back to its compact string, e.g. `"WDL"`.
    pub fn form_string(&self) -> String {
        self.form.iter().map(|r| r.as_char()).collect()
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}, form {})", self.name, self.position, self.form_string())
    }
}

/// A single recent result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl FormResult {
    pub fn as_char(&self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }

    /// Parse a compact form string. Whitespace is ignored.
    pub fn parse_sequence(form: &str) -> Result<Vec<Self>, MatchdayError> {
        form.chars()
            .filter(|c| !c.is_whitespace())
            .map(FormResult::try_from)
            .collect()
    }
}

impl TryFrom<char> for FormResult {
    type Error = MatchdayError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'W' => Ok(FormResult::Win),
            'D' => Ok(FormResult::Draw),
            'L' => Ok(FormResult::Loss),
            other => Err(MatchdayError::InvalidForm(other)),
        }
    }
}

impl fmt::Display for FormResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// A fixture. Home and away may be unset until the user picks them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub id: u32,
    /// Kickoff time-of-day; there is no calendar date attached.
    pub kickoff: NaiveTime,
    pub home: Option<Team>,
    pub away: Option<Team>,
}

impl Match {
    /// Build a match from an `"HH:MM"` kickoff string.
    pub fn new(
        id: u32,
        kickoff: &str,
        home: Option<Team>,
        away: Option<Team>,
    ) -> Result<Self, MatchdayError> {
        Ok(Self {
            id,
            kickoff: parse_kickoff(kickoff)?,
            home,
            away,
        })
    }
}

/// Parse an `"HH:MM"` time-of-day.
pub fn parse_kickoff(raw: &str) -> Result<NaiveTime, MatchdayError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| MatchdayError::InvalidKickoff(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which side of the card a picker or team belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Home,
    Away,
}

impl Slot {
    pub fn other(&self) -> Self {
        match self {
            Slot::Home => Slot::Away,
            Slot::Away => Slot::Home,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Home => write!(f, "home"),
            Slot::Away => write!(f, "away"),
        }
    }
}

/// Predicted match outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Home,
    Draw,
    Away,
}

impl Prediction {
    pub const ALL: &'static [Prediction] = &[Prediction::Home, Prediction::Draw, Prediction::Away];
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Home => write!(f, "home"),
            Prediction::Draw => write!(f, "draw"),
            Prediction::Away => write!(f, "away"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for MATCHDAY.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchdayError {
    #[error("Invalid kickoff time (expected HH:MM): {0}")]
    InvalidKickoff(String),

    #[error("Invalid form character: {0:?}")]
    InvalidForm(char),

    #[error("Invalid league position for {team}: must be at least 1")]
    InvalidPosition { team: String },

    #[error("Match {0} does not accept selections")]
    NotSelectable(u32),

    #[error("Team not found: {0}")]
    TeamNotFound(u32),

    #[error("Duplicate team id: {0}")]
    DuplicateTeam(u32),

    #[error("Match not found: {0}")]
    MatchNotFound(u32),

    #[error("Duplicate match id: {0}")]
    DuplicateMatch(u32),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The team catalog and fixture list live in the same file as
//! `[[teams]]` and `[[matches]]` tables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::time::Duration;

use crate::catalog::TeamCatalog;
use crate::types::{parse_kickoff, MatchdayError, Team};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub teams: Vec<TeamConfig>,
    #[serde(default)]
    pub matches: Vec<MatchConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
    #[serde(default)]
    pub log_json: bool,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "MATCHDAY".to_string(),
            log_json: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    /// Simulated round-trip before a submission resolves.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Share of simulated submissions that fail (0.0–1.0).
    #[serde(default)]
    pub failure_rate: f64,
}

fn default_delay_ms() -> u64 {
    1000
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            failure_rate: 0.0,
        }
    }
}

impl SubmissionConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TeamConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub logo: String,
    /// Compact W/D/L string, most-recent-last.
    #[serde(default)]
    pub form: String,
    pub position: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchConfig {
    pub id: u32,
    /// "HH:MM"
    pub kickoff: String,
    /// Catalog id of a pre-selected home team.
    pub home: Option<u32>,
    pub away: Option<u32>,
    #[serde(default = "default_selectable")]
    pub selectable: bool,
}

fn default_selectable() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config file: {path}"))
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(contents).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that would build a broken board.
    pub fn validate(&self) -> Result<(), MatchdayError> {
        if !(0.0..=1.0).contains(&self.submission.failure_rate) {
            return Err(MatchdayError::Config(format!(
                "submission.failure_rate must be within 0.0–1.0, got {}",
                self.submission.failure_rate
            )));
        }

        let catalog = self.catalog()?;

        let mut seen = HashSet::new();
        for m in &self.matches {
            if !seen.insert(m.id) {
                return Err(MatchdayError::DuplicateMatch(m.id));
            }
            parse_kickoff(&m.kickoff)?;
            for id in m.home.iter().chain(m.away.iter()) {
                catalog.require(*id)?;
            }
        }
        Ok(())
    }

    /// The configured catalog, or the built-in one when no teams are listed.
    pub fn catalog(&self) -> Result<TeamCatalog, MatchdayError> {
        if self.teams.is_empty() {
            return Ok(TeamCatalog::builtin());
        }
        let teams = self
            .teams
            .iter()
            .map(|t| Team::new(t.id, t.name.clone(), t.logo.clone(), &t.form, t.position))
            .collect::<Result<Vec<_>, _>>()?;
        TeamCatalog::new(teams)
    }
}

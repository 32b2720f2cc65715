//! Match board — the set of prediction cards shown together.
//!
//! Builds one independent card per configured fixture. Cards share the
//! catalog, submitter and sink but never share selection state.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::card::kickoff::Clock;
use crate::card::submission::PredictionSubmitter;
use crate::card::{CardView, PredictionCard};
use crate::catalog::TeamCatalog;
use crate::config::MatchConfig;
use crate::notify::NotificationSink;
use crate::types::{Match, MatchdayError};

#[derive(Debug)]
pub struct MatchBoard {
    catalog: Arc<TeamCatalog>,
    cards: Vec<Arc<PredictionCard>>,
}

impl MatchBoard {
    pub fn new(catalog: Arc<TeamCatalog>, cards: Vec<PredictionCard>) -> Result<Self, MatchdayError> {
        let mut seen = HashSet::new();
        for card in &cards {
            if !seen.insert(card.match_id()) {
                return Err(MatchdayError::DuplicateMatch(card.match_id()));
            }
        }
        Ok(Self {
            catalog,
            cards: cards.into_iter().map(Arc::new).collect(),
        })
    }

    /// Build cards from the `[[matches]]` config.
    pub fn from_config(
        matches: &[MatchConfig],
        catalog: Arc<TeamCatalog>,
        submitter: Arc<dyn PredictionSubmitter>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, MatchdayError> {
        let mut cards = Vec::with_capacity(matches.len());
        for m in matches {
            let home = m.home.map(|id| catalog.require(id).cloned()).transpose()?;
            let away = m.away.map(|id| catalog.require(id).cloned()).transpose()?;
            let fixture = Match::new(m.id, &m.kickoff, home, away)?;
            let card = PredictionCard::new(fixture, catalog.clone(), submitter.clone(), sink.clone())
                .with_selectable(m.selectable);
            cards.push(card);
        }

        let board = Self::new(catalog, cards)?;
        info!(cards = board.len(), teams = board.catalog.len(), "Match board built");
        Ok(board)
    }

    pub fn catalog(&self) -> &TeamCatalog {
        &self.catalog
    }

    pub fn cards(&self) -> &[Arc<PredictionCard>] {
        &self.cards
    }

    pub fn card(&self, match_id: u32) -> Result<&Arc<PredictionCard>, MatchdayError> {
        self.cards
            .iter()
            .find(|c| c.match_id() == match_id)
            .ok_or(MatchdayError::MatchNotFound(match_id))
    }

    pub fn views(&self, clock: &dyn Clock) -> Vec<CardView> {
        self.cards.iter().map(|c| c.view(clock)).collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Dispose every card, cancelling in-flight submissions.
    pub fn dispose_all(&self) {
        for card in &self.cards {
            card.dispose();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

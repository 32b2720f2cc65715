//! Prediction submission.
//!
//! Defines the `PredictionSubmitter` capability the card awaits during a
//! submit, the request it sends, and the outcome the card reports back.
//! `SimulatedSubmitter` stands in for a real backend.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::types::{Prediction, Team};

/// Shown to the user whenever a submission fails, whatever the cause.
pub const FAILURE_MESSAGE: &str = "Failed to submit prediction. Please try again.";

/// Delay used when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// A complete prediction, ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    pub match_id: u32,
    pub home: Team,
    pub away: Team,
    pub prediction: Prediction,
}

impl PredictionRequest {
    /// The toast shown once the prediction is accepted.
    pub fn success_message(&self) -> String {
        match self.prediction {
            Prediction::Home => format!("Prediction submitted: {} to win", self.home.name),
            Prediction::Draw => format!(
                "Prediction submitted: Draw between {} and {}",
                self.home.name, self.away.name
            ),
            Prediction::Away => format!("Prediction submitted: {} to win", self.away.name),
        }
    }
}

/// Sends a prediction somewhere and reports whether it was accepted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionSubmitter: Send + Sync {
    async fn submit(&self, request: &PredictionRequest) -> Result<()>;
}

/// Sleeps for a fixed delay, then succeeds (or fails at `failure_rate`).
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    delay: Duration,
    failure_rate: f64,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failure_rate: 0.0,
        }
    }

    /// Fail a share of submissions. Clamped to 0.0–1.0.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl PredictionSubmitter for SimulatedSubmitter {
    async fn submit(&self, request: &PredictionRequest) -> Result<()> {
        debug!(
            match_id = request.match_id,
            prediction = %request.prediction,
            delay_ms = self.delay.as_millis() as u64,
            "Simulating prediction submission"
        );
        tokio::time::sleep(self.delay).await;

        if self.failure_rate > 0.0 && rand::random::<f64>() < self.failure_rate {
            bail!("Simulated backend rejected prediction for match {}", request.match_id);
        }
        Ok(())
    }
}

/// Why a submit call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    NotSelectable,
    Disposed,
    MissingHomeTeam,
    MissingAwayTeam,
    MissingPrediction,
    AlreadySubmitting,
}

/// Result of a single `submit` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Guard failed; no state change, no notification.
    Blocked { reason: BlockReason },
    Succeeded { message: String },
    Failed { message: String },
    /// The card was disposed while the submission was in flight.
    Cancelled,
}

impl SubmitOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, SubmitOutcome::Blocked { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

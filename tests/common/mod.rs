//! Recording collaborators for integration testing.
//!
//! `RecordingSink` captures every notification and `ScriptedSubmitter`
//! resolves submissions after a delay with a controllable result, all
//! in-memory with no external dependencies.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use matchday::card::submission::{PredictionRequest, PredictionSubmitter};
use matchday::card::PredictionCard;
use matchday::catalog::TeamCatalog;
use matchday::notify::NotificationSink;
use matchday::types::{Match, Team};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Success(String),
    Failure(String),
}

/// Notification sink that remembers what it was told.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingSink {
    fn notify_success(&self, message: &str) {
        self.calls.lock().unwrap().push(Recorded::Success(message.to_string()));
    }

    fn notify_failure(&self, message: &str) {
        self.calls.lock().unwrap().push(Recorded::Failure(message.to_string()));
    }
}

/// Submitter with a fixed delay whose result can be flipped from tests.
pub struct ScriptedSubmitter {
    delay: Duration,
    force_error: Mutex<Option<String>>,
    requests: Mutex<Vec<PredictionRequest>>,
}

impl ScriptedSubmitter {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            force_error: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Make all subsequent submissions fail.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn requests(&self) -> Vec<PredictionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionSubmitter for ScriptedSubmitter {
    async fn submit(&self, request: &PredictionRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        let forced = self.force_error.lock().unwrap().clone();
        match forced {
            Some(err) => Err(anyhow!(err)),
            None => Ok(()),
        }
    }
}

pub fn arsenal() -> Team {
    Team::new(1, "Arsenal", "https://logo.example/1.png", "WWDWW", 1).unwrap()
}

pub fn chelsea() -> Team {
    Team::new(6, "Chelsea", "https://logo.example/6.png", "WDLWD", 6).unwrap()
}

pub fn liverpool() -> Team {
    Team::new(3, "Liverpool", "https://logo.example/3.png", "WWLDW", 3).unwrap()
}

pub fn catalog() -> Arc<TeamCatalog> {
    Arc::new(TeamCatalog::new(vec![arsenal(), liverpool(), chelsea()]).unwrap())
}

pub fn card_with(
    home: Option<Team>,
    away: Option<Team>,
    submitter: Arc<ScriptedSubmitter>,
    sink: Arc<RecordingSink>,
) -> Arc<PredictionCard> {
    let fixture = Match::new(1, "20:00", home, away).unwrap();
    Arc::new(PredictionCard::new(fixture, catalog(), submitter, sink))
}

//! Match prediction card.
//!
//! One card per fixture. The card owns its `SelectionState` and is the only
//! thing that mutates it: team pickers, the outcome choice and the
//! submission flow all go through `PredictionCard` methods.
//!
//! Submission runs `Idle → Submitting → Idle`. The submitter and the
//! notification sink are injected, so the whole flow can be driven from
//! tests with a paused clock. `dispose()` cancels an in-flight submission.

pub mod kickoff;
pub mod submission;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::TeamCatalog;
use crate::notify::NotificationSink;
use crate::types::{Match, MatchdayError, Prediction, Slot, Team};

use kickoff::{Clock, KickoffStatus};
use submission::{BlockReason, PredictionRequest, PredictionSubmitter, SubmitOutcome, FAILURE_MESSAGE};

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// Everything the user has chosen on a card, plus the in-flight flag.
///
/// `open_picker` is a single field, so at most one picker is ever open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    home_team: Option<Team>,
    away_team: Option<Team>,
    prediction: Option<Prediction>,
    open_picker: Option<Slot>,
    is_submitting: bool,
}

impl SelectionState {
    pub fn new(home_team: Option<Team>, away_team: Option<Team>) -> Self {
        Self {
            home_team,
            away_team,
            ..Self::default()
        }
    }

    pub fn team(&self, slot: Slot) -> Option<&Team> {
        match slot {
            Slot::Home => self.home_team.as_ref(),
            Slot::Away => self.away_team.as_ref(),
        }
    }

    pub fn home_team(&self) -> Option<&Team> {
        self.home_team.as_ref()
    }

    pub fn away_team(&self) -> Option<&Team> {
        self.away_team.as_ref()
    }

    pub fn prediction(&self) -> Option<Prediction> {
        self.prediction
    }

    pub fn open_picker(&self) -> Option<Slot> {
        self.open_picker
    }

    pub fn is_picker_open(&self, slot: Slot) -> bool {
        self.open_picker == Some(slot)
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn has_both_teams(&self) -> bool {
        self.home_team.is_some() && self.away_team.is_some()
    }

    /// Build the request a submit would send, or say why it can't.
    pub fn submit_guard(&self, match_id: u32) -> Result<PredictionRequest, BlockReason> {
        if self.is_submitting {
            return Err(BlockReason::AlreadySubmitting);
        }
        let home = self.home_team.clone().ok_or(BlockReason::MissingHomeTeam)?;
        let away = self.away_team.clone().ok_or(BlockReason::MissingAwayTeam)?;
        let prediction = self.prediction.ok_or(BlockReason::MissingPrediction)?;
        Ok(PredictionRequest {
            match_id,
            home,
            away,
            prediction,
        })
    }

    pub fn can_submit(&self) -> bool {
        self.submit_guard(0).is_ok()
    }

    fn set_team(&mut self, slot: Slot, team: Team) {
        match slot {
            Slot::Home => self.home_team = Some(team),
            Slot::Away => self.away_team = Some(team),
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One row in a picker's option list.
#[derive(Debug, Clone, Serialize)]
pub struct PickerOption {
    pub team: Team,
    pub selected: bool,
}

/// Render-ready snapshot of a card.
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub match_id: u32,
    pub kickoff: String,
    pub status: KickoffStatus,
    pub selectable: bool,
    pub home_team: Option<Team>,
    pub away_team: Option<Team>,
    pub prediction: Option<Prediction>,
    pub open_picker: Option<Slot>,
    pub is_submitting: bool,
    pub can_submit: bool,
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

pub struct PredictionCard {
    match_id: u32,
    kickoff: NaiveTime,
    selectable: bool,
    catalog: Arc<TeamCatalog>,
    state: Mutex<SelectionState>,
    submitter: Arc<dyn PredictionSubmitter>,
    sink: Arc<dyn NotificationSink>,
    cancel: watch::Sender<bool>,
}

impl PredictionCard {
    /// A fresh, selectable card. Teams already on the fixture pre-fill
    /// the selection.
    pub fn new(
        fixture: Match,
        catalog: Arc<TeamCatalog>,
        submitter: Arc<dyn PredictionSubmitter>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            match_id: fixture.id,
            kickoff: fixture.kickoff,
            selectable: true,
            catalog,
            state: Mutex::new(SelectionState::new(fixture.home, fixture.away)),
            submitter,
            sink,
            cancel,
        }
    }

    /// Display-only cards ignore every interaction.
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn match_id(&self) -> u32 {
        self.match_id
    }

    pub fn kickoff(&self) -> NaiveTime {
        self.kickoff
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn is_disposed(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Snapshot of the current selection.
    pub fn state(&self) -> SelectionState {
        self.lock().clone()
    }

    // -- Pickers ------------------------------------------------------------

    /// Open a picker, closing the other one.
    pub fn open_picker(&self, slot: Slot) {
        if !self.interactive() {
            return;
        }
        self.lock().open_picker = Some(slot);
        debug!(match_id = self.match_id, %slot, "Picker opened");
    }

    pub fn close_picker(&self, slot: Slot) {
        if !self.interactive() {
            return;
        }
        let mut state = self.lock();
        if state.open_picker == Some(slot) {
            state.open_picker = None;
        }
    }

    pub fn toggle_picker(&self, slot: Slot) {
        if !self.interactive() {
            return;
        }
        let mut state = self.lock();
        state.open_picker = if state.open_picker == Some(slot) {
            None
        } else {
            Some(slot)
        };
    }

    /// Put `team` in `slot` and close that slot's picker. The other slot
    /// is untouched, and nothing stops the same team being picked twice.
    /// Returns whether the selection applied.
    pub fn select_team(&self, slot: Slot, team: Team) -> bool {
        if !self.interactive() {
            return false;
        }
        let mut state = self.lock();
        debug!(match_id = self.match_id, %slot, team = %team.name, "Team selected");
        state.set_team(slot, team);
        if state.open_picker == Some(slot) {
            state.open_picker = None;
        }
        true
    }

    /// `select_team` by catalog id. Display-only and disposed cards
    /// reject the selection with `NotSelectable`.
    pub fn select_team_by_id(&self, slot: Slot, team_id: u32) -> Result<(), MatchdayError> {
        let team = self.catalog.require(team_id)?.clone();
        if !self.select_team(slot, team) {
            return Err(MatchdayError::NotSelectable(self.match_id));
        }
        Ok(())
    }

    /// The catalog as a picker list, with the slot's current team flagged.
    pub fn picker_options(&self, slot: Slot) -> Vec<PickerOption> {
        let selected_id = self.lock().team(slot).map(|t| t.id);
        self.catalog
            .teams()
            .iter()
            .map(|team| PickerOption {
                team: team.clone(),
                selected: Some(team.id) == selected_id,
            })
            .collect()
    }

    // -- Prediction ---------------------------------------------------------

    /// Choose (or clear, with `None`) the predicted outcome. Outcomes can
    /// only be chosen once both teams are set; returns whether it applied.
    pub fn select_prediction(&self, prediction: Option<Prediction>) -> bool {
        if !self.interactive() {
            return false;
        }
        let mut state = self.lock();
        if prediction.is_some() && !state.has_both_teams() {
            debug!(match_id = self.match_id, "Prediction ignored, teams not set");
            return false;
        }
        state.prediction = prediction;
        true
    }

    // -- Status -------------------------------------------------------------

    pub fn kickoff_status_at(&self, now: NaiveDateTime) -> KickoffStatus {
        kickoff::kickoff_status(now, self.kickoff)
    }

    pub fn kickoff_status(&self, clock: &dyn Clock) -> KickoffStatus {
        self.kickoff_status_at(clock.now())
    }

    pub fn view(&self, clock: &dyn Clock) -> CardView {
        let state = self.state();
        CardView {
            match_id: self.match_id,
            kickoff: self.kickoff.format("%H:%M").to_string(),
            status: self.kickoff_status(clock),
            selectable: self.selectable,
            can_submit: self.selectable && !self.is_disposed() && state.can_submit(),
            is_submitting: state.is_submitting,
            open_picker: state.open_picker,
            prediction: state.prediction,
            home_team: state.home_team,
            away_team: state.away_team,
        }
    }

    // -- Submission ---------------------------------------------------------

    /// Submit the current prediction.
    ///
    /// A no-op returning `Blocked` unless both teams and an outcome are set
    /// and nothing is in flight. Otherwise awaits the submitter and reports
    /// exactly one notification. `is_submitting` is cleared on every exit.
    pub async fn submit(&self) -> SubmitOutcome {
        if !self.selectable {
            return SubmitOutcome::Blocked {
                reason: BlockReason::NotSelectable,
            };
        }
        if self.is_disposed() {
            return SubmitOutcome::Blocked {
                reason: BlockReason::Disposed,
            };
        }

        let request = {
            let mut state = self.lock();
            match state.submit_guard(self.match_id) {
                Ok(request) => {
                    state.is_submitting = true;
                    request
                }
                Err(reason) => {
                    debug!(match_id = self.match_id, ?reason, "Submit blocked");
                    return SubmitOutcome::Blocked { reason };
                }
            }
        };
        let _in_flight = InFlight { state: &self.state };

        info!(
            match_id = self.match_id,
            home = %request.home.name,
            away = %request.away.name,
            prediction = %request.prediction,
            "Submitting prediction"
        );

        let result = tokio::select! {
            res = self.submitter.submit(&request) => Some(res),
            _ = wait_cancelled(self.cancel.subscribe()) => None,
        };

        match result {
            None => {
                info!(match_id = self.match_id, "Submission cancelled, card disposed");
                SubmitOutcome::Cancelled
            }
            Some(_) if self.is_disposed() => SubmitOutcome::Cancelled,
            Some(Ok(())) => {
                let message = request.success_message();
                info!(match_id = self.match_id, %message, "Prediction accepted");
                self.sink.notify_success(&message);
                SubmitOutcome::Succeeded { message }
            }
            Some(Err(e)) => {
                warn!(match_id = self.match_id, error = %e, "Prediction submission failed");
                self.sink.notify_failure(FAILURE_MESSAGE);
                SubmitOutcome::Failed {
                    message: FAILURE_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Tear the card down. An in-flight submission resolves as `Cancelled`
    /// without notifying, and every later call is a no-op.
    pub fn dispose(&self) {
        if self.cancel.send_replace(true) {
            return;
        }
        let mut state = self.lock();
        state.open_picker = None;
        debug!(match_id = self.match_id, submitting = state.is_submitting, "Card disposed");
    }

    fn interactive(&self) -> bool {
        self.selectable && !self.is_disposed()
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for PredictionCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionCard")
            .field("match_id", &self.match_id)
            .field("kickoff", &self.kickoff)
            .field("selectable", &self.selectable)
            .field("state", &self.state())
            .finish()
    }
}

/// Clears `is_submitting` when the submit future finishes, fails, panics
/// or is dropped.
struct InFlight<'a> {
    state: &'a Mutex<SelectionState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.is_submitting = false;
    }
}

async fn wait_cancelled(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            // Sender gone means the card is gone; never resolve.
            std::future::pending::<()>().await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

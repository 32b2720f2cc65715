//! Kickoff status calculator.
//!
//! Turns "now" and a kickoff time-of-day into the label shown on a card.
//! The kickoff is always combined with today's date; there is no day
//! rollover, so a kickoff earlier in the day reads as live or finished.

use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Length of the "Live" window after kickoff, in minutes.
pub const LIVE_WINDOW_MINUTES: i64 = 90;

/// Up to this many minutes before kickoff the label is minutes-only.
pub const IMMINENT_MINUTES: i64 = 60;

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Visual emphasis for the status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTier {
    /// More than an hour away
    Informational,
    /// Within the hour
    Imminent,
    /// In play
    Active,
    /// Over
    Past,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KickoffStatus {
    pub label: String,
    pub tier: StatusTier,
    pub minutes_until: i64,
}

/// Whole minutes from `now` until kickoff on the same date, rounded down.
pub fn minutes_until(now: NaiveDateTime, kickoff: NaiveTime) -> i64 {
    let kickoff_at = now.date().and_time(kickoff);
    (kickoff_at - now).num_seconds().div_euclid(60)
}

pub fn kickoff_status(now: NaiveDateTime, kickoff: NaiveTime) -> KickoffStatus {
    status_for_minutes(minutes_until(now, kickoff))
}

pub fn status_for_minutes(minutes: i64) -> KickoffStatus {
    let (label, tier) = if minutes > IMMINENT_MINUTES {
        (
            format!("Starts in {}h {}m", minutes / 60, minutes % 60),
            StatusTier::Informational,
        )
    } else if minutes > 0 {
        (format!("Starts in {minutes}m"), StatusTier::Imminent)
    } else if minutes > -LIVE_WINDOW_MINUTES {
        ("Live".to_string(), StatusTier::Active)
    } else {
        ("Finished".to_string(), StatusTier::Past)
    };

    KickoffStatus {
        label,
        tier,
        minutes_until: minutes,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

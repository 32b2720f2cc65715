//! Notification sinks.
//!
//! Defines the `NotificationSink` trait the prediction card reports to,
//! and provides implementations for:
//! - `TracingSink` — writes each toast to the log
//! - `NotificationLog` — bounded in-memory history served by the dashboard
//! - `FanoutSink` — forwards to several sinks

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

/// Surface for transient success/failure messages.
///
/// Fire-and-forget: the card never looks at a return value.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn notify_success(&self, message: &str);

    fn notify_failure(&self, message: &str);
}

// ---------------------------------------------------------------------------
// Notification record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    fn new(kind: NotificationKind, message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Logs notifications through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify_success(&self, message: &str) {
        info!(message, "Notification");
    }

    fn notify_failure(&self, message: &str) {
        warn!(message, "Notification");
    }
}

/// Keeps the most recent notifications, oldest evicted first.
#[derive(Debug)]
pub struct NotificationLog {
    capacity: usize,
    entries: Mutex<VecDeque<Notification>>,
}

impl NotificationLog {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Snapshot, oldest first.
    pub fn recent(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, kind: NotificationKind, message: &str) {
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(Notification::new(kind, message));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl NotificationSink for NotificationLog {
    fn notify_success(&self, message: &str) {
        self.push(NotificationKind::Success, message);
    }

    fn notify_failure(&self, message: &str) {
        self.push(NotificationKind::Failure, message);
    }
}

/// Forwards every notification to each inner sink, in order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }
}

impl NotificationSink for FanoutSink {
    fn notify_success(&self, message: &str) {
        for sink in &self.sinks {
            sink.notify_success(message);
        }
    }

    fn notify_failure(&self, message: &str) {
        for sink in &self.sinks {
            sink.notify_failure(message);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_records_in_order() {
        let log = NotificationLog::default();
        log.notify_success("first");
        log.notify_failure("second");

        let entries = log.recent();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[0].kind, NotificationKind::Success);
        assert_eq!(entries[1].kind, NotificationKind::Failure);
    }

    #[test]
    fn test_log_evicts_oldest() {
        let log = NotificationLog::new(2);
        log.notify_success("a");
        log.notify_success("b");
        log.notify_success("c");

        let messages: Vec<_> = log.recent().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
    }

    #[test]
    fn test_log_zero_capacity_keeps_one() {
        let log = NotificationLog::new(0);
        log.notify_success("a");
        log.notify_success("b");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_fanout_forwards_to_all() {
        let mut first = MockNotificationSink::new();
        first
            .expect_notify_success()
            .withf(|m| m.to_string() == "ok")
            .times(1)
            .return_const(());
        first.expect_notify_failure().times(1).return_const(());
        let mut second = MockNotificationSink::new();
        second.expect_notify_success().times(1).return_const(());
        second.expect_notify_failure().times(1).return_const(());

        let fanout = FanoutSink::new(vec![Arc::new(first), Arc::new(second)]);
        fanout.notify_success("ok");
        fanout.notify_failure("bad");
    }

    #[test]
    fn test_notification_serializes() {
        let log = NotificationLog::default();
        log.notify_failure("Failed");
        let json = serde_json::to_string(&log.recent()).unwrap();
        assert!(json.contains("\"kind\":\"failure\""));
        assert!(json.contains("Failed"));
    }
}

//! Reminder models
//!
//! Inert descriptions of notifications plus the records the local
//! notification center keeps for them.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// When a reminder fires, in local wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Trigger {
    /// Fires once at an absolute date and time
    Once { at: NaiveDateTime },
    /// Repeats every day at hour:minute
    Daily { hour: u32, minute: u32 },
    /// Repeats every year on month/day at hour:minute
    Yearly {
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Once { at } => write!(f, "once at {}", at.format("%Y-%m-%d %H:%M")),
            Trigger::Daily { hour, minute } => write!(f, "daily at {:02}:{:02}", hour, minute),
            Trigger::Yearly {
                month,
                day,
                hour,
                minute,
            } => write!(
                f,
                "yearly on {:02}-{:02} at {:02}:{:02}",
                month, day, hour, minute
            ),
        }
    }
}

/// A notification to be scheduled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSpec {
    pub title: String,
    pub body: String,
    pub trigger: Trigger,
}

/// Opaque handle returned when a reminder is scheduled
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(pub String);

impl NotificationHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NotificationHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Result of asking a host service for permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// A reminder persisted by the local notification center
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub id: String,
    pub spec: ReminderSpec,
    pub created_at: DateTime<Utc>,
}

/// Published when a scheduled reminder fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderEvent {
    pub reminder_id: String,
    pub title: String,
    pub body: String,
}

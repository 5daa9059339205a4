//! Notification service
//!
//! `Notifier` is the seam to whatever actually delivers reminders.
//! `NotificationCenter` is the local implementation: it keeps every
//! scheduled reminder in the key-value store, where the dispatcher picks
//! them up, and lets callers cancel them by handle.

use crate::config::SCHEDULED_REMINDERS_KEY;
use crate::error::{AppError, Result};
use crate::models::{NotificationHandle, PermissionStatus, ReminderSpec, ScheduledReminder};
use crate::services::SettingsService;
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Schedules and cancels reminders
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Ask whether reminders may be scheduled
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Schedule a reminder and return its handle
    async fn schedule(&self, spec: &ReminderSpec) -> Result<NotificationHandle>;

    /// Cancel a scheduled reminder. Unknown handles are ignored.
    async fn cancel(&self, handle: &NotificationHandle) -> Result<()>;
}

/// Local notification center backed by the key-value store
#[derive(Clone)]
pub struct NotificationCenter {
    kv: Arc<dyn KeyValueStore>,
    settings: SettingsService,
    write_lock: Arc<Mutex<()>>,
}

impl NotificationCenter {
    pub fn new(kv: Arc<dyn KeyValueStore>, settings: SettingsService) -> Self {
        Self {
            kv,
            settings,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All reminders currently scheduled
    pub async fn list(&self) -> Result<Vec<ScheduledReminder>> {
        let Some(raw) = self.kv.get(SCHEDULED_REMINDERS_KEY).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|e| {
            AppError::StorageRead(format!("Failed to decode scheduled reminders: {}", e))
        })
    }

    async fn save(&self, reminders: &[ScheduledReminder]) -> Result<()> {
        let payload = serde_json::to_string(reminders)?;
        self.kv.set(SCHEDULED_REMINDERS_KEY, &payload).await
    }
}

#[async_trait]
impl Notifier for NotificationCenter {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        let reminders = self.settings.get_reminders().await?;

        Ok(if reminders.enabled {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn schedule(&self, spec: &ReminderSpec) -> Result<NotificationHandle> {
        let _guard = self.write_lock.lock().await;
        let mut reminders = self.list().await?;

        let reminder = ScheduledReminder {
            id: Uuid::new_v4().to_string(),
            spec: spec.clone(),
            created_at: Utc::now(),
        };
        let handle = NotificationHandle(reminder.id.clone());

        tracing::info!("Scheduling reminder {} ({})", reminder.id, spec.trigger);
        reminders.push(reminder);
        self.save(&reminders).await?;

        Ok(handle)
    }

    async fn cancel(&self, handle: &NotificationHandle) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut reminders = self.list().await?;

        let before = reminders.len();
        reminders.retain(|r| r.id != handle.as_str());

        if reminders.len() == before {
            tracing::debug!("Reminder {} was not scheduled", handle);
            return Ok(());
        }

        self.save(&reminders).await?;
        tracing::info!("Cancelled reminder {}", handle);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trigger;
    use crate::services::ReminderSettings;
    use crate::storage::MemoryKeyValueStore;
    use tempfile::TempDir;

    fn create_test_center() -> (NotificationCenter, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let settings = SettingsService::new(temp_dir.path().to_path_buf());
        let center = NotificationCenter::new(Arc::new(MemoryKeyValueStore::new()), settings);
        (center, temp_dir)
    }

    fn daily(hour: u32) -> ReminderSpec {
        ReminderSpec {
            title: "💊 Medication Reminder".to_string(),
            body: "It's time to give Rex their pill!".to_string(),
            trigger: Trigger::Daily { hour, minute: 0 },
        }
    }

    #[tokio::test]
    async fn test_schedule_and_list() {
        let (center, _temp) = create_test_center();

        let first = center.schedule(&daily(8)).await.unwrap();
        let second = center.schedule(&daily(20)).await.unwrap();
        assert_ne!(first, second);

        let reminders = center.list().await.unwrap();
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].id, first.as_str());
        assert_eq!(reminders[1].spec, daily(20));
    }

    #[tokio::test]
    async fn test_cancel_removes_only_that_reminder() {
        let (center, _temp) = create_test_center();

        let first = center.schedule(&daily(8)).await.unwrap();
        let second = center.schedule(&daily(20)).await.unwrap();

        center.cancel(&first).await.unwrap();
        center
            .cancel(&NotificationHandle("unknown".to_string()))
            .await
            .unwrap();

        let reminders = center.list().await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].id, second.as_str());
    }

    #[tokio::test]
    async fn test_permission_follows_settings() {
        let (center, temp) = create_test_center();
        assert_eq!(
            center.request_permission().await.unwrap(),
            PermissionStatus::Granted
        );

        SettingsService::new(temp.path().to_path_buf())
            .update_reminders(ReminderSettings { enabled: false })
            .await
            .unwrap();

        assert_eq!(
            center.request_permission().await.unwrap(),
            PermissionStatus::Denied
        );
    }
}

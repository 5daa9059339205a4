//! Reminders service
//!
//! Hands planned reminders to a `Notifier` and cancels them again. Callers
//! get back the handles to store on the pet record.

use crate::error::Result;
use crate::models::{NotificationHandle, ReminderSpec};
use crate::services::Notifier;
use std::sync::Arc;

#[derive(Clone)]
pub struct RemindersService {
    notifier: Arc<dyn Notifier>,
}

impl RemindersService {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Schedule every reminder and return their handles in the same order.
    ///
    /// Returns no handles when permission is denied. If one fails,
    /// the ones already scheduled are cancelled before the error is returned.
    pub async fn schedule_all(&self, specs: &[ReminderSpec]) -> Result<Vec<NotificationHandle>> {
        if specs.is_empty() {
            return Ok(Vec::new());
        }

        if !self.notifier.request_permission().await?.is_granted() {
            tracing::warn!(
                "Notification permission denied, skipping {} reminder(s)",
                specs.len()
            );
            return Ok(Vec::new());
        }

        let mut handles = Vec::with_capacity(specs.len());
        for spec in specs {
            match self.notifier.schedule(spec).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::error!("Failed to schedule reminder '{}': {}", spec.title, e);
                    self.cancel_handles(&handles).await;
                    return Err(e);
                }
            }
        }

        tracing::debug!("Scheduled {} reminder(s)", handles.len());
        Ok(handles)
    }

    /// Cancel stored handles. Failures are logged, never returned.
    pub async fn cancel_all(&self, ids: &[String]) {
        let handles: Vec<NotificationHandle> =
            ids.iter().cloned().map(NotificationHandle::from).collect();
        self.cancel_handles(&handles).await;
    }

    async fn cancel_handles(&self, handles: &[NotificationHandle]) {
        for handle in handles {
            if let Err(e) = self.notifier.cancel(handle).await {
                tracing::warn!("Failed to cancel reminder {}: {}", handle, e);
            }
        }
    }
}

//! Reminder dispatcher
//! Turns the reminders held by the notification center into cron jobs and
//! publishes a `ReminderEvent` every time one fires

use crate::config::{DISPATCHER_RESYNC_INTERVAL_SECS, REMINDER_EVENT_CHANNEL_CAPACITY};
use crate::error::{AppError, Result};
use crate::models::{ReminderEvent, ScheduledReminder, Trigger};
use crate::services::NotificationCenter;
use chrono::Local;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

/// Cron expression for a recurring trigger, `None` for one-shot triggers
pub fn to_cron(trigger: &Trigger) -> Option<String> {
    match *trigger {
        Trigger::Once { .. } => None,
        Trigger::Daily { hour, minute } => Some(format!("0 {} {} * * *", minute, hour)),
        Trigger::Yearly {
            month,
            day,
            hour,
            minute,
        } => Some(format!("0 {} {} {} {} *", minute, hour, day, month)),
    }
}

type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

fn fire_reminder(
    events: broadcast::Sender<ReminderEvent>,
    event: ReminderEvent,
) -> impl FnMut(Uuid, JobScheduler) -> JobFuture + Send + Sync + 'static {
    move |_uuid, _l| {
        let events = events.clone();
        let event = event.clone();
        Box::pin(async move {
            tracing::info!("Reminder fired: {} - {}", event.title, event.body);
            if events.send(event).is_err() {
                tracing::debug!("No listeners for reminder event");
            }
        })
    }
}

/// Runs scheduled reminders on a cron scheduler
#[derive(Clone)]
pub struct ReminderDispatcher {
    scheduler: Arc<RwLock<JobScheduler>>,
    /// Reminder id to job id; `None` when a one-shot reminder was already past
    jobs: Arc<RwLock<HashMap<String, Option<Uuid>>>>,
    events: broadcast::Sender<ReminderEvent>,
}

impl ReminderDispatcher {
    /// Create new dispatcher
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to create scheduler: {}", e)))?;
        let (events, _) = broadcast::channel(REMINDER_EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            scheduler: Arc::new(RwLock::new(scheduler)),
            jobs: Arc::new(RwLock::new(HashMap::new())),
            events,
        })
    }

    /// Receive every reminder that fires from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ReminderEvent> {
        self.events.subscribe()
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<()> {
        let scheduler = self.scheduler.read().await;
        scheduler
            .start()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to start scheduler: {}", e)))?;
        tracing::info!("Reminder dispatcher started");
        Ok(())
    }

    /// Make the running jobs match `reminders`: add new ones, drop cancelled ones
    pub async fn sync(&self, reminders: &[ScheduledReminder]) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let wanted: HashSet<&str> = reminders.iter().map(|r| r.id.as_str()).collect();

        let stale: Vec<String> = jobs
            .keys()
            .filter(|id| !wanted.contains(id.as_str()))
            .cloned()
            .collect();

        for reminder_id in stale {
            if let Some(Some(job_id)) = jobs.remove(&reminder_id) {
                let scheduler = self.scheduler.read().await;
                if let Err(e) = scheduler.remove(&job_id).await {
                    tracing::warn!("Failed to remove job for reminder {}: {}", reminder_id, e);
                }
                tracing::info!("Unscheduled reminder {}", reminder_id);
            }
        }

        for reminder in reminders {
            if jobs.contains_key(&reminder.id) {
                continue;
            }
            let job_id = self.add_job(reminder).await?;
            jobs.insert(reminder.id.clone(), job_id);
        }

        Ok(())
    }

    async fn add_job(&self, reminder: &ScheduledReminder) -> Result<Option<Uuid>> {
        let event = ReminderEvent {
            reminder_id: reminder.id.clone(),
            title: reminder.spec.title.clone(),
            body: reminder.spec.body.clone(),
        };
        let run = fire_reminder(self.events.clone(), event);

        let job = match (&reminder.spec.trigger, to_cron(&reminder.spec.trigger)) {
            (_, Some(cron_expr)) => Job::new_async_tz(cron_expr, Local, run),
            (Trigger::Once { at }, None) => {
                let Some(fire_at) = at.and_local_timezone(Local).earliest() else {
                    tracing::warn!("Reminder {} has no local time {}", reminder.id, at);
                    return Ok(None);
                };
                let Ok(delay) = (fire_at - Local::now()).to_std() else {
                    tracing::warn!("Reminder {} is in the past ({}), skipping", reminder.id, at);
                    return Ok(None);
                };
                Job::new_one_shot_async(delay, run)
            }
            (trigger, None) => {
                return Err(AppError::Scheduler(format!(
                    "No schedule for trigger {}",
                    trigger
                )))
            }
        }
        .map_err(|e| AppError::Scheduler(format!("Failed to create reminder job: {}", e)))?;

        let job_id = job.guid();
        let scheduler = self.scheduler.read().await;
        scheduler
            .add(job)
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to schedule job: {}", e)))?;

        tracing::info!(
            "Reminder {} scheduled ({})",
            reminder.id,
            reminder.spec.trigger
        );
        Ok(Some(job_id))
    }

    /// Periodically pick up reminders scheduled or cancelled by other calls
    pub fn start_resync(&self, center: NotificationCenter) -> JoinHandle<()> {
        let dispatcher = self.clone();

        tokio::spawn(async move {
            tracing::info!("Starting reminder resync loop");

            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(
                DISPATCHER_RESYNC_INTERVAL_SECS,
            ));

            loop {
                interval.tick().await;

                let result = match center.list().await {
                    Ok(reminders) => dispatcher.sync(&reminders).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    tracing::error!("Error syncing reminders: {}", e);
                }
            }
        })
    }

    /// Number of reminders with a live job
    pub async fn active_jobs(&self) -> usize {
        self.jobs.read().await.values().filter(|j| j.is_some()).count()
    }

    /// Shutdown scheduler gracefully
    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.write().await;
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to shutdown scheduler: {}", e)))?;
        tracing::info!("Reminder dispatcher shutdown");
        Ok(())
    }
}

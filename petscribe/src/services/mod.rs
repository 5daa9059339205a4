//! Services module
//!
//! Business logic that sits between the CLI and storage: profile editing,
//! reminder planning, scheduling and dispatch, image picking and settings.

pub mod images;
pub mod notifications;
pub mod pets;
pub mod planner;
pub mod reminders;
pub mod scheduler;
pub mod settings;

pub use images::{FileImagePicker, ImagePicker};
pub use notifications::{NotificationCenter, Notifier};
pub use pets::PetsService;
pub use reminders::RemindersService;
pub use scheduler::ReminderDispatcher;
pub use settings::{AppSettings, DisplaySettings, ReminderSettings, SettingsService};

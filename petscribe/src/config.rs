//! Application configuration constants
//!
//! Central location for storage keys, date arithmetic factors,
//! reminder defaults and validation boundaries used throughout the application.

// ===== Storage =====

/// Key holding the JSON-serialized pet collection
pub const PETS_STORAGE_KEY: &str = "pets";

/// Key holding the JSON-serialized list of scheduled reminders
pub const SCHEDULED_REMINDERS_KEY: &str = "scheduled_reminders";

/// File name of the settings document inside the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Sub-directory of the data directory for key-value documents
pub const STORE_DIR_NAME: &str = "store";

/// Sub-directory of the data directory for imported pet photos
pub const IMAGES_DIR_NAME: &str = "images";

/// Directory name used under the platform data directory
pub const APP_DIR_NAME: &str = "petscribe";

// ===== Date Arithmetic =====

/// Days added per week of frequency
pub const DAYS_PER_WEEK: u64 = 7;

/// Days added per month of frequency.
/// Months are always approximated as 30 days.
pub const DAYS_PER_MONTH: u64 = 30;

// ===== Reminders =====

/// Hour of day (local) at which birthday reminders fire
pub const BIRTHDAY_REMINDER_HOUR: u32 = 9;

/// Minute of hour at which birthday reminders fire
pub const BIRTHDAY_REMINDER_MINUTE: u32 = 0;

/// How often the dispatcher reloads persisted reminders, in seconds
pub const DISPATCHER_RESYNC_INTERVAL_SECS: u64 = 60;

/// Capacity of the fired-reminder broadcast channel
pub const REMINDER_EVENT_CHANNEL_CAPACITY: usize = 64;

// ===== Validation Limits =====

/// Maximum length for a pet name or type
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum number of times of day for one medication or feeding entry
pub const MAX_TIMES_PER_ENTRY: usize = 24;

/// Maximum accepted weight value (either unit)
pub const MAX_WEIGHT_VALUE: f64 = 10_000.0;

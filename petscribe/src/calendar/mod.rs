//! Calendar helpers
//!
//! Pure date and time-of-day calculations used by reminder planning
//! and profile display.

pub mod dates;
pub mod time_of_day;

pub use dates::{age_from, next_occurrence, Age, Frequency, FrequencyUnit};
pub use time_of_day::{parse_time_of_day, ParseTimeError, TimeOfDay};

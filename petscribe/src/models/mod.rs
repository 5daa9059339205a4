//! Data models
//!
//! Rust structs for persisted pet data and reminders.
//! All models use serde for the JSON storage format.

pub mod pet;
pub mod reminder;

pub use pet::*;
pub use reminder::*;

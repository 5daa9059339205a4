//! Pet record model
//!
//! One `PetRecord` per pet, persisted as part of a single JSON array.
//! Field names match the camelCase keys written by earlier app versions.

use crate::calendar::{age_from, Age, Frequency};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_PET_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a pet id from the current millisecond timestamp.
///
/// Ids increase strictly within one process. Nothing checks them against
/// the stored collection.
pub fn generate_pet_id() -> String {
    let now = Utc::now().timestamp_millis();
    let prev = match LAST_PET_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
        Some(now.max(prev + 1))
    }) {
        Ok(prev) | Err(prev) => prev,
    };
    now.max(prev + 1).to_string()
}

/// Serde helpers for ISO dates that older app versions sometimes wrote as
/// empty strings or full timestamps.
mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    fn parse(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
        // Accept "2024-01-01" and "2024-01-01T10:00:00.000Z"
        let date_part = raw.split('T').next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
    }

    pub fn required<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim()).map_err(serde::de::Error::custom)
    }

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// Unit of a recorded weight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "lbs", alias = "pounds")]
    Pounds,
    #[serde(rename = "kg", alias = "kilograms")]
    Kilograms,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Pounds => f.write_str("lbs"),
            WeightUnit::Kilograms => f.write_str("kg"),
        }
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Pounds),
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kilograms),
            other => Err(format!("Invalid weight unit '{}'. Use lbs or kg", other)),
        }
    }
}

/// One weight measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    #[serde(deserialize_with = "iso_date::required")]
    pub date: NaiveDate,
    pub weight: f64,
    #[serde(default)]
    pub unit: WeightUnit,
}

/// A recurring medication with its daily reminder times
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationSchedule {
    pub name: String,
    /// "N unit", e.g. "1 days"
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub times_per_day: String,
    #[serde(default)]
    pub times_of_day: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    /// Handles of the reminders scheduled for this entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notification_ids: Vec<String>,
}

/// A feeding routine with its daily reminder times
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingSchedule {
    pub food_type: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub frequency_number: String,
    #[serde(default)]
    pub frequency_unit: String,
    #[serde(default)]
    pub times_of_day: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notification_ids: Vec<String>,
}

/// Care logs nested under a pet. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetLogs {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "iso_date::optional"
    )]
    pub last_bath: Option<NaiveDate>,
    /// "N unit", e.g. "6 weeks"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bath_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bath_notification_id: Option<String>,
    /// Free text from the add-pet form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_medication: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medications_list: Vec<MedicationSchedule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feeding_schedule: Vec<FeedingSchedule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weight_history: Vec<WeightEntry>,
}

/// A pet and all of its care data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Free text weight from the add form, e.g. "25 kg"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// Local or remote image URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    /// Legacy free-text medications, independent of `logs.medicationsList`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<String>,
    /// External identifier such as a microchip number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vet_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "iso_date::optional"
    )]
    pub birthday: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday_notification_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<PetLogs>,
    /// Keys this version does not know about, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PetRecord {
    /// Create a record with a fresh id and no optional data
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: generate_pet_id(),
            name: name.into(),
            kind: kind.into(),
            breed: None,
            color: None,
            weight: None,
            image: None,
            allergies: None,
            medications: None,
            pet_id: None,
            vet_info: None,
            notes: None,
            birthday: None,
            birthday_notification_id: None,
            logs: None,
            extra: serde_json::Map::new(),
        }
    }

    /// List label, e.g. "Rex (Dog)"
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }

    /// Logs, creating an empty set if the record has none
    pub fn logs_mut(&mut self) -> &mut PetLogs {
        self.logs.get_or_insert_with(PetLogs::default)
    }

    pub fn last_bath(&self) -> Option<NaiveDate> {
        self.logs.as_ref().and_then(|logs| logs.last_bath)
    }

    /// Parsed bath frequency, if one is stored and well-formed
    pub fn bath_frequency(&self) -> Option<Frequency> {
        self.logs
            .as_ref()
            .and_then(|logs| logs.bath_frequency.as_deref())
            .and_then(|raw| raw.parse().ok())
    }

    pub fn medications_list(&self) -> &[MedicationSchedule] {
        self.logs
            .as_ref()
            .map(|logs| logs.medications_list.as_slice())
            .unwrap_or(&[])
    }

    pub fn feeding_schedule(&self) -> &[FeedingSchedule] {
        self.logs
            .as_ref()
            .map(|logs| logs.feeding_schedule.as_slice())
            .unwrap_or(&[])
    }

    /// Weight history in insertion order
    pub fn weight_history(&self) -> &[WeightEntry] {
        self.logs
            .as_ref()
            .map(|logs| logs.weight_history.as_slice())
            .unwrap_or(&[])
    }

    /// Weight history ordered by date; entries on the same date keep insertion order
    pub fn sorted_weight_history(&self) -> Vec<WeightEntry> {
        let mut entries = self.weight_history().to_vec();
        entries.sort_by_key(|entry| entry.date);
        entries
    }

    pub fn age(&self, today: NaiveDate) -> Option<Age> {
        self.birthday.map(|birthday| age_from(birthday, today))
    }

    /// Every reminder handle stored anywhere on this record
    pub fn notification_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.birthday_notification_id.iter().cloned().collect();

        if let Some(logs) = &self.logs {
            ids.extend(logs.bath_notification_id.iter().cloned());
            for med in &logs.medications_list {
                ids.extend(med.notification_ids.iter().cloned());
            }
            for feeding in &logs.feeding_schedule {
                ids.extend(feeding.notification_ids.iter().cloned());
            }
        }

        ids
    }
}

/// Input for the add-pet flow
#[derive(Debug, Clone, Default)]
pub struct NewPet {
    pub name: String,
    pub kind: String,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub weight: Option<String>,
    pub image: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub last_bath: Option<NaiveDate>,
    pub last_medication: Option<String>,
}

/// Basic details replaced by the edit-pet flow
#[derive(Debug, Clone, Default)]
pub struct PetDetails {
    pub name: String,
    pub kind: String,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub weight: Option<String>,
    pub image: Option<String>,
    pub allergies: Option<String>,
}

/// Profile fields edited inline; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub pet_id: Option<String>,
    pub vet_info: Option<String>,
    pub notes: Option<String>,
}

/// Input for adding a medication
#[derive(Debug, Clone)]
pub struct NewMedication {
    pub name: String,
    pub frequency: Frequency,
    pub times_per_day: Option<String>,
    pub times_of_day: Vec<String>,
    pub instructions: Option<String>,
}

/// Input for adding a feeding routine
#[derive(Debug, Clone, Default)]
pub struct NewFeeding {
    pub food_type: String,
    pub amount: String,
    pub frequency_number: String,
    pub frequency_unit: String,
    /// Comma-separated times, e.g. "8:00 AM, 6:00 PM"
    pub times_of_day: String,
    pub instructions: Option<String>,
}

/// Split comma-separated times into trimmed, non-empty entries
pub fn split_times_of_day(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

//! Pets service
//!
//! The profile-editing operations behind each screen. Every operation is a
//! read-modify-write through `PetStore`. Operations that derive reminders
//! write the record first, then schedule, then store the returned handles
//! on the owning entry with a second write. That write only lands if the
//! entry still looks the way it did when the reminders were planned.

use crate::calendar::{Frequency, FrequencyUnit};
use crate::config::{MAX_NAME_LENGTH, MAX_TIMES_PER_ENTRY, MAX_WEIGHT_VALUE};
use crate::error::{AppError, Result};
use crate::models::{
    split_times_of_day, FeedingSchedule, MedicationSchedule, NewFeeding, NewMedication, NewPet,
    PetDetails, PetLogs, PetRecord, ProfileUpdate, ReminderSpec, WeightEntry, WeightUnit,
};
use crate::services::planner::{
    plan_bath_reminder, plan_birthday_reminder, plan_feeding_reminders, plan_medication_reminders,
};
use crate::services::{ImagePicker, RemindersService};
use crate::storage::PetStore;
use chrono::NaiveDate;

/// Service for pet profile operations
#[derive(Clone)]
pub struct PetsService {
    store: PetStore,
    reminders: RemindersService,
}

impl PetsService {
    pub fn new(store: PetStore, reminders: RemindersService) -> Self {
        Self { store, reminders }
    }

    /// All pets in stored order. A store that cannot be read lists as empty.
    pub async fn list_pets(&self) -> Vec<PetRecord> {
        match self.store.load_all().await {
            Ok(pets) => pets,
            Err(e) => {
                tracing::error!("Failed to load pets: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get_pet(&self, id: &str) -> Result<PetRecord> {
        self.store.get(id).await
    }

    /// Create a pet from the add-pet form
    pub async fn add_pet(&self, new_pet: NewPet) -> Result<PetRecord> {
        let (name, kind) = validate_name_and_type(&new_pet.name, &new_pet.kind)?;

        let mut pet = PetRecord::new(name, kind);
        pet.breed = non_blank(new_pet.breed);
        pet.color = non_blank(new_pet.color);
        pet.weight = non_blank(new_pet.weight);
        pet.image = non_blank(new_pet.image);
        pet.allergies = non_blank(new_pet.allergies);
        pet.medications = non_blank(new_pet.medications);

        let last_medication = non_blank(new_pet.last_medication);
        if new_pet.last_bath.is_some() || last_medication.is_some() {
            pet.logs = Some(PetLogs {
                last_bath: new_pet.last_bath,
                last_medication,
                ..Default::default()
            });
        }

        self.store.upsert(pet.clone()).await?;
        tracing::info!("Added pet {}: {}", pet.id, pet.display_label());

        Ok(pet)
    }

    /// Replace the basic details of a pet
    pub async fn edit_pet(&self, id: &str, details: PetDetails) -> Result<PetRecord> {
        let (name, kind) = validate_name_and_type(&details.name, &details.kind)?;

        let pet = self
            .store
            .update(id, |pet| {
                pet.name = name;
                pet.kind = kind;
                pet.breed = non_blank(details.breed);
                pet.color = non_blank(details.color);
                pet.weight = non_blank(details.weight);
                pet.image = non_blank(details.image);
                pet.allergies = non_blank(details.allergies);
                Ok(())
            })
            .await?;

        tracing::info!("Updated pet {}", id);
        Ok(pet)
    }

    /// Change the provided profile fields; a blank value clears the field
    pub async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<PetRecord> {
        let pet = self
            .store
            .update(id, |pet| {
                if let Some(pet_id) = update.pet_id {
                    pet.pet_id = non_blank(Some(pet_id));
                }
                if let Some(vet_info) = update.vet_info {
                    pet.vet_info = non_blank(Some(vet_info));
                }
                if let Some(notes) = update.notes {
                    pet.notes = non_blank(Some(notes));
                }
                Ok(())
            })
            .await?;

        tracing::info!("Updated profile of pet {}", id);
        Ok(pet)
    }

    /// Record the date of the last bath
    pub async fn record_bath(&self, id: &str, date: NaiveDate) -> Result<PetRecord> {
        let pet = self
            .store
            .update(id, |pet| {
                pet.logs_mut().last_bath = Some(date);
                Ok(())
            })
            .await?;

        tracing::info!("Recorded bath for pet {} on {}", id, date);
        Ok(pet)
    }

    /// Save the bath frequency and replace the bath reminder.
    /// The next bath is counted from the last one, or from `today` if none.
    pub async fn set_bath_frequency(
        &self,
        id: &str,
        frequency: Frequency,
        today: NaiveDate,
    ) -> Result<PetRecord> {
        if frequency.count == 0 {
            return Err(AppError::Validation(
                "Bath frequency must be at least 1".to_string(),
            ));
        }

        let mut spec = None;
        let mut previous = None;

        let pet = self
            .store
            .update(id, |pet| {
                let from = pet.last_bath().unwrap_or(today);
                spec = Some(plan_bath_reminder(&pet.name, from, frequency)?);

                let logs = pet.logs_mut();
                logs.bath_frequency = Some(frequency.to_string());
                previous = logs.bath_notification_id.take();
                Ok(())
            })
            .await?;

        tracing::info!("Set bath frequency of pet {} to {}", id, frequency);

        self.reminders.cancel_all(&previous.into_iter().collect::<Vec<_>>()).await;

        let stored_frequency = frequency.to_string();
        let specs: Vec<ReminderSpec> = spec.into_iter().collect();
        self.attach_reminders(pet, &specs, |pet, ids| {
            let logs = pet.logs_mut();
            if logs.bath_frequency.as_deref() != Some(stored_frequency.as_str())
                || logs.bath_notification_id.is_some()
            {
                return false;
            }
            logs.bath_notification_id = ids.into_iter().next();
            true
        })
        .await
    }

    /// Add a medication and schedule a daily reminder for each time
    pub async fn add_medication(&self, id: &str, medication: NewMedication) -> Result<PetRecord> {
        let name = required(&medication.name, "Medication name")?;
        if medication.frequency.count == 0 {
            return Err(AppError::Validation(
                "Medication frequency must be at least 1".to_string(),
            ));
        }
        let times = validate_times(&medication.times_of_day)?;

        let entry = MedicationSchedule {
            name: name.clone(),
            frequency: medication.frequency.to_string(),
            times_per_day: non_blank(medication.times_per_day)
                .unwrap_or_else(|| times.len().to_string()),
            times_of_day: times.clone(),
            instructions: non_blank(medication.instructions).unwrap_or_default(),
            notification_ids: Vec::new(),
        };

        let mut specs = Vec::new();
        let mut index = 0;

        let pet = self
            .store
            .update(id, |pet| {
                specs = plan_medication_reminders(&pet.name, &name, &times)?;
                let list = &mut pet.logs_mut().medications_list;
                list.push(entry);
                index = list.len() - 1;
                Ok(())
            })
            .await?;

        tracing::info!("Added medication '{}' for pet {}", name, id);

        self.attach_reminders(pet, &specs, |pet, ids| {
            match pet
                .logs_mut()
                .medications_list
                .get_mut(index)
                .filter(|entry| entry.name == name && entry.notification_ids.is_empty())
            {
                Some(entry) => {
                    entry.notification_ids = ids;
                    true
                }
                None => false,
            }
        })
        .await
    }

    /// Remove the medication at `index` and cancel its reminders
    pub async fn remove_medication(&self, id: &str, index: usize) -> Result<PetRecord> {
        let mut removed = None;

        let pet = self
            .store
            .update(id, |pet| {
                let list = &mut pet.logs_mut().medications_list;
                if index >= list.len() {
                    return Err(AppError::Validation(format!(
                        "No medication at position {}",
                        index
                    )));
                }
                removed = Some(list.remove(index));
                Ok(())
            })
            .await?;

        if let Some(entry) = removed {
            tracing::info!("Removed medication '{}' from pet {}", entry.name, id);
            self.reminders.cancel_all(&entry.notification_ids).await;
        }

        Ok(pet)
    }

    /// Add a feeding routine and schedule a daily reminder for each time
    pub async fn add_feeding(&self, id: &str, feeding: NewFeeding) -> Result<PetRecord> {
        let food_type = required(&feeding.food_type, "Food type")?;
        let amount = required(&feeding.amount, "Amount")?;
        let frequency_number = required(&feeding.frequency_number, "Frequency")?;
        let frequency_unit = match feeding.frequency_unit.trim() {
            "" => FrequencyUnit::Days.to_string(),
            unit => unit.to_string(),
        };
        let times = validate_times(&split_times_of_day(&feeding.times_of_day))?;

        let entry = FeedingSchedule {
            food_type: food_type.clone(),
            amount: amount.clone(),
            frequency_number,
            frequency_unit,
            times_of_day: times.clone(),
            instructions: non_blank(feeding.instructions).unwrap_or_default(),
            notification_ids: Vec::new(),
        };

        let mut specs = Vec::new();
        let mut index = 0;

        let pet = self
            .store
            .update(id, |pet| {
                specs = plan_feeding_reminders(&pet.name, &food_type, &amount, &times)?;
                let schedule = &mut pet.logs_mut().feeding_schedule;
                schedule.push(entry);
                index = schedule.len() - 1;
                Ok(())
            })
            .await?;

        tracing::info!("Added feeding '{}' for pet {}", food_type, id);

        self.attach_reminders(pet, &specs, |pet, ids| {
            match pet
                .logs_mut()
                .feeding_schedule
                .get_mut(index)
                .filter(|entry| entry.food_type == food_type && entry.notification_ids.is_empty())
            {
                Some(entry) => {
                    entry.notification_ids = ids;
                    true
                }
                None => false,
            }
        })
        .await
    }

    /// Remove the feeding routine at `index` and cancel its reminders
    pub async fn remove_feeding(&self, id: &str, index: usize) -> Result<PetRecord> {
        let mut removed = None;

        let pet = self
            .store
            .update(id, |pet| {
                let schedule = &mut pet.logs_mut().feeding_schedule;
                if index >= schedule.len() {
                    return Err(AppError::Validation(format!(
                        "No feeding at position {}",
                        index
                    )));
                }
                removed = Some(schedule.remove(index));
                Ok(())
            })
            .await?;

        if let Some(entry) = removed {
            tracing::info!("Removed feeding '{}' from pet {}", entry.food_type, id);
            self.reminders.cancel_all(&entry.notification_ids).await;
        }

        Ok(pet)
    }

    /// Append a weight measurement
    pub async fn add_weight(
        &self,
        id: &str,
        weight: f64,
        unit: WeightUnit,
        date: NaiveDate,
    ) -> Result<PetRecord> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(AppError::Validation(format!(
                "Weight must be a positive number, got {}",
                weight
            )));
        }
        if weight > MAX_WEIGHT_VALUE {
            return Err(AppError::Validation(format!(
                "Weight {} exceeds the maximum of {}",
                weight, MAX_WEIGHT_VALUE
            )));
        }

        let pet = self
            .store
            .update(id, |pet| {
                pet.logs_mut()
                    .weight_history
                    .push(WeightEntry { date, weight, unit });
                Ok(())
            })
            .await?;

        tracing::info!("Recorded weight {} {} for pet {} on {}", weight, unit, id, date);
        Ok(pet)
    }

    /// Store the birthday and replace the yearly birthday reminder
    pub async fn set_birthday(
        &self,
        id: &str,
        birthday: NaiveDate,
        today: NaiveDate,
    ) -> Result<PetRecord> {
        if birthday > today {
            return Err(AppError::Validation(format!(
                "Birthday {} is in the future",
                birthday
            )));
        }

        let mut spec = None;
        let mut previous = None;

        let pet = self
            .store
            .update(id, |pet| {
                spec = Some(plan_birthday_reminder(&pet.name, birthday, today));
                pet.birthday = Some(birthday);
                previous = pet.birthday_notification_id.take();
                Ok(())
            })
            .await?;

        tracing::info!("Set birthday of pet {} to {}", id, birthday);

        self.reminders.cancel_all(&previous.into_iter().collect::<Vec<_>>()).await;

        let specs: Vec<ReminderSpec> = spec.into_iter().collect();
        self.attach_reminders(pet, &specs, |pet, ids| {
            if pet.birthday != Some(birthday) || pet.birthday_notification_id.is_some() {
                return false;
            }
            pet.birthday_notification_id = ids.into_iter().next();
            true
        })
        .await
    }

    /// Let the user pick a photo. `None` when the picker was cancelled.
    pub async fn set_image(
        &self,
        id: &str,
        picker: &dyn ImagePicker,
    ) -> Result<Option<PetRecord>> {
        self.store.get(id).await?;

        if !picker.request_permission().await?.is_granted() {
            return Err(AppError::PermissionDenied(
                "Photo library access is required to choose a pet photo".to_string(),
            ));
        }

        let Some(uri) = picker.pick_image().await? else {
            tracing::debug!("Image selection cancelled for pet {}", id);
            return Ok(None);
        };

        let pet = self
            .store
            .update(id, |pet| {
                pet.image = Some(uri);
                Ok(())
            })
            .await?;

        tracing::info!("Updated image of pet {}", id);
        Ok(Some(pet))
    }

    /// Remove a pet and cancel all of its reminders. Returns whether it existed.
    pub async fn remove_pet(&self, id: &str) -> Result<bool> {
        let Some(pet) = self.store.remove(id).await? else {
            return Ok(false);
        };

        self.reminders.cancel_all(&pet.notification_ids()).await;
        tracing::info!("Removed pet {}: {}", id, pet.display_label());

        Ok(true)
    }

    /// Schedule `specs` for an already saved pet and store the handles with
    /// `attach`. A scheduling failure leaves the saved record as it is.
    /// When `attach` declines or the pet is gone, the new reminders are
    /// cancelled.
    async fn attach_reminders<F>(
        &self,
        pet: PetRecord,
        specs: &[ReminderSpec],
        attach: F,
    ) -> Result<PetRecord>
    where
        F: FnOnce(&mut PetRecord, Vec<String>) -> bool + Send,
    {
        let handles = match self.reminders.schedule_all(specs).await {
            Ok(handles) => handles,
            Err(e) => {
                tracing::error!("Saved pet {} but failed to schedule reminders: {}", pet.id, e);
                return Ok(pet);
            }
        };

        if handles.is_empty() {
            return Ok(pet);
        }

        let ids: Vec<String> = handles.into_iter().map(|handle| handle.0).collect();
        let attached_ids = ids.clone();
        let mut attached = false;

        let result = self
            .store
            .update(&pet.id, |pet| {
                attached = attach(pet, attached_ids);
                Ok(())
            })
            .await;

        match result {
            Ok(updated) if attached => Ok(updated),
            Ok(updated) => {
                // A newer write owns this slot now
                tracing::info!("Pet {} changed while scheduling, dropping new reminders", pet.id);
                self.reminders.cancel_all(&ids).await;
                Ok(updated)
            }
            Err(e) => {
                self.reminders.cancel_all(&ids).await;
                Err(e)
            }
        }
    }
}

fn validate_name_and_type(name: &str, kind: &str) -> Result<(String, String)> {
    Ok((required(name, "Name")?, required(kind, "Type")?))
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LENGTH
        )));
    }

    Ok(value.to_string())
}

fn validate_times(times: &[String]) -> Result<Vec<String>> {
    let times: Vec<String> = times
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if times.is_empty() {
        return Err(AppError::Validation(
            "At least one time of day is required".to_string(),
        ));
    }
    if times.len() > MAX_TIMES_PER_ENTRY {
        return Err(AppError::Validation(format!(
            "At most {} times of day are allowed",
            MAX_TIMES_PER_ENTRY
        )));
    }

    Ok(times)
}

/// Trimmed value, or `None` when blank
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

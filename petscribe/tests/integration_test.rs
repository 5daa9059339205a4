//! Integration tests for Petscribe
//!
//! These tests verify end-to-end functionality including:
//! - Pet lifecycle through the file-backed store
//! - Reminder scheduling, replacement and cancellation
//! - Behavior with a corrupt store or disabled notifications

use chrono::NaiveDate;
use petscribe::app::AppState;
use petscribe::calendar::{Frequency, FrequencyUnit};
use petscribe::error::AppError;
use petscribe::models::{NewMedication, NewPet, Trigger, WeightUnit};
use petscribe::services::{FileImagePicker, ReminderSettings};
use tempfile::TempDir;

/// Helper to create app state in a fresh data directory
async fn create_test_app() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let state = AppState::initialize(temp_dir.path().to_path_buf())
        .await
        .unwrap();

    (state, temp_dir)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_pet(name: &str, kind: &str) -> NewPet {
    NewPet {
        name: name.to_string(),
        kind: kind.to_string(),
        ..Default::default()
    }
}

fn medication(times: &[&str]) -> NewMedication {
    NewMedication {
        name: "Heartworm Pill".to_string(),
        frequency: Frequency::new(1, FrequencyUnit::Days).unwrap(),
        times_per_day: None,
        times_of_day: times.iter().map(|t| t.to_string()).collect(),
        instructions: None,
    }
}

#[tokio::test]
async fn test_pet_lifecycle() {
    let (state, _temp) = create_test_app().await;

    let rex = state.pets.add_pet(new_pet("Rex", "Dog")).await.unwrap();

    let labels: Vec<String> = state
        .pets
        .list_pets()
        .await
        .iter()
        .map(|pet| pet.display_label())
        .collect();
    assert_eq!(labels, vec!["Rex (Dog)"]);

    assert!(state.pets.remove_pet(&rex.id).await.unwrap());
    assert!(state.pets.list_pets().await.is_empty());
}

#[tokio::test]
async fn test_records_survive_restart() {
    let temp_dir = TempDir::new().unwrap();

    let id = {
        let state = AppState::initialize(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        let pet = state.pets.add_pet(new_pet("Mochi", "Cat")).await.unwrap();
        state
            .pets
            .add_weight(&pet.id, 9.5, WeightUnit::Pounds, date(2024, 2, 1))
            .await
            .unwrap();
        state
            .pets
            .add_weight(&pet.id, 9.1, WeightUnit::Pounds, date(2024, 1, 1))
            .await
            .unwrap();
        pet.id
    };

    let state = AppState::initialize(temp_dir.path().to_path_buf())
        .await
        .unwrap();
    let pet = state.pets.get_pet(&id).await.unwrap();

    let dates: Vec<NaiveDate> = pet.sorted_weight_history().iter().map(|w| w.date).collect();
    assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 2, 1)]);
    assert_eq!(pet.weight_history()[0].date, date(2024, 2, 1));
}

#[tokio::test]
async fn test_removing_medication_cancels_reminders() {
    let (state, _temp) = create_test_app().await;
    let rex = state.pets.add_pet(new_pet("Rex", "Dog")).await.unwrap();

    state
        .pets
        .add_medication(&rex.id, medication(&["8:00 AM", "8:30 PM"]))
        .await
        .unwrap();

    let reminders = state.notifications.list().await.unwrap();
    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[1].spec.trigger, Trigger::Daily { hour: 20, minute: 30 });
    assert_eq!(reminders[0].spec.body, "It's time to give Rex their Heartworm Pill!");

    state.pets.remove_medication(&rex.id, 0).await.unwrap();
    assert!(state.notifications.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bath_frequency_keeps_one_reminder() {
    let (state, _temp) = create_test_app().await;
    let rex = state.pets.add_pet(new_pet("Rex", "Dog")).await.unwrap();
    state.pets.record_bath(&rex.id, date(2024, 1, 1)).await.unwrap();

    let today = date(2024, 1, 2);
    for count in [1, 2] {
        let frequency = Frequency::new(count, FrequencyUnit::Weeks).unwrap();
        state
            .pets
            .set_bath_frequency(&rex.id, frequency, today)
            .await
            .unwrap();
    }

    let reminders = state.notifications.list().await.unwrap();
    assert_eq!(reminders.len(), 1);

    let expected = date(2024, 1, 15).and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(reminders[0].spec.trigger, Trigger::Once { at: expected });
}

#[tokio::test]
async fn test_removing_pet_cancels_all_reminders() {
    let (state, _temp) = create_test_app().await;
    let rex = state.pets.add_pet(new_pet("Rex", "Dog")).await.unwrap();
    let mochi = state.pets.add_pet(new_pet("Mochi", "Cat")).await.unwrap();

    state
        .pets
        .add_medication(&rex.id, medication(&["8:00 AM"]))
        .await
        .unwrap();
    state
        .pets
        .set_birthday(&rex.id, date(2020, 3, 15), date(2024, 3, 10))
        .await
        .unwrap();
    state
        .pets
        .add_medication(&mochi.id, medication(&["9:00 AM"]))
        .await
        .unwrap();
    assert_eq!(state.notifications.list().await.unwrap().len(), 3);

    state.pets.remove_pet(&rex.id).await.unwrap();

    let remaining = state.notifications.list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].spec.body, "It's time to give Mochi their Heartworm Pill!");
}

#[tokio::test]
async fn test_corrupt_store_lists_empty_and_is_not_overwritten() {
    let (state, temp) = create_test_app().await;
    let pets_file = temp.path().join("store").join("pets.json");
    tokio::fs::write(&pets_file, "{not json").await.unwrap();

    assert!(state.pets.list_pets().await.is_empty());

    let result = state.pets.add_pet(new_pet("Rex", "Dog")).await;
    assert!(matches!(result, Err(AppError::StorageRead(_))));

    let contents = tokio::fs::read_to_string(&pets_file).await.unwrap();
    assert_eq!(contents, "{not json");
}

#[tokio::test]
async fn test_disabled_notifications_store_no_handles() {
    let (state, _temp) = create_test_app().await;
    state
        .settings
        .update_reminders(ReminderSettings { enabled: false })
        .await
        .unwrap();

    let rex = state.pets.add_pet(new_pet("Rex", "Dog")).await.unwrap();
    let pet = state
        .pets
        .add_medication(&rex.id, medication(&["8:00 AM"]))
        .await
        .unwrap();

    assert_eq!(pet.medications_list().len(), 1);
    assert!(pet.notification_ids().is_empty());
    assert!(state.notifications.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_image_import() {
    let (state, temp) = create_test_app().await;
    let rex = state.pets.add_pet(new_pet("Rex", "Dog")).await.unwrap();

    let photo = temp.path().join("rex.jpg");
    tokio::fs::write(&photo, b"jpeg bytes").await.unwrap();

    let picker = FileImagePicker::new(state.images.clone(), Some(photo.display().to_string()));
    let pet = state.pets.set_image(&rex.id, &picker).await.unwrap().unwrap();

    let image = pet.image.unwrap();
    assert!(image.starts_with("file://"));

    // Photo stays reachable after the source is deleted
    tokio::fs::remove_file(&photo).await.unwrap();
    let stored = image.trim_start_matches("file://");
    assert!(std::path::Path::new(stored).exists());
}

#[tokio::test]
async fn test_unknown_pet() {
    let (state, _temp) = create_test_app().await;

    let result = state.pets.record_bath("missing", date(2024, 1, 1)).await;
    assert!(matches!(result, Err(AppError::PetNotFound(_))));
    assert!(!state.pets.remove_pet("missing").await.unwrap());
}

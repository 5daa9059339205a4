//! Command line front end
//!
//! One subcommand per screen action. Medications and feedings are addressed
//! by the 1-based positions `show` prints.

use crate::app::AppState;
use crate::calendar::{Frequency, FrequencyUnit};
use crate::config::APP_DIR_NAME;
use crate::models::{
    NewFeeding, NewMedication, NewPet, PetDetails, PetRecord, ProfileUpdate, WeightUnit,
};
use crate::services::{DisplaySettings, FileImagePicker, ReminderDispatcher, ReminderSettings};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;

#[derive(Args, Debug, Clone)]
pub struct PetFieldsArgs {
    #[arg(long)]
    name: String,
    /// Kind of animal, e.g. Dog
    #[arg(long = "type")]
    kind: String,
    #[arg(long)]
    breed: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    weight: Option<String>,
    /// Image URI
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    allergies: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[command(flatten)]
    fields: PetFieldsArgs,
    /// Current medications, free text
    #[arg(long)]
    medications: Option<String>,
    #[arg(long)]
    last_bath: Option<NaiveDate>,
    #[arg(long)]
    last_medication: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    id: String,
    /// Microchip or registration number
    #[arg(long)]
    pet_id: Option<String>,
    #[arg(long)]
    vet_info: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AddMedArgs {
    id: String,
    #[arg(long)]
    name: String,
    /// e.g. "1 days", "2 weeks"
    #[arg(long)]
    frequency: Frequency,
    /// Comma-separated, e.g. "8:00 AM, 8:00 PM"
    #[arg(long)]
    times: String,
    #[arg(long)]
    times_per_day: Option<String>,
    #[arg(long)]
    instructions: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AddFeedingArgs {
    id: String,
    #[arg(long)]
    food: String,
    #[arg(long)]
    amount: String,
    #[arg(long)]
    frequency_number: String,
    #[arg(long, default_value = "days")]
    frequency_unit: String,
    /// Comma-separated, e.g. "8:00 AM, 6:00 PM"
    #[arg(long)]
    times: String,
    #[arg(long)]
    instructions: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    /// List all pets
    List,
    /// Show a pet's full profile
    Show { id: String },
    /// Add a pet
    Add(AddArgs),
    /// Replace a pet's basic details
    Edit {
        id: String,
        #[command(flatten)]
        fields: PetFieldsArgs,
    },
    /// Edit pet id, vet info and notes
    Profile(ProfileArgs),
    /// Remove a pet and its reminders
    Remove { id: String },
    /// Record a bath (defaults to today)
    Bath {
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Set how often the pet is bathed and schedule the next reminder
    BathFrequency {
        id: String,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
        unit: FrequencyUnit,
    },
    /// Add a medication with daily reminders
    AddMed(AddMedArgs),
    /// Remove a medication by its position in `show`
    RemoveMed {
        id: String,
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: u64,
    },
    /// Add a feeding routine with daily reminders
    AddFeeding(AddFeedingArgs),
    /// Remove a feeding routine by its position in `show`
    RemoveFeeding {
        id: String,
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: u64,
    },
    /// Record a weight measurement
    Weight {
        id: String,
        value: f64,
        /// lbs or kg; defaults to the display setting
        #[arg(long)]
        unit: Option<WeightUnit>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Set the birthday and schedule the yearly reminder
    Birthday { id: String, date: NaiveDate },
    /// Set the photo from a local file or an http(s) URL
    Image { id: String, source: String },
    /// List scheduled reminders
    Reminders,
    /// Run scheduled reminders until interrupted
    Watch,
    /// Show or change settings
    Settings {
        #[arg(long, value_enum)]
        notifications: Option<Toggle>,
        #[arg(long)]
        weight_unit: Option<WeightUnit>,
    },
}

/// Track pets, their care and reminders
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    /// Where pets, reminders and settings are stored
    #[arg(long, env = "PETSCRIBE_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        let state = AppState::initialize(data_dir).await?;
        let today = Local::now().date_naive();

        match &self.action {
            Action::List => {
                let pets = state.pets.list_pets().await;
                if pets.is_empty() {
                    println!("No pets yet. Add one with `petscribe add`.");
                }
                for pet in pets {
                    println!("{}  {}", pet.id, pet.display_label());
                }
            }
            Action::Show { id } => {
                let pet = state.pets.get_pet(id).await?;
                print_pet(&pet, today);
            }
            Action::Add(args) => {
                let fields = args.fields.clone();
                let pet = state
                    .pets
                    .add_pet(NewPet {
                        name: fields.name,
                        kind: fields.kind,
                        breed: fields.breed,
                        color: fields.color,
                        weight: fields.weight,
                        image: fields.image,
                        allergies: fields.allergies,
                        medications: args.medications.clone(),
                        last_bath: args.last_bath,
                        last_medication: args.last_medication.clone(),
                    })
                    .await?;
                println!("Added {} [{}]", pet.display_label(), pet.id);
            }
            Action::Edit { id, fields } => {
                let fields = fields.clone();
                let pet = state
                    .pets
                    .edit_pet(
                        id,
                        PetDetails {
                            name: fields.name,
                            kind: fields.kind,
                            breed: fields.breed,
                            color: fields.color,
                            weight: fields.weight,
                            image: fields.image,
                            allergies: fields.allergies,
                        },
                    )
                    .await?;
                println!("Updated {}", pet.display_label());
            }
            Action::Profile(args) => {
                let pet = state
                    .pets
                    .update_profile(
                        &args.id,
                        ProfileUpdate {
                            pet_id: args.pet_id.clone(),
                            vet_info: args.vet_info.clone(),
                            notes: args.notes.clone(),
                        },
                    )
                    .await?;
                print_pet(&pet, today);
            }
            Action::Remove { id } => {
                if state.pets.remove_pet(id).await? {
                    println!("Removed pet {}", id);
                } else {
                    println!("No pet with id {}", id);
                }
            }
            Action::Bath { id, date } => {
                let date = date.unwrap_or(today);
                let pet = state.pets.record_bath(id, date).await?;
                println!("Recorded bath for {} on {}", pet.name, date);
            }
            Action::BathFrequency { id, count, unit } => {
                let frequency = Frequency::new(*count, *unit)?;
                let pet = state.pets.set_bath_frequency(id, frequency, today).await?;
                println!("{} is bathed every {}", pet.name, frequency);
            }
            Action::AddMed(args) => {
                let pet = state
                    .pets
                    .add_medication(
                        &args.id,
                        NewMedication {
                            name: args.name.clone(),
                            frequency: args.frequency,
                            times_per_day: args.times_per_day.clone(),
                            times_of_day: args.times.split(',').map(str::to_string).collect(),
                            instructions: args.instructions.clone(),
                        },
                    )
                    .await?;
                println!("Added medication {} for {}", args.name, pet.name);
            }
            Action::RemoveMed { id, position } => {
                let pet = state
                    .pets
                    .remove_medication(id, to_index(*position)?)
                    .await?;
                println!("{} has {} medication(s)", pet.name, pet.medications_list().len());
            }
            Action::AddFeeding(args) => {
                let pet = state
                    .pets
                    .add_feeding(
                        &args.id,
                        NewFeeding {
                            food_type: args.food.clone(),
                            amount: args.amount.clone(),
                            frequency_number: args.frequency_number.clone(),
                            frequency_unit: args.frequency_unit.clone(),
                            times_of_day: args.times.clone(),
                            instructions: args.instructions.clone(),
                        },
                    )
                    .await?;
                println!("Added feeding {} for {}", args.food, pet.name);
            }
            Action::RemoveFeeding { id, position } => {
                let pet = state
                    .pets
                    .remove_feeding(id, to_index(*position)?)
                    .await?;
                println!("{} has {} feeding routine(s)", pet.name, pet.feeding_schedule().len());
            }
            Action::Weight {
                id,
                value,
                unit,
                date,
            } => {
                let unit = match unit {
                    Some(unit) => *unit,
                    None => state.settings.get_display().await?.weight_unit,
                };
                let date = date.unwrap_or(today);
                let pet = state.pets.add_weight(id, *value, unit, date).await?;
                println!("Recorded {} {} for {} on {}", value, unit, pet.name, date);
            }
            Action::Birthday { id, date } => {
                let pet = state.pets.set_birthday(id, *date, today).await?;
                if let Some(age) = pet.age(today) {
                    println!("{} is {}", pet.name, age);
                }
            }
            Action::Image { id, source } => {
                let picker = FileImagePicker::new(state.images.clone(), Some(source.clone()));
                match state.pets.set_image(id, &picker).await? {
                    Some(pet) => println!(
                        "Updated photo of {}: {}",
                        pet.name,
                        pet.image.unwrap_or_default()
                    ),
                    None => println!("Photo unchanged"),
                }
            }
            Action::Reminders => {
                let reminders = state.notifications.list().await?;
                if reminders.is_empty() {
                    println!("No reminders scheduled");
                }
                for reminder in reminders {
                    println!(
                        "{}  {}  {}: {}",
                        reminder.id, reminder.spec.trigger, reminder.spec.title, reminder.spec.body
                    );
                }
            }
            Action::Watch => watch(&state).await?,
            Action::Settings {
                notifications,
                weight_unit,
            } => {
                if let Some(toggle) = notifications {
                    state
                        .settings
                        .update_reminders(ReminderSettings {
                            enabled: matches!(toggle, Toggle::On),
                        })
                        .await?;
                }
                if let Some(weight_unit) = weight_unit {
                    state
                        .settings
                        .update_display(DisplaySettings {
                            weight_unit: *weight_unit,
                        })
                        .await?;
                }

                let settings = state.settings.load().await?;
                println!(
                    "notifications: {}",
                    if settings.reminders.enabled { "on" } else { "off" }
                );
                println!("weight unit: {}", settings.display.weight_unit);
            }
        }

        Ok(())
    }
}

async fn watch(state: &AppState) -> anyhow::Result<()> {
    let dispatcher = ReminderDispatcher::new().await?;
    dispatcher.sync(&state.notifications.list().await?).await?;
    dispatcher.start().await?;

    let mut events = dispatcher.subscribe();
    let resync = dispatcher.start_resync(state.notifications.clone());

    println!("Watching reminders, press Ctrl+C to stop");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => println!("{}\n  {}", event.title, event.body),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} reminder event(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    resync.abort();
    dispatcher.shutdown().await?;

    Ok(())
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .context("Could not determine a data directory, pass --data-dir")
}

fn to_index(position: u64) -> anyhow::Result<usize> {
    let index = usize::try_from(position).context("Position out of range")?;
    Ok(index.saturating_sub(1))
}

fn print_pet(pet: &PetRecord, today: NaiveDate) {
    println!("{}", pet.display_label());
    println!("  ID: {}", pet.id);

    let details = [
        ("Breed", &pet.breed),
        ("Color", &pet.color),
        ("Weight", &pet.weight),
        ("Allergies", &pet.allergies),
        ("Medications", &pet.medications),
        ("Pet ID", &pet.pet_id),
        ("Vet", &pet.vet_info),
        ("Notes", &pet.notes),
        ("Photo", &pet.image),
    ];
    for (label, value) in details {
        if let Some(value) = value {
            println!("  {}: {}", label, value);
        }
    }

    if let (Some(birthday), Some(age)) = (pet.birthday, pet.age(today)) {
        println!("  Birthday: {} ({})", birthday, age);
    }

    if let Some(last_bath) = pet.last_bath() {
        println!("  Last bath: {}", last_bath);
    }
    if let Some(frequency) = pet.bath_frequency() {
        println!("  Bath every: {}", frequency);
    }

    let medications = pet.medications_list();
    if !medications.is_empty() {
        println!("  Medications:");
        for (i, med) in medications.iter().enumerate() {
            println!(
                "    {}. {} every {} at {}",
                i + 1,
                med.name,
                med.frequency,
                med.times_of_day.join(", ")
            );
            if !med.instructions.is_empty() {
                println!("       {}", med.instructions);
            }
        }
    }

    let feeding = pet.feeding_schedule();
    if !feeding.is_empty() {
        println!("  Feeding:");
        for (i, entry) in feeding.iter().enumerate() {
            println!(
                "    {}. {} of {} every {} {} at {}",
                i + 1,
                entry.amount,
                entry.food_type,
                entry.frequency_number,
                entry.frequency_unit,
                entry.times_of_day.join(", ")
            );
            if !entry.instructions.is_empty() {
                println!("       {}", entry.instructions);
            }
        }
    }

    let weights = pet.sorted_weight_history();
    if !weights.is_empty() {
        println!("  Weight history:");
        for entry in weights {
            println!("    {}  {} {}", entry.date, entry.weight, entry.unit);
        }
    }
}

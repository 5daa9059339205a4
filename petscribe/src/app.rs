//! Application state and initialization
//!
//! Every service for one data directory is created here and shared through
//! `AppState`.

use crate::config::{IMAGES_DIR_NAME, STORE_DIR_NAME};
use crate::error::Result;
use crate::services::{NotificationCenter, PetsService, RemindersService, SettingsService};
use crate::storage::{FileKeyValueStore, ImageStore, KeyValueStore, PetStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub pets: PetsService,
    pub notifications: NotificationCenter,
    pub settings: SettingsService,
    pub images: ImageStore,
}

impl AppState {
    /// Create directories and wire services for `app_data_dir`
    pub async fn initialize(app_data_dir: PathBuf) -> Result<Self> {
        tracing::info!("App data directory: {:?}", app_data_dir);

        tokio::fs::create_dir_all(&app_data_dir).await?;

        let kv_store = FileKeyValueStore::new(app_data_dir.join(STORE_DIR_NAME));
        kv_store.initialize().await?;
        let kv: Arc<dyn KeyValueStore> = Arc::new(kv_store);

        let images = ImageStore::new(app_data_dir.join(IMAGES_DIR_NAME));
        images.initialize().await?;

        let settings = SettingsService::new(app_data_dir.clone());
        let notifications = NotificationCenter::new(Arc::clone(&kv), settings.clone());
        let reminders = RemindersService::new(Arc::new(notifications.clone()));
        let pets = PetsService::new(PetStore::new(kv), reminders);

        tracing::info!("Application initialized successfully");

        Ok(Self {
            app_data_dir,
            pets,
            notifications,
            settings,
            images,
        })
    }
}

//! Storage module
//!
//! Key-value document storage, the pet collection on top of it,
//! and content-addressed storage for pet photos.

pub mod image_store;
pub mod kv_store;
pub mod pet_store;

pub use image_store::ImageStore;
pub use kv_store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use pet_store::PetStore;

//! Petscribe library
//!
//! Pet records, care logs and the reminders derived from them. The binary
//! is a thin command-line front end over this crate.

pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

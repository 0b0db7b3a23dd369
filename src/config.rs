// ABOUTME: Configuration loading for the esm binary.
// ABOUTME: Reads ESM_* environment variables (after .env) with defaults for every setting.

use std::path::PathBuf;

use esm_store::Backend;
use thiserror::Error;

use crate::reminder::{ReminderSchedule, ScheduleError};

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ESM_BACKEND is invalid: {0}")]
    InvalidBackend(String),

    #[error("ESM_REMINDER_TIMES is invalid: {0}")]
    InvalidReminderTimes(#[from] ScheduleError),
}

/// Runtime configuration for the CLI.
#[derive(Debug, Clone)]
pub struct EsmConfig {
    pub home: PathBuf,
    pub backend: Backend,
    pub reminders: ReminderSchedule,
}

impl EsmConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - ESM_HOME: data directory (default: ~/.esm)
    /// - ESM_BACKEND: `sqlite` or `document` (default: sqlite)
    /// - ESM_REMINDER_TIMES: comma-separated HH:MM list (default: 09:00,14:00,20:00)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let home = var("ESM_HOME").map(PathBuf::from).unwrap_or_else(|| {
            var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".esm")
        });

        let backend = match var("ESM_BACKEND") {
            Some(raw) => raw.parse::<Backend>().map_err(ConfigError::InvalidBackend)?,
            None => Backend::default(),
        };

        let reminders = match var("ESM_REMINDER_TIMES") {
            Some(raw) => raw.parse::<ReminderSchedule>()?,
            None => ReminderSchedule::default(),
        };

        Ok(Self {
            home,
            backend,
            reminders,
        })
    }
}

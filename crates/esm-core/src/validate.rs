// ABOUTME: Validated insert inputs for each record kind.
// ABOUTME: Every store backend builds one of these before touching durable state.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::{LocationRecord, RecordId, SentimentRecord, VlogRecord};

pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

/// Reasons a caller-supplied value is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be between 1 and 5, got {value}")]
    RatingOutOfRange { field: &'static str, value: i64 },

    #[error("latitude must be a number between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude must be a number between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),

    #[error("vlog file path must not be empty")]
    EmptyFilePath,
}

fn rating(field: &'static str, value: i64) -> Result<u8, ValidationError> {
    if (RATING_MIN..=RATING_MAX).contains(&value) {
        // Range-checked above, fits in u8.
        Ok(value as u8)
    } else {
        Err(ValidationError::RatingOutOfRange { field, value })
    }
}

/// A self-report whose ratings have all been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentInput {
    pub mood: u8,
    pub energy: u8,
    pub stress: u8,
}

impl SentimentInput {
    /// Validate raw ratings. The first out-of-range field is reported.
    pub fn new(mood: i64, energy: i64, stress: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            mood: rating("mood", mood)?,
            energy: rating("energy", energy)?,
            stress: rating("stress", stress)?,
        })
    }

    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> SentimentRecord {
        SentimentRecord {
            id,
            mood: self.mood,
            energy: self.energy,
            stress: self.stress,
            created_at,
        }
    }
}

/// A coordinate pair inside the WGS84 bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationInput {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationInput {
    /// Validate a coordinate pair. NaN and infinities fall outside both ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> LocationRecord {
        LocationRecord {
            id,
            latitude: self.latitude,
            longitude: self.longitude,
            created_at,
        }
    }
}

/// A non-blank file path reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlogInput {
    pub file_path: String,
}

impl VlogInput {
    pub fn new(file_path: &str) -> Result<Self, ValidationError> {
        if file_path.trim().is_empty() {
            return Err(ValidationError::EmptyFilePath);
        }
        Ok(Self {
            file_path: file_path.to_string(),
        })
    }

    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> VlogRecord {
        VlogRecord {
            id,
            file_path: self.file_path,
            created_at,
        }
    }
}

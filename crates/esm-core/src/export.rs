// ABOUTME: The export bundle: all three collections plus derived summary statistics.
// ABOUTME: Built in memory from list results; serialized by callers for sharing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{LocationRecord, SentimentRecord, VlogRecord};

/// Number of records in each collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub sentiments: usize,
    pub locations: usize,
    pub vlogs: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.sentiments + self.locations + self.vlogs
    }
}

/// Summary statistics carried inside a bundle.
///
/// The time range covers the sentiment collection only. Locations and vlogs
/// do not widen it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub counts: Counts,
    pub time_range_first: Option<DateTime<Utc>>,
    pub time_range_last: Option<DateTime<Utc>>,
}

/// A point-in-time snapshot of every collection, newest records first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub exported_at: DateTime<Utc>,
    pub sentiments: Vec<SentimentRecord>,
    pub locations: Vec<LocationRecord>,
    pub vlogs: Vec<VlogRecord>,
    pub summary: ExportSummary,
}

/// Earliest and latest sentiment timestamps, as written to `summary.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

/// Standalone summary document for the split export layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    pub exported_at: DateTime<Utc>,
    pub counts: Counts,
    pub time_range: TimeRange,
}

impl ExportBundle {
    /// Assemble a bundle from already-listed collections and compute its summary.
    pub fn assemble(
        exported_at: DateTime<Utc>,
        sentiments: Vec<SentimentRecord>,
        locations: Vec<LocationRecord>,
        vlogs: Vec<VlogRecord>,
    ) -> Self {
        let counts = Counts {
            sentiments: sentiments.len(),
            locations: locations.len(),
            vlogs: vlogs.len(),
        };
        let summary = ExportSummary {
            counts,
            time_range_first: sentiments.iter().map(|s| s.created_at).min(),
            time_range_last: sentiments.iter().map(|s| s.created_at).max(),
        };

        Self {
            exported_at,
            sentiments,
            locations,
            vlogs,
            summary,
        }
    }

    pub fn summary_document(&self) -> SummaryDocument {
        SummaryDocument {
            exported_at: self.exported_at,
            counts: self.summary.counts,
            time_range: TimeRange {
                first: self.summary.time_range_first,
                last: self.summary.time_range_last,
            },
        }
    }

    /// Pretty-printed JSON, the format written to export files.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

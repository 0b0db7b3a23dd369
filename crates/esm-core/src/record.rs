// ABOUTME: Defines the three immutable record kinds (sentiment, location, vlog) and their collections.
// ABOUTME: Also holds the shared newest-first ordering and store-assigned timestamp helpers.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a record within its collection. Assigned by the store,
/// strictly increasing with insertion order and never reused.
pub type RecordId = i64;

/// The three named logical record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Sentiments,
    Locations,
    Vlogs,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Sentiments,
        Collection::Locations,
        Collection::Vlogs,
    ];

    /// Stable key used for table names, document names, and export file names.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Sentiments => "sentiments",
            Collection::Locations => "locations",
            Collection::Vlogs => "vlogs",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentiments" | "sentiment" | "surveys" | "survey" => Ok(Collection::Sentiments),
            "locations" | "location" | "gps" => Ok(Collection::Locations),
            "vlogs" | "vlog" => Ok(Collection::Vlogs),
            other => Err(format!("unknown collection: {other}")),
        }
    }
}

/// Common accessors shared by every record kind.
pub trait Record {
    fn id(&self) -> RecordId;
    fn created_at(&self) -> DateTime<Utc>;
}

/// A mood/energy/stress self-report. Each rating is in 1..=5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentRecord {
    pub id: RecordId,
    pub mood: u8,
    pub energy: u8,
    pub stress: u8,
    pub created_at: DateTime<Utc>,
}

/// An approximate GPS fix in decimal degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: RecordId,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

/// A reference to a video clip on the filesystem. The store owns only the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VlogRecord {
    pub id: RecordId,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

impl VlogRecord {
    /// The last component of the referenced path, for display.
    pub fn file_name(&self) -> Option<&str> {
        Path::new(&self.file_path)
            .file_name()
            .and_then(|name| name.to_str())
    }
}

macro_rules! impl_record {
    ($($ty:ty),+) => {
        $(impl Record for $ty {
            fn id(&self) -> RecordId {
                self.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        })+
    };
}

impl_record!(SentimentRecord, LocationRecord, VlogRecord);

/// The current time truncated to microseconds, the precision every backend
/// persists. Records returned from an insert therefore compare equal to the
/// same records read back by a list.
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 rendering whose lexical order matches time order.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Compare two records newest first: `created_at` descending, then `id` descending.
pub fn newest_first<R: Record>(a: &R, b: &R) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(&a.id()))
}

/// Sort a slice of records into the list-all contract order.
pub fn sort_newest_first<R: Record>(records: &mut [R]) {
    records.sort_by(newest_first);
}

/// File name for a freshly captured clip, embedding the capture time in epoch millis.
pub fn vlog_file_name(at: DateTime<Utc>) -> String {
    format!("vlog_{}.mp4", at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sentiment(id: RecordId, secs: i64) -> SentimentRecord {
        SentimentRecord {
            id,
            mood: 3,
            energy: 3,
            stress: 3,
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn sort_puts_newest_first() {
        let mut records = vec![sentiment(1, 100), sentiment(2, 300), sentiment(3, 200)];
        sort_newest_first(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn sort_breaks_timestamp_ties_by_id() {
        let mut records = vec![sentiment(4, 100), sentiment(5, 100), sentiment(6, 100)];
        sort_newest_first(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![6, 5, 4]);
    }

    #[test]
    fn timestamp_format_is_fixed_width() {
        let whole = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let fractional = Utc.timestamp_opt(1_700_000_000, 500_000_000).unwrap();
        let a = format_timestamp(&whole);
        let b = format_timestamp(&fractional);
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(a, "2023-11-14T22:13:20.000000Z");
    }

    #[test]
    fn now_micros_has_no_sub_microsecond_part() {
        let now = now_micros();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn vlog_file_name_extracts_last_component() {
        let record = VlogRecord {
            id: 1,
            file_path: "/data/vlogs/vlog_1700000000000.mp4".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(record.file_name(), Some("vlog_1700000000000.mp4"));
    }

    #[test]
    fn vlog_file_name_embeds_epoch_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(vlog_file_name(at), "vlog_1700000000123.mp4");
    }

    #[test]
    fn collection_parses_aliases() {
        assert_eq!("surveys".parse::<Collection>().unwrap(), Collection::Sentiments);
        assert_eq!("GPS".parse::<Collection>().unwrap(), Collection::Locations);
        assert_eq!("vlog".parse::<Collection>().unwrap(), Collection::Vlogs);
        assert!("photos".parse::<Collection>().is_err());
    }

    #[test]
    fn records_serialize_camel_case() {
        let json = serde_json::to_value(sentiment(7, 0)).unwrap();
        assert_eq!(json["id"], 7);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}

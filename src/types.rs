//! Result schemas mirroring restic's JSON summary shapes, and the
//! content-hash snapshot identifier.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{Error as DeError, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Size of an identifier in bytes (SHA-256 content hash).
pub const ID_SIZE: usize = 32;

/// Content-derived identifier referencing data within a repository.
///
/// The canonical string form is lowercase hex, exactly twice [`ID_SIZE`]
/// characters, and round-trips losslessly through [`Id::parse`] and
/// [`fmt::Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Id([u8; ID_SIZE]);

impl Id {
    /// Parses a 64-character hex string into an identifier.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != ID_SIZE * 2 {
            return Err(Error::InvalidId);
        }
        let mut bytes = [0u8; ID_SIZE];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| Error::InvalidId)?;
        Ok(Id(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Id::parse(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Id::parse(&s).map_err(|_| {
            D::Error::invalid_value(Unexpected::Str(&s), &"a 64-character hex identifier")
        })
    }
}

/// The state of a backed-up resource at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Id,
    #[serde(default)]
    pub short_id: String,
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<Id>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default)]
    pub uid: u32,
    #[serde(default)]
    pub gid: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Id>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub program_version: String,
}

/// Final summary record of a backup run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupSummary {
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub files_new: u64,
    #[serde(default)]
    pub files_changed: u64,
    #[serde(default)]
    pub files_unmodified: u64,
    #[serde(default)]
    pub dirs_new: u64,
    #[serde(default)]
    pub dirs_changed: u64,
    #[serde(default)]
    pub dirs_unmodified: u64,
    #[serde(default)]
    pub data_blobs: u64,
    #[serde(default)]
    pub tree_blobs: u64,
    #[serde(default)]
    pub data_added: u64,
    #[serde(default)]
    pub total_files_processed: u64,
    #[serde(default)]
    pub total_bytes_processed: u64,
    #[serde(default)]
    pub total_duration: f64,
    #[serde(default)]
    pub snapshot_id: String,
}

/// Final summary record of a restore run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreSummary {
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub files_restored: u64,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub bytes_restored: u64,
}

/// Per-group outcome of a forget run: what was kept, what was removed,
/// and why.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgetSummary {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub paths: Option<Vec<String>>,
    #[serde(default)]
    pub keep: Option<Vec<ForgetGroupSnapshot>>,
    #[serde(default)]
    pub remove: Option<Vec<ForgetGroupSnapshot>>,
    #[serde(default)]
    pub reasons: Option<Vec<ForgetReason>>,
}

/// Snapshot entry inside a forget keep/remove group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgetGroupSnapshot {
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<Id>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub uid: u32,
    #[serde(default)]
    pub gid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub program_version: String,
    // The reasons record omits the id fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_id: String,
}

/// Why a snapshot was kept by the retention policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgetReason {
    pub snapshot: ForgetGroupSnapshot,
    #[serde(default)]
    pub matches: Vec<String>,
    #[serde(default)]
    pub counters: ForgetCounters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgetCounters {
    #[serde(default)]
    pub last: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_ID: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn id_round_trips_through_hex() {
        let id = Id::parse(HEX_ID).expect("valid id");
        assert_eq!(id.to_string(), HEX_ID);
        assert_eq!(HEX_ID.parse::<Id>().expect("from_str"), id);
    }

    #[test]
    fn id_string_length_is_twice_the_byte_length() {
        let id = Id::parse(HEX_ID).expect("valid id");
        assert_eq!(id.to_string().len(), id.as_bytes().len() * 2);
    }

    #[test]
    fn id_rejects_bad_input() {
        assert!(matches!(Id::parse(""), Err(Error::InvalidId)));
        assert!(matches!(Id::parse("0123456789abcdef"), Err(Error::InvalidId)));
        let long = format!("{HEX_ID}00");
        assert!(matches!(Id::parse(&long), Err(Error::InvalidId)));
        let bad = HEX_ID.replace('0', "g");
        assert!(matches!(Id::parse(&bad), Err(Error::InvalidId)));
    }

    #[test]
    fn id_serde_round_trip() {
        let id = Id::parse(HEX_ID).expect("valid id");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{HEX_ID}\""));
        let back: Id = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn snapshot_deserializes_from_restic_json() {
        let json = format!(
            r#"{{
                "id": "{HEX_ID}",
                "short_id": "01234567",
                "time": "2024-03-01T12:30:45.123456789Z",
                "tree": "{HEX_ID}",
                "paths": ["/data"],
                "hostname": "host-1",
                "username": "root",
                "uid": 0,
                "gid": 0,
                "tags": ["daily"],
                "program_version": "restic 0.16.4"
            }}"#
        );
        let snapshot: Snapshot = serde_json::from_str(&json).expect("snapshot");
        assert_eq!(snapshot.short_id, "01234567");
        assert_eq!(snapshot.paths, vec!["/data"]);
        assert_eq!(snapshot.tags, vec!["daily"]);
        assert!(snapshot.parent.is_none());
        assert_eq!(snapshot.id.to_string(), HEX_ID);
    }

    #[test]
    fn backup_summary_deserializes() {
        let json = r#"{
            "message_type": "summary",
            "files_new": 10,
            "files_changed": 2,
            "total_files_processed": 12,
            "total_bytes_processed": 4096,
            "total_duration": 0.25,
            "snapshot_id": "deadbeef"
        }"#;
        let summary: BackupSummary = serde_json::from_str(json).expect("summary");
        assert_eq!(summary.files_new, 10);
        assert_eq!(summary.snapshot_id, "deadbeef");
        assert_eq!(summary.dirs_new, 0);
    }

    #[test]
    fn forget_summary_deserializes_with_null_fields() {
        let json = format!(
            r#"[{{
                "tags": null,
                "host": "host-1",
                "paths": ["/data"],
                "keep": [{{
                    "time": "2024-03-01T12:30:45Z",
                    "tree": "{HEX_ID}",
                    "paths": ["/data"],
                    "hostname": "host-1",
                    "username": "root",
                    "id": "{HEX_ID}",
                    "short_id": "01234567"
                }}],
                "remove": null,
                "reasons": [{{
                    "snapshot": {{
                        "time": "2024-03-01T12:30:45Z",
                        "paths": ["/data"],
                        "hostname": "host-1"
                    }},
                    "matches": ["last snapshot"],
                    "counters": {{"last": 0}}
                }}]
            }}]"#
        );
        let groups: Vec<ForgetSummary> = serde_json::from_str(&json).expect("forget groups");
        assert_eq!(groups.len(), 1);
        let keep = groups[0].keep.as_ref().expect("keep list");
        assert_eq!(keep.len(), 1);
        assert_eq!(keep[0].short_id, "01234567");
        assert!(groups[0].remove.is_none());
    }
}

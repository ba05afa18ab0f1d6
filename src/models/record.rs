//! The key record model and its patch/projection forms.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One stored credential and its metadata.
///
/// `key`, `account`, and `domain` are required and immutable once the
/// record is in the store; `domain` is held in canonical form. The
/// remaining named fields are optional, with the empty string meaning
/// unset. Caller-defined fields live in `extra` and round-trip through
/// the key file via the flattened map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub mnemonic: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "ts")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "ts")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub expired: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Record {
    /// A blank record with only the creation timestamp filled in.
    pub fn new() -> Self {
        Self {
            created_at: Some(now()),
            ..Self::default()
        }
    }
}

/// A partial record used to address and modify an existing record.
///
/// `key` plus a non-empty `account` and/or `domain` locate the record.
/// The optional fields describe the desired end state of the record's
/// non-protected fields: `None` clears a named field, and extension
/// entries absent from `extra` are removed from the record.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub key: String,
    pub account: String,
    pub domain: String,
    pub organization: Option<String>,
    pub mnemonic: Option<String>,
    pub description: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl RecordPatch {
    /// Start a patch from a live record, carrying its current fields.
    pub fn from_record(record: &Record) -> Self {
        Self {
            key: record.key.clone(),
            account: record.account.clone(),
            domain: record.domain.clone(),
            organization: non_empty(&record.organization),
            mnemonic: non_empty(&record.mnemonic),
            description: non_empty(&record.description),
            extra: record.extra.clone(),
        }
    }
}

/// Projection of a record for listings; never carries key material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub account: String,
    pub domain: String,
    pub description: String,
    pub expired: bool,
}

impl ListEntry {
    pub fn from_record(record: &Record) -> Self {
        Self {
            account: record.account.clone(),
            domain: record.domain.clone(),
            description: record.description.clone(),
            expired: record.expired,
        }
    }
}

/// The current local time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Timestamp codec for the key file: `"YYYY-MM-DD HH:MM:SS"` in local
/// time, with the empty string standing for an unset timestamp.
mod ts {
    use crate::constants::TS_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.collect_str(&ts.format(TS_FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(&raw, TS_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    #[test]
    fn test_new_record_has_creation_timestamp_only() {
        let record = Record::new();
        assert!(record.created_at.is_some());
        assert!(record.updated_at.is_none());
        assert!(!record.expired);
        assert!(record.key.is_empty());
        assert!(record.account.is_empty());
        assert!(record.domain.is_empty());
    }

    #[test]
    fn test_now_has_no_subsecond_component() {
        assert_eq!(now().nanosecond(), 0);
    }

    #[test]
    fn test_record_serializes_every_field() {
        let record = Record {
            key: "secret".into(),
            account: "alice".into(),
            domain: "api.example.com".into(),
            created_at: Some(sample_ts()),
            ..Record::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        for field in [
            "key",
            "account",
            "domain",
            "organization",
            "mnemonic",
            "description",
            "created_at",
            "updated_at",
            "expired",
        ] {
            assert!(obj.contains_key(field), "missing field {}", field);
        }
        assert_eq!(obj["created_at"], "2024-05-17 09:30:05");
        assert_eq!(obj["updated_at"], "");
        assert_eq!(obj["organization"], "");
        assert_eq!(obj["expired"], false);
    }

    #[test]
    fn test_record_roundtrip_with_extra_fields() {
        let mut record = Record::new();
        record.key = "secret".into();
        record.account = "alice".into();
        record.domain = "api.example.com".into();
        record
            .extra
            .insert("region".into(), Value::String("eu-west-1".into()));
        let json = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.extra["region"], "eu-west-1");
    }

    #[test]
    fn test_record_tolerates_missing_fields() {
        let parsed: Record = serde_json::from_str(r#"{"key":"k","account":"a","domain":"d"}"#).unwrap();
        assert_eq!(parsed.key, "k");
        assert!(parsed.created_at.is_none());
        assert!(!parsed.expired);
        assert!(parsed.extra.is_empty());
    }

    #[test]
    fn test_patch_from_record_maps_empty_to_none() {
        let mut record = Record::new();
        record.key = "k".into();
        record.account = "a".into();
        record.domain = "d".into();
        record.organization = "acme".into();
        let patch = RecordPatch::from_record(&record);
        assert_eq!(patch.organization.as_deref(), Some("acme"));
        assert!(patch.mnemonic.is_none());
        assert!(patch.description.is_none());
        assert_eq!(patch.key, "k");
    }

    #[test]
    fn test_list_entry_projection() {
        let mut record = Record::new();
        record.account = "alice".into();
        record.domain = "api.example.com".into();
        record.description = "prod key".into();
        record.expired = true;
        let entry = ListEntry::from_record(&record);
        assert_eq!(entry.account, "alice");
        assert_eq!(entry.domain, "api.example.com");
        assert_eq!(entry.description, "prod key");
        assert!(entry.expired);
    }
}

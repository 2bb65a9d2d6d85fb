//! Structural validation and version migration of persisted documents.
//!
//! Each sub-document is decoded on its own. Anything that fails is swapped
//! for its default (array elements are dropped) and its path is recorded in
//! [`Validated::rejected`], so one corrupted field never discards the rest.
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::constants::SCHEMA_VERSION;
use crate::history::{HistoryLog, HistoryRecord};
use crate::progression::{Base, Stats};
use crate::quests::Quest;
use crate::state::{AppState, DiaryEntry, Limits, Meta, PlayerProfile};

/// A decoded value plus the paths that had to be replaced by defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub value: T,
    pub rejected: Vec<String>,
}

impl<T> Validated<T> {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Upgrade a raw document in place to [`SCHEMA_VERSION`].
///
/// Returns the version the document was stored with. Documents written by a
/// newer version are left untouched.
pub fn migrate(raw: &mut Value) -> u32 {
    let stored = raw
        .pointer("/meta/version")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(1);
    let Some(doc) = raw.as_object_mut() else {
        return stored;
    };

    if stored < 2 {
        doc.entry("limits").or_insert_with(|| json!({ "rerolls": {} }));
        if let Some(base) = doc.get_mut("base").and_then(Value::as_object_mut) {
            base.entry("upgrades").or_insert_with(|| json!([]));
        }
    }
    if stored < SCHEMA_VERSION {
        if let Some(meta) = doc.get_mut("meta").and_then(Value::as_object_mut) {
            meta.insert("version".into(), json!(SCHEMA_VERSION));
        }
        log::info!("migrated state document from v{stored} to v{SCHEMA_VERSION}");
    } else if stored > SCHEMA_VERSION {
        log::warn!("state document v{stored} is newer than v{SCHEMA_VERSION}; loading best-effort");
    }
    stored
}

fn field<T: DeserializeOwned>(
    doc: &Map<String, Value>,
    key: &str,
    rejected: &mut Vec<String>,
) -> Option<T> {
    let raw = doc.get(key)?;
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("rejected {key}: {err}");
            rejected.push(key.to_string());
            None
        }
    }
}

fn elements<T: DeserializeOwned>(
    doc: &Map<String, Value>,
    key: &str,
    rejected: &mut Vec<String>,
    accept: impl Fn(&T) -> bool,
) -> Vec<T> {
    let Some(raw) = doc.get(key) else {
        return Vec::new();
    };
    let Some(items) = raw.as_array() else {
        rejected.push(key.to_string());
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            match serde_json::from_value::<T>(item.clone()) {
                Ok(value) if accept(&value) => Some(value),
                _ => {
                    rejected.push(format!("{key}[{idx}]"));
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn is_valid_entry(entry: &DiaryEntry) -> bool {
    NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d").is_ok()
}

/// Keep one entry per date; a later duplicate replaces the earlier one in place.
pub(crate) fn dedupe_entries(
    entries: Vec<DiaryEntry>,
    rejected: &mut Vec<String>,
) -> Vec<DiaryEntry> {
    let mut out: Vec<DiaryEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(slot) = out.iter_mut().find(|e| e.date == entry.date) {
            rejected.push(format!("entries[date={}]", entry.date));
            *slot = entry;
        } else {
            out.push(entry);
        }
    }
    out
}

/// Validate a migrated raw document into an [`AppState`].
#[must_use]
pub fn validate_state(raw: &Value, now: DateTime<Utc>) -> Validated<AppState> {
    let mut rejected = Vec::new();
    let mut state = AppState::initial(now);
    let Some(doc) = raw.as_object() else {
        rejected.push("$".to_string());
        return Validated {
            value: state,
            rejected,
        };
    };

    if let Some(profile) = field::<PlayerProfile>(doc, "profile", &mut rejected) {
        state.profile = profile;
    }
    match field::<Stats>(doc, "stats", &mut rejected) {
        Some(stats) if stats.is_consistent() => state.stats = stats,
        Some(_) => rejected.push("stats".to_string()),
        None => {}
    }
    if let Some(base) = field::<Base>(doc, "base", &mut rejected) {
        state.base = base;
    }
    let entries = elements::<DiaryEntry>(doc, "entries", &mut rejected, is_valid_entry);
    state.entries = dedupe_entries(entries, &mut rejected);
    state.quests = elements::<Quest>(doc, "quests", &mut rejected, |q| !q.id.is_empty());
    if let Some(limits) = field::<Limits>(doc, "limits", &mut rejected) {
        state.limits = limits;
    }
    let history = elements::<HistoryRecord>(doc, "history", &mut rejected, |_| true);
    state.history = HistoryLog::from_records(history);
    if let Some(meta) = field::<Meta>(doc, "meta", &mut rejected) {
        state.meta = meta;
    }
    state.refresh_base();

    Validated {
        value: state,
        rejected,
    }
}

/// Migrate then validate.
#[must_use]
pub fn load_document(mut raw: Value, now: DateTime<Utc>) -> Validated<AppState> {
    migrate(&mut raw);
    validate_state(&raw, now)
}

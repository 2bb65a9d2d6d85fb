//! Append-only, capped activity log.
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::constants::HISTORY_CAP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryKind {
    EntryAdded,
    EntryDerived,
    EntryUndone,
    LevelUp,
    QuestAdded,
    QuestDone,
    QuestSkipped,
    QuestRerolled,
    ProfileUpdated,
    /// Tags written by other versions of the app
    #[serde(other)]
    Other,
}

const KNOWN_KINDS: [HistoryKind; 9] = [
    HistoryKind::EntryAdded,
    HistoryKind::EntryDerived,
    HistoryKind::EntryUndone,
    HistoryKind::LevelUp,
    HistoryKind::QuestAdded,
    HistoryKind::QuestDone,
    HistoryKind::QuestSkipped,
    HistoryKind::QuestRerolled,
    HistoryKind::ProfileUpdated,
];

impl HistoryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EntryAdded => "ENTRY_ADDED",
            Self::EntryDerived => "ENTRY_DERIVED",
            Self::EntryUndone => "ENTRY_UNDONE",
            Self::LevelUp => "LEVEL_UP",
            Self::QuestAdded => "QUEST_ADDED",
            Self::QuestDone => "QUEST_DONE",
            Self::QuestSkipped => "QUEST_SKIPPED",
            Self::QuestRerolled => "QUEST_REROLLED",
            Self::ProfileUpdated => "PROFILE_UPDATED",
            Self::Other => "OTHER",
        }
    }

    #[must_use]
    pub const fn is_entry(self) -> bool {
        matches!(self, Self::EntryAdded | Self::EntryDerived | Self::EntryUndone)
    }

    #[must_use]
    pub const fn is_quest(self) -> bool {
        matches!(
            self,
            Self::QuestAdded | Self::QuestDone | Self::QuestSkipped | Self::QuestRerolled
        )
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KNOWN_KINDS
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordDoc", into = "RecordDoc")]
pub struct HistoryRecord {
    /// Epoch milliseconds
    pub ts: i64,
    pub kind: HistoryKind,
    pub summary: String,
    /// Stored tag of an [`HistoryKind::Other`] record, written back unchanged
    pub raw_kind: Option<String>,
}

impl HistoryRecord {
    #[must_use]
    pub fn new(ts: i64, kind: HistoryKind, summary: impl Into<String>) -> Self {
        Self {
            ts,
            kind,
            summary: summary.into(),
            raw_kind: None,
        }
    }

    /// The tag as persisted.
    #[must_use]
    pub fn tag(&self) -> &str {
        match (&self.kind, &self.raw_kind) {
            (HistoryKind::Other, Some(raw)) => raw.as_str(),
            (kind, _) => kind.as_str(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RecordDoc {
    ts: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    summary: String,
}

impl From<RecordDoc> for HistoryRecord {
    fn from(doc: RecordDoc) -> Self {
        match doc.kind.parse::<HistoryKind>() {
            Ok(kind) => Self::new(doc.ts, kind, doc.summary),
            Err(()) => Self {
                raw_kind: Some(doc.kind),
                ..Self::new(doc.ts, HistoryKind::Other, doc.summary)
            },
        }
    }
}

impl From<HistoryRecord> for RecordDoc {
    fn from(record: HistoryRecord) -> Self {
        Self {
            kind: record.tag().to_string(),
            ts: record.ts,
            summary: record.summary,
        }
    }
}

/// Display filter for the history panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Entry,
    Quest,
    LevelUp,
}

impl HistoryFilter {
    #[must_use]
    pub const fn matches(self, kind: HistoryKind) -> bool {
        match self {
            Self::All => true,
            Self::Entry => kind.is_entry(),
            Self::Quest => kind.is_quest(),
            Self::LevelUp => matches!(kind, HistoryKind::LevelUp),
        }
    }
}

/// History records, oldest first, never longer than [`HISTORY_CAP`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct HistoryLog(VecDeque<HistoryRecord>);

impl<'de> Deserialize<'de> for HistoryLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<HistoryRecord>::deserialize(deserializer).map(Self::from_records)
    }
}

impl HistoryLog {
    #[must_use]
    pub const fn new() -> Self {
        Self(VecDeque::new())
    }

    /// Build from persisted records, keeping only the newest [`HISTORY_CAP`].
    #[must_use]
    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        let skip = records.len().saturating_sub(HISTORY_CAP);
        Self(records.into_iter().skip(skip).collect())
    }

    pub fn push(&mut self, ts: i64, kind: HistoryKind, summary: impl Into<String>) {
        self.0.push_back(HistoryRecord::new(ts, kind, summary));
        while self.0.len() > HISTORY_CAP {
            self.0.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryRecord> {
        self.0.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&HistoryRecord> {
        self.0.back()
    }

    /// Newest-first view, filtered and limited.
    #[must_use]
    pub fn recent(&self, filter: HistoryFilter, limit: usize) -> Vec<&HistoryRecord> {
        self.0
            .iter()
            .rev()
            .filter(|record| filter.matches(record.kind))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_capped_and_drops_oldest() {
        let mut log = HistoryLog::new();
        for i in 0..(HISTORY_CAP + 25) {
            log.push(i64::try_from(i).unwrap(), HistoryKind::EntryAdded, "e");
        }
        assert_eq!(log.len(), HISTORY_CAP);
        assert_eq!(log.iter().next().map(|r| r.ts), Some(25));
    }

    #[test]
    fn loading_oversized_history_keeps_newest() {
        let records = (0..1500)
            .map(|ts| HistoryRecord::new(ts, HistoryKind::QuestDone, ""))
            .collect();
        let log = HistoryLog::from_records(records);
        assert_eq!(log.len(), HISTORY_CAP);
        assert_eq!(log.last().map(|r| r.ts), Some(1499));
    }

    #[test]
    fn filters_by_category_newest_first() {
        let mut log = HistoryLog::new();
        log.push(1, HistoryKind::EntryAdded, "a");
        log.push(2, HistoryKind::QuestDone, "b");
        log.push(3, HistoryKind::LevelUp, "c");
        log.push(4, HistoryKind::EntryDerived, "d");
        let entries: Vec<i64> = log
            .recent(HistoryFilter::Entry, 10)
            .iter()
            .map(|r| r.ts)
            .collect();
        assert_eq!(entries, [4, 1]);
        assert_eq!(log.recent(HistoryFilter::LevelUp, 10).len(), 1);
        assert_eq!(log.recent(HistoryFilter::All, 2).len(), 2);
    }

    #[test]
    fn serializes_type_tag() {
        let mut log = HistoryLog::new();
        log.push(5, HistoryKind::QuestRerolled, "A → B");
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[0]["type"], "QUEST_REROLLED");
        let unknown: HistoryRecord =
            serde_json::from_str(r#"{"ts":1,"type":"SOMETHING_NEW","summary":"x"}"#).unwrap();
        assert_eq!(unknown.kind, HistoryKind::Other);
    }

    #[test]
    fn unknown_tags_are_written_back_unchanged() {
        let json = r#"[{"ts":1,"type":"IMPORT","summary":"Backup"},{"ts":2,"type":"LEVEL_UP","summary":""}]"#;
        let log: HistoryLog = serde_json::from_str(json).unwrap();
        let kinds: Vec<HistoryKind> = log.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, [HistoryKind::Other, HistoryKind::LevelUp]);
        assert_eq!(log.iter().next().map(HistoryRecord::tag), Some("IMPORT"));
        assert_eq!(serde_json::to_string(&log).unwrap(), json);
    }

    #[test]
    fn deserializing_oversized_history_applies_cap() {
        let records: Vec<HistoryRecord> = (0..1500)
            .map(|ts| HistoryRecord::new(ts, HistoryKind::EntryAdded, "e"))
            .collect();
        let json = serde_json::to_string(&records).unwrap();
        let log: HistoryLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log.len(), HISTORY_CAP);
        assert_eq!(log.iter().next().map(|r| r.ts), Some(500));
    }
}

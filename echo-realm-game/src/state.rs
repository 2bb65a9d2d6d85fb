//! The persisted player document and its parts.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{DEFAULT_LANGUAGE, DEFAULT_PLAYER_NAME, SCHEMA_VERSION};
use crate::derive::DerivationResult;
use crate::history::HistoryLog;
use crate::progression::{Base, Stats, update_base};
use crate::quests::Quest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub streak_clean_days: u32,
    #[serde(default)]
    pub preferences: Preferences,
}

impl PlayerProfile {
    #[must_use]
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            name: DEFAULT_PLAYER_NAME.to_string(),
            created_at,
            streak_clean_days: 0,
            preferences: Preferences::default(),
        }
    }
}

/// One diary entry; `date` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivationResult>,
}

/// Per-day counters keyed by ISO date.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default)]
    pub rerolls: BTreeMap<String, u32>,
}

impl Limits {
    #[must_use]
    pub fn rerolls_on(&self, day: &str) -> u32 {
        self.rerolls.get(day).copied().unwrap_or(0)
    }

    /// Count one reroll for `day`, forgetting counters of other days.
    pub fn record_reroll(&mut self, day: &str) -> u32 {
        self.rerolls.retain(|key, _| key == day);
        let used = self.rerolls.entry(day.to_string()).or_insert(0);
        *used += 1;
        *used
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate root persisted under the `state` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub profile: PlayerProfile,
    pub stats: Stats,
    pub base: Base,
    #[serde(default)]
    pub entries: Vec<DiaryEntry>,
    #[serde(default)]
    pub quests: Vec<Quest>,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub history: HistoryLog,
    pub meta: Meta,
}

impl AppState {
    /// Fresh document stamped with `now`.
    #[must_use]
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            profile: PlayerProfile::new(now),
            stats: Stats::default(),
            base: Base::default(),
            entries: Vec::new(),
            quests: Vec::new(),
            limits: Limits::default(),
            history: HistoryLog::new(),
            meta: Meta {
                version: SCHEMA_VERSION,
                updated_at: now,
            },
        }
    }

    #[must_use]
    pub fn entry_for_date(&self, date: &str) -> Option<&DiaryEntry> {
        self.entries.iter().find(|entry| entry.date == date)
    }

    #[must_use]
    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|quest| quest.id == id)
    }

    pub fn quest_mut(&mut self, id: &str) -> Option<&mut Quest> {
        self.quests.iter_mut().find(|quest| quest.id == id)
    }

    /// Open quests in insertion order.
    pub fn open_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter().filter(|quest| quest.is_open())
    }

    /// Entries newest date first.
    #[must_use]
    pub fn entries_by_date_desc(&self) -> Vec<&DiaryEntry> {
        let mut sorted: Vec<&DiaryEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    /// Bring the base read-model in line with current stats.
    pub fn refresh_base(&mut self) -> bool {
        update_base(&mut self.base, &self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn initial_state_uses_defaults() {
        let state = AppState::initial(now());
        assert_eq!(state.profile.name, "Abenteurer");
        assert_eq!(state.profile.preferences.language, "de");
        assert_eq!(state.stats.xp_to_next, 65);
        assert_eq!(state.base.name, "Lager");
        assert_eq!(state.meta.version, SCHEMA_VERSION);
        assert_eq!(state.stats.attributes.len(), 4);
    }

    #[test]
    fn reroll_counter_prunes_old_days() {
        let mut limits = Limits::default();
        assert_eq!(limits.record_reroll("2024-05-01"), 1);
        assert_eq!(limits.record_reroll("2024-05-01"), 2);
        assert_eq!(limits.record_reroll("2024-05-02"), 1);
        assert_eq!(limits.rerolls_on("2024-05-01"), 0);
        assert_eq!(limits.rerolls.len(), 1);
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let value = serde_json::to_value(AppState::initial(now())).unwrap();
        assert!(value["profile"]["createdAt"].is_string());
        assert!(value["profile"]["streakCleanDays"].is_number());
        assert_eq!(value["stats"]["xpToNext"], 65);
        assert!(value["meta"]["updatedAt"].is_string());
        assert!(value["limits"]["rerolls"].is_object());
    }
}

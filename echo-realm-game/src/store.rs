//! The authoritative player document and every operation that mutates it.
//!
//! All mutations go through [`Store`]: mutate in memory, persist the whole
//! document, then notify observers. Persistence is best-effort; a failed write
//! is logged and the in-memory state stays authoritative.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ConfigSource;
use crate::clock::{Clock, day_key};
use crate::config::KeywordConfig;
use crate::constants::{CONFIG_KEY, MAX_REROLLS_PER_DAY, MOOD_RANGE, STATE_KEY};
use crate::derive::{DerivationResult, derive_from_entry, summarize_derivation};
use crate::events::{Observers, StoreEvent, SubscriptionId};
use crate::history::HistoryKind;
use crate::ids::IdGenerator;
use crate::progression::apply_delta;
use crate::quests::{
    Quest, QuestError, QuestIdea, QuestStatus, apply_quest_reward, quest_from_idea,
    sanitize_quest_ideas, suggest_quest_from_state,
};
use crate::schema::{dedupe_entries, is_valid_entry, load_document, migrate};
use crate::state::{AppState, DiaryEntry};
use crate::storage::StateStorage;
use crate::undo::UndoStack;

/// Export file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub state: AppState,
    #[serde(default)]
    pub config: Option<KeywordConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Import fehlgeschlagen: ungültiges JSON ({0})")]
    Json(#[from] serde_json::Error),
    #[error("Import fehlgeschlagen: Feld `state` fehlt")]
    MissingState,
    #[error("Import fehlgeschlagen: {0}")]
    Shape(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("Text leer")]
    EmptyText,
    #[error("{field} muss zwischen 1 und 5 liegen (war {value})")]
    OutOfRange { field: &'static str, value: i64 },
}

/// Raw diary input as collected by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryInput {
    /// Defaults to today
    pub date: Option<NaiveDate>,
    pub text: String,
    pub mood: Option<i64>,
    pub energy: Option<i64>,
}

/// What a submitted entry did to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySubmission {
    pub entry: DiaryEntry,
    pub derived: DerivationResult,
    pub levels_gained: u32,
    pub replaced_previous: bool,
}

pub struct Store<S: StateStorage, C: Clock> {
    storage: S,
    clock: C,
    ids: IdGenerator,
    state: AppState,
    config: KeywordConfig,
    config_loaded: bool,
    undo: UndoStack<Option<DiaryEntry>>,
    observers: Observers,
    load_report: Vec<String>,
}

impl<S: StateStorage, C: Clock> std::fmt::Debug for Store<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("config_loaded", &self.config_loaded)
            .field("undo", &self.undo.len())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl<S: StateStorage, C: Clock> Store<S, C> {
    /// Load the persisted document (or start fresh) with random ids.
    pub fn load(storage: S, clock: C) -> Self {
        Self::load_with_ids(storage, clock, IdGenerator::from_entropy())
    }

    /// Load with an explicit id source, e.g. a seeded one for replays.
    pub fn load_with_ids(storage: S, clock: C, ids: IdGenerator) -> Self {
        let now = clock.now();
        let (state, load_report) = match storage.read(STATE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => {
                    let validated = load_document(value, now);
                    if !validated.is_clean() {
                        log::warn!(
                            "state loaded with defaults for: {}",
                            validated.rejected.join(", ")
                        );
                    }
                    (validated.value, validated.rejected)
                }
                Err(err) => {
                    log::warn!("stored state is not valid JSON, starting fresh: {err}");
                    (AppState::initial(now), vec!["$".to_string()])
                }
            },
            Ok(None) => (AppState::initial(now), Vec::new()),
            Err(err) => {
                log::warn!("failed to read stored state, starting fresh: {err}");
                (AppState::initial(now), Vec::new())
            }
        };

        let stored_config = match storage.read(CONFIG_KEY) {
            Ok(Some(raw)) => KeywordConfig::from_json(&raw)
                .inspect_err(|err| log::warn!("ignoring stored config: {err}"))
                .ok(),
            Ok(None) => None,
            Err(err) => {
                log::warn!("failed to read stored config: {err}");
                None
            }
        };

        Self {
            storage,
            clock,
            ids,
            state,
            config_loaded: stored_config.is_some(),
            config: stored_config.unwrap_or_else(KeywordConfig::empty),
            undo: UndoStack::default(),
            observers: Observers::default(),
            load_report,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Active keyword config; empty until one has been set or loaded.
    #[must_use]
    pub const fn config(&self) -> &KeywordConfig {
        &self.config
    }

    #[must_use]
    pub const fn has_config(&self) -> bool {
        self.config_loaded
    }

    /// Paths replaced by defaults during the initial load.
    #[must_use]
    pub fn load_report(&self) -> &[String] {
        &self.load_report
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub fn subscribe(&mut self, callback: impl FnMut(StoreEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn push_history(&mut self, kind: HistoryKind, summary: impl Into<String>) {
        let ts = self.clock.now().timestamp_millis();
        self.state.history.push(ts, kind, summary);
    }

    fn persist(&mut self) {
        self.state.meta.updated_at = self.clock.now();
        match serde_json::to_string(&self.state) {
            Ok(json) => {
                if let Err(err) = self.storage.write(STATE_KEY, &json) {
                    log::warn!("state save failed: {err}");
                } else {
                    log::debug!("state saved ({} bytes)", json.len());
                }
            }
            Err(err) => log::warn!("state serialization failed: {err}"),
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.observers.emit(StoreEvent::StateChanged);
    }

    fn record_level_ups(&mut self, levels: u32) {
        if levels > 0 {
            let level = self.state.stats.level;
            self.push_history(HistoryKind::LevelUp, format!("Level {level}"));
            if self.state.refresh_base() {
                log::info!("base upgraded to {}", self.state.base.name);
            }
        }
    }

    /// Store `entry`, replacing any entry on the same date, without deriving.
    ///
    /// The replaced entry (or its absence) is pushed onto the undo stack.
    pub fn add_entry(&mut self, entry: DiaryEntry) -> DiaryEntry {
        self.put_entry(entry.clone());
        let summary = entry
            .derived
            .as_ref()
            .map_or_else(|| "entry".to_string(), |d| format!("XP +{}", d.xp_gained));
        self.push_history(HistoryKind::EntryAdded, summary);
        self.commit();
        entry
    }

    fn put_entry(&mut self, entry: DiaryEntry) -> bool {
        if let Some(slot) = self.state.entries.iter_mut().find(|e| e.date == entry.date) {
            let previous = std::mem::replace(slot, entry);
            self.undo.push(Some(previous));
            true
        } else {
            self.state.entries.push(entry);
            self.undo.push(None);
            false
        }
    }

    /// Derive, apply and store a diary entry in one persisted step.
    ///
    /// # Errors
    ///
    /// Returns an error for empty text or mood/energy outside 1..=5; the state
    /// is left untouched in that case.
    pub fn submit_entry(&mut self, input: EntryInput) -> Result<EntrySubmission, EntryError> {
        let text = input.text.trim();
        if text.is_empty() {
            return Err(EntryError::EmptyText);
        }
        for (field, value) in [("mood", input.mood), ("energy", input.energy)] {
            if let Some(value) = value.filter(|v| !MOOD_RANGE.contains(v)) {
                return Err(EntryError::OutOfRange { field, value });
            }
        }

        let date = input.date.unwrap_or_else(|| self.clock.today());
        let derived = derive_from_entry(text, input.mood, input.energy, &self.config);
        let levels_gained = apply_delta(
            &mut self.state.stats,
            derived.xp_gained,
            &derived.stat_diff,
        );
        self.state.refresh_base();

        let entry = DiaryEntry {
            id: self.ids.next_id(),
            date: day_key(date),
            text: text.to_string(),
            mood: input.mood,
            energy: input.energy,
            derived: Some(derived.clone()),
        };
        let replaced_previous = self.put_entry(entry.clone());
        self.push_history(
            HistoryKind::EntryAdded,
            format!("{}: XP +{}", entry.date, derived.xp_gained),
        );
        self.push_history(HistoryKind::EntryDerived, summarize_derivation(&derived));
        self.record_level_ups(levels_gained);
        self.commit();

        Ok(EntrySubmission {
            entry,
            derived,
            levels_gained,
            replaced_previous,
        })
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Revert the most recent entry add. Returns false if there is nothing to undo.
    ///
    /// Only the entry slot is restored; XP already granted stays.
    pub fn undo_last_entry(&mut self) -> bool {
        let Some(snapshot) = self.undo.pop() else {
            return false;
        };
        let summary = match snapshot {
            Some(previous) => {
                let date = previous.date.clone();
                if let Some(slot) = self.state.entries.iter_mut().find(|e| e.date == date) {
                    *slot = previous;
                } else {
                    self.state.entries.push(previous);
                }
                format!("{date} wiederhergestellt")
            }
            None => {
                // Approximates "most recent" by date order, not insertion order.
                let last = self.state.entries.iter().map(|e| e.date.clone()).max();
                match last {
                    Some(date) => {
                        self.state.entries.retain(|e| e.date != date);
                        format!("{date} entfernt")
                    }
                    None => "nichts zu entfernen".to_string(),
                }
            }
        };
        self.push_history(HistoryKind::EntryUndone, summary);
        self.commit();
        true
    }

    pub fn add_quest(&mut self, quest: Quest) {
        self.push_history(HistoryKind::QuestAdded, quest.title.clone());
        self.state.quests.push(quest);
        self.commit();
    }

    /// Generate a rule-based quest for the weakest attribute and add it.
    pub fn generate_quest(&mut self) -> Quest {
        let quest = suggest_quest_from_state(&self.state.stats, self.ids.next_id());
        self.add_quest(quest.clone());
        quest
    }

    /// Sanitise remote quest ideas and add the usable ones as open quests.
    pub fn add_quest_ideas(&mut self, ideas: Vec<QuestIdea>) -> Vec<Quest> {
        let quests: Vec<Quest> = sanitize_quest_ideas(ideas)
            .iter()
            .filter_map(|idea| quest_from_idea(idea, self.ids.next_id()))
            .collect();
        if quests.is_empty() {
            return quests;
        }
        for quest in &quests {
            self.push_history(HistoryKind::QuestAdded, quest.title.clone());
        }
        self.state.quests.extend(quests.iter().cloned());
        self.commit();
        quests
    }

    /// Mark an open quest done and grant its reward once.
    /// Returns false (and changes nothing) if the quest is missing or not open.
    pub fn complete_quest(&mut self, id: &str) -> bool {
        let Some(quest) = self.state.quest_mut(id).filter(|q| q.is_open()) else {
            return false;
        };
        quest.status = QuestStatus::Done;
        let quest = quest.clone();
        let levels = apply_quest_reward(&mut self.state.stats, &quest);
        self.push_history(HistoryKind::QuestDone, quest.title);
        self.record_level_ups(levels);
        self.commit();
        true
    }

    /// Skip an open quest without reward.
    pub fn skip_quest(&mut self, id: &str) -> bool {
        let Some(quest) = self.state.quest_mut(id).filter(|q| q.is_open()) else {
            return false;
        };
        quest.status = QuestStatus::Skipped;
        let title = quest.title.clone();
        self.push_history(HistoryKind::QuestSkipped, title);
        self.commit();
        true
    }

    #[must_use]
    pub fn rerolls_left_today(&self) -> u32 {
        let today = day_key(self.clock.today());
        MAX_REROLLS_PER_DAY.saturating_sub(self.state.limits.rerolls_on(&today))
    }

    /// Regenerate an open quest in place, counting against today's quota.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::RerollLimit`] once today's quota is used up, or
    /// `NotFound`/`NotOpen` for quests that cannot be rerolled. No state
    /// changes on error.
    pub fn reroll_quest(&mut self, id: &str) -> Result<Quest, QuestError> {
        let today = day_key(self.clock.today());
        match self.state.quest(id) {
            None => return Err(QuestError::NotFound(id.to_string())),
            Some(quest) if !quest.is_open() => return Err(QuestError::NotOpen(id.to_string())),
            Some(_) => {}
        }
        let used = self.state.limits.rerolls_on(&today);
        if used >= MAX_REROLLS_PER_DAY {
            return Err(QuestError::RerollLimit {
                used,
                max: MAX_REROLLS_PER_DAY,
            });
        }

        let fresh = suggest_quest_from_state(&self.state.stats, self.ids.next_id());
        let Some(quest) = self.state.quest_mut(id) else {
            return Err(QuestError::NotFound(id.to_string()));
        };
        let old_title = std::mem::take(&mut quest.title);
        quest.reroll_from(fresh);
        let rerolled = quest.clone();
        self.state.limits.record_reroll(&today);
        self.push_history(
            HistoryKind::QuestRerolled,
            format!("{old_title} → {}", rerolled.title),
        );
        self.commit();
        Ok(rerolled)
    }

    /// Rename the player. Returns false for blank names.
    pub fn rename_player(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.state.profile.name = name.to_string();
        self.push_history(HistoryKind::ProfileUpdated, format!("Name: {name}"));
        self.commit();
        true
    }

    pub fn set_language(&mut self, language: &str) {
        self.state.profile.preferences.language = language.trim().to_string();
        self.push_history(
            HistoryKind::ProfileUpdated,
            format!("Sprache: {}", self.state.profile.preferences.language),
        );
        self.commit();
    }

    /// Cache and persist a keyword config (e.g. the fetched static resource).
    pub fn set_config(&mut self, config: KeywordConfig) {
        self.config = config;
        self.config_loaded = true;
        self.persist_config();
        self.observers.emit(StoreEvent::ConfigChanged);
    }

    /// Fetch the config from `source` and cache it. A failed fetch keeps the
    /// current config and only logs; returns whether a new config was applied.
    pub async fn refresh_config<L: ConfigSource>(&mut self, source: &L) -> bool {
        match source.fetch_config().await {
            Ok(config) => {
                log::debug!("keyword config fetched ({} keywords)", config.keywords.len());
                self.set_config(config);
                true
            }
            Err(err) => {
                log::warn!("keyword config unavailable, keeping current: {err}");
                false
            }
        }
    }

    fn persist_config(&self) {
        match serde_json::to_string(&self.config) {
            Ok(json) => {
                if let Err(err) = self.storage.write(CONFIG_KEY, &json) {
                    log::warn!("config save failed: {err}");
                }
            }
            Err(err) => log::warn!("config serialization failed: {err}"),
        }
    }

    /// Pretty JSON envelope with the full state and active config.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_state(&self) -> Result<String, serde_json::Error> {
        let envelope = ExportEnvelope {
            state: self.state.clone(),
            config: Some(self.config.clone()),
        };
        serde_json::to_string_pretty(&envelope)
    }

    /// Replace state (and config, if present) with an exported envelope.
    ///
    /// # Errors
    ///
    /// Returns an error for unparseable JSON, a missing `state` key or a
    /// document that does not have the expected shape (including entry dates
    /// that are not `YYYY-MM-DD`). Nothing is changed on error. Entries that
    /// share a date keep the last one, as on load.
    pub fn import_state(&mut self, json: &str) -> Result<(), ImportError> {
        let mut envelope: Value = serde_json::from_str(json)?;
        let mut raw_state = match envelope.get_mut("state").map(Value::take) {
            Some(Value::Null) | None => return Err(ImportError::MissingState),
            Some(raw) => raw,
        };
        migrate(&mut raw_state);
        let mut state: AppState = serde_json::from_value(raw_state)
            .map_err(|err| ImportError::Shape(format!("state: {err}")))?;
        if !state.stats.is_consistent() {
            return Err(ImportError::Shape("stats: xp outside level range".into()));
        }
        if let Some(entry) = state.entries.iter().find(|e| !is_valid_entry(e)) {
            return Err(ImportError::Shape(format!(
                "entries: `{}` is not a YYYY-MM-DD date",
                entry.date
            )));
        }
        let mut merged = Vec::new();
        state.entries = dedupe_entries(std::mem::take(&mut state.entries), &mut merged);
        if !merged.is_empty() {
            log::warn!("import kept the last of duplicate entries: {}", merged.join(", "));
        }
        let config = match envelope.get_mut("config").map(Value::take) {
            Some(Value::Null) | None => None,
            Some(raw) => Some(
                serde_json::from_value::<KeywordConfig>(raw)
                    .map_err(|err| ImportError::Shape(format!("config: {err}")))?,
            ),
        };

        state.refresh_base();
        self.state = state;
        self.undo.clear();
        if let Some(config) = config {
            self.set_config(config);
        }
        log::info!("state imported");
        self.commit();
        Ok(())
    }

    /// Start over with a fresh document.
    pub fn reset(&mut self) {
        self.state = AppState::initial(self.clock.now());
        self.undo.clear();
        log::info!("state reset");
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::KeywordRule;
    use crate::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};
    use std::cell::Cell;
    use std::rc::Rc;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 4, 10, 9, 0, 0).unwrap())
    }

    fn store() -> Store<MemoryStorage, FixedClock> {
        Store::load_with_ids(MemoryStorage::new(), clock(), IdGenerator::from_seed(1))
    }

    fn input(date: Option<NaiveDate>, text: &str) -> EntryInput {
        EntryInput {
            date,
            text: text.to_string(),
            ..EntryInput::default()
        }
    }

    #[test]
    fn submit_defaults_to_today_and_persists() {
        let storage = MemoryStorage::new();
        let mut store =
            Store::load_with_ids(storage.clone(), clock(), IdGenerator::from_seed(1));
        let out = store.submit_entry(input(None, "Ein ruhiger Tag")).unwrap();
        assert_eq!(out.entry.date, "2024-04-10");
        assert_eq!(out.derived.xp_gained, 5);
        assert_eq!(store.state().stats.xp, 5);

        let persisted: AppState =
            serde_json::from_str(&storage.get(STATE_KEY).unwrap()).unwrap();
        assert_eq!(&persisted, store.state());
    }

    #[test]
    fn invalid_input_leaves_state_untouched() {
        let mut store = store();
        let before = store.state().clone();
        assert_eq!(
            store.submit_entry(input(None, "   ")),
            Err(EntryError::EmptyText)
        );
        let bad = EntryInput {
            mood: Some(9),
            ..input(None, "text")
        };
        assert_eq!(
            store.submit_entry(bad),
            Err(EntryError::OutOfRange {
                field: "mood",
                value: 9
            })
        );
        assert_eq!(store.state(), &before);
        assert!(!store.can_undo());
    }

    #[test]
    fn every_mutation_notifies_once() {
        let mut store = store();
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        store.subscribe(move |event| {
            if event == StoreEvent::StateChanged {
                sink.set(sink.get() + 1);
            }
        });
        store.submit_entry(input(None, "eins zwei drei")).unwrap();
        let quest = store.generate_quest();
        store.complete_quest(&quest.id);
        store.complete_quest(&quest.id);
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn same_date_replaces_and_undo_restores() {
        let mut store = store();
        let day = NaiveDate::from_ymd_opt(2024, 4, 8);
        store.submit_entry(input(day, "erster Text")).unwrap();
        let second = store.submit_entry(input(day, "zweiter Text")).unwrap();
        assert!(second.replaced_previous);
        assert_eq!(store.state().entries.len(), 1);
        assert_eq!(store.state().entries[0].text, "zweiter Text");

        assert!(store.undo_last_entry());
        assert_eq!(store.state().entries.len(), 1);
        assert_eq!(store.state().entries[0].text, "erster Text");

        assert!(store.undo_last_entry());
        assert!(store.state().entries.is_empty());
        assert!(!store.undo_last_entry());
    }

    #[test]
    fn undo_of_fresh_date_removes_last_date_not_last_insert() {
        let mut store = store();
        store
            .submit_entry(input(NaiveDate::from_ymd_opt(2024, 4, 9), "spät"))
            .unwrap();
        store
            .submit_entry(input(NaiveDate::from_ymd_opt(2024, 4, 1), "früh"))
            .unwrap();
        assert!(store.undo_last_entry());
        let dates: Vec<&str> = store.state().entries.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, ["2024-04-01"]);
    }

    #[test]
    fn keyword_config_feeds_derivation() {
        let mut store = store();
        store.set_config(KeywordConfig::from_keywords(vec![
            KeywordRule::new("yoga", 10).with_attribute("vitalitaet", None),
        ]));
        let out = store.submit_entry(input(None, "Yoga am Morgen")).unwrap();
        assert_eq!(out.derived.xp_gained, 15);
        assert_eq!(store.state().stats.attributes.get("vitalitaet"), Some(2));
    }

    #[test]
    fn quest_reward_applies_once() {
        let mut store = store();
        let quest = store.generate_quest();
        assert!(store.complete_quest(&quest.id));
        let xp_after = store.state().stats.xp;
        assert!(!store.complete_quest(&quest.id));
        assert!(!store.skip_quest(&quest.id));
        assert_eq!(store.state().stats.xp, xp_after);
        assert_eq!(xp_after, 20);
        assert_eq!(store.state().stats.attributes.get("vitalitaet"), Some(2));
    }

    #[test]
    fn reroll_quota_is_two_per_day() {
        let mut store = store();
        let quest = store.generate_quest();
        assert_eq!(store.rerolls_left_today(), 2);
        let first = store.reroll_quest(&quest.id).unwrap();
        assert_eq!(first.id, quest.id);
        assert_eq!(first.status, QuestStatus::Open);
        store.reroll_quest(&quest.id).unwrap();
        let before = store.state().clone();

        let err = store.reroll_quest(&quest.id).unwrap_err();
        assert_eq!(err, QuestError::RerollLimit { used: 2, max: 2 });
        assert_eq!(err.to_string(), "Reroll-Limit für heute erreicht (2/2)");
        assert_eq!(store.state(), &before);

        store.clock().advance(chrono::Duration::days(1));
        assert_eq!(store.rerolls_left_today(), 2);
        assert!(store.reroll_quest(&quest.id).is_ok());
    }

    #[test]
    fn reroll_rejects_closed_or_unknown_quests() {
        let mut store = store();
        let quest = store.generate_quest();
        store.skip_quest(&quest.id);
        assert_eq!(
            store.reroll_quest(&quest.id),
            Err(QuestError::NotOpen(quest.id.clone()))
        );
        assert!(matches!(
            store.reroll_quest("missing"),
            Err(QuestError::NotFound(_))
        ));
        assert_eq!(store.rerolls_left_today(), 2);
    }

    #[test]
    fn import_failure_keeps_state() {
        let mut store = store();
        store.submit_entry(input(None, "bleibt")).unwrap();
        let before = store.state().clone();
        assert!(matches!(
            store.import_state("{not json"),
            Err(ImportError::Json(_))
        ));
        assert!(matches!(
            store.import_state(r#"{"config":{}}"#),
            Err(ImportError::MissingState)
        ));
        assert!(matches!(
            store.import_state(r#"{"state":{"profile":1}}"#),
            Err(ImportError::Shape(_))
        ));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn reset_starts_fresh() {
        let mut store = store();
        store.submit_entry(input(None, "weg damit")).unwrap();
        store.reset();
        assert!(store.state().entries.is_empty());
        assert_eq!(store.state().stats.xp, 0);
        assert!(!store.can_undo());
    }

    #[test]
    fn quest_ideas_are_sanitised_before_adding() {
        let mut store = store();
        let added = store.add_quest_ideas(vec![
            QuestIdea {
                title: Some("Spaziergang".into()),
                desc: None,
                reward: Some(crate::quests::QuestReward {
                    xp: 15,
                    attribute: None,
                }),
            },
            QuestIdea::default(),
        ]);
        assert_eq!(added.len(), 1);
        assert_eq!(store.state().quests.len(), 1);
        assert!(store.add_quest_ideas(vec![QuestIdea::default()]).is_empty());
    }

    #[test]
    fn rename_rejects_blank_names() {
        let mut store = store();
        assert!(!store.rename_player("  "));
        assert!(store.rename_player(" Mira "));
        assert_eq!(store.state().profile.name, "Mira");
    }
}

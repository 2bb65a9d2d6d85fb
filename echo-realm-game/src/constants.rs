//! Centralized balance and tuning constants for Echo Realm progression.
//!
//! These values define the deterministic math for entry scoring, levelling
//! and quests. Keyword tuning is data driven (see [`crate::config`]); the
//! curve itself can only change through code review.

// Persistence keys ---------------------------------------------------------
pub const STATE_KEY: &str = "state";
pub const CONFIG_KEY: &str = "config";
pub const SCHEMA_VERSION: u32 = 2;

// Derivation tuning --------------------------------------------------------
pub(crate) const WORDS_PER_BASE_XP: f64 = 3.0;
pub(crate) const BASE_XP_MIN: i64 = 5;
pub(crate) const BASE_XP_MAX: i64 = 50;
pub(crate) const NEUTRAL_MOOD: i64 = 3;
pub(crate) const MOOD_ENERGY_WEIGHT: i64 = 2;
pub(crate) const MIN_XP_GAINED: i64 = 1;
pub(crate) const DEFAULT_ATTRIBUTE_GAIN: i64 = 1;
pub const MOOD_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

// Level curve --------------------------------------------------------------
pub(crate) const XP_CURVE_BASE: f64 = 50.0;
pub(crate) const XP_CURVE_FACTOR: f64 = 1.3;
pub(crate) const LEVELS_PER_TIER: i64 = 3;
pub(crate) const BASE_TIER_NAMES: [&str; 6] = [
    "Lager",
    "Zeltlager",
    "Holzhütte",
    "Außenposten",
    "Siedlung",
    "Festung",
];

// Quests -------------------------------------------------------------------
pub(crate) const QUEST_REWARD_XP: i64 = 20;
pub(crate) const QUEST_REWARD_ATTRIBUTE: i64 = 1;
pub const MAX_REROLLS_PER_DAY: u32 = 2;
pub(crate) const QUEST_IDEA_TITLE_MAX: usize = 60;
pub(crate) const QUEST_IDEA_DESC_MAX: usize = 140;
pub(crate) const FALLBACK_ATTRIBUTE: &str = "fokus";

// Store --------------------------------------------------------------------
pub const HISTORY_CAP: usize = 1000;
pub const UNDO_CAPACITY: usize = 10;
pub(crate) const DEFAULT_PLAYER_NAME: &str = "Abenteurer";
pub(crate) const DEFAULT_LANGUAGE: &str = "de";
pub(crate) const DEFAULT_ATTRIBUTES: [&str; 4] = ["vitalitaet", "fokus", "sozial", "disziplin"];

// Summarization ------------------------------------------------------------
pub const DIRECT_SESSION_TTL_MINUTES: i64 = 15;
pub const HIDDEN_REVERT_MINUTES: i64 = 20;
pub const DEFAULT_PROXY_URL: &str = "http://localhost:8787";
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "mixtral-8x7b";

//! Echo Realm Engine
//!
//! Platform-agnostic core of the Echo Realm journaling RPG: diary entries are
//! scored into XP and attributes, the character levels up, the home base
//! grows, and quests are offered, completed or rerolled. Hosts supply
//! persistence ([`StateStorage`]), time ([`Clock`]), HTTP ([`HttpTransport`])
//! and the keyword config ([`ConfigSource`]).

pub mod attributes;
pub mod clock;
pub mod config;
pub mod constants;
pub mod derive;
pub mod events;
pub mod history;
pub mod ids;
pub mod numbers;
pub mod progression;
pub mod quests;
pub mod schema;
pub mod state;
pub mod storage;
pub mod store;
pub mod summarize;
pub mod undo;

// Re-export commonly used types
pub use attributes::AttributeMap;
pub use clock::{Clock, FixedClock, SystemClock, day_key};
pub use config::{KeywordConfig, KeywordRule};
pub use derive::{DerivationResult, derive_from_entry, summarize_derivation};
pub use events::{StoreEvent, SubscriptionId};
pub use history::{HistoryFilter, HistoryKind, HistoryLog, HistoryRecord};
pub use ids::IdGenerator;
pub use progression::{Base, Stats, apply_delta, tier_for_level, update_base, xp_needed};
pub use quests::{Quest, QuestError, QuestIdea, QuestReward, QuestStatus};
pub use schema::{Validated, migrate, validate_state};
pub use state::{AppState, DiaryEntry, Limits, Meta, PlayerProfile, Preferences};
pub use storage::{MemoryStorage, StateStorage};
pub use store::{EntryError, EntryInput, EntrySubmission, ExportEnvelope, ImportError, Store};
pub use summarize::{
    Credential, DirectOptions, DirectSummarizer, HttpResponse, HttpTransport, LocalSummarizer,
    ProxySummarizer, RevertReason, StrategyController, StrategyMode, SummarizeError, Summarizer,
    TransportError,
};

/// Trait for abstracting where the keyword config comes from
/// Platform-specific implementations should provide this
#[async_trait::async_trait(?Send)]
pub trait ConfigSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the keyword config document
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be fetched or parsed.
    async fn fetch_config(&self) -> Result<KeywordConfig, Self::Error>;
}

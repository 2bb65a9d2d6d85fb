//! Entry summaries and quest ideas, from pure local derivation or a remote model.
//!
//! [`StrategyController`] picks the active [`Summarizer`] and falls back to
//! [`LocalSummarizer`] whenever a remote call fails, so callers always get text.
use async_trait::async_trait;

use crate::derive::DerivationResult;
use crate::quests::QuestIdea;
use crate::state::AppState;

pub mod controller;
pub mod local;
pub mod remote;
pub mod transport;

pub use controller::{RevertReason, StrategyController, StrategyMode};
pub use local::LocalSummarizer;
pub use remote::{Credential, DirectOptions, DirectSummarizer, ProxySummarizer};
pub use transport::{HttpResponse, HttpTransport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("remote returned HTTP {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Malformed(String),
    #[error("service not available at {0}")]
    Unavailable(String),
    #[error("credential has been cleared")]
    CredentialCleared,
}

/// One way of producing summaries and quest ideas.
#[async_trait(?Send)]
pub trait Summarizer {
    /// One-line summary of a diary entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a remote strategy fails; local never does.
    async fn summarize_entry(
        &self,
        text: &str,
        derived: &DerivationResult,
    ) -> Result<String, SummarizeError>;

    /// Unsanitised quest suggestions for the current player state.
    ///
    /// # Errors
    ///
    /// Returns an error if a remote strategy fails; local never does.
    async fn suggest_quests(&self, state: &AppState) -> Result<Vec<QuestIdea>, SummarizeError>;
}

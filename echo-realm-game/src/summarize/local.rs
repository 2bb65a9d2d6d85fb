use async_trait::async_trait;

use super::{SummarizeError, Summarizer};
use crate::derive::{DerivationResult, summarize_derivation};
use crate::quests::QuestIdea;
use crate::state::AppState;

/// Deterministic summaries built purely from the derivation; never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSummarizer;

impl LocalSummarizer {
    #[must_use]
    pub fn summary(derived: &DerivationResult) -> String {
        let mut out = summarize_derivation(derived);
        if !derived.keywords.is_empty() {
            out.push_str(" | ");
            out.push_str(&derived.keywords.join(", "));
        }
        out
    }
}

#[async_trait(?Send)]
impl Summarizer for LocalSummarizer {
    async fn summarize_entry(
        &self,
        _text: &str,
        derived: &DerivationResult,
    ) -> Result<String, SummarizeError> {
        Ok(Self::summary(derived))
    }

    async fn suggest_quests(&self, _state: &AppState) -> Result<Vec<QuestIdea>, SummarizeError> {
        Ok(Vec::new())
    }
}

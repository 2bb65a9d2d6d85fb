//! Entry scoring: turns diary text plus mood/energy into an XP and attribute delta.
//!
//! Everything in here is pure. Identical inputs always produce identical
//! [`DerivationResult`]s; no clock, randomness or storage is touched.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::attributes::AttributeMap;
use crate::config::{KeywordConfig, KeywordRule};
use crate::constants::{
    BASE_XP_MAX, BASE_XP_MIN, DEFAULT_ATTRIBUTE_GAIN, MIN_XP_GAINED, MOOD_ENERGY_WEIGHT,
    NEUTRAL_MOOD, WORDS_PER_BASE_XP,
};
use crate::numbers::{i64_to_f64, round_half_up, usize_to_i64};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("static word regex"));

/// What a single entry is worth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivationResult {
    pub words: usize,
    /// Matched keywords in config order
    #[serde(default)]
    pub keywords: Vec<String>,
    pub xp_gained: i64,
    #[serde(default)]
    pub stat_diff: AttributeMap,
}

/// Count word-boundary tokens.
#[must_use]
pub fn word_count(text: &str) -> usize {
    WORD_RE.find_iter(text.trim()).count()
}

/// Keywords contained in `text`, case-insensitively and as plain substrings.
///
/// Substring matching is intentional: `"lauf"` also matches `"Dauerlauf"`.
#[must_use]
pub fn find_keywords<'a>(text: &str, keywords: &'a [KeywordRule]) -> Vec<&'a KeywordRule> {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .filter(|rule| !rule.word.is_empty() && lower.contains(&rule.word.to_lowercase()))
        .collect()
}

/// Sum attribute gains of matched keywords, per attribute.
#[must_use]
pub fn derive_attribute_diff(matched: &[&KeywordRule]) -> AttributeMap {
    let mut diff = AttributeMap::new();
    for rule in matched {
        if let Some(attribute) = rule.attribute.as_deref() {
            diff.add(
                attribute,
                rule.attribute_gain.unwrap_or(DEFAULT_ATTRIBUTE_GAIN),
            );
        }
    }
    diff
}

#[must_use]
pub fn base_xp(words: usize) -> i64 {
    round_half_up(i64_to_f64(usize_to_i64(words)) / WORDS_PER_BASE_XP).clamp(BASE_XP_MIN, BASE_XP_MAX)
}

/// Bonus (or malus) from mood and energy; missing values count as neutral.
#[must_use]
pub fn mood_energy_delta(mood: Option<i64>, energy: Option<i64>) -> i64 {
    (mood.unwrap_or(NEUTRAL_MOOD) - NEUTRAL_MOOD) * MOOD_ENERGY_WEIGHT
        + (energy.unwrap_or(NEUTRAL_MOOD) - NEUTRAL_MOOD) * MOOD_ENERGY_WEIGHT
}

/// Score a diary entry.
#[must_use]
pub fn derive_from_entry(
    text: &str,
    mood: Option<i64>,
    energy: Option<i64>,
    config: &KeywordConfig,
) -> DerivationResult {
    let words = word_count(text);
    let matched = find_keywords(text, &config.keywords);
    let keyword_bonus: i64 = matched.iter().map(|rule| rule.xp).sum();
    let raw = base_xp(words) + keyword_bonus + mood_energy_delta(mood, energy);
    let xp_gained = round_half_up(i64_to_f64(raw)).max(MIN_XP_GAINED);

    DerivationResult {
        words,
        keywords: matched.iter().map(|rule| rule.word.clone()).collect(),
        xp_gained,
        stat_diff: derive_attribute_diff(&matched),
    }
}

/// Short human-readable line such as `XP +26, fokus+1`.
#[must_use]
pub fn summarize_derivation(result: &DerivationResult) -> String {
    let mut parts = vec![format!("XP +{}", result.xp_gained)];
    parts.extend(result.stat_diff.iter().map(|(name, delta)| format_delta(name, delta)));
    parts.join(", ")
}

/// `fokus+1` / `fokus-2`.
#[must_use]
pub fn format_delta(name: &str, delta: i64) -> String {
    if delta >= 0 {
        format!("{name}+{delta}")
    } else {
        format!("{name}{delta}")
    }
}

//! Quest model, rule-based generation and remote idea sanitising.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::attributes::AttributeMap;
use crate::constants::{
    FALLBACK_ATTRIBUTE, QUEST_IDEA_DESC_MAX, QUEST_IDEA_TITLE_MAX,
    QUEST_REWARD_ATTRIBUTE, QUEST_REWARD_XP,
};
use crate::progression::{Stats, apply_delta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    #[default]
    Open,
    Done,
    Skipped,
}

impl QuestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Done => "done",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "done" => Ok(Self::Done),
            "skipped" => Ok(Self::Skipped),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuestReward {
    #[serde(default)]
    pub xp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<AttributeMap>,
}

impl QuestReward {
    /// Human-readable reward, e.g. `20 XP + fokus+1`.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!("{} XP", self.xp);
        if let Some(attribute) = self.attribute.as_ref().filter(|a| !a.is_empty()) {
            let parts: Vec<String> = attribute
                .iter()
                .map(|(name, delta)| crate::derive::format_delta(name, delta))
                .collect();
            out.push_str(" + ");
            out.push_str(&parts.join(", "));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub status: QuestStatus,
    #[serde(default)]
    pub reward: QuestReward,
}

impl Quest {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == QuestStatus::Open
    }

    /// Replace the generated content while keeping id and status.
    pub fn reroll_from(&mut self, fresh: Quest) {
        self.title = fresh.title;
        self.desc = fresh.desc;
        self.reward = fresh.reward;
    }
}

/// Quest suggestion as returned by a remote strategy, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuestIdea {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub reward: Option<QuestReward>,
}

/// Why a reroll was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestError {
    #[error("Quest {0} nicht gefunden")]
    NotFound(String),
    #[error("Quest {0} ist nicht offen")]
    NotOpen(String),
    #[error("Reroll-Limit für heute erreicht ({used}/{max})")]
    RerollLimit { used: u32, max: u32 },
}

fn title_for_attribute(attribute: &str) -> &'static str {
    match attribute {
        "vitalitaet" => "15 Min. Bewegung",
        "fokus" => "25 Min. Fokusblock",
        "sozial" => "Kontakt aufnehmen",
        _ => "Routine pflegen",
    }
}

/// Build an open quest targeting the player's weakest attribute.
#[must_use]
pub fn suggest_quest_from_state(stats: &Stats, id: String) -> Quest {
    let attribute = stats
        .attributes
        .weakest()
        .map_or(FALLBACK_ATTRIBUTE, |(name, _)| name);
    let mut reward_attr = AttributeMap::new();
    reward_attr.set(attribute, QUEST_REWARD_ATTRIBUTE);

    Quest {
        id,
        title: title_for_attribute(attribute).to_string(),
        desc: format!("Unterstütze dein Attribut {attribute} heute."),
        status: QuestStatus::Open,
        reward: QuestReward {
            xp: QUEST_REWARD_XP,
            attribute: Some(reward_attr),
        },
    }
}

/// Apply a quest's reward to `stats`. Returns levels gained.
pub fn apply_quest_reward(stats: &mut Stats, quest: &Quest) -> u32 {
    let empty = AttributeMap::new();
    let diff = quest.reward.attribute.as_ref().unwrap_or(&empty);
    apply_delta(stats, quest.reward.xp, diff)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Keep only ideas with a title and a reward, truncating long text.
#[must_use]
pub fn sanitize_quest_ideas(ideas: Vec<QuestIdea>) -> Vec<QuestIdea> {
    ideas
        .into_iter()
        .filter_map(|idea| {
            let title = idea.title.filter(|t| !t.trim().is_empty())?;
            let reward = idea.reward?;
            Some(QuestIdea {
                title: Some(truncate_chars(title.trim(), QUEST_IDEA_TITLE_MAX)),
                desc: Some(truncate_chars(
                    idea.desc.as_deref().unwrap_or_default().trim(),
                    QUEST_IDEA_DESC_MAX,
                )),
                reward: Some(reward),
            })
        })
        .collect()
}

/// Turn a sanitised idea into an open quest. Returns `None` for unsanitised input.
#[must_use]
pub fn quest_from_idea(idea: &QuestIdea, id: String) -> Option<Quest> {
    Some(Quest {
        id,
        title: idea.title.clone()?,
        desc: idea.desc.clone().unwrap_or_default(),
        status: QuestStatus::Open,
        reward: idea.reward.clone()?,
    })
}

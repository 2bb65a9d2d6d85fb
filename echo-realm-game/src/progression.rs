//! Level curve, XP rollover and the derived base read-model.
use serde::{Deserialize, Serialize};

use crate::attributes::AttributeMap;
use crate::constants::{
    BASE_TIER_NAMES, DEFAULT_ATTRIBUTES, LEVELS_PER_TIER, XP_CURVE_BASE, XP_CURVE_FACTOR,
};
use crate::numbers::{i64_to_f64, round_half_up};

/// XP required to advance from `level` to `level + 1`.
#[must_use]
pub fn xp_needed(level: i64) -> i64 {
    round_half_up(XP_CURVE_BASE * i64_to_f64(level) * XP_CURVE_FACTOR)
}

/// Character sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub level: i64,
    pub xp: i64,
    pub xp_to_next: i64,
    pub attributes: AttributeMap,
    #[serde(default)]
    pub buffs: Vec<String>,
    #[serde(default)]
    pub debuffs: Vec<String>,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            xp_to_next: xp_needed(1),
            attributes: DEFAULT_ATTRIBUTES.iter().map(|name| (*name, 1)).collect(),
            buffs: Vec::new(),
            debuffs: Vec::new(),
        }
    }
}

impl Stats {
    /// Whether the sheet satisfies the level/XP invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.level >= 1 && self.xp >= 0 && self.xp < self.xp_to_next
    }

    /// Fraction of the way to the next level, in percent.
    #[must_use]
    pub fn progress_pct(&self) -> i64 {
        if self.xp_to_next <= 0 {
            return 0;
        }
        round_half_up(i64_to_f64(self.xp) / i64_to_f64(self.xp_to_next) * 100.0).min(100)
    }
}

/// Apply an XP gain and attribute deltas, rolling over as many levels as needed.
///
/// Returns the number of levels gained.
pub fn apply_delta(stats: &mut Stats, xp_gained: i64, stat_diff: &AttributeMap) -> u32 {
    stats.xp = stats.xp.saturating_add(xp_gained).max(0);
    stats.attributes.merge(stat_diff);

    let mut levels = 0;
    while stats.xp >= stats.xp_to_next {
        stats.level += 1;
        stats.xp -= stats.xp_to_next;
        stats.xp_to_next = xp_needed(stats.level);
        levels += 1;
    }
    levels
}

/// Home base, derived from level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    pub tier: i64,
    pub name: String,
    pub slots: i64,
    #[serde(default)]
    pub upgrades: Vec<String>,
}

impl Default for Base {
    fn default() -> Self {
        Self {
            tier: 1,
            name: base_name_for_tier(1),
            slots: 1,
            upgrades: Vec::new(),
        }
    }
}

#[must_use]
pub fn tier_for_level(level: i64) -> i64 {
    (level.div_euclid(LEVELS_PER_TIER) + 1).max(1)
}

#[must_use]
pub fn base_name_for_tier(tier: i64) -> String {
    usize::try_from(tier - 1)
        .ok()
        .and_then(|idx| BASE_TIER_NAMES.get(idx))
        .map_or_else(|| format!("Tier {tier}"), |name| (*name).to_string())
}

/// Recompute tier, name and slots from `stats`. Returns true if the tier changed.
pub fn update_base(base: &mut Base, stats: &Stats) -> bool {
    let tier = tier_for_level(stats.level);
    let changed = tier != base.tier;
    base.tier = tier;
    base.name = base_name_for_tier(tier);
    base.slots = tier;
    changed
}

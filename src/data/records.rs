//! Flat input records handed to the analysis engine, plus the per-player
//! profile assembled from them. Column semantics follow the normalized raid
//! tables: `IGN, Class, Spec, Token, Role` (loot tables add `Item`).

use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

/// One row of a per-raid participant table. The source tag is the file name
/// the row came from; the attendance ledger maps it to a boss-kill count and
/// a raid size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    pub raw_name: String,
    pub class: String,
    pub spec: String,
    pub token: String,
    pub role: String,
    pub source_tag: String,
}

/// One row of a per-raid loot table: who received which item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootRecord {
    pub raw_name: String,
    pub item: String,
    pub class: String,
    pub spec: String,
    pub token: String,
    pub role: String,
    pub source_tag: String,
}

/// Canonical per-player attributes. One profile per canonical identity;
/// merging is last-write-wins except that populated fields are never
/// overwritten by "Unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub display_name: String,
    pub class: String,
    pub spec: String,
    pub token: String,
    pub role: String,
    pub primary_stat: String,
}

impl PlayerProfile {
    pub fn is_healer(&self) -> bool {
        self.role == "Healer"
    }

    /// Fill any "Unknown" field of `self` from `other`.
    pub fn merge_from(&mut self, other: &PlayerProfile) {
        merge_field(&mut self.class, &other.class);
        merge_field(&mut self.spec, &other.spec);
        merge_field(&mut self.token, &other.token);
        merge_field(&mut self.role, &other.role);
        merge_field(&mut self.primary_stat, &other.primary_stat);
    }

    pub fn from_participation(record: &ParticipationRecord) -> PlayerProfile {
        profile_from_columns(
            &record.raw_name,
            &record.class,
            &record.spec,
            &record.token,
            &record.role,
        )
    }

    pub fn from_loot(record: &LootRecord) -> PlayerProfile {
        profile_from_columns(
            &record.raw_name,
            &record.class,
            &record.spec,
            &record.token,
            &record.role,
        )
    }
}

fn merge_field(target: &mut String, source: &str) {
    if target == UNKNOWN && !source.is_empty() && source != UNKNOWN {
        *target = source.to_string();
    }
}

fn profile_from_columns(
    raw_name: &str,
    class: &str,
    spec: &str,
    token: &str,
    role: &str,
) -> PlayerProfile {
    let class = non_empty_or_unknown(class);
    let spec = non_empty_or_unknown(spec);
    let primary_stat = primary_stat_for(&class, &spec).to_string();
    PlayerProfile {
        display_name: raw_name.trim().to_string(),
        class,
        spec,
        token: non_empty_or_unknown(token),
        role: non_empty_or_unknown(role),
        primary_stat,
    }
}

fn non_empty_or_unknown(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Primary stat by class, spec-dependent for hybrid classes. Unrecognized
/// classes get "Unknown"; a hybrid class with an unrecognized spec falls back
/// to its caster stat.
pub fn primary_stat_for(class: &str, spec: &str) -> &'static str {
    match class {
        "DK" | "Death Knight" | "Warrior" => "Strength",
        "Hunter" | "Rogue" => "Agility",
        "Mage" | "Priest" | "Warlock" => "Intellect",
        "Druid" => match spec {
            "Feral" | "Guardian" => "Agility",
            _ => "Intellect",
        },
        "Paladin" => match spec {
            "Retribution" | "Protection" => "Strength",
            _ => "Intellect",
        },
        "Shaman" => match spec {
            "Enhancement" => "Agility",
            _ => "Intellect",
        },
        _ => UNKNOWN,
    }
}

//! Analysis configuration: scoring tunables, alias/exclusion tables, the
//! source-tag to boss-count mapping, and slot importance weights. Loaded from
//! JSON with defaults matching the campaign the tracker was built for; a
//! malformed file or an inconsistent table is fatal at startup.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::records::PlayerProfile;

pub const DEFAULT_CONFIG_PATH: &str = "data/analysis_config.json";

/// A pair of identities known to be the same player under two spellings.
/// When both show up, the alternate is dropped before ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConflict {
    pub alternate: String,
    pub preferred: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Boss encounters in the full campaign; denominator for attendance.
    pub total_bosses: u32,
    /// Fraction of attendance percentage contributing to the base score.
    pub attendance_weight: f64,
    /// Base multiplier for per-slot item penalties.
    pub item_penalty_multiplier: f64,
    /// How much the "other" gear economy counts against a track, in [0, 1].
    pub token_penalty_reduction: f64,
    /// Attendance bonus rate for 25-man participation; 0 disables the bonus.
    pub raid_25_bonus: f64,
    /// Attendance percentage considered excellent in recommendation tags.
    pub high_attendance_threshold: f64,
    /// Items-per-boss below which a player is due for loot.
    pub low_items_per_boss: f64,
    /// Items-per-boss above which a player recently received multiple items.
    pub high_items_per_boss: f64,
    /// Short or misspelled name -> canonical name. Applied before the
    /// auto-detected alias table.
    pub manual_aliases: HashMap<String, String>,
    /// Names excluded from analysis entirely (case-insensitive exact match).
    pub exclude_players: Vec<String>,
    /// Substrings marking a raw name as a pick-up-group outsider.
    pub pug_markers: Vec<String>,
    /// Source-tag substring -> boss-kill count, first match wins. Tags with
    /// no match contribute zero bosses.
    pub file_tag_bosses: Vec<(String, u32)>,
    /// Slot importance multipliers for regular gear penalties.
    pub slot_weights: HashMap<String, f64>,
    /// Per token-set slot importance overrides. Every slot named here must
    /// also exist in `slot_weights`.
    pub token_slot_importance: HashMap<String, HashMap<String, f64>>,
    /// Duplicate-spelling conflicts resolved in favor of a preferred identity.
    pub profile_conflicts: Vec<ProfileConflict>,
    /// Profiles injected for identities absent after ingestion. Documented
    /// exception list, not derived from data.
    pub profile_patches: HashMap<String, PlayerProfile>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            total_bosses: 8,
            attendance_weight: 0.55,
            item_penalty_multiplier: 55.0,
            token_penalty_reduction: 0.75,
            raid_25_bonus: 0.0,
            high_attendance_threshold: 87.5,
            low_items_per_boss: 0.2,
            high_items_per_boss: 0.8,
            manual_aliases: default_manual_aliases(),
            exclude_players: vec![
                "Ifbbathlete".to_string(),
                "Andrewd".to_string(),
                "Rewolut".to_string(),
                "Corwor".to_string(),
                "anotherpug".to_string(),
            ],
            pug_markers: vec!["-pug".to_string(), "-good pug".to_string()],
            file_tag_bosses: vec![
                ("25man_58".to_string(), 5),
                ("10man_war_spine".to_string(), 2),
                ("10man_madness".to_string(), 1),
            ],
            slot_weights: default_slot_weights(),
            token_slot_importance: default_token_slot_importance(),
            profile_conflicts: vec![ProfileConflict {
                alternate: "overdeath".to_string(),
                preferred: "ooverdeath".to_string(),
            }],
            profile_patches: default_profile_patches(),
        }
    }
}

fn default_manual_aliases() -> HashMap<String, String> {
    [
        ("saoki", "saokipriest"),
        ("ruskov", "rùskøv"),
        ("pepsi", "pepsícola"),
        ("delusive", "ðelusive"),
        ("ricardo", "ricardomìlos"),
        ("overdeath", "ooverdeath"),
        ("borrann", "borran"),
    ]
    .iter()
    .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
    .collect()
}

fn default_slot_weights() -> HashMap<String, f64> {
    [
        ("head", 1.5),
        ("chest", 1.5),
        ("legs", 1.5),
        ("weapon", 1.5),
        ("trinket", 1.5),
        ("shoulder", 1.3),
        ("hands", 1.3),
        ("waist", 1.2),
        ("feet", 1.2),
        ("back", 1.2),
        ("off-hand", 1.2),
        ("wrist", 1.1),
        ("neck", 1.0),
        ("finger", 1.0),
        ("ranged", 1.0),
        ("relic", 1.0),
    ]
    .iter()
    .map(|(slot, weight)| (slot.to_string(), *weight))
    .collect()
}

fn default_token_slot_importance() -> HashMap<String, HashMap<String, f64>> {
    let per_set: HashMap<String, f64> = [
        ("head", 1.5),
        ("shoulder", 1.3),
        ("chest", 1.5),
        ("hands", 1.3),
        ("legs", 1.5),
    ]
    .iter()
    .map(|(slot, weight)| (slot.to_string(), *weight))
    .collect();

    ["Vanquisher", "Conqueror", "Protector"]
        .iter()
        .map(|set| (set.to_string(), per_set.clone()))
        .collect()
}

fn default_profile_patches() -> HashMap<String, PlayerProfile> {
    let mut patches = HashMap::new();
    patches.insert(
        "ooverdeath".to_string(),
        PlayerProfile {
            display_name: "overdeath".to_string(),
            class: "DK".to_string(),
            spec: "Blood".to_string(),
            token: "Vanquisher".to_string(),
            role: "Main Tank".to_string(),
            primary_stat: "Strength".to_string(),
        },
    );
    patches
}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    Invalid(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read config file: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config JSON: {err}"),
            Self::Invalid(issues) => {
                write!(f, "invalid configuration ({} issue(s))", issues.len())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl AnalysisConfig {
    /// Load from a JSON file. A missing file yields the defaults; a file that
    /// exists but fails to parse or validate is fatal.
    pub fn load(path: &str) -> Result<AnalysisConfig, ConfigError> {
        let config = if Path::new(path).exists() {
            let raw = fs::read_to_string(path).map_err(ConfigError::Read)?;
            serde_json::from_str(&raw).map_err(ConfigError::Parse)?
        } else {
            AnalysisConfig::default()
        };
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Consistency checks surfaced at startup rather than per record.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();

        if self.total_bosses == 0 {
            issues.push("total_bosses must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.attendance_weight) {
            issues.push(format!(
                "attendance_weight {} outside [0, 1]",
                self.attendance_weight
            ));
        }
        if !(0.0..=1.0).contains(&self.token_penalty_reduction) {
            issues.push(format!(
                "token_penalty_reduction {} outside [0, 1]",
                self.token_penalty_reduction
            ));
        }
        if self.item_penalty_multiplier < 0.0 {
            issues.push("item_penalty_multiplier must be non-negative".to_string());
        }
        if self.raid_25_bonus < 0.0 {
            issues.push("raid_25_bonus must be non-negative".to_string());
        }
        if self.low_items_per_boss >= self.high_items_per_boss {
            issues.push(format!(
                "low_items_per_boss {} must be below high_items_per_boss {}",
                self.low_items_per_boss, self.high_items_per_boss
            ));
        }
        for (slot, weight) in &self.slot_weights {
            if *weight < 0.0 {
                issues.push(format!("slot_weights['{slot}'] is negative"));
            }
        }
        for (token_set, slots) in &self.token_slot_importance {
            for (slot, weight) in slots {
                if !self.slot_weights.contains_key(slot) {
                    issues.push(format!(
                        "token_slot_importance['{token_set}'] references unknown slot '{slot}'"
                    ));
                }
                if *weight < 0.0 {
                    issues.push(format!(
                        "token_slot_importance['{token_set}']['{slot}'] is negative"
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Boss-kill count for a source tag; zero when no pattern matches.
    pub fn bosses_for_tag(&self, source_tag: &str) -> u32 {
        self.file_tag_bosses
            .iter()
            .find(|(pattern, _)| source_tag.contains(pattern.as_str()))
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn slot_weight(&self, slot: &str) -> f64 {
        self.slot_weights.get(slot).copied().unwrap_or(1.0)
    }

    /// Token-set specific importance for a slot, falling back to the regular
    /// slot weight when the set has no override.
    pub fn token_slot_weight(&self, token_set: &str, slot: &str) -> f64 {
        self.token_slot_importance
            .get(token_set)
            .and_then(|slots| slots.get(slot))
            .copied()
            .unwrap_or_else(|| self.slot_weight(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn unknown_slot_in_importance_table_is_rejected() {
        let mut config = AnalysisConfig::default();
        if let Some(slots) = config.token_slot_importance.get_mut("Vanquisher") {
            slots.insert("tabard".to_string(), 1.5);
        }
        let issues = config.validate().unwrap_err();
        assert!(issues.iter().any(|issue| issue.contains("tabard")));
    }

    #[test]
    fn out_of_range_reduction_is_rejected() {
        let config = AnalysisConfig {
            token_penalty_reduction: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn tag_lookup_is_substring_based() {
        let config = AnalysisConfig::default();
        assert_eq!(config.bosses_for_tag("25man_58___sunday_2402_loot.csv"), 5);
        assert_eq!(config.bosses_for_tag("10man_war_spine_participants.csv"), 2);
        assert_eq!(config.bosses_for_tag("10man_madness_participants.csv"), 1);
        assert_eq!(config.bosses_for_tag("all_participants.csv"), 0);
    }

    #[test]
    fn token_slot_weight_falls_back_to_slot_weight() {
        let config = AnalysisConfig::default();
        assert_eq!(config.token_slot_weight("Vanquisher", "head"), 1.5);
        assert_eq!(config.token_slot_weight("Vanquisher", "wrist"), 1.1);
        assert_eq!(config.token_slot_weight("Unknown", "head"), 1.5);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = AnalysisConfig::load("does/not/exist.json").unwrap();
        assert_eq!(config.total_bosses, 8);
    }
}

//! Canonical identity resolution for raw in-game names: normalization, PUG
//! and exclusion-list filtering, the manual alias table, and the per-pass
//! auto-detected alias table built by comparing loot names against
//! participation names.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::AnalysisConfig;

/// Trim and lowercase a raw name. The result is the key space all alias
/// tables operate on.
pub fn normalize_name(raw_name: &str) -> String {
    raw_name.trim().to_lowercase()
}

/// Fold accented characters to their base letter so spelling variants like
/// "ruskov" and "rùskøv" compare equal. Covers the Latin accents that occur
/// in in-game names; anything else passes through unchanged.
pub fn strip_diacritics(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            'ç' => 'c',
            'ñ' => 'n',
            'ð' => 'd',
            'þ' => 'p',
            other => other,
        })
        .collect()
}

pub struct IdentityResolver {
    manual_aliases: HashMap<String, String>,
    auto_aliases: HashMap<String, String>,
    exclusions: HashSet<String>,
    pug_markers: Vec<String>,
}

impl IdentityResolver {
    pub fn new(config: &AnalysisConfig) -> IdentityResolver {
        IdentityResolver {
            manual_aliases: config
                .manual_aliases
                .iter()
                .map(|(alias, canonical)| (normalize_name(alias), normalize_name(canonical)))
                .collect(),
            auto_aliases: HashMap::new(),
            exclusions: config
                .exclude_players
                .iter()
                .map(|name| normalize_name(name))
                .collect(),
            pug_markers: config
                .pug_markers
                .iter()
                .map(|marker| marker.to_lowercase())
                .collect(),
        }
    }

    /// A name is excluded when it is empty, appears on the exclusion list, or
    /// carries any PUG marker substring.
    pub fn is_excluded(&self, raw_name: &str) -> bool {
        let normalized = normalize_name(raw_name);
        if normalized.is_empty() || self.exclusions.contains(&normalized) {
            return true;
        }
        self.pug_markers
            .iter()
            .any(|marker| normalized.contains(marker.as_str()))
    }

    /// Resolve a raw name to its canonical identity. Returns `None` for
    /// excluded names; a name no table knows stays its own identity.
    pub fn resolve(&self, raw_name: &str) -> Option<String> {
        if self.is_excluded(raw_name) {
            return None;
        }
        let mut name = normalize_name(raw_name);
        if let Some(canonical) = self.manual_aliases.get(&name) {
            name = canonical.clone();
        }
        if let Some(canonical) = self.auto_aliases.get(&name) {
            name = canonical.clone();
        }
        Some(name)
    }

    /// Build the auto-detected alias table for this pass. For every
    /// normalized loot-only name not already manually mapped, try each
    /// participation name in sorted order: a prefix relation in either
    /// direction or equality after diacritic stripping wins; first match
    /// wins. Candidates are visited in sorted order so repeated runs produce
    /// the same table.
    pub fn learn_aliases(
        &mut self,
        loot_names: &HashSet<String>,
        participation_names: &HashSet<String>,
    ) {
        let candidates: BTreeSet<&String> = participation_names.iter().collect();
        let mut loot_sorted: Vec<&String> = loot_names.iter().collect();
        loot_sorted.sort();

        for loot_name in loot_sorted {
            if self.manual_aliases.contains_key(loot_name.as_str())
                || participation_names.contains(loot_name.as_str())
            {
                continue;
            }
            let stripped_loot = strip_diacritics(loot_name);
            for participant in &candidates {
                if loot_name.starts_with(participant.as_str())
                    || participant.starts_with(loot_name.as_str())
                    || stripped_loot == strip_diacritics(participant)
                {
                    self.auto_aliases
                        .insert(loot_name.clone(), (*participant).clone());
                    break;
                }
            }
        }
    }

    /// Auto-detected mappings learned this pass, for diagnostics.
    pub fn auto_aliases(&self) -> &HashMap<String, String> {
        &self.auto_aliases
    }
}

//! Item classification: display name -> (kind, slot), with token-set armor
//! detected separately from ordinary gear. Three tiers, in priority order:
//! the fixed token table, curated per-item slot overrides (fed from the loot
//! tables file), then an ordered keyword scan over the cleaned name.

use std::collections::HashMap;

use serde::Serialize;

pub const UNKNOWN_SLOT: &str = "unknown";

const CATALOG_SUFFIX: &str = " - item - cataclysm classic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Token,
    Gear,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemClass {
    pub kind: ItemKind,
    pub slot: String,
    pub token_set: Option<String>,
}

/// Set-token armor pieces by cleaned lowercase name. Authoritative: an entry
/// here wins over every other classification tier.
const TOKEN_TABLE: &[(&str, &str, &str)] = &[
    ("crown of the corrupted protector", "Protector", "head"),
    ("shoulders of the corrupted protector", "Protector", "shoulder"),
    ("chest of the corrupted protector", "Protector", "chest"),
    ("gauntlets of the corrupted protector", "Protector", "hands"),
    ("leggings of the corrupted protector", "Protector", "legs"),
    ("crown of the corrupted conqueror", "Conqueror", "head"),
    ("shoulders of the corrupted conqueror", "Conqueror", "shoulder"),
    ("chest of the corrupted conqueror", "Conqueror", "chest"),
    ("gauntlets of the corrupted conqueror", "Conqueror", "hands"),
    ("leggings of the corrupted conqueror", "Conqueror", "legs"),
    ("crown of the corrupted vanquisher", "Vanquisher", "head"),
    ("shoulders of the corrupted vanquisher", "Vanquisher", "shoulder"),
    ("chest of the corrupted vanquisher", "Vanquisher", "chest"),
    ("gauntlets of the corrupted vanquisher", "Vanquisher", "hands"),
    ("leggings of the corrupted vanquisher", "Vanquisher", "legs"),
];

/// Slot keyword lists, scanned in order; the first slot with any matching
/// substring wins. Order carries the tie-breaks: "greaves" belongs to legs
/// before feet, "orb" to trinket before off-hand, "fists" to hands before
/// the weapon list sees "fist".
const SLOT_KEYWORDS: &[(&str, &[&str])] = &[
    ("head", &["helm", "hood", "crown", "cowl", "headpiece", "faceguard", "headguard", "mask"]),
    ("neck", &["necklace", "amulet", "choker", "pendant"]),
    ("shoulder", &["shoulder", "spaulders", "mantle", "pauldrons"]),
    ("back", &["cloak", "cape", "drape", "shroud"]),
    ("chest", &["chest", "robe", "tunic", "breastplate", "hauberk", "vestment"]),
    ("wrist", &["bracers", "wristguards", "wristbands", "vambraces"]),
    ("hands", &["gloves", "gauntlets", "handguards", "grips", "fists"]),
    ("waist", &["belt", "girdle", "waistguard", "waistband", "cinch", "cord"]),
    ("legs", &["leggings", "pants", "legguards", "legplates", "kilt", "greaves"]),
    ("feet", &["boots", "treads", "sabatons", "stompers", "footguards"]),
    ("finger", &["ring", "band", "seal", "signet", "loop"]),
    ("trinket", &["trinket", "charm", "insignia", "heart", "eye", "fang", "vial", "orb"]),
    (
        "weapon",
        &[
            "sword", "axe", "mace", "staff", "dagger", "blade", "hammer", "fist", "scythe",
            "glaive", "spear", "polearm",
        ],
    ),
    ("ranged", &["bow", "gun", "crossbow", "wand", "thrown", "rifle", "launcher"]),
    ("off-hand", &["shield", "offhand", "tome", "totem", "idol", "defender"]),
    ("relic", &["libram", "sigil"]),
];

/// Lowercase an item display name and strip the trailing catalog tag.
pub fn clean_item_name(display_name: &str) -> String {
    let lowered = display_name.trim().to_lowercase();
    match lowered.find(CATALOG_SUFFIX) {
        Some(index) => lowered[..index].trim().to_string(),
        None => lowered,
    }
}

pub struct ItemClassifier {
    token_table: HashMap<String, (String, String)>,
    slot_overrides: HashMap<String, String>,
}

impl Default for ItemClassifier {
    fn default() -> Self {
        ItemClassifier::new()
    }
}

impl ItemClassifier {
    pub fn new() -> ItemClassifier {
        ItemClassifier::with_overrides(HashMap::new())
    }

    /// Build a classifier with a curated name -> slot override map, e.g. from
    /// the loot tables file. Override keys and slots are normalized here.
    pub fn with_overrides(slot_overrides: HashMap<String, String>) -> ItemClassifier {
        ItemClassifier {
            token_table: TOKEN_TABLE
                .iter()
                .map(|(name, set, slot)| {
                    (name.to_string(), (set.to_string(), slot.to_string()))
                })
                .collect(),
            slot_overrides: slot_overrides
                .into_iter()
                .map(|(name, slot)| (clean_item_name(&name), coarse_slot(&slot.to_lowercase())))
                .collect(),
        }
    }

    pub fn classify(&self, display_name: &str) -> ItemClass {
        let name = clean_item_name(display_name);
        if name.is_empty() {
            return ItemClass {
                kind: ItemKind::Unknown,
                slot: UNKNOWN_SLOT.to_string(),
                token_set: None,
            };
        }

        if let Some((token_set, slot)) = self.token_table.get(&name) {
            return ItemClass {
                kind: ItemKind::Token,
                slot: slot.clone(),
                token_set: Some(token_set.clone()),
            };
        }

        if let Some(slot) = self.slot_overrides.get(&name) {
            return ItemClass {
                kind: ItemKind::Gear,
                slot: slot.clone(),
                token_set: None,
            };
        }

        for (slot, keywords) in SLOT_KEYWORDS {
            if keywords.iter().any(|keyword| name.contains(keyword)) {
                return ItemClass {
                    kind: ItemKind::Gear,
                    slot: slot.to_string(),
                    token_set: None,
                };
            }
        }

        ItemClass {
            kind: ItemKind::Unknown,
            slot: UNKNOWN_SLOT.to_string(),
            token_set: None,
        }
    }
}

/// Map fine-grained weapon subtype names from override sources onto the
/// coarse slots the penalty weighting uses.
fn coarse_slot(slot: &str) -> String {
    match slot {
        "bow" | "gun" | "crossbow" | "wand" | "thrown" => "ranged".to_string(),
        "shield" | "held in off-hand" | "off hand" => "off-hand".to_string(),
        "one-hand" | "two-hand" | "main hand" | "one hand" | "two hand" => "weapon".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_table_classifies_with_and_without_suffix() {
        let classifier = ItemClassifier::new();
        let plain = classifier.classify("Crown of the Corrupted Vanquisher");
        assert_eq!(plain.kind, ItemKind::Token);
        assert_eq!(plain.slot, "head");
        assert_eq!(plain.token_set.as_deref(), Some("Vanquisher"));

        let suffixed = classifier
            .classify("Crown of the Corrupted Vanquisher - Item - Cataclysm Classic");
        assert_eq!(suffixed, plain);
    }

    #[test]
    fn keyword_scan_picks_first_slot_in_order() {
        let classifier = ItemClassifier::new();
        assert_eq!(classifier.classify("Girdle of Shattered Stone").slot, "waist");
        assert_eq!(classifier.classify("Mosswrought Shoulderguards").slot, "shoulder");
        // "greaves" appears in both lists; legs comes first
        assert_eq!(classifier.classify("Greaves of Sordid Dreams").slot, "legs");
    }

    #[test]
    fn weapon_subtypes_coarsen() {
        let classifier = ItemClassifier::new();
        assert_eq!(classifier.classify("Vishanka, Jaws of the Earth").slot, UNKNOWN_SLOT);
        assert_eq!(classifier.classify("Ruinblaster Shotgun").slot, "ranged");
        assert_eq!(classifier.classify("Finger of Zon'ozz Wand").slot, "ranged");
        assert_eq!(classifier.classify("Timepiece of the Bronze Flight Shield").slot, "off-hand");
        assert_eq!(classifier.classify("Gurthalak, Voice of the Deeps Sword").slot, "weapon");
    }

    #[test]
    fn override_tier_beats_keywords_but_not_tokens() {
        let mut overrides = HashMap::new();
        // "Seal" would keyword-match finger; the curated table knows better.
        overrides.insert("seal of primordial shadow".to_string(), "trinket".to_string());
        overrides.insert("Crown of the Corrupted Vanquisher".to_string(), "chest".to_string());
        let classifier = ItemClassifier::with_overrides(overrides);

        let sealed = classifier.classify("Seal of Primordial Shadow");
        assert_eq!(sealed.kind, ItemKind::Gear);
        assert_eq!(sealed.slot, "trinket");

        let token = classifier.classify("Crown of the Corrupted Vanquisher");
        assert_eq!(token.kind, ItemKind::Token);
        assert_eq!(token.slot, "head");
    }

    #[test]
    fn override_slots_are_coarsened() {
        let mut overrides = HashMap::new();
        overrides.insert("ataraxis, cudgel of the warmaster".to_string(), "Two-Hand".to_string());
        overrides.insert("vishanka, jaws of the earth".to_string(), "Bow".to_string());
        let classifier = ItemClassifier::with_overrides(overrides);
        assert_eq!(classifier.classify("Ataraxis, Cudgel of the Warmaster").slot, "weapon");
        assert_eq!(classifier.classify("Vishanka, Jaws of the Earth").slot, "ranged");
    }

    #[test]
    fn unmatched_name_degrades_to_unknown() {
        let classifier = ItemClassifier::new();
        let result = classifier.classify("Petrified Fungal Growth");
        assert_eq!(result.kind, ItemKind::Unknown);
        assert_eq!(result.slot, UNKNOWN_SLOT);
        assert_eq!(result.token_set, None);
    }
}

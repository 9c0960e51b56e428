//! Loot ledger: per-identity item counts by slot, split between token-set
//! armor and regular gear, plus a classification-independent total used for
//! loot-per-boss metrics.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::analysis::items::{ItemClassifier, ItemKind, UNKNOWN_SLOT};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemSlotTally {
    /// Every item received, whether or not it classified to a slot.
    pub total_items: u32,
    pub regular_by_slot: BTreeMap<String, u32>,
    pub token_by_slot: BTreeMap<String, u32>,
    pub tokens_by_set: BTreeMap<String, u32>,
}

impl ItemSlotTally {
    pub fn token_items(&self) -> u32 {
        self.tokens_by_set.values().sum()
    }

    /// Combined slot counts (regular + token) for display.
    pub fn combined_slots(&self) -> BTreeMap<String, u32> {
        let mut combined = self.regular_by_slot.clone();
        for (slot, count) in &self.token_by_slot {
            *combined.entry(slot.clone()).or_insert(0) += count;
        }
        combined
    }
}

pub struct LootLedger<'a> {
    classifier: &'a ItemClassifier,
    tallies: HashMap<String, ItemSlotTally>,
}

impl<'a> LootLedger<'a> {
    pub fn new(classifier: &'a ItemClassifier) -> LootLedger<'a> {
        LootLedger {
            classifier,
            tallies: HashMap::new(),
        }
    }

    /// Classify one received item and fold it into the identity's tally.
    /// Unknown-slot items count toward the total only, so unclassifiable
    /// names never leak into the weighted slot penalties.
    pub fn ingest(&mut self, identity: &str, item_display_name: &str) {
        let classified = self.classifier.classify(item_display_name);
        let tally = self.tallies.entry(identity.to_string()).or_default();
        tally.total_items += 1;

        match classified.kind {
            ItemKind::Token => {
                if let Some(token_set) = classified.token_set {
                    *tally.tokens_by_set.entry(token_set).or_insert(0) += 1;
                }
                if classified.slot != UNKNOWN_SLOT {
                    *tally.token_by_slot.entry(classified.slot).or_insert(0) += 1;
                }
            }
            ItemKind::Gear => {
                if classified.slot != UNKNOWN_SLOT {
                    *tally.regular_by_slot.entry(classified.slot).or_insert(0) += 1;
                }
            }
            ItemKind::Unknown => {
                eprintln!("loot: could not determine slot for item '{item_display_name}'");
            }
        }
    }

    pub fn tally(&self, identity: &str) -> Option<&ItemSlotTally> {
        self.tallies.get(identity)
    }

    pub fn total_items(&self) -> u32 {
        self.tallies.values().map(|tally| tally.total_items).sum()
    }

    /// Token counts summed over all identities, per token set.
    pub fn token_distribution(&self) -> BTreeMap<String, u32> {
        let mut distribution = BTreeMap::new();
        for tally in self.tallies.values() {
            for (token_set, count) in &tally.tokens_by_set {
                *distribution.entry(token_set.clone()).or_insert(0) += count;
            }
        }
        distribution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_and_gear_counted_separately() {
        let classifier = ItemClassifier::new();
        let mut ledger = LootLedger::new(&classifier);
        ledger.ingest("milka", "Crown of the Corrupted Conqueror");
        ledger.ingest("milka", "Girdle of Shattered Stone");

        let tally = ledger.tally("milka").unwrap();
        assert_eq!(tally.total_items, 2);
        assert_eq!(tally.token_by_slot.get("head"), Some(&1));
        assert_eq!(tally.regular_by_slot.get("waist"), Some(&1));
        assert_eq!(tally.tokens_by_set.get("Conqueror"), Some(&1));
        assert_eq!(tally.token_items(), 1);
    }

    #[test]
    fn unknown_items_count_only_toward_total() {
        let classifier = ItemClassifier::new();
        let mut ledger = LootLedger::new(&classifier);
        ledger.ingest("copro", "Petrified Fungal Growth");

        let tally = ledger.tally("copro").unwrap();
        assert_eq!(tally.total_items, 1);
        assert!(tally.regular_by_slot.is_empty());
        assert!(tally.token_by_slot.is_empty());
    }

    #[test]
    fn token_distribution_sums_across_players() {
        let classifier = ItemClassifier::new();
        let mut ledger = LootLedger::new(&classifier);
        ledger.ingest("milka", "Crown of the Corrupted Conqueror");
        ledger.ingest("dankovich", "Leggings of the Corrupted Conqueror");
        ledger.ingest("copro", "Chest of the Corrupted Vanquisher");

        let distribution = ledger.token_distribution();
        assert_eq!(distribution.get("Conqueror"), Some(&2));
        assert_eq!(distribution.get("Vanquisher"), Some(&1));
        assert_eq!(ledger.total_items(), 3);
    }

    #[test]
    fn combined_slots_merge_both_counters() {
        let classifier = ItemClassifier::new();
        let mut ledger = LootLedger::new(&classifier);
        ledger.ingest("albear", "Crown of the Corrupted Vanquisher");
        ledger.ingest("albear", "Hood of Hidden Flesh");

        let combined = ledger.tally("albear").unwrap().combined_slots();
        assert_eq!(combined.get("head"), Some(&2));
    }
}

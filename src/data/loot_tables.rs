//! Loot catalog loader. The catalog CSV is a hand-maintained export with
//! boss heading lines, difficulty sub-heading lines, and item rows whose
//! third and fourth columns carry slot and item name. The result feeds the
//! item classifier as slot overrides.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_LOOT_TABLES_PATH: &str = "loot_tables.csv";

/// Parse the catalog into an item-name-to-slot map. A missing or unreadable
/// file degrades to keyword-only classification with a warning rather than
/// failing the run.
pub fn load_slot_overrides(path: &Path) -> HashMap<String, String> {
    let mut overrides = HashMap::new();

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!(
                "loot_tables: no catalog at {} ({err}); item slots fall back to keywords",
                path.display()
            );
            return overrides;
        }
    };

    for line in contents.lines().skip(1) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(',').collect();
        // Boss headings are single-column, difficulty rows have only the
        // second column populated.
        if parts.len() == 1 {
            continue;
        }
        if parts.len() == 2 && parts[0].is_empty() && !parts[1].is_empty() {
            continue;
        }

        let slot = parts.get(2).map(|s| s.trim()).unwrap_or("");
        let item_name = parts.get(3).map(|s| s.trim()).unwrap_or("");
        if slot.is_empty() || item_name.is_empty() {
            continue;
        }

        overrides.insert(repair_duplicated_name(item_name), slot.to_lowercase());
    }

    overrides
}

/// Some export rows carry the item name doubled back to back ("Kiril Fury of
/// Beasts Kiril Fury of Beasts"). When the first word repeats, keep the first
/// half of the words.
fn repair_duplicated_name(item_name: &str) -> String {
    let words: Vec<&str> = item_name.split_whitespace().collect();
    if let Some(first) = words.first() {
        let occurrences = words.iter().filter(|word| *word == first).count();
        if occurrences > 1 && words.len() % 2 == 0 {
            let half = words.len() / 2;
            if words[..half] == words[half..] {
                return words[..half].join(" ");
            }
        }
    }
    item_name.to_string()
}

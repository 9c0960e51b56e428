//! Dual-track priority scoring: attendance reward minus slot-weighted item
//! penalties, computed once against the regular-gear economy and once against
//! the token economy. Each track is discounted, not absolved, for receipts in
//! the other economy.

use serde::Serialize;

use crate::analysis::attendance::AttendanceTally;
use crate::analysis::loot::ItemSlotTally;
use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriorityScore {
    pub attendance_score: f64,
    pub regular_penalty: f64,
    pub token_penalty: f64,
    pub regular_score: f64,
    pub token_score: f64,
}

/// Score one player. `token_set` is the player's own set, used for the
/// token-slot importance overrides.
pub fn score_player(
    config: &AnalysisConfig,
    attendance_percent: f64,
    attendance: &AttendanceTally,
    loot: &ItemSlotTally,
    token_set: &str,
) -> PriorityScore {
    let attendance_score = attendance_percent * config.attendance_weight;
    // floor of 1 so a zero-attendance straggler cannot divide by zero
    let bosses = attendance.bosses_attended.max(1) as f64;

    let mut regular_penalty = 0.0;
    for (slot, count) in &loot.regular_by_slot {
        let base = (*count as f64 / bosses) * config.item_penalty_multiplier;
        regular_penalty += base * config.slot_weight(slot);
    }

    let mut token_penalty = 0.0;
    for (slot, count) in &loot.token_by_slot {
        let base = (*count as f64 / bosses) * config.item_penalty_multiplier;
        token_penalty += base * config.token_slot_weight(token_set, slot);
    }

    let reduction = config.token_penalty_reduction;
    PriorityScore {
        attendance_score,
        regular_penalty,
        token_penalty,
        regular_score: attendance_score - regular_penalty - token_penalty * reduction,
        token_score: attendance_score - token_penalty - regular_penalty * reduction,
    }
}

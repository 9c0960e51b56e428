//! Final ordering and cohort ranking of scored players, plus the
//! human-readable recommendation tag each record carries.

use serde::Serialize;

use crate::config::AnalysisConfig;

pub const TOKEN_SETS: &[&str] = &["Vanquisher", "Conqueror", "Protector"];
pub const PRIMARY_STATS: &[&str] = &["Strength", "Agility", "Intellect"];
pub const ROLES: &[&str] = &["Healer", "DPS", "Main Tank", "Offtank"];

/// The exported per-player view: profile fields, formatted and numeric
/// metrics, cohort ranks, and the recommendation tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRecord {
    pub player: String,
    pub display_name: String,
    pub class: String,
    pub spec: String,
    pub role: String,
    pub token: String,
    pub primary_stat: String,
    pub is_healer: bool,
    pub attendance: String,
    pub attendance_value: f64,
    pub bosses_attended: u32,
    pub raid_sizes: String,
    pub items_received: u32,
    pub items_per_boss: String,
    pub items_per_boss_value: f64,
    pub priority_score: String,
    pub priority_score_value: f64,
    pub token_priority_score: String,
    pub token_priority_score_value: f64,
    pub token_items: u32,
    pub slot_distribution: String,
    pub overall_rank: u32,
    pub token_rank: Option<u32>,
    pub stat_rank: Option<u32>,
    pub role_rank: Option<u32>,
    pub recommendation: String,
}

/// Sort by regular priority score descending and assign overall and cohort
/// ranks plus recommendation tags. Equal scores tie-break on the canonical
/// identity string so repeated runs produce identical orderings.
pub fn rank_players(
    mut records: Vec<RecommendationRecord>,
    config: &AnalysisConfig,
) -> Vec<RecommendationRecord> {
    records.sort_by(|left, right| {
        right
            .priority_score_value
            .total_cmp(&left.priority_score_value)
            .then_with(|| left.player.cmp(&right.player))
    });

    for (index, record) in records.iter_mut().enumerate() {
        record.overall_rank = (index + 1) as u32;
    }

    for token_set in TOKEN_SETS {
        assign_cohort_rank(
            &mut records,
            |record| record.token == *token_set,
            |record| record.token_priority_score_value,
            |record, rank| record.token_rank = Some(rank),
        );
    }
    for stat in PRIMARY_STATS {
        assign_cohort_rank(
            &mut records,
            |record| record.primary_stat == *stat,
            |record| record.priority_score_value,
            |record, rank| record.stat_rank = Some(rank),
        );
    }
    for role in ROLES {
        assign_cohort_rank(
            &mut records,
            |record| record.role == *role,
            |record| record.priority_score_value,
            |record, rank| record.role_rank = Some(rank),
        );
    }

    for record in &mut records {
        record.recommendation = recommendation_tag(record, config);
    }

    records
}

fn assign_cohort_rank<F, K, S>(
    records: &mut [RecommendationRecord],
    belongs: F,
    sort_key: K,
    set_rank: S,
) where
    F: Fn(&RecommendationRecord) -> bool,
    K: Fn(&RecommendationRecord) -> f64,
    S: Fn(&mut RecommendationRecord, u32),
{
    let mut members: Vec<(usize, f64, String)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| belongs(record))
        .map(|(index, record)| (index, sort_key(record), record.player.clone()))
        .collect();
    members.sort_by(|left, right| {
        right.1.total_cmp(&left.1).then_with(|| left.2.cmp(&right.2))
    });
    for (rank, (index, _, _)) in members.into_iter().enumerate() {
        set_rank(&mut records[index], (rank + 1) as u32);
    }
}

/// Tag rules in fixed priority order, joined with " | "; an empty result
/// becomes "Standard priority".
fn recommendation_tag(record: &RecommendationRecord, config: &AnalysisConfig) -> String {
    let mut tags: Vec<String> = Vec::new();

    if record.overall_rank <= 3 {
        tags.push("HIGH PRIORITY for next suitable item".to_string());
    } else if record.overall_rank <= 5 {
        tags.push("Priority candidate for loot".to_string());
    }

    if let Some(token_rank) = record.token_rank {
        if token_rank <= 2 {
            tags.push(format!("HIGH PRIORITY for {} tokens", record.token));
        }
    }

    if record.attendance_value >= config.high_attendance_threshold {
        tags.push("Excellent attendance".to_string());
    }

    if record.items_per_boss_value < config.low_items_per_boss {
        tags.push("Due for loot".to_string());
    } else if record.items_per_boss_value > config.high_items_per_boss {
        tags.push("Recently received multiple items".to_string());
    }

    if tags.is_empty() {
        "Standard priority".to_string()
    } else {
        tags.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(player: &str, score: f64, token: &str, stat: &str, role: &str) -> RecommendationRecord {
        RecommendationRecord {
            player: player.to_string(),
            display_name: player.to_string(),
            class: "Mage".to_string(),
            spec: "Fire".to_string(),
            role: role.to_string(),
            token: token.to_string(),
            primary_stat: stat.to_string(),
            is_healer: role == "Healer",
            attendance: "50.0%".to_string(),
            attendance_value: 50.0,
            bosses_attended: 4,
            raid_sizes: "10".to_string(),
            items_received: 2,
            items_per_boss: "0.50".to_string(),
            items_per_boss_value: 0.5,
            priority_score: format!("{score:.1}"),
            priority_score_value: score,
            token_priority_score: format!("{score:.1}"),
            token_priority_score_value: score,
            token_items: 0,
            slot_distribution: String::new(),
            overall_rank: 0,
            token_rank: None,
            stat_rank: None,
            role_rank: None,
            recommendation: String::new(),
        }
    }

    #[test]
    fn overall_ranks_follow_descending_score() {
        let config = AnalysisConfig::default();
        let ranked = rank_players(
            vec![
                record("copro", 30.0, "Vanquisher", "Intellect", "DPS"),
                record("milka", 40.0, "Conqueror", "Intellect", "DPS"),
            ],
            &config,
        );
        assert_eq!(ranked[0].player, "milka");
        assert_eq!(ranked[0].overall_rank, 1);
        assert_eq!(ranked[1].player, "copro");
        assert_eq!(ranked[1].overall_rank, 2);
    }

    #[test]
    fn equal_scores_tie_break_on_identity() {
        let config = AnalysisConfig::default();
        let ranked = rank_players(
            vec![
                record("zug", 30.0, "Protector", "Strength", "DPS"),
                record("alb", 30.0, "Protector", "Strength", "DPS"),
            ],
            &config,
        );
        assert_eq!(ranked[0].player, "alb");
        assert_eq!(ranked[1].player, "zug");
    }

    #[test]
    fn every_record_gets_cohort_ranks_for_its_cohorts() {
        let config = AnalysisConfig::default();
        let ranked = rank_players(
            vec![
                record("a", 30.0, "Vanquisher", "Intellect", "DPS"),
                record("b", 20.0, "Vanquisher", "Agility", "Healer"),
                record("c", 10.0, "Conqueror", "Intellect", "DPS"),
            ],
            &config,
        );
        for rec in &ranked {
            assert!(rec.overall_rank >= 1);
            assert!(rec.token_rank.is_some(), "{} missing token rank", rec.player);
            assert!(rec.stat_rank.is_some(), "{} missing stat rank", rec.player);
            assert!(rec.role_rank.is_some(), "{} missing role rank", rec.player);
        }
        let a = ranked.iter().find(|r| r.player == "a").unwrap();
        let b = ranked.iter().find(|r| r.player == "b").unwrap();
        assert_eq!(a.token_rank, Some(1));
        assert_eq!(b.token_rank, Some(2));
    }

    #[test]
    fn token_cohort_ranks_by_token_score() {
        let config = AnalysisConfig::default();
        let mut high_token = record("a", 30.0, "Vanquisher", "Intellect", "DPS");
        high_token.token_priority_score_value = 50.0;
        let mut low_token = record("b", 40.0, "Vanquisher", "Intellect", "DPS");
        low_token.token_priority_score_value = 10.0;
        let ranked = rank_players(vec![low_token, high_token], &config);

        let a = ranked.iter().find(|r| r.player == "a").unwrap();
        let b = ranked.iter().find(|r| r.player == "b").unwrap();
        // b leads overall, a leads the token cohort
        assert_eq!(b.overall_rank, 1);
        assert_eq!(a.token_rank, Some(1));
        assert_eq!(b.token_rank, Some(2));
    }

    #[test]
    fn unknown_cohort_membership_gets_no_rank() {
        let config = AnalysisConfig::default();
        let ranked = rank_players(
            vec![record("a", 30.0, "Unknown", "Unknown", "Unknown")],
            &config,
        );
        assert_eq!(ranked[0].token_rank, None);
        assert_eq!(ranked[0].stat_rank, None);
        assert_eq!(ranked[0].role_rank, None);
        assert_eq!(ranked[0].overall_rank, 1);
    }

    #[test]
    fn tags_concatenate_in_priority_order() {
        let config = AnalysisConfig::default();
        let mut top = record("a", 90.0, "Vanquisher", "Intellect", "DPS");
        top.attendance_value = 95.0;
        top.items_per_boss_value = 0.1;
        let ranked = rank_players(vec![top], &config);
        assert_eq!(
            ranked[0].recommendation,
            "HIGH PRIORITY for next suitable item | HIGH PRIORITY for Vanquisher tokens | \
             Excellent attendance | Due for loot"
        );
    }

    #[test]
    fn quiet_middle_of_pack_is_standard_priority() {
        let config = AnalysisConfig::default();
        let mut records = Vec::new();
        for (index, name) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
            let mut rec = record(name, 100.0 - index as f64, "Unknown", "Unknown", "Unknown");
            rec.attendance_value = 50.0;
            rec.items_per_boss_value = 0.5;
            records.push(rec);
        }
        let ranked = rank_players(records, &config);
        assert_eq!(ranked[6].recommendation, "Standard priority");
    }
}

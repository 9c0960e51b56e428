//! Loot priority analysis pipeline. A single pass over a fixed snapshot of
//! participation and loot records: resolve identities, learn spelling
//! aliases, tally attendance and item receipts, score both gear economies,
//! and rank. No state survives between runs; refreshing means re-running.

pub mod attendance;
pub mod identity;
pub mod items;
pub mod loot;
pub mod ranking;
pub mod scoring;

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::config::{AnalysisConfig, ConfigError};
use crate::data::records::{LootRecord, ParticipationRecord, PlayerProfile, UNKNOWN};

use self::attendance::ParticipationLedger;
use self::identity::{normalize_name, IdentityResolver};
use self::items::ItemClassifier;
use self::loot::LootLedger;
use self::ranking::{rank_players, RecommendationRecord};
use self::scoring::score_player;

/// One immutable snapshot of engine input.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub participation: Vec<ParticipationRecord>,
    pub loot: Vec<LootRecord>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub recommendations: Vec<RecommendationRecord>,
    pub total_items: u32,
    pub token_distribution: BTreeMap<String, u32>,
    pub player_count: usize,
}

/// Build the resolver for this snapshot: configured tables plus the aliases
/// auto-detected by comparing loot names against participation names.
fn build_resolver(input: &AnalysisInput, config: &AnalysisConfig) -> IdentityResolver {
    let mut resolver = IdentityResolver::new(config);
    let participation_names: HashSet<String> = input
        .participation
        .iter()
        .map(|record| normalize_name(&record.raw_name))
        .filter(|name| !name.is_empty())
        .collect();
    let loot_names: HashSet<String> = input
        .loot
        .iter()
        .map(|record| normalize_name(&record.raw_name))
        .filter(|name| !name.is_empty())
        .collect();
    resolver.learn_aliases(&loot_names, &participation_names);
    resolver
}

/// All known, non-excluded player profiles for this snapshot, keyed by
/// canonical identity. Participation records seed the map; loot records fill
/// gaps; configured patches cover identities the data never names; spelling
/// conflicts are settled in favor of the configured preferred identity.
pub fn collect_profiles(
    input: &AnalysisInput,
    config: &AnalysisConfig,
    resolver: &IdentityResolver,
) -> BTreeMap<String, PlayerProfile> {
    let mut profiles: BTreeMap<String, PlayerProfile> = BTreeMap::new();

    for record in &input.participation {
        let Some(identity) = resolver.resolve(&record.raw_name) else {
            continue;
        };
        let incoming = PlayerProfile::from_participation(record);
        merge_profile(&mut profiles, &identity, incoming);
    }

    for record in &input.loot {
        if record.item.trim().is_empty() {
            continue;
        }
        let Some(identity) = resolver.resolve(&record.raw_name) else {
            continue;
        };
        let incoming = PlayerProfile::from_loot(record);
        merge_profile(&mut profiles, &identity, incoming);
    }

    for (identity, patch) in &config.profile_patches {
        if !profiles.contains_key(identity) {
            profiles.insert(identity.clone(), patch.clone());
        }
    }

    for conflict in &config.profile_conflicts {
        if profiles.contains_key(&conflict.preferred) {
            profiles.remove(&conflict.alternate);
        }
    }

    profiles
}

fn merge_profile(
    profiles: &mut BTreeMap<String, PlayerProfile>,
    identity: &str,
    incoming: PlayerProfile,
) {
    match profiles.get_mut(identity) {
        Some(existing) => existing.merge_from(&incoming),
        None => {
            profiles.insert(identity.to_string(), incoming);
        }
    }
}

/// Run the full pipeline over one snapshot. The only error is a malformed
/// configuration; malformed records are skipped, never fatal.
pub fn analyze(
    input: &AnalysisInput,
    config: &AnalysisConfig,
    classifier: &ItemClassifier,
) -> Result<AnalysisReport, ConfigError> {
    config.validate().map_err(ConfigError::Invalid)?;

    let resolver = build_resolver(input, config);
    let profiles = collect_profiles(input, config, &resolver);

    let mut attendance = ParticipationLedger::new(config);
    for record in &input.participation {
        if let Some(identity) = resolver.resolve(&record.raw_name) {
            attendance.ingest(&identity, &record.source_tag, config);
        }
    }

    let mut loot_ledger = LootLedger::new(classifier);
    for record in &input.loot {
        if record.item.trim().is_empty() {
            continue;
        }
        if let Some(identity) = resolver.resolve(&record.raw_name) {
            loot_ledger.ingest(&identity, &record.item);
        }
    }

    // No loot at all: callers can tell this apart by the zero item total.
    if input.loot.is_empty() {
        return Ok(AnalysisReport {
            player_count: profiles.len(),
            ..AnalysisReport::default()
        });
    }

    let empty_tally = loot::ItemSlotTally::default();
    let mut records = Vec::new();
    for (identity, profile) in &profiles {
        let Some(tally) = attendance.tally(identity) else {
            continue;
        };
        if resolver.is_excluded(identity) {
            continue;
        }

        let loot_tally = loot_ledger.tally(identity).unwrap_or(&empty_tally);
        let attendance_percent = attendance.attendance_percent(identity);
        let score = score_player(config, attendance_percent, tally, loot_tally, &profile.token);

        let items_per_boss = if tally.bosses_attended > 0 {
            loot_tally.total_items as f64 / tally.bosses_attended as f64
        } else {
            0.0
        };
        let slot_distribution = loot_tally
            .combined_slots()
            .iter()
            .map(|(slot, count)| format!("{slot}:{count}"))
            .collect::<Vec<_>>()
            .join(", ");

        records.push(RecommendationRecord {
            player: identity.clone(),
            display_name: profile.display_name.clone(),
            class: profile.class.clone(),
            spec: profile.spec.clone(),
            role: profile.role.clone(),
            token: profile.token.clone(),
            primary_stat: if profile.primary_stat == UNKNOWN {
                crate::data::records::primary_stat_for(&profile.class, &profile.spec).to_string()
            } else {
                profile.primary_stat.clone()
            },
            is_healer: profile.is_healer(),
            attendance: format!("{attendance_percent:.1}%"),
            attendance_value: attendance_percent,
            bosses_attended: tally.bosses_attended,
            raid_sizes: tally.raid_sizes.iter().cloned().collect::<Vec<_>>().join(", "),
            items_received: loot_tally.total_items,
            items_per_boss: format!("{items_per_boss:.2}"),
            items_per_boss_value: items_per_boss,
            priority_score: format!("{:.1}", score.regular_score),
            priority_score_value: score.regular_score,
            token_priority_score: format!("{:.1}", score.token_score),
            token_priority_score_value: score.token_score,
            token_items: loot_tally.token_items(),
            slot_distribution,
            overall_rank: 0,
            token_rank: None,
            stat_rank: None,
            role_rank: None,
            recommendation: String::new(),
        });
    }

    Ok(AnalysisReport {
        recommendations: rank_players(records, config),
        total_items: loot_ledger.total_items(),
        token_distribution: loot_ledger.token_distribution(),
        player_count: profiles.len(),
    })
}

/// Convenience wrapper building a resolver for callers that only need the
/// profile view (e.g. the players endpoint).
pub fn known_players(
    input: &AnalysisInput,
    config: &AnalysisConfig,
) -> BTreeMap<String, PlayerProfile> {
    let resolver = build_resolver(input, config);
    collect_profiles(input, config, &resolver)
}

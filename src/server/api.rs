//! JSON payload builders for the API routes. Every request reloads the data
//! directory so the server always reflects the CSVs on disk.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::analysis::items::{ItemClassifier, ItemKind};
use crate::analysis::ranking::RecommendationRecord;
use crate::analysis::{analyze, known_players, AnalysisInput};
use crate::config::{self, AnalysisConfig, ConfigError};
use crate::data::ingest::{load_analysis_input, IngestError, DEFAULT_DATA_DIR};
use crate::data::loot_tables::{load_slot_overrides, DEFAULT_LOOT_TABLES_PATH};

pub const DATA_DIR_ENV: &str = "MASTERLOOTER_DATA_DIR";
pub const LOOT_TABLES_ENV: &str = "MASTERLOOTER_LOOT_TABLES";

#[derive(Debug)]
pub enum ApiError {
    Ingest(IngestError),
    Config(ConfigError),
    Json(serde_json::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingest(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        Self::Ingest(err)
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

pub fn data_dir() -> PathBuf {
    PathBuf::from(std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()))
}

fn loot_tables_path() -> PathBuf {
    PathBuf::from(
        std::env::var(LOOT_TABLES_ENV).unwrap_or_else(|_| DEFAULT_LOOT_TABLES_PATH.to_string()),
    )
}

fn load_snapshot() -> Result<(AnalysisInput, AnalysisConfig, ItemClassifier), ApiError> {
    let input = load_analysis_input(&data_dir())?;
    let config = AnalysisConfig::load(config::DEFAULT_CONFIG_PATH)?;
    let classifier = ItemClassifier::with_overrides(load_slot_overrides(&loot_tables_path()));
    Ok((input, config, classifier))
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "masterlooter-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn query_param(path: &str, name: &str) -> Option<String> {
    let query = path.split('?').nth(1)?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.replace('+', " "))
        } else {
            None
        }
    })
}

/// Ranked priorities, optionally filtered by token set, primary stat, or
/// role. Token and stat filters are exact (case-insensitive); the role
/// filter is substring so "tank" covers both tank roles.
pub fn priorities_payload(path: &str) -> Result<String, ApiError> {
    let (input, config, classifier) = load_snapshot()?;
    let report = analyze(&input, &config, &classifier)?;

    let token = query_param(path, "token");
    let stat = query_param(path, "stat");
    let role = query_param(path, "role");

    let data: Vec<&RecommendationRecord> = report
        .recommendations
        .iter()
        .filter(|rec| {
            token
                .as_deref()
                .map_or(true, |t| rec.token.eq_ignore_ascii_case(t))
        })
        .filter(|rec| {
            stat.as_deref()
                .map_or(true, |s| rec.primary_stat.eq_ignore_ascii_case(s))
        })
        .filter(|rec| {
            role.as_deref()
                .map_or(true, |r| rec.role.to_lowercase().contains(&r.to_lowercase()))
        })
        .collect();

    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "data": data,
        "total_items": report.total_items,
        "token_distribution": report.token_distribution,
    }))?)
}

#[derive(Debug, Clone, Serialize)]
struct PlayerListItem {
    name: String,
    display_name: String,
    class: String,
    spec: String,
    role: String,
    token: String,
    primary_stat: String,
}

pub fn players_payload() -> Result<String, ApiError> {
    let input = load_analysis_input(&data_dir())?;
    let config = AnalysisConfig::load(config::DEFAULT_CONFIG_PATH)?;

    let players: Vec<PlayerListItem> = known_players(&input, &config)
        .into_iter()
        .map(|(identity, profile)| PlayerListItem {
            name: identity,
            display_name: profile.display_name,
            class: profile.class,
            spec: profile.spec,
            role: profile.role,
            token: profile.token,
            primary_stat: profile.primary_stat,
        })
        .collect();

    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "data": players,
    }))?)
}

#[derive(Debug, Clone, Serialize)]
struct ItemListItem {
    name: String,
    slot: String,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
}

/// Unique items seen in the loot history, classified, optionally filtered by
/// slot or token-ness.
pub fn items_payload(path: &str) -> Result<String, ApiError> {
    let (input, _, classifier) = load_snapshot()?;

    let slot_filter = query_param(path, "slot").map(|s| s.to_lowercase());
    let token_filter = query_param(path, "token").map(|t| t == "true" || t == "1");

    let mut unique: BTreeMap<String, ItemListItem> = BTreeMap::new();
    for record in &input.loot {
        let name = record.item.trim();
        if name.is_empty() {
            continue;
        }
        let key = name.to_lowercase();
        if unique.contains_key(&key) {
            continue;
        }
        let classified = classifier.classify(name);
        unique.insert(
            key,
            ItemListItem {
                name: name.to_string(),
                slot: classified.slot,
                kind: match classified.kind {
                    ItemKind::Token => "token",
                    ItemKind::Gear => "gear",
                    ItemKind::Unknown => "unknown",
                },
                token_type: classified.token_set,
            },
        );
    }

    let items: Vec<ItemListItem> = unique
        .into_values()
        .filter(|item| {
            token_filter.map_or(true, |wants_token| (item.kind == "token") == wants_token)
        })
        .filter(|item| slot_filter.as_deref().map_or(true, |slot| item.slot == slot))
        .collect();

    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "data": items,
    }))?)
}

/// Per-receipt loot history, optionally filtered by player name substring,
/// item kind, or raid size.
pub fn history_payload(path: &str) -> Result<String, ApiError> {
    let (input, _, classifier) = load_snapshot()?;

    let player_filter = query_param(path, "player").map(|p| p.to_lowercase());
    let kind_filter = query_param(path, "item_type").map(|t| t.to_lowercase());
    let raid_filter = query_param(path, "raid_type").map(|r| r.to_lowercase());

    let mut history: Vec<serde_json::Value> = Vec::new();
    for record in &input.loot {
        let item = record.item.trim();
        if item.is_empty() {
            continue;
        }
        let classified = classifier.classify(item);
        let kind = match classified.kind {
            ItemKind::Token => "token",
            ItemKind::Gear => "gear",
            ItemKind::Unknown => "unknown",
        };
        let raid_type = if record.source_tag.contains("25man") {
            "25man"
        } else {
            "10man"
        };

        if let Some(player) = &player_filter {
            if !record.raw_name.to_lowercase().contains(player.as_str()) {
                continue;
            }
        }
        if let Some(wanted_kind) = &kind_filter {
            if kind != wanted_kind.as_str() {
                continue;
            }
        }
        if let Some(wanted_raid) = &raid_filter {
            if raid_type != wanted_raid.as_str() {
                continue;
            }
        }

        history.push(serde_json::json!({
            "player": record.raw_name,
            "item": item,
            "item_type": kind,
            "item_slot": classified.slot,
            "raid_type": raid_type,
            "source": record.source_tag,
        }));
    }

    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "data": history,
    }))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_parse_from_path() {
        assert_eq!(
            query_param("/api/priorities?token=Vanquisher&role=DPS", "token").as_deref(),
            Some("Vanquisher")
        );
        assert_eq!(
            query_param("/api/priorities?token=Vanquisher&role=DPS", "role").as_deref(),
            Some("DPS")
        );
        assert_eq!(query_param("/api/priorities?token=", "token"), None);
        assert_eq!(query_param("/api/priorities", "token"), None);
        assert_eq!(
            query_param("/api/priorities?role=Main+Tank", "role").as_deref(),
            Some("Main Tank")
        );
    }

    #[test]
    fn health_payload_reports_service() {
        let payload = health_payload().unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["service"], "masterlooter-api");
    }
}

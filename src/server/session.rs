//! In-memory raid session tracking. One session at a time, held behind a
//! process-wide mutex; ending a session persists it as JSON under
//! `data/raid_logs/` before the state resets.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

pub const RAID_LOGS_DIR: &str = "data/raid_logs";

static ACTIVE_SESSION: Mutex<Option<RaidSession>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize)]
pub struct RaidSession {
    pub session_id: String,
    pub start_time: String,
    pub current_boss: String,
    pub participants: Vec<String>,
    pub loot_assignments: Vec<LootAssignment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LootAssignment {
    pub item: String,
    pub player: String,
    pub boss: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
struct StartRequest {
    boss_name: String,
    #[serde(default)]
    participants: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AssignRequest {
    item_name: String,
    player_name: String,
    boss_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BossRequest {
    boss_name: String,
}

#[derive(Debug)]
pub enum SessionError {
    Parse(serde_json::Error),
    Conflict(&'static str),
    Persist(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid session request: {err}"),
            Self::Conflict(msg) => write!(f, "{msg}"),
            Self::Persist(err) => write!(f, "failed to save raid log: {err}"),
            Self::Json(err) => write!(f, "{err}"),
        }
    }
}

fn lock_session() -> std::sync::MutexGuard<'static, Option<RaidSession>> {
    // A poisoned lock only means another request panicked mid-update; the
    // session state itself is still usable.
    ACTIVE_SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn start_payload(body: &str) -> Result<String, SessionError> {
    let request: StartRequest = serde_json::from_str(body).map_err(SessionError::Parse)?;

    let mut session = lock_session();
    if session.is_some() {
        return Err(SessionError::Conflict(
            "There is already an active raid session. End it first.",
        ));
    }

    let started = RaidSession {
        session_id: uuid::Uuid::new_v4().to_string(),
        start_time: chrono::Local::now().to_rfc3339(),
        current_boss: request.boss_name.clone(),
        participants: request.participants.clone(),
        loot_assignments: Vec::new(),
    };
    *session = Some(started.clone());

    serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "message": format!(
            "Raid started on {} with {} participants",
            request.boss_name,
            request.participants.len()
        ),
        "data": started,
    }))
    .map_err(SessionError::Json)
}

pub fn assign_payload(body: &str) -> Result<String, SessionError> {
    let request: AssignRequest = serde_json::from_str(body).map_err(SessionError::Parse)?;

    let mut session = lock_session();
    let Some(active) = session.as_mut() else {
        return Err(SessionError::Conflict("There is no active raid session."));
    };

    let assignment = LootAssignment {
        item: request.item_name.clone(),
        player: request.player_name.clone(),
        boss: request
            .boss_name
            .unwrap_or_else(|| active.current_boss.clone()),
        timestamp: chrono::Local::now().to_rfc3339(),
    };
    active.loot_assignments.push(assignment.clone());

    serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "message": format!("Item {} assigned to {}", request.item_name, request.player_name),
        "data": assignment,
    }))
    .map_err(SessionError::Json)
}

pub fn update_boss_payload(body: &str) -> Result<String, SessionError> {
    let request: BossRequest = serde_json::from_str(body).map_err(SessionError::Parse)?;

    let mut session = lock_session();
    let Some(active) = session.as_mut() else {
        return Err(SessionError::Conflict("There is no active raid session."));
    };
    active.current_boss = request.boss_name.clone();

    serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "message": format!("Current boss updated to {}", request.boss_name),
        "data": active,
    }))
    .map_err(SessionError::Json)
}

pub fn end_payload() -> Result<String, SessionError> {
    let mut session = lock_session();
    let Some(ended) = session.take() else {
        return Err(SessionError::Conflict("There is no active raid session."));
    };

    let end_time = chrono::Local::now();
    let filename = format!("raid_session_{}.json", end_time.format("%Y%m%d_%H%M%S"));
    let log = serde_json::json!({
        "session_id": ended.session_id,
        "start_time": ended.start_time,
        "end_time": end_time.to_rfc3339(),
        "current_boss": ended.current_boss,
        "participants": ended.participants,
        "loot_assignments": ended.loot_assignments,
    });

    fs::create_dir_all(RAID_LOGS_DIR).map_err(SessionError::Persist)?;
    let serialized = serde_json::to_string_pretty(&log).map_err(SessionError::Json)?;
    fs::write(Path::new(RAID_LOGS_DIR).join(&filename), serialized)
        .map_err(SessionError::Persist)?;

    serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "message": format!("Raid ended and data saved to {filename}"),
        "data": log,
    }))
    .map_err(SessionError::Json)
}

/// Persisted raid logs, oldest first. Unreadable or corrupt log files are
/// skipped with a warning rather than failing the listing.
pub fn sessions_payload() -> Result<String, SessionError> {
    let mut logs: Vec<serde_json::Value> = Vec::new();
    let dir = Path::new(RAID_LOGS_DIR);
    if dir.is_dir() {
        let mut names: Vec<String> = fs::read_dir(dir)
            .map_err(SessionError::Persist)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| name.ends_with(".json"))
            .collect();
        names.sort();

        for name in names {
            let path = dir.join(&name);
            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) => {
                    eprintln!("sessions: could not read {name}: {err}");
                    continue;
                }
            };
            match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(log) => logs.push(log),
                Err(err) => eprintln!("sessions: skipping corrupt log {name}: {err}"),
            }
        }
    }

    serde_json::to_string_pretty(&serde_json::json!({
        "status": "success",
        "data": logs,
    }))
    .map_err(SessionError::Json)
}

pub fn status_payload() -> Result<String, serde_json::Error> {
    let session = lock_session();
    match session.as_ref() {
        Some(active) => serde_json::to_string_pretty(&serde_json::json!({
            "status": "success",
            "data": { "active": true, "session": active },
        })),
        None => serde_json::to_string_pretty(&serde_json::json!({
            "status": "success",
            "data": { "active": false, "session": null },
        })),
    }
}

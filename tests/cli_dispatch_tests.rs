use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_masterlooter")
}

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("masterlooter-{name}-{stamp}"));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn missing_command_prints_usage() {
    let output = Command::new(bin()).output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: masterlooter"));
}

#[test]
fn validate_command_passes_on_default_config() {
    let output = Command::new(bin())
        .args(["validate", "does/not/exist.json"])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("validation passed"));
}

#[test]
fn analyze_command_reports_empty_data_directory() {
    let dir = unique_temp_dir("empty-analyze");
    let output = Command::new(bin())
        .args(["analyze", dir.to_str().expect("utf8 path")])
        .output()
        .expect("analyze should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no loot data found"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn analyze_command_emits_ranked_json() {
    let dir = unique_temp_dir("analyze");
    fs::write(
        dir.join("25man_58_participants.csv"),
        "Player,IGN,Class,Spec,Token,Role\n,Milka,Mage,Fire,Vanquisher,DPS\n",
    )
    .expect("participants fixture");
    fs::write(
        dir.join("25man_58_loot.csv"),
        "Player,IGN,Item,Class,Spec,Token,Role\n,Milka,Girdle of Shattered Stone,Mage,Fire,Vanquisher,DPS\n",
    )
    .expect("loot fixture");

    let output = Command::new(bin())
        .args(["analyze", dir.to_str().expect("utf8 path")])
        .output()
        .expect("analyze should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("analyze should emit json");
    assert_eq!(payload["total_items"], 1);
    let recommendations = payload["recommendations"]
        .as_array()
        .expect("recommendations array");
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["player"], "milka");
    assert_eq!(recommendations[0]["overall_rank"], 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn export_command_writes_report_csv() {
    let dir = unique_temp_dir("export");
    fs::write(
        dir.join("10man_madness_participants.csv"),
        "Player,IGN,Class,Spec,Token,Role\n,Copro,Warlock,Destruction,Conqueror,DPS\n",
    )
    .expect("participants fixture");
    fs::write(
        dir.join("10man_madness_loot.csv"),
        "Player,IGN,Item,Class,Spec,Token,Role\n,Copro,Bone-Link Fetish,Warlock,Destruction,Conqueror,DPS\n",
    )
    .expect("loot fixture");
    let report_path = dir.join("report.csv");

    let output = Command::new(bin())
        .args([
            "export",
            dir.to_str().expect("utf8 path"),
            report_path.to_str().expect("utf8 path"),
        ])
        .output()
        .expect("export should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("report written"));

    let report = fs::read_to_string(&report_path).expect("report file should exist");
    let mut lines = report.lines();
    let header = lines.next().expect("header line");
    assert!(header.starts_with("Player Name,Class,Spec"));
    assert!(header.ends_with("Recommendation"));
    assert!(lines.next().expect("data line").contains("Copro"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn extract_command_requires_workbook_path() {
    let output = Command::new(bin())
        .arg("extract")
        .output()
        .expect("extract should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: masterlooter extract"));
}

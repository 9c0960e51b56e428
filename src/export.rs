//! CSV report export: one row per ranked player with profile, metrics,
//! cohort ranks, and the recommendation tag.

use std::fmt;
use std::path::Path;

use crate::analysis::ranking::RecommendationRecord;

pub const REPORT_HEADERS: [&str; 21] = [
    "Player Name",
    "Class",
    "Spec",
    "Role",
    "Token Type",
    "Primary Stat",
    "Is Healer",
    "Overall Rank",
    "Token Rank",
    "Stat Rank",
    "Role Rank",
    "Attendance %",
    "Bosses Attended",
    "Raid Sizes",
    "Total Items",
    "Items Per Boss",
    "Token Items",
    "Priority Score",
    "Token Priority Score",
    "Item Slots Distribution",
    "Recommendation",
];

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Write(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to encode report CSV: {err}"),
            Self::Write(err) => write!(f, "failed to write report file: {err}"),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Timestamped default report filename, e.g.
/// `loot_analysis_report_20120815_193000.csv`.
pub fn default_report_path() -> String {
    format!(
        "loot_analysis_report_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

pub fn write_report(path: &Path, records: &[RecommendationRecord]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(REPORT_HEADERS)?;
    for record in records {
        writer.write_record(report_row(record))?;
    }
    writer.flush().map_err(ExportError::Write)?;
    Ok(())
}

fn rank_cell(rank: Option<u32>) -> String {
    match rank {
        Some(rank) => rank.to_string(),
        None => "N/A".to_string(),
    }
}

fn report_row(record: &RecommendationRecord) -> Vec<String> {
    vec![
        record.display_name.clone(),
        record.class.clone(),
        record.spec.clone(),
        record.role.clone(),
        record.token.clone(),
        record.primary_stat.clone(),
        if record.is_healer { "Yes" } else { "No" }.to_string(),
        record.overall_rank.to_string(),
        rank_cell(record.token_rank),
        rank_cell(record.stat_rank),
        rank_cell(record.role_rank),
        record.attendance.clone(),
        record.bosses_attended.to_string(),
        record.raid_sizes.clone(),
        record.items_received.to_string(),
        record.items_per_boss.clone(),
        record.token_items.to_string(),
        record.priority_score.clone(),
        record.token_priority_score.clone(),
        record.slot_distribution.clone(),
        record.recommendation.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record() -> RecommendationRecord {
        RecommendationRecord {
            player: "milka".to_string(),
            display_name: "Milka".to_string(),
            class: "Mage".to_string(),
            spec: "Fire".to_string(),
            role: "DPS".to_string(),
            token: "Vanquisher".to_string(),
            primary_stat: "Intellect".to_string(),
            is_healer: false,
            attendance: "87.5%".to_string(),
            attendance_value: 87.5,
            bosses_attended: 7,
            raid_sizes: "10, 25".to_string(),
            items_received: 2,
            items_per_boss: "0.29".to_string(),
            items_per_boss_value: 0.29,
            priority_score: "32.1".to_string(),
            priority_score_value: 32.1,
            token_priority_score: "35.4".to_string(),
            token_priority_score_value: 35.4,
            token_items: 1,
            slot_distribution: "head:1, waist:1".to_string(),
            overall_rank: 1,
            token_rank: Some(1),
            stat_rank: Some(1),
            role_rank: None,
            recommendation: "HIGH PRIORITY for next suitable item".to_string(),
        }
    }

    #[test]
    fn report_rows_align_with_headers() {
        let row = report_row(&record());
        assert_eq!(row.len(), REPORT_HEADERS.len());
        assert_eq!(row[0], "Milka");
        assert_eq!(row[6], "No");
        assert_eq!(row[8], "1");
        assert_eq!(row[10], "N/A");
        assert_eq!(row[20], "HIGH PRIORITY for next suitable item");
    }

    #[test]
    fn report_file_round_trips_through_csv_reader() {
        let path = std::env::temp_dir().join(format!("masterlooter_report_{}.csv", std::process::id()));
        write_report(&path, &[record()]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            REPORT_HEADERS.to_vec()
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0), Some("Milka"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn default_report_path_is_timestamped() {
        let path = default_report_path();
        assert!(path.starts_with("loot_analysis_report_"));
        assert!(path.ends_with(".csv"));
    }
}

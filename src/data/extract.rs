//! Workbook extraction: split each tracker sheet into a loot table and a
//! participant table and write them as normalized CSVs. Tracker sheets carry
//! both tables side by side with repeated header names; the second occurrence
//! of each header starts the participant half.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use calamine::Reader;

pub const DEFAULT_OUTPUT_DIR: &str = "processed_data";

const PARTICIPANT_HEADERS: [&str; 6] = ["Player", "IGN", "Class", "Spec", "Token", "Role"];
const LOOT_HEADERS: [&str; 7] = ["Player", "IGN", "Item", "Class", "Spec", "Token", "Role"];

#[derive(Debug)]
pub enum ExtractError {
    Workbook(calamine::Error),
    Write(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook(err) => write!(f, "failed to read workbook: {err}"),
            Self::Write(err) => write!(f, "failed to write extracted CSV: {err}"),
            Self::Csv(err) => write!(f, "failed to encode extracted CSV: {err}"),
        }
    }
}

impl From<csv::Error> for ExtractError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub sheets_processed: usize,
    pub sheets_skipped: Vec<String>,
    pub files_written: Vec<String>,
    pub consolidated_players: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ParticipantRow {
    player: String,
    ign: String,
    class: String,
    spec: String,
    token: String,
    role: String,
}

/// Split a workbook into `<sheet>_participants.csv` / `<sheet>_loot.csv`
/// pairs plus a consolidated `all_participants.csv`. Sheets without a
/// participant half are skipped and reported, not fatal.
pub fn extract_workbook(path: &Path, output_dir: &Path) -> Result<ExtractReport, ExtractError> {
    fs::create_dir_all(output_dir).map_err(ExtractError::Write)?;

    let mut workbook = calamine::open_workbook_auto(path).map_err(ExtractError::Workbook)?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut report = ExtractReport::default();
    let mut all_participants: Vec<ParticipantRow> = Vec::new();

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(ExtractError::Workbook)?;
        let rows: Vec<&[calamine::Data]> = range.rows().collect();
        let Some((header_row, data_rows)) = rows.split_first() else {
            report.sheets_skipped.push(sheet_name);
            continue;
        };

        let headers: Vec<String> = header_row.iter().map(|cell| cell_text(cell)).collect();
        let (loot_columns, participant_columns) = split_header_halves(&headers);
        if participant_columns.get("Player").is_none() || participant_columns.get("IGN").is_none() {
            report.sheets_skipped.push(sheet_name);
            continue;
        }

        let tag = sanitize_sheet_name(&sheet_name);

        let mut participants: Vec<ParticipantRow> = Vec::new();
        for row in data_rows {
            let participant = ParticipantRow {
                player: column_text(row, &participant_columns, "Player"),
                ign: column_text(row, &participant_columns, "IGN"),
                class: column_text(row, &participant_columns, "Class"),
                spec: column_text(row, &participant_columns, "Spec"),
                token: column_text(row, &participant_columns, "Token"),
                role: column_text(row, &participant_columns, "Role"),
            };
            if participant.player.is_empty() && participant.ign.is_empty() {
                continue;
            }
            participants.push(participant);
        }

        let by_ign: HashMap<String, ParticipantRow> = participants
            .iter()
            .filter(|row| !row.ign.is_empty())
            .map(|row| (row.ign.clone(), row.clone()))
            .collect();

        let participants_name = format!("{tag}_participants.csv");
        write_participants(&output_dir.join(&participants_name), &participants)?;
        report.files_written.push(participants_name);

        let loot_name = format!("{tag}_loot.csv");
        write_loot(&output_dir.join(&loot_name), data_rows, &loot_columns, &by_ign)?;
        report.files_written.push(loot_name);

        all_participants.extend(participants);
        report.sheets_processed += 1;
    }

    if report.sheets_processed > 0 {
        let consolidated = consolidate_participants(all_participants);
        report.consolidated_players = consolidated.len();
        write_participants(&output_dir.join("all_participants.csv"), &consolidated)?;
        report.files_written.push("all_participants.csv".to_string());
    }

    Ok(report)
}

fn cell_text(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::String(s) => s.trim().to_string(),
        calamine::Data::Int(i) => i.to_string(),
        calamine::Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        calamine::Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Map header names to column indices for each half of a dual-table sheet.
/// The first occurrence of a name belongs to the loot half, any repeat to
/// the participant half.
fn split_header_halves(
    headers: &[String],
) -> (HashMap<String, usize>, HashMap<String, usize>) {
    let mut loot = HashMap::new();
    let mut participants = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for (index, header) in headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        if seen.insert(header.as_str()) {
            loot.insert(header.clone(), index);
        } else {
            participants.entry(header.clone()).or_insert(index);
        }
    }
    (loot, participants)
}

fn column_text(row: &[calamine::Data], columns: &HashMap<String, usize>, name: &str) -> String {
    columns
        .get(name)
        .and_then(|index| row.get(*index))
        .map(cell_text)
        .unwrap_or_default()
}

fn sanitize_sheet_name(sheet_name: &str) -> String {
    sheet_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Deduplicate by in-game name, keeping the first sighting, sorted by name.
fn consolidate_participants(rows: Vec<ParticipantRow>) -> Vec<ParticipantRow> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut consolidated: Vec<ParticipantRow> = Vec::new();
    for row in rows {
        if row.ign.is_empty() || seen.insert(row.ign.clone()) {
            consolidated.push(row);
        }
    }
    consolidated.sort_by(|left, right| left.ign.cmp(&right.ign));
    consolidated
}

fn write_participants(path: &Path, rows: &[ParticipantRow]) -> Result<(), ExtractError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(PARTICIPANT_HEADERS)?;
    for row in rows {
        writer.write_record([
            row.player.as_str(),
            row.ign.as_str(),
            row.class.as_str(),
            row.spec.as_str(),
            row.token.as_str(),
            row.role.as_str(),
        ])?;
    }
    writer.flush().map_err(ExtractError::Write)?;
    Ok(())
}

fn write_loot(
    path: &Path,
    data_rows: &[&[calamine::Data]],
    loot_columns: &HashMap<String, usize>,
    participants_by_ign: &HashMap<String, ParticipantRow>,
) -> Result<(), ExtractError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(LOOT_HEADERS)?;
    for row in data_rows {
        let item = column_text(row, loot_columns, "Item");
        if item.is_empty() {
            continue;
        }
        let ign = column_text(row, loot_columns, "IGN");
        let mut class = column_text(row, loot_columns, "Class");
        let mut spec = column_text(row, loot_columns, "Spec");
        let mut token = column_text(row, loot_columns, "Token");
        let mut role = column_text(row, loot_columns, "Role");
        // Loot rows often omit profile columns; fill them from the
        // participant half when the receiver is on it.
        if let Some(participant) = participants_by_ign.get(&ign) {
            fill_if_empty(&mut class, &participant.class);
            fill_if_empty(&mut spec, &participant.spec);
            fill_if_empty(&mut token, &participant.token);
            fill_if_empty(&mut role, &participant.role);
        }
        writer.write_record([
            column_text(row, loot_columns, "Player").as_str(),
            ign.as_str(),
            item.as_str(),
            class.as_str(),
            spec.as_str(),
            token.as_str(),
            role.as_str(),
        ])?;
    }
    writer.flush().map_err(ExtractError::Write)?;
    Ok(())
}

fn fill_if_empty(target: &mut String, source: &str) {
    if target.is_empty() && !source.is_empty() {
        *target = source.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_sanitize_to_file_tags() {
        assert_eq!(sanitize_sheet_name("25man 5/8"), "25man_5_8");
        assert_eq!(sanitize_sheet_name("10man madness"), "10man_madness");
    }

    #[test]
    fn repeated_headers_split_into_two_halves() {
        let headers: Vec<String> = [
            "Player", "IGN", "Item", "Class", "Spec", "Token", "Role", "Player", "IGN", "Class",
            "Spec", "Token", "Role",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let (loot, participants) = split_header_halves(&headers);
        assert_eq!(loot.get("Item"), Some(&2));
        assert_eq!(loot.get("IGN"), Some(&1));
        assert_eq!(participants.get("Player"), Some(&7));
        assert_eq!(participants.get("IGN"), Some(&8));
        assert!(participants.get("Item").is_none());
    }

    #[test]
    fn single_table_sheet_has_no_participant_half() {
        let headers: Vec<String> = ["Slot", "Item", "Type"].iter().map(|s| s.to_string()).collect();
        let (_, participants) = split_header_halves(&headers);
        assert!(participants.is_empty());
    }

    #[test]
    fn consolidation_dedups_by_ign_and_sorts() {
        let rows = vec![
            ParticipantRow {
                ign: "Milka".to_string(),
                class: "Mage".to_string(),
                ..ParticipantRow::default()
            },
            ParticipantRow {
                ign: "Albear".to_string(),
                ..ParticipantRow::default()
            },
            ParticipantRow {
                ign: "Milka".to_string(),
                class: "Priest".to_string(),
                ..ParticipantRow::default()
            },
        ];
        let consolidated = consolidate_participants(rows);
        assert_eq!(consolidated.len(), 2);
        assert_eq!(consolidated[0].ign, "Albear");
        assert_eq!(consolidated[1].ign, "Milka");
        // first sighting wins
        assert_eq!(consolidated[1].class, "Mage");
    }

    #[test]
    fn numeric_cells_render_without_trailing_zero() {
        assert_eq!(cell_text(&calamine::Data::Float(3.0)), "3");
        assert_eq!(cell_text(&calamine::Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&calamine::Data::String("  Milka ".to_string())), "Milka");
    }
}

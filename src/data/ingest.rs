//! CSV ingestion: turns a directory of normalized per-raid tables into one
//! [`AnalysisInput`]. File names double as source tags; `*_participants.csv`
//! rows become participation records, `*_loot.csv` rows become loot records.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::analysis::AnalysisInput;
use crate::data::records::{LootRecord, ParticipationRecord};

pub const DEFAULT_DATA_DIR: &str = "processed_data";

#[derive(Debug)]
pub enum IngestError {
    Read(std::io::Error),
    Csv(String, csv::Error),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to scan data directory: {err}"),
            Self::Csv(file, err) => write!(f, "failed to parse {file}: {err}"),
        }
    }
}

/// Load every participant and loot table under `dir`. A missing directory is
/// an empty snapshot, not an error; a malformed CSV file is. Files are read
/// in name order so repeated loads see records in the same order.
pub fn load_analysis_input(dir: &Path) -> Result<AnalysisInput, IngestError> {
    let mut input = AnalysisInput::default();
    if !dir.is_dir() {
        return Ok(input);
    }

    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir).map_err(IngestError::Read)? {
        let entry = entry.map_err(IngestError::Read)?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();

    for name in names {
        let path = dir.join(&name);
        if name.ends_with("_participants.csv") {
            load_participants(&path, &name, &mut input.participation)?;
        } else if name.ends_with("_loot.csv") {
            load_loot(&path, &name, &mut input.loot)?;
        }
    }

    Ok(input)
}

/// Find a column by header name, accepting the ".1" suffix pandas appends to
/// the second of two same-named columns when a sheet carries both table
/// halves side by side.
fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    let suffixed = format!("{name}.1");
    headers
        .iter()
        .position(|header| header == name)
        .or_else(|| headers.iter().position(|header| header == suffixed))
}

fn field(record: &csv::StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|idx| record.get(idx))
        .unwrap_or("")
        .trim()
        .to_string()
}

fn load_participants(
    path: &Path,
    source_tag: &str,
    out: &mut Vec<ParticipationRecord>,
) -> Result<(), IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|err| IngestError::Csv(source_tag.to_string(), err))?;
    let headers = reader
        .headers()
        .map_err(|err| IngestError::Csv(source_tag.to_string(), err))?
        .clone();

    let ign = column_index(&headers, "IGN");
    let class = column_index(&headers, "Class");
    let spec = column_index(&headers, "Spec");
    let token = column_index(&headers, "Token");
    let role = column_index(&headers, "Role");

    for row in reader.records() {
        let row = row.map_err(|err| IngestError::Csv(source_tag.to_string(), err))?;
        let raw_name = field(&row, ign);
        if raw_name.is_empty() {
            continue;
        }
        out.push(ParticipationRecord {
            raw_name,
            class: field(&row, class),
            spec: field(&row, spec),
            token: field(&row, token),
            role: field(&row, role),
            source_tag: source_tag.to_string(),
        });
    }
    Ok(())
}

fn load_loot(path: &Path, source_tag: &str, out: &mut Vec<LootRecord>) -> Result<(), IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|err| IngestError::Csv(source_tag.to_string(), err))?;
    let headers = reader
        .headers()
        .map_err(|err| IngestError::Csv(source_tag.to_string(), err))?
        .clone();

    let ign = column_index(&headers, "IGN");
    let item = column_index(&headers, "Item");
    let class = column_index(&headers, "Class");
    let spec = column_index(&headers, "Spec");
    let token = column_index(&headers, "Token");
    let role = column_index(&headers, "Role");

    for row in reader.records() {
        let row = row.map_err(|err| IngestError::Csv(source_tag.to_string(), err))?;
        let raw_name = field(&row, ign);
        let item_name = field(&row, item);
        if raw_name.is_empty() || item_name.is_empty() {
            continue;
        }
        out.push(LootRecord {
            raw_name,
            item: item_name,
            class: field(&row, class),
            spec: field(&row, spec),
            token: field(&row, token),
            role: field(&row, role),
            source_tag: source_tag.to_string(),
        });
    }
    Ok(())
}

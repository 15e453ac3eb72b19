use crate::models::{ModelName, ScheduleEntry, ScheduleName, SideMetrics, TeamStatRecord};
use crate::utils::edge::{EdgeRecord, SHEET_HEADERS};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::warn;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Save any serializable value to a JSON cache file
pub fn save_to_cache<T: Serialize + ?Sized>(data: &T, cache_file: impl AsRef<Path>) -> Result<()> {
    let cache_file = cache_file.as_ref();
    ensure_parent_dir(cache_file)?;
    let json = serde_json::to_string_pretty(data).context("Failed to serialize cache data")?;
    fs::write(cache_file, json).context("Failed to write cache file")?;
    Ok(())
}

/// Load a value previously written by [`save_to_cache`]
pub fn load_from_cache<T: DeserializeOwned>(cache_file: impl AsRef<Path>) -> Result<T> {
    let json = fs::read_to_string(cache_file.as_ref()).context("Failed to read cache file")?;
    let data = serde_json::from_str(&json).context("Failed to deserialize cache data")?;
    Ok(data)
}

#[derive(Debug, Deserialize)]
struct MappingRow {
    #[serde(rename = "ESPN_School")]
    schedule_name: String,
    #[serde(rename = "Model_School")]
    model_name: String,
}

/// Read a schedule-name -> model-name table. Rows keep file order, which
/// decides collisions in the mapper.
pub fn read_team_mapping<R: Read>(reader: R) -> Result<Vec<(ScheduleName, ModelName)>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut table = Vec::new();
    for row in rdr.deserialize::<MappingRow>() {
        let row = row.context("Failed to parse mapping row")?;
        let schedule_name = row.schedule_name.trim();
        let model_name = row.model_name.trim();
        if schedule_name.is_empty() || model_name.is_empty() {
            continue;
        }
        table.push((schedule_name.into(), model_name.into()));
    }
    Ok(table)
}

pub fn load_team_mapping(path: impl AsRef<Path>) -> Result<Vec<(ScheduleName, ModelName)>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open mapping table {}", path.display()))?;
    read_team_mapping(file)
}

#[derive(Debug, Deserialize)]
struct StatRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    season: Option<i32>,
    team: String,
    #[serde(default)]
    conference: Option<String>,
    #[serde(default)]
    offense: String,
    #[serde(default)]
    defense: String,
}

/// Parse one nested stat cell. Snapshots exported from pandas store these as
/// Python dict literals, so quotes and keywords are rewritten to JSON first.
/// An unreadable cell yields empty metrics (read as 0.0) and a warning.
pub fn parse_stat_cell(team: &str, side: &str, cell: &str) -> SideMetrics {
    let cell = cell.trim();
    if cell.is_empty() {
        return SideMetrics::default();
    }
    let json = cell
        .replace('\'', "\"")
        .replace("None", "null")
        .replace("True", "true")
        .replace("False", "false");
    match serde_json::from_str::<serde_json::Value>(&json) {
        Ok(value) if value.is_object() => SideMetrics::from_value(&value),
        Ok(_) | Err(_) => {
            warn!(team, side, "could not parse nested stats, using 0.0");
            SideMetrics::default()
        }
    }
}

/// Read the advanced-stats CSV snapshot
pub fn read_team_stats_csv<R: Read>(reader: R) -> Result<Vec<TeamStatRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<StatRow>() {
        let row = row.context("Failed to parse stats row")?;
        let team = row.team.trim();
        if team.is_empty() {
            continue;
        }
        records.push(TeamStatRecord {
            season: row.season,
            team: team.into(),
            conference: row.conference.filter(|c| !c.is_empty()),
            offense: parse_stat_cell(team, "offense", &row.offense),
            defense: parse_stat_cell(team, "defense", &row.defense),
        });
    }
    Ok(records)
}

/// Read the CFBD `/stats/season/advanced` JSON array
pub fn read_team_stats_json(json: &str) -> Result<Vec<TeamStatRecord>> {
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(json).context("Failed to deserialize stats JSON")?;
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(team) = row.get("team").and_then(|t| t.as_str()) else {
            warn!("stats entry without a team name, skipping");
            continue;
        };
        let side = |key: &str| match row.get(key) {
            Some(value) if value.is_object() => SideMetrics::from_value(value),
            _ => {
                warn!(team, side = key, "missing nested stats, using 0.0");
                SideMetrics::default()
            }
        };
        records.push(TeamStatRecord {
            season: row
                .get("season")
                .and_then(|s| s.as_i64())
                .and_then(|s| i32::try_from(s).ok()),
            team: team.trim().into(),
            conference: row
                .get("conference")
                .and_then(|c| c.as_str())
                .map(str::to_string),
            offense: side("offense"),
            defense: side("defense"),
        });
    }
    Ok(records)
}

/// Write a raw CFBD advanced-stats body as a weekly snapshot
pub fn save_stats_snapshot(json: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write stats snapshot {}", path.display()))?;
    Ok(())
}

/// Load a stats snapshot, JSON if the extension says so, CSV otherwise
pub fn load_team_stats(path: impl AsRef<Path>) -> Result<Vec<TeamStatRecord>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read stats file {}", path.display()))?;
        read_team_stats_json(&json)
    } else {
        let file = File::open(path)
            .with_context(|| format!("Failed to open stats file {}", path.display()))?;
        read_team_stats_csv(file)
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    #[serde(rename = "Home Team")]
    home: String,
    #[serde(rename = "Away Team")]
    away: String,
}

pub fn read_schedule_csv<R: Read>(reader: R) -> Result<Vec<ScheduleEntry>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut schedule = Vec::new();
    for row in rdr.deserialize::<ScheduleRow>() {
        let row = row.context("Failed to parse schedule row")?;
        schedule.push(ScheduleEntry::new(row.home.trim(), row.away.trim()));
    }
    Ok(schedule)
}

pub fn load_schedule_csv(path: impl AsRef<Path>) -> Result<Vec<ScheduleEntry>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open schedule file {}", path.display()))?;
    read_schedule_csv(file)
}

/// Write records as the eight-column predictions sheet
pub fn write_sheet_csv<W: Write>(records: &[EdgeRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SHEET_HEADERS)?;
    for record in records {
        wtr.write_record(record.to_sheet_row())?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_sheet_csv(records: &[EdgeRecord], filename: impl AsRef<Path>) -> Result<()> {
    let filename = filename.as_ref();
    ensure_parent_dir(filename)?;
    let file = File::create(filename).context("Failed to create CSV file")?;
    write_sheet_csv(records, file)
}

/// Save the per-game recommendation breakdown to CSV
pub fn save_analysis_csv(records: &[EdgeRecord], filename: impl AsRef<Path>) -> Result<()> {
    let filename = filename.as_ref();
    ensure_parent_dir(filename)?;
    let mut file = File::create(filename).context("Failed to create CSV file")?;
    write_analysis_csv(records, &mut file)
}

fn opt(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    value.map(render).unwrap_or_default()
}

pub fn write_analysis_csv<W: Write>(records: &[EdgeRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "Matchup",
        "Home Team",
        "Away Team",
        "Raw Margin",
        "Model Margin",
        "Market Line",
        "Difference",
        "Recommendation",
        "Edge Band",
        "Confidence",
        "Historical Record",
    ])?;
    for record in records {
        wtr.write_record([
            record.matchup.clone(),
            record.home_team.to_string(),
            record.away_team.to_string(),
            opt(record.raw_margin, |v| format!("{:.2}", v)),
            opt(record.damped_margin, |v| format!("{:+.1}", v)),
            record.market_line.map(|l| l.to_string()).unwrap_or_default(),
            opt(record.difference(), |v| format!("{:+.1}", v)),
            record.recommendation.label(),
            record
                .edge_band
                .map(|b| b.range().to_string())
                .unwrap_or_default(),
            record.confidence_label.clone().unwrap_or_default(),
            record
                .edge_band
                .map(|b| b.historical_record().to_string())
                .unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

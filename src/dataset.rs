use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Deserialize;
use tracing::{debug, info};

pub const DATE_FORMAT: &str = "%d %b %Y";

pub const REQUIRED_COLUMNS: &[&str] = &[
    "possession_team1",
    "possession_team2",
    "possession_in_contest",
    "number_of_goals_team1",
    "number_of_goals_team2",
    "total_attempts_team1",
    "total_attempts_team2",
    "on_target_attempts_team1",
    "on_target_attempts_team2",
    "team1",
    "team2",
    "date",
    "hour",
    "category",
    "assists_team1",
    "assists_team2",
];

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error at line {line}: {source}")]
    Csv { line: u64, source: csv::Error },

    #[error("missing columns in dataset: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("invalid {column} value {value:?} at line {line}: {reason}")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchSide {
    Team1,
    Team2,
}

impl MatchSide {
    pub const BOTH: [MatchSide; 2] = [MatchSide::Team1, MatchSide::Team2];

    pub fn label(self) -> &'static str {
        match self {
            MatchSide::Team1 => "Team 1",
            MatchSide::Team2 => "Team 2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    pub team1: String,
    pub team2: String,
    pub date: String,
    pub ts: NaiveDate,
    pub hour: String,
    pub category: String,
    pub possession_team1: f64,
    pub possession_team2: f64,
    pub possession_in_contest: f64,
    pub number_of_goals_team1: u32,
    pub number_of_goals_team2: u32,
    pub total_attempts_team1: u32,
    pub total_attempts_team2: u32,
    pub on_target_attempts_team1: u32,
    pub on_target_attempts_team2: u32,
    pub assists_team1: u32,
    pub assists_team2: u32,
}

impl MatchRow {
    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }

    pub fn team(&self, side: MatchSide) -> &str {
        match side {
            MatchSide::Team1 => &self.team1,
            MatchSide::Team2 => &self.team2,
        }
    }

    pub fn possession(&self, side: MatchSide) -> f64 {
        match side {
            MatchSide::Team1 => self.possession_team1,
            MatchSide::Team2 => self.possession_team2,
        }
    }

    pub fn goals(&self, side: MatchSide) -> u32 {
        match side {
            MatchSide::Team1 => self.number_of_goals_team1,
            MatchSide::Team2 => self.number_of_goals_team2,
        }
    }

    pub fn attempts(&self, side: MatchSide) -> u32 {
        match side {
            MatchSide::Team1 => self.total_attempts_team1,
            MatchSide::Team2 => self.total_attempts_team2,
        }
    }

    pub fn on_target(&self, side: MatchSide) -> u32 {
        match side {
            MatchSide::Team1 => self.on_target_attempts_team1,
            MatchSide::Team2 => self.on_target_attempts_team2,
        }
    }

    pub fn assists(&self, side: MatchSide) -> u32 {
        match side {
            MatchSide::Team1 => self.assists_team1,
            MatchSide::Team2 => self.assists_team2,
        }
    }
}

// Field names are the normalized header names (spaces replaced by underscores).
#[derive(Debug, Deserialize)]
struct RawMatchRecord {
    team1: String,
    team2: String,
    date: String,
    hour: String,
    category: String,
    possession_team1: String,
    possession_team2: String,
    possession_in_contest: String,
    number_of_goals_team1: String,
    number_of_goals_team2: String,
    total_attempts_team1: String,
    total_attempts_team2: String,
    on_target_attempts_team1: String,
    on_target_attempts_team2: String,
    assists_team1: String,
    assists_team2: String,
}

pub fn normalize_header(name: &str) -> String {
    name.trim().replace(' ', "_")
}

pub fn missing_columns(headers: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| (*col).to_string())
        .collect()
}

pub fn parse_percent(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_end_matches('%').trim_end();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn load_matches(path: &Path) -> Result<Vec<MatchRow>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = load_matches_from_reader(file)?;
    info!(path = %path.display(), rows = rows.len(), "loaded match table");
    Ok(rows)
}

pub fn load_matches_from_reader<R: Read>(rdr: R) -> Result<Vec<MatchRow>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| DatasetError::Csv { line: 1, source })?
        .iter()
        .map(normalize_header)
        .collect();

    let missing = missing_columns(&headers);
    if !missing.is_empty() {
        return Err(DatasetError::MissingColumns(missing));
    }
    let headers = StringRecord::from(headers);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| DatasetError::Csv {
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawMatchRecord = record
            .deserialize(Some(&headers))
            .map_err(|source| DatasetError::Csv { line, source })?;
        rows.push(convert_record(raw, line)?);
    }

    // Stable: matches played on the same day keep their file order.
    rows.sort_by_key(|row| row.ts);
    debug!(rows = rows.len(), "match table sorted by date");
    Ok(rows)
}

fn convert_record(raw: RawMatchRecord, line: u64) -> Result<MatchRow, DatasetError> {
    let ts = parse_match_date(&raw.date).ok_or_else(|| DatasetError::InvalidValue {
        line,
        column: "date",
        value: raw.date.clone(),
        reason: format!("expected a date like \"20 NOV 2022\" ({DATE_FORMAT})"),
    })?;
    let count = |value: &str, column: &'static str| count_field(value, column, line);

    Ok(MatchRow {
        possession_team1: percent_field(&raw.possession_team1, "possession_team1", line)?,
        possession_team2: percent_field(&raw.possession_team2, "possession_team2", line)?,
        possession_in_contest: percent_field(
            &raw.possession_in_contest,
            "possession_in_contest",
            line,
        )?,
        team1: raw.team1,
        team2: raw.team2,
        date: raw.date,
        ts,
        hour: raw.hour,
        category: raw.category,
        number_of_goals_team1: count(&raw.number_of_goals_team1, "number_of_goals_team1")?,
        number_of_goals_team2: count(&raw.number_of_goals_team2, "number_of_goals_team2")?,
        total_attempts_team1: count(&raw.total_attempts_team1, "total_attempts_team1")?,
        total_attempts_team2: count(&raw.total_attempts_team2, "total_attempts_team2")?,
        on_target_attempts_team1: count(&raw.on_target_attempts_team1, "on_target_attempts_team1")?,
        on_target_attempts_team2: count(&raw.on_target_attempts_team2, "on_target_attempts_team2")?,
        assists_team1: count(&raw.assists_team1, "assists_team1")?,
        assists_team2: count(&raw.assists_team2, "assists_team2")?,
    })
}

fn percent_field(raw: &str, column: &'static str, line: u64) -> Result<f64, DatasetError> {
    parse_percent(raw).ok_or_else(|| DatasetError::InvalidValue {
        line,
        column,
        value: raw.to_string(),
        reason: "expected a percentage like \"42%\"".to_string(),
    })
}

fn count_field(raw: &str, column: &'static str, line: u64) -> Result<u32, DatasetError> {
    parse_count(raw).ok_or_else(|| DatasetError::InvalidValue {
        line,
        column,
        value: raw.to_string(),
        reason: "expected a non-negative whole number".to_string(),
    })
}

pub fn parse_count(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

pub fn unique_dates(rows: &[MatchRow]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = rows.iter().map(|row| row.ts).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

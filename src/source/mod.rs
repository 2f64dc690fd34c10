use crate::error::SourceError;
use crate::forecast::weights::BiasWeightTable;
use crate::models::{PollRecord, Scope};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DATE_FORMATS: [&str; 3] = ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

/// One row of the published poll table, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPollRow {
    poll_id: RawId,
    #[serde(default)]
    pub state: Option<String>,
    pub candidate_name: String,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub pollster: Option<String>,
    #[serde(default)]
    pub sponsors: Option<String>,
    pub pct: f64,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl RawPollRow {
    pub fn id(&self) -> String {
        self.poll_id.clone().into_string()
    }

    /// Rows without a state cannot be placed in any scope and are dropped.
    pub fn into_record(self) -> Option<PollRecord> {
        let state = self.state.filter(|s| !s.trim().is_empty())?;
        Some(PollRecord {
            id: self.poll_id.into_string(),
            unit: Scope::from(state),
            candidate_name: self.candidate_name,
            party: non_blank(self.party),
            pollster: non_blank(self.pollster),
            sponsor: non_blank(self.sponsors),
            estimated_pct: self.pct,
            end_date: self.end_date.as_deref().and_then(parse_poll_date),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parses the date formats seen in published poll tables. Anything else
/// is `None`, which the recency filter treats as out of window.
pub fn parse_poll_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

pub fn parse_polls(json: &str) -> Result<Vec<PollRecord>, SourceError> {
    let rows: Vec<RawPollRow> = serde_json::from_str(json)?;
    let total = rows.len();
    let records: Vec<PollRecord> = rows.into_iter().filter_map(RawPollRow::into_record).collect();
    if records.len() < total {
        debug!("Dropped {} poll rows without a state", total - records.len());
    }
    Ok(records)
}

pub fn parse_weights(json: &str) -> Result<BiasWeightTable, SourceError> {
    Ok(BiasWeightTable::from_json(json)?)
}

pub struct PollSource {
    pub records: Vec<PollRecord>,
    pub weights: BiasWeightTable,
}

impl PollSource {
    pub fn from_files(polls_path: &Path, weights_path: &Path) -> Result<Self, SourceError> {
        let records = parse_polls(&read(polls_path)?)?;
        let weights = parse_weights(&read(weights_path)?)?;
        info!(
            "Loaded {} poll records from {}",
            records.len(),
            polls_path.display()
        );
        Ok(Self { records, weights })
    }
}

fn read(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })
}

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

const REQUIRED_COLUMNS: [&str; 3] = ["id", "lat", "long"];

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Found missing {field} value in row {row}")]
    NullCoordinate { row: usize, field: String },
    #[error("Duplicate property IDs found after deduplication")]
    DuplicateIds,
}

/// One row of the input dataset: a property located by id and coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub id: String,
    pub lat: f64,
    pub long: f64,
}

/// Raw CSV row before the whole-dataset null check. Extra columns are
/// ignored by serde; empty coordinate cells come through as None.
#[derive(Deserialize, Debug)]
struct RawRecord {
    id: String,
    lat: Option<f64>,
    long: Option<f64>,
}

/// The validated, deduplicated working set. Loaded once, then iterated
/// read-only for the rest of the run.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<PropertyRecord>,
    duplicates_removed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSummary {
    pub total: usize,
    pub lat_min: f64,
    pub lat_max: f64,
    pub long_min: f64,
    pub long_max: f64,
}

impl Dataset {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        check_schema(reader.headers()?)?;

        let mut raw: Vec<RawRecord> = vec![];
        for record in reader.deserialize() {
            raw.push(record?);
        }

        let records = check_coordinates(raw)?;
        let (records, duplicates_removed) = deduplicate(records);

        // Residual duplicates after dedup are a consistency error
        let distinct: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        if distinct.len() != records.len() {
            return Err(DatasetError::DuplicateIds.into());
        }

        Ok(Self {
            records,
            duplicates_removed,
        })
    }

    pub fn records(self: &Self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn len(self: &Self) -> usize {
        self.records.len()
    }

    pub fn is_empty(self: &Self) -> bool {
        self.records.is_empty()
    }

    pub fn duplicates_removed(self: &Self) -> usize {
        self.duplicates_removed
    }

    /// Row count and coordinate ranges, for reporting only. None when the
    /// dataset has no rows.
    pub fn summary(self: &Self) -> Option<CoordinateSummary> {
        if self.records.is_empty() {
            return None;
        }
        let mut summary = CoordinateSummary {
            total: self.records.len(),
            lat_min: f64::INFINITY,
            lat_max: f64::NEG_INFINITY,
            long_min: f64::INFINITY,
            long_max: f64::NEG_INFINITY,
        };
        for record in self.records.iter() {
            summary.lat_min = summary.lat_min.min(record.lat);
            summary.lat_max = summary.lat_max.max(record.lat);
            summary.long_min = summary.long_min.min(record.long);
            summary.long_max = summary.long_max.max(record.long);
        }
        Some(summary)
    }
}

fn check_schema(headers: &csv::StringRecord) -> Result<(), DatasetError> {
    let present: HashSet<&str> = headers.iter().collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !present.contains(**column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DatasetError::MissingColumns(missing));
    }
    Ok(())
}

fn check_coordinates(raw: Vec<RawRecord>) -> Result<Vec<PropertyRecord>, DatasetError> {
    let mut records = Vec::with_capacity(raw.len());
    for (index, record) in raw.into_iter().enumerate() {
        // Rows are numbered from 1, matching the data portion of the file
        let row = index + 1;
        let lat = record.lat.ok_or(DatasetError::NullCoordinate {
            row,
            field: "lat".to_string(),
        })?;
        let long = record.long.ok_or(DatasetError::NullCoordinate {
            row,
            field: "long".to_string(),
        })?;
        records.push(PropertyRecord {
            id: record.id,
            lat,
            long,
        });
    }
    Ok(records)
}

/// One image per property: keep the first occurrence of each id, preserving
/// the original row order.
fn deduplicate(records: Vec<PropertyRecord>) -> (Vec<PropertyRecord>, usize) {
    let before = records.len();
    let mut seen: HashSet<String> = HashSet::new();
    let deduplicated: Vec<PropertyRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .collect();
    let removed = before - deduplicated.len();
    (deduplicated, removed)
}

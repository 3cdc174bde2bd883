//! Loader for the cleaned Chicago traffic-accident CSV.
//!
//! The input is a tabular file with named columns. Only `crash_record_id`,
//! `latitude` and `longitude` are required to be present in the header; other
//! columns are parsed when available. Cells that fail to parse as their
//! expected type coerce to `None` rather than failing the load.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use thiserror::Error;

/// Errors that can occur during dataset loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Missing required columns: {0}")]
    MissingColumns(String),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Date formats seen in exports of the Chicago crash dataset.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// One row of the accident dataset.
///
/// Coordinates and numeric fields are `None` when the source cell is empty
/// or unparseable. Categorical fields are `None` when empty.
#[derive(Debug, Clone, Default)]
pub struct AccidentRecord {
    pub crash_record_id: String,
    pub crash_date: Option<NaiveDateTime>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub lighting_condition: Option<String>,
    pub weather_condition: Option<String>,
    pub roadway_surface_cond: Option<String>,
    pub traffic_control_device: Option<String>,
    pub prim_contributory_cause: Option<String>,
    pub trafficway_type: Option<String>,
    pub first_crash_type: Option<String>,
    pub injuries_total: Option<f64>,
    pub speed_limit: Option<i32>,
}

/// Immutable handle over the loaded accident records.
///
/// Loaded exactly once per session and never mutated afterwards; every
/// downstream computation borrows it.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<AccidentRecord>,
    source_path: Option<PathBuf>,
}

impl Dataset {
    /// Creates a dataset from already-parsed records.
    pub fn new(records: Vec<AccidentRecord>) -> Self {
        Self {
            records,
            source_path: None,
        }
    }

    /// Returns all records in file order.
    #[inline]
    pub fn records(&self) -> &[AccidentRecord] {
        &self.records
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the dataset has no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the path the dataset was loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Looks up a record by its `crash_record_id`.
    pub fn find_by_id(&self, crash_id: &str) -> Option<&AccidentRecord> {
        self.records
            .iter()
            .find(|r| r.crash_record_id == crash_id)
    }
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

fn parse_string(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_f64(s: Option<&str>) -> Option<f64> {
    s.and_then(|v| v.trim().parse().ok())
}

fn parse_i32(s: Option<&str>) -> Option<i32> {
    // Some exports render integer columns as floats ("30.0")
    let v = s?.trim();
    v.parse::<i32>()
        .ok()
        .or_else(|| v.parse::<f64>().ok().map(|f| f as i32))
}

/// Load the accident dataset from a CSV file.
///
/// Columns are matched by lowercase header name, so `Latitude` and
/// `latitude` both work. The header must contain `crash_record_id`,
/// `latitude`, and `longitude`; every other column is optional.
///
/// # Errors
///
/// Returns an error if the file cannot be read, required columns are
/// missing, or no data rows are present.
pub fn load_accidents_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    // Map lowercase header names to column indices
    let headers = reader.headers()?.clone();
    let col_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_lowercase(), i))
        .collect();

    let missing: Vec<&str> = ["crash_record_id", "latitude", "longitude"]
        .into_iter()
        .filter(|name| !col_map.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        return Err(LoaderError::MissingColumns(missing.join(", ")));
    }

    let col = |name: &str| col_map.get(name).copied();
    let id_idx = col("crash_record_id").unwrap_or(0);
    let date_idx = col("crash_date");
    let lat_idx = col("latitude").unwrap_or(0);
    let lon_idx = col("longitude").unwrap_or(0);
    let lighting_idx = col("lighting_condition");
    let weather_idx = col("weather_condition");
    let surface_idx = col("roadway_surface_cond");
    let control_idx = col("traffic_control_device");
    let cause_idx = col("prim_contributory_cause");
    let trafficway_idx = col("trafficway_type");
    let crash_type_idx = col("first_crash_type");
    let injuries_idx = col("injuries_total");
    let speed_idx = col("speed_limit");

    let get = |record: &csv::StringRecord, idx: Option<usize>| -> Option<String> {
        idx.and_then(|i| parse_string(record.get(i)))
    };

    let mut records = Vec::with_capacity(10_000);

    for result in reader.records() {
        let record = result?;

        records.push(AccidentRecord {
            crash_record_id: record.get(id_idx).unwrap_or_default().trim().to_string(),
            crash_date: date_idx
                .and_then(|i| record.get(i))
                .and_then(parse_date),
            latitude: parse_f64(record.get(lat_idx)),
            longitude: parse_f64(record.get(lon_idx)),
            lighting_condition: get(&record, lighting_idx),
            weather_condition: get(&record, weather_idx),
            roadway_surface_cond: get(&record, surface_idx),
            traffic_control_device: get(&record, control_idx),
            prim_contributory_cause: get(&record, cause_idx),
            trafficway_type: get(&record, trafficway_idx),
            first_crash_type: get(&record, crash_type_idx),
            injuries_total: injuries_idx.and_then(|i| parse_f64(record.get(i))),
            speed_limit: speed_idx.and_then(|i| parse_i32(record.get(i))),
        });
    }

    if records.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(Dataset {
        records,
        source_path: Some(path.to_path_buf()),
    })
}

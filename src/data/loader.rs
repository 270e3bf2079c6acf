use std::fmt;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Date32Type, Float64Type, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::model::{CombinedDataset, Country, DataOrigin, Measurement};
use super::synthetic::{self, SyntheticConfig};

pub const TIMESTAMP_COLUMN: &str = "TIMESTAMP";
pub const GHI_COLUMN: &str = "GHI";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A country file does not exist. Handled inside [`load`] by switching
    /// to synthetic data; only surfaces from [`load_country`].
    #[error("{country} data file not found: {}", path.display())]
    FileMissing { country: Country, path: PathBuf },

    #[error("{country}: required column '{field}' missing in {}", path.display())]
    MissingField {
        country: Country,
        path: PathBuf,
        field: &'static str,
    },

    #[error("{}: row {row}: {message}", path.display())]
    Parse {
        path: PathBuf,
        row: usize,
        message: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing CSV {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("parsing JSON {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("reading parquet {}", path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("decoding arrow data in {}", path.display())]
    Arrow {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("no data: loading failed in both real and synthetic modes")]
    NoData,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a country file lacks a required column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Warn and leave that country out of the real dataset.
    #[default]
    Skip,
    /// Abort the whole load.
    Fail,
}

impl FromStr for MissingFieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(MissingFieldPolicy::Skip),
            "fail" => Ok(MissingFieldPolicy::Fail),
            other => Err(format!("unknown policy '{other}' (expected skip or fail)")),
        }
    }
}

impl fmt::Display for MissingFieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingFieldPolicy::Skip => f.write_str("skip"),
            MissingFieldPolicy::Fail => f.write_str("fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory holding `{country}_clean.{ext}` files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File extension (`csv`, `json`, `parquet`).
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub missing_field: MissingFieldPolicy,

    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            extension: default_extension(),
            missing_field: MissingFieldPolicy::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_extension() -> String {
    "csv".to_string()
}

impl LoaderConfig {
    /// Location of a country's cleaned file.
    pub fn path_for(&self, country: Country) -> PathBuf {
        let ext = self.extension.trim_start_matches('.');
        self.data_dir
            .join(format!("{}_clean.{ext}", country.file_stem()))
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Build the combined dataset.
///
/// Reads every country's file. If any file is missing the real results are
/// discarded and the whole dataset is generated synthetically.
pub fn load(config: &LoaderConfig) -> Result<CombinedDataset, LoadError> {
    let dataset = match load_measured(config) {
        Ok(records) => CombinedDataset::new(records, DataOrigin::Measured),
        Err(LoadError::FileMissing { country, path }) => {
            log::warn!(
                "{country} file {} not found; generating synthetic data for all countries",
                path.display()
            );
            synthetic::generate(&config.synthetic)
        }
        Err(e) => return Err(e),
    };

    if dataset.is_empty() {
        return Err(LoadError::NoData);
    }

    log::info!(
        "loaded {} {} rows for {} countries",
        dataset.len(),
        dataset.origin(),
        dataset.countries().len()
    );
    Ok(dataset)
}

fn load_measured(config: &LoaderConfig) -> Result<Vec<Measurement>, LoadError> {
    let mut records = Vec::new();
    for country in Country::ALL {
        match load_country(config, country) {
            Ok(rows) => {
                log::debug!("{country}: {} rows", rows.len());
                records.extend(rows);
            }
            Err(LoadError::MissingField { country, path, field })
                if config.missing_field == MissingFieldPolicy::Skip =>
            {
                log::warn!(
                    "{field} column missing in {country}'s data ({}); skipping real data for this country",
                    path.display()
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}

/// Read and normalize one country's file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, `TIMESTAMP` and `GHI` columns
/// * `.json`    – `[{ "TIMESTAMP": ..., "GHI": ... }, ...]`
/// * `.parquet` – `TIMESTAMP` (timestamp, date or string) and numeric `GHI`
pub fn load_country(config: &LoaderConfig, country: Country) -> Result<Vec<Measurement>, LoadError> {
    let path = config.path_for(country);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => read_csv(&path, country)?,
        "json" => read_json(&path, country)?,
        "parquet" | "pq" => read_parquet(&path, country)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    Ok(normalize(country, rows, &path))
}

fn open(path: &Path, country: Country) -> Result<File, LoadError> {
    File::open(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            LoadError::FileMissing {
                country,
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Tag rows with their country and floor negative readings at zero.
fn normalize(country: Country, rows: Vec<(NaiveDateTime, f64)>, path: &Path) -> Vec<Measurement> {
    let mut clamped = 0usize;
    let out = rows
        .into_iter()
        .map(|(timestamp, ghi)| {
            let ghi = if ghi < 0.0 {
                clamped += 1;
                0.0
            } else {
                ghi
            };
            Measurement { country, timestamp, ghi }
        })
        .collect();
    if clamped > 0 {
        log::warn!(
            "{country}: clamped {clamped} negative GHI values to 0 in {}",
            path.display()
        );
    }
    out
}

fn missing(country: Country, path: &Path, field: &'static str) -> LoadError {
    LoadError::MissingField {
        country,
        path: path.to_path_buf(),
        field,
    }
}

fn parse_error(path: &Path, row: usize, message: impl Into<String>) -> LoadError {
    LoadError::Parse {
        path: path.to_path_buf(),
        row,
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Value parsing
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse the timestamp spellings found in cleaned exports.
/// Offsets are converted to UTC and dropped.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn find_column<'a>(names: impl IntoIterator<Item = &'a str>, wanted: &str) -> Option<usize> {
    names
        .into_iter()
        .position(|h| h.trim().eq_ignore_ascii_case(wanted))
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path, country: Country) -> Result<Vec<(NaiveDateTime, f64)>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = open(path, country)?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers = reader.headers().map_err(csv_err)?.clone();

    let ts_idx = find_column(headers.iter(), TIMESTAMP_COLUMN)
        .ok_or_else(|| missing(country, path, TIMESTAMP_COLUMN))?;
    let ghi_idx = find_column(headers.iter(), GHI_COLUMN)
        .ok_or_else(|| missing(country, path, GHI_COLUMN))?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;

        let raw_ts = record.get(ts_idx).unwrap_or("");
        let timestamp = parse_timestamp(raw_ts)
            .ok_or_else(|| parse_error(path, row_no, format!("'{raw_ts}' is not a timestamp")))?;

        let raw_ghi = record.get(ghi_idx).unwrap_or("").trim();
        let ghi = raw_ghi
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| parse_error(path, row_no, format!("GHI '{raw_ghi}' is not a number")))?;

        rows.push((timestamp, ghi));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented layout (`df.to_json(orient='records')`). Timestamps
/// may be strings or epoch milliseconds.
fn read_json(path: &Path, country: Country) -> Result<Vec<(NaiveDateTime, f64)>, LoadError> {
    let file = open(path, country)?;
    let root: JsonValue = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        LoadError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let records = root
        .as_array()
        .ok_or_else(|| parse_error(path, 0, "expected top-level JSON array"))?;

    // Column names come from the first record, like a DataFrame built from it.
    let (ts_key, ghi_key) = match records.first().and_then(|r| r.as_object()) {
        Some(first) => {
            let key_for = |wanted: &'static str| {
                first
                    .keys()
                    .find(|k| k.eq_ignore_ascii_case(wanted))
                    .cloned()
                    .ok_or_else(|| missing(country, path, wanted))
            };
            (key_for(TIMESTAMP_COLUMN)?, key_for(GHI_COLUMN)?)
        }
        None if records.is_empty() => return Ok(Vec::new()),
        None => return Err(parse_error(path, 0, "row is not a JSON object")),
    };

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| -> Result<(NaiveDateTime, f64), LoadError> {
            let obj = rec
                .as_object()
                .ok_or_else(|| parse_error(path, i, "row is not a JSON object"))?;

            let timestamp = match obj.get(&ts_key) {
                Some(JsonValue::String(s)) => parse_timestamp(s),
                Some(JsonValue::Number(n)) => n
                    .as_i64()
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|dt| dt.naive_utc()),
                _ => None,
            }
            .ok_or_else(|| parse_error(path, i, format!("invalid '{ts_key}' value")))?;

            let ghi = obj
                .get(&ghi_key)
                .and_then(JsonValue::as_f64)
                .ok_or_else(|| parse_error(path, i, format!("invalid '{ghi_key}' value")))?;

            Ok((timestamp, ghi))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Works with files written by both Pandas (`df.to_parquet()`) and
/// Polars (`df.write_parquet()`).
fn read_parquet(path: &Path, country: Country) -> Result<Vec<(NaiveDateTime, f64)>, LoadError> {
    let parquet_err = |source| LoadError::Parquet {
        path: path.to_path_buf(),
        source,
    };
    let arrow_err = |source| LoadError::Arrow {
        path: path.to_path_buf(),
        source,
    };

    let file = open(path, country)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;

    let schema = builder.schema().clone();
    let names = schema.fields().iter().map(|f| f.name().as_str());
    let ts_idx = find_column(names.clone(), TIMESTAMP_COLUMN)
        .ok_or_else(|| missing(country, path, TIMESTAMP_COLUMN))?;
    let ghi_idx =
        find_column(names, GHI_COLUMN).ok_or_else(|| missing(country, path, GHI_COLUMN))?;

    let reader = builder.build().map_err(parquet_err)?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(arrow_err)?;
        let offset = rows.len();

        let ts_col = batch.column(ts_idx);
        let ghi_col = cast(batch.column(ghi_idx), &DataType::Float64).map_err(arrow_err)?;
        let ghi_values = ghi_col.as_primitive::<Float64Type>();

        for row in 0..batch.num_rows() {
            let timestamp = timestamp_at(ts_col, row)
                .ok_or_else(|| parse_error(path, offset + row, "invalid or null TIMESTAMP"))?;
            if ghi_values.is_null(row) {
                return Err(parse_error(path, offset + row, "null GHI"));
            }
            let ghi = ghi_values.value(row);
            if !ghi.is_finite() {
                return Err(parse_error(path, offset + row, "GHI is not a finite number"));
            }
            rows.push((timestamp, ghi));
        }
    }
    Ok(rows)
}

/// Read one timestamp cell from an Arrow column at a given row.
fn timestamp_at(col: &ArrayRef, row: usize) -> Option<NaiveDateTime> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => parse_timestamp(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => parse_timestamp(col.as_string::<i64>().value(row)),
        DataType::Timestamp(TimeUnit::Second, _) => {
            col.as_primitive::<TimestampSecondType>().value_as_datetime(row)
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            col.as_primitive::<TimestampMillisecondType>().value_as_datetime(row)
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            col.as_primitive::<TimestampMicrosecondType>().value_as_datetime(row)
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            col.as_primitive::<TimestampNanosecondType>().value_as_datetime(row)
        }
        DataType::Date32 => col.as_primitive::<Date32Type>().value_as_datetime(row),
        _ => None,
    }
}

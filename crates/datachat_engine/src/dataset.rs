use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATASET_FILE: &str = "input.csv";

const SAMPLE_ROWS: usize = 5;
const BUCKET_WIDTH: f64 = 10.0;
/// Most frequent categories charted by name; the rest are summed as "Other".
const TOP_CATEGORIES: usize = 2;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset unavailable at {path:?}: {reason}")]
    Unavailable { path: PathBuf, reason: String },
}

/// How the dataset is presented to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotMode {
    /// Every row as a JSON object.
    #[default]
    Rows,
    /// Columns, a few sample rows and per-column statistics.
    Summary,
}

/// Serialized view of the dataset embedded as request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSnapshot {
    columns: Vec<String>,
    row_count: usize,
    text: String,
}

impl DatasetSnapshot {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn as_context(&self) -> &str {
        &self.text
    }
}

pub trait DatasetProvider {
    fn load(&self) -> Result<DatasetSnapshot, DatasetError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnStats {
    Numeric { mean: f64, median: f64, stddev: f64 },
    Categorical { unique_values: usize },
}

impl ColumnStats {
    fn to_json(&self) -> Value {
        match self {
            ColumnStats::Numeric {
                mean,
                median,
                stddev,
            } => json!({
                "mean": format!("{mean:.2}"),
                "median": median,
                "stddev": format!("{stddev:.2}"),
            }),
            ColumnStats::Categorical { unique_values } => json!({ "uniqueValues": unique_values }),
        }
    }
}

/// Computes statistics for one column.
///
/// Values that parse as numbers are summarized numerically; a column without
/// any numeric value reports its count of distinct values.
pub fn column_stats(values: &[&str]) -> ColumnStats {
    let mut numeric: Vec<f64> = values
        .iter()
        .filter_map(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect();

    if numeric.is_empty() {
        let unique: HashSet<&str> = values.iter().copied().collect();
        return ColumnStats::Categorical {
            unique_values: unique.len(),
        };
    }

    let count = numeric.len() as f64;
    let mean = numeric.iter().sum::<f64>() / count;
    let variance = numeric.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count;
    numeric.sort_by(f64::total_cmp);
    let median = numeric[numeric.len() / 2];

    ColumnStats::Numeric {
        mean,
        median,
        stddev: variance.sqrt(),
    }
}

/// Bar chart data for one column: `(label, count)` pairs in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChart {
    pub column: String,
    pub bars: Vec<(String, u64)>,
}

/// Counts the values of one column for charting.
///
/// A column where every value is a number is bucketed into ranges of ten,
/// labelled `"{start}-{start + 9}"` in ascending order. Anything else lists
/// its two most frequent values followed by `"Other"` with the remainder.
pub fn column_distribution(values: &[&str]) -> Vec<(String, u64)> {
    let numeric: Option<Vec<f64>> = values
        .iter()
        .map(|value| value.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();
    match numeric {
        Some(numbers) if !numbers.is_empty() => numeric_buckets(&numbers),
        _ => top_categories(values),
    }
}

fn numeric_buckets(numbers: &[f64]) -> Vec<(String, u64)> {
    let mut buckets: BTreeMap<i64, u64> = BTreeMap::new();
    for number in numbers {
        let start = ((number / BUCKET_WIDTH).floor() * BUCKET_WIDTH) as i64;
        *buckets.entry(start).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(start, count)| (format!("{}-{}", start, start + 9), count))
        .collect()
}

fn top_categories(values: &[&str]) -> Vec<(String, u64)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for &value in values {
        let count = counts.entry(value).or_insert_with(|| {
            order.push(value);
            0
        });
        *count += 1;
    }
    // Stable sort: ties keep first-appearance order.
    let mut ranked: Vec<(String, u64)> = order
        .into_iter()
        .map(|value| (value.to_string(), counts[value]))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    if ranked.len() > TOP_CATEGORIES {
        let other: u64 = ranked[TOP_CATEGORIES..].iter().map(|(_, count)| count).sum();
        ranked.truncate(TOP_CATEGORIES);
        ranked.push(("Other".to_string(), other));
    }
    ranked
}

/// Reads a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvDatasetProvider {
    path: PathBuf,
    mode: SnapshotMode,
}

impl CsvDatasetProvider {
    pub fn new(path: impl Into<PathBuf>, mode: SnapshotMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl ToString) -> DatasetError {
        DatasetError::Unavailable {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    /// One chart per column, in header order.
    pub fn distributions(&self) -> Result<Vec<ColumnChart>, DatasetError> {
        let (columns, rows) = self.read_table()?;
        let charts = columns
            .into_iter()
            .enumerate()
            .map(|(idx, column)| {
                let values = column_values(&rows, idx);
                ColumnChart {
                    column,
                    bars: column_distribution(&values),
                }
            })
            .collect();
        Ok(charts)
    }

    fn read_table(&self) -> Result<(Vec<String>, Vec<Vec<String>>), DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|err| self.unavailable(err))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|err| self.unavailable(err))?
            .iter()
            .map(ToOwned::to_owned)
            .collect();
        if columns.is_empty() {
            return Err(self.unavailable("missing header row"));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| self.unavailable(err))?;
            rows.push(record.iter().map(ToOwned::to_owned).collect());
        }
        Ok((columns, rows))
    }
}

impl DatasetProvider for CsvDatasetProvider {
    fn load(&self) -> Result<DatasetSnapshot, DatasetError> {
        let (columns, rows) = self.read_table()?;
        let text = match self.mode {
            SnapshotMode::Rows => render_rows(&columns, &rows),
            SnapshotMode::Summary => render_summary(&columns, &rows),
        }
        .map_err(|err| self.unavailable(err))?;

        engine_info!(
            "Loaded dataset {:?} mode={:?} columns={} rows={}",
            self.path,
            self.mode,
            columns.len(),
            rows.len()
        );
        Ok(DatasetSnapshot {
            columns,
            row_count: rows.len(),
            text,
        })
    }
}

fn column_values(rows: &[Vec<String>], idx: usize) -> Vec<&str> {
    rows.iter()
        .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
        .collect()
}

fn row_object(columns: &[String], row: &[String]) -> Value {
    let object: Map<String, Value> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let cell = row.get(idx).cloned().unwrap_or_default();
            (column.clone(), Value::String(cell))
        })
        .collect();
    Value::Object(object)
}

fn render_rows(columns: &[String], rows: &[Vec<String>]) -> serde_json::Result<String> {
    let objects: Vec<Value> = rows.iter().map(|row| row_object(columns, row)).collect();
    serde_json::to_string_pretty(&objects)
}

fn render_summary(columns: &[String], rows: &[Vec<String>]) -> serde_json::Result<String> {
    let samples: Vec<Value> = rows
        .iter()
        .take(SAMPLE_ROWS)
        .map(|row| row_object(columns, row))
        .collect();

    let stats: Map<String, Value> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let values = column_values(rows, idx);
            (column.clone(), column_stats(&values).to_json())
        })
        .collect();

    Ok(format!(
        "CSV Columns: {}\n\nSample Rows: {}\n\nColumn Statistics: {}",
        columns.join(", "),
        serde_json::to_string_pretty(&samples)?,
        serde_json::to_string_pretty(&stats)?
    ))
}

//! ---
//! chm_section: "11-simulation"
//! chm_subsection: "module"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Column-aware telemetry table with CSV and JSON persistence."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
//! A [`TelemetryDataset`] carries an ordered set of columns. Simulated data has
//! every column; recorded data loaded from CSV may carry only a subset, and
//! every consumer treats a missing column as "statistic not available".
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;
use tracing::debug;

use crate::frames::TelemetrySample;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row}: invalid value '{value}' for column {column}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Telemetry columns in their canonical order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    Time,
    Chiller,
    Ambient,
    ItLoad,
    ChwIn,
    PowerPredicted,
    PowerActual,
    AnomalyScore,
}

impl Column {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Column::Time | Column::Chiller)
    }
}

/// One table row; fields for columns the dataset lacks are always `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetryRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chiller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub it_load: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chw_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_predicted: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_actual: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_score: Option<f64>,
}

impl TelemetryRow {
    pub fn numeric(&self, column: Column) -> Option<f64> {
        match column {
            Column::Time | Column::Chiller => None,
            Column::Ambient => self.ambient,
            Column::ItLoad => self.it_load,
            Column::ChwIn => self.chw_in,
            Column::PowerPredicted => self.power_predicted,
            Column::PowerActual => self.power_actual,
            Column::AnomalyScore => self.anomaly_score,
        }
    }

    fn numeric_mut(&mut self, column: Column) -> Option<&mut Option<f64>> {
        match column {
            Column::Time | Column::Chiller => None,
            Column::Ambient => Some(&mut self.ambient),
            Column::ItLoad => Some(&mut self.it_load),
            Column::ChwIn => Some(&mut self.chw_in),
            Column::PowerPredicted => Some(&mut self.power_predicted),
            Column::PowerActual => Some(&mut self.power_actual),
            Column::AnomalyScore => Some(&mut self.anomaly_score),
        }
    }

    /// Text cell for tabular display; empty when the value is missing.
    pub fn display_value(&self, column: Column) -> String {
        match column {
            Column::Time => self
                .time
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            Column::Chiller => self.chiller.clone().unwrap_or_default(),
            other => self
                .numeric(other)
                .map(|v| format!("{:.6}", v))
                .unwrap_or_default(),
        }
    }

    fn storage_value(&self, column: Column) -> String {
        match column {
            Column::Time => self.time.map(|t| t.to_rfc3339()).unwrap_or_default(),
            Column::Chiller => self.chiller.clone().unwrap_or_default(),
            other => self.numeric(other).map(|v| v.to_string()).unwrap_or_default(),
        }
    }

    fn clear(&mut self, column: Column) {
        match column {
            Column::Time => self.time = None,
            Column::Chiller => self.chiller = None,
            other => {
                if let Some(slot) = self.numeric_mut(other) {
                    *slot = None;
                }
            }
        }
    }
}

impl From<&TelemetrySample> for TelemetryRow {
    fn from(sample: &TelemetrySample) -> Self {
        Self {
            time: Some(sample.time),
            chiller: Some(sample.chiller.clone()),
            ambient: Some(sample.ambient),
            it_load: Some(sample.it_load),
            chw_in: Some(sample.chw_in),
            power_predicted: Some(sample.power_predicted),
            power_actual: Some(sample.power_actual),
            anomaly_score: Some(sample.anomaly_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetryDataset {
    columns: Vec<Column>,
    rows: Vec<TelemetryRow>,
}

impl TelemetryDataset {
    /// Empty dataset with the given columns; duplicates are dropped, order kept.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut unique = Vec::new();
        for column in columns {
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        Self {
            columns: unique,
            rows: Vec::new(),
        }
    }

    /// Full-column dataset from simulated samples.
    pub fn from_samples(samples: &[TelemetrySample]) -> Self {
        Self {
            columns: Column::iter().collect(),
            rows: samples.iter().map(TelemetryRow::from).collect(),
        }
    }

    /// Append a row, clearing any value for a column this dataset does not carry.
    pub fn push(&mut self, mut row: TelemetryRow) {
        for column in Column::iter() {
            if !self.has_column(column) {
                row.clear(column);
            }
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[TelemetryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Rows belonging to `chiller`. Without a chiller column nothing matches.
    pub fn for_chiller(&self, chiller: &str) -> Self {
        let rows = if self.has_column(Column::Chiller) {
            self.rows
                .iter()
                .filter(|row| row.chiller.as_deref() == Some(chiller))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Stable sort by timestamp ascending; rows without a timestamp sort first.
    /// A dataset without a time column keeps its order.
    pub fn sorted_by_time(&self) -> Self {
        let mut rows = self.rows.clone();
        if self.has_column(Column::Time) {
            rows.sort_by_key(|row| row.time);
        }
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// The last `n` rows.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.rows.len().saturating_sub(n);
        Self {
            columns: self.columns.clone(),
            rows: self.rows[start..].to_vec(),
        }
    }

    /// Keep only the listed columns that exist here, in this dataset's order.
    pub fn project(&self, keep: &[Column]) -> Self {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .copied()
            .filter(|column| keep.contains(column))
            .collect();
        let mut projected = Self::new(columns);
        for row in &self.rows {
            projected.push(row.clone());
        }
        projected
    }

    /// Column values that are present, in row order.
    pub fn values(&self, column: Column) -> Vec<f64> {
        if !self.has_column(column) {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter_map(|row| row.numeric(column))
            .collect()
    }

    /// Mean of a numeric column, `None` when the column is absent or empty.
    pub fn mean(&self, column: Column) -> Option<f64> {
        let values = self.values(column);
        if values.is_empty() {
            return None;
        }
        Some(values.iter().mean())
    }

    /// Mean signed `power_actual - power_predicted` over rows carrying both.
    pub fn mean_power_delta(&self) -> Option<f64> {
        if !(self.has_column(Column::PowerActual) && self.has_column(Column::PowerPredicted)) {
            return None;
        }
        let deltas: Vec<f64> = self
            .rows
            .iter()
            .filter_map(|row| Some(row.power_actual? - row.power_predicted?))
            .collect();
        if deltas.is_empty() {
            return None;
        }
        Some(deltas.iter().mean())
    }

    /// Render as right-aligned plain text without a row index.
    pub fn to_text_table(&self) -> String {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.name()).collect();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| self.columns.iter().map(|c| row.display_value(*c)).collect())
            .collect();
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                cells
                    .iter()
                    .map(|row| row[idx].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let render_line = |values: Vec<&str>| -> String {
            values
                .iter()
                .zip(&widths)
                .map(|(value, width)| format!("{:>width$}", value, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
        };

        let mut lines = Vec::with_capacity(cells.len() + 1);
        lines.push(render_line(headers));
        for row in &cells {
            lines.push(render_line(row.iter().map(String::as_str).collect()));
        }
        lines.join("\n")
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.columns.iter().map(|c| c.name()))?;
        for row in &self.rows {
            writer.write_record(self.columns.iter().map(|c| row.storage_value(*c)))?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Read a CSV whose header names any subset of the known columns.
    /// Unknown headers are ignored and empty cells become missing values.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        let mapping: Vec<Option<Column>> = headers
            .iter()
            .map(|header| {
                let column = Column::from_str(header).ok();
                if column.is_none() {
                    debug!(header, "ignoring unknown telemetry column");
                }
                column
            })
            .collect();

        let mut dataset = Self::new(mapping.iter().flatten().copied());
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let mut row = TelemetryRow::default();
            for (value, column) in record.iter().zip(&mapping) {
                if let Some(column) = column {
                    parse_cell(&mut row, *column, value, idx + 1)?;
                }
            }
            dataset.push(row);
        }
        Ok(dataset)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.rows)?;
        Ok(())
    }

    /// Read a JSON array of row objects. Columns are those appearing in any row.
    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        let rows: Vec<TelemetryRow> = serde_json::from_reader(reader)?;
        let columns = Column::iter().filter(|column| {
            rows.iter().any(|row| match column {
                Column::Time => row.time.is_some(),
                Column::Chiller => row.chiller.is_some(),
                other => row.numeric(*other).is_some(),
            })
        });
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push(row);
        }
        Ok(dataset)
    }

    /// Load a dataset, picking the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("csv") => Self::read_csv(file),
            Some("json") => Self::read_json(file),
            _ => Err(DatasetError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Write the dataset to `path` as CSV or JSON according to its extension.
    pub fn to_path(&self, path: &Path) -> Result<()> {
        let format = path.extension().and_then(|ext| ext.to_str());
        if !matches!(format, Some("csv") | Some("json")) {
            return Err(DatasetError::UnsupportedFormat(path.to_path_buf()));
        }
        let file = fs::File::create(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let writer = std::io::BufWriter::new(file);
        match format {
            Some("csv") => self.write_csv(writer),
            _ => self.write_json(writer),
        }
    }
}

fn parse_cell(row: &mut TelemetryRow, column: Column, value: &str, row_idx: usize) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    let invalid = || DatasetError::InvalidValue {
        row: row_idx,
        column: column.name(),
        value: value.to_owned(),
    };
    match column {
        Column::Time => row.time = Some(parse_timestamp(value).ok_or_else(invalid)?),
        Column::Chiller => row.chiller = Some(value.to_owned()),
        other => {
            let parsed: f64 = value.parse().map_err(|_| invalid())?;
            if let Some(slot) = row.numeric_mut(other) {
                *slot = Some(parsed);
            }
        }
    }
    Ok(())
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS[.f]` interpreted as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, minute, 0).unwrap()
    }

    fn row(chiller: &str, minute: u32, ambient: f64) -> TelemetryRow {
        TelemetryRow {
            time: Some(ts(minute)),
            chiller: Some(chiller.into()),
            ambient: Some(ambient),
            ..Default::default()
        }
    }

    fn partial_dataset() -> TelemetryDataset {
        let mut dataset = TelemetryDataset::new([Column::Time, Column::Chiller, Column::Ambient]);
        dataset.push(row("CH-1", 30, 31.0));
        dataset.push(row("CH-2", 0, 40.0));
        dataset.push(row("CH-1", 0, 29.0));
        dataset
    }

    #[test]
    fn column_names_are_snake_case() {
        assert_eq!(Column::ItLoad.name(), "it_load");
        assert_eq!(Column::PowerPredicted.name(), "power_predicted");
        assert_eq!(Column::from_str("chw_in").unwrap(), Column::ChwIn);
        assert!(Column::from_str("voltage").is_err());
    }

    #[test]
    fn push_masks_columns_the_dataset_lacks() {
        let mut dataset = TelemetryDataset::new([Column::Chiller, Column::Ambient]);
        dataset.push(TelemetryRow {
            chiller: Some("CH-1".into()),
            ambient: Some(30.0),
            it_load: Some(50.0),
            ..Default::default()
        });
        assert_eq!(dataset.rows()[0].it_load, None);
        assert_eq!(dataset.mean(Column::ItLoad), None);
    }

    #[test]
    fn filter_sort_and_tail() {
        let dataset = partial_dataset().for_chiller("CH-1").sorted_by_time();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0].time, Some(ts(0)));
        assert_eq!(dataset.tail(1).rows()[0].ambient, Some(31.0));
        assert_eq!(dataset.tail(10).len(), 2);
    }

    #[test]
    fn missing_chiller_column_matches_nothing() {
        let mut dataset = TelemetryDataset::new([Column::Ambient]);
        dataset.push(TelemetryRow {
            ambient: Some(30.0),
            ..Default::default()
        });
        assert!(dataset.for_chiller("CH-1").is_empty());
    }

    #[test]
    fn means_skip_absent_columns() {
        let dataset = partial_dataset().for_chiller("CH-1");
        assert_eq!(dataset.mean(Column::Ambient), Some(30.0));
        assert_eq!(dataset.mean(Column::ChwIn), None);
        assert_eq!(dataset.mean_power_delta(), None);
    }

    #[test]
    fn mean_power_delta_is_signed() {
        let mut dataset = TelemetryDataset::new([Column::PowerPredicted, Column::PowerActual]);
        for (predicted, actual) in [(100.0, 90.0), (100.0, 80.0)] {
            dataset.push(TelemetryRow {
                power_predicted: Some(predicted),
                power_actual: Some(actual),
                ..Default::default()
            });
        }
        assert_eq!(dataset.mean_power_delta(), Some(-15.0));
    }

    #[test]
    fn projection_preserves_dataset_order() {
        let projected = partial_dataset().project(&[Column::Ambient, Column::Time, Column::ItLoad]);
        assert_eq!(projected.columns(), &[Column::Time, Column::Ambient]);
        assert_eq!(projected.rows()[0].chiller, None);
    }

    #[test]
    fn text_table_is_right_aligned_without_index() {
        let table = partial_dataset()
            .for_chiller("CH-2")
            .project(&[Column::Time, Column::Ambient])
            .to_text_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "               time    ambient");
        assert_eq!(lines[1], "2024-06-01 00:00:00  40.000000");
    }

    #[test]
    fn csv_round_trip_keeps_partial_columns() {
        let original = partial_dataset();
        let mut buffer = Vec::new();
        original.write_csv(&mut buffer).unwrap();
        let restored = TelemetryDataset::read_csv(buffer.as_slice()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn csv_reader_accepts_naive_timestamps_and_blanks() {
        let raw = "time,chiller,ambient,voltage\n2024-06-01 00:15:00,CH-1,,230\n2024-06-01 00:30:00.5,CH-1,33.5,231\n";
        let dataset = TelemetryDataset::read_csv(raw.as_bytes()).unwrap();
        assert_eq!(dataset.columns(), &[Column::Time, Column::Chiller, Column::Ambient]);
        assert_eq!(dataset.rows()[0].ambient, None);
        assert_eq!(dataset.rows()[0].time, Some(ts(15)));
        assert_eq!(dataset.mean(Column::Ambient), Some(33.5));
    }

    #[test]
    fn csv_reader_reports_bad_numbers() {
        let raw = "chiller,ambient\nCH-1,hot\n";
        let err = TelemetryDataset::read_csv(raw.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::InvalidValue { row: 1, column: "ambient", .. }
        ));
    }

    #[test]
    fn json_reader_infers_columns() {
        let raw = r#"[{"chiller":"CH-1","ambient":30.0},{"chiller":"CH-1","chw_in":7.5}]"#;
        let dataset = TelemetryDataset::read_json(raw.as_bytes()).unwrap();
        assert_eq!(dataset.columns(), &[Column::Chiller, Column::Ambient, Column::ChwIn]);
        assert_eq!(dataset.mean(Column::ChwIn), Some(7.5));
    }
}

//! Tabular dataset loading for ingestion.
//!
//! CSV files and JSON arrays of records are loaded into rows of JSON values.
//! CSV cells are typed on load (numbers, booleans, empty as null) so both
//! formats share one notion of a textual column.

use aixp_core::{AppError, AppResult};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
}

impl DatasetFormat {
    /// Detect the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(AppError::Knowledge(
                "Unsupported dataset type. Use CSV or JSON.".to_string(),
            )),
        }
    }
}

/// A loaded dataset: ordered columns and one record per row.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl Dataset {
    pub fn load(path: &Path) -> AppResult<Self> {
        match DatasetFormat::from_path(path)? {
            DatasetFormat::Csv => Self::from_csv(std::fs::File::open(path)?),
            DatasetFormat::Json => Self::from_json(&std::fs::read_to_string(path)?),
        }
    }

    pub fn from_csv(reader: impl std::io::Read) -> AppResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let columns: Vec<String> = csv_reader
            .headers()
            .map_err(|e| AppError::Knowledge(format!("Failed to read CSV header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (i, record) in csv_reader.records().enumerate() {
            let record = record
                .map_err(|e| AppError::Knowledge(format!("Invalid CSV row {}: {}", i, e)))?;
            let row: Map<String, Value> = columns
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| (column.clone(), csv_cell(cell)))
                .collect();
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Parse a JSON array of records. Columns are ordered by first appearance.
    pub fn from_json(content: &str) -> AppResult<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| AppError::Knowledge(format!("Invalid JSON dataset: {}", e)))?;

        let Value::Array(items) = value else {
            return Err(AppError::Knowledge(
                "JSON dataset must be an array of records".to_string(),
            ));
        };

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let Value::Object(record) = item else {
                return Err(AppError::Knowledge(format!(
                    "JSON dataset row {} is not an object",
                    i
                )));
            };
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
            rows.push(record);
        }

        Ok(Self { columns, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns holding text: any present value that is a string or a
    /// nested structure.
    pub fn textual_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| {
                self.rows.iter().any(|row| {
                    matches!(
                        row.get(*column),
                        Some(Value::String(_) | Value::Array(_) | Value::Object(_))
                    )
                })
            })
            .cloned()
            .collect()
    }

    /// Resolve the columns to read: the requested ones, or the textual ones.
    pub fn resolve_columns(&self, requested: Option<&[String]>) -> AppResult<Vec<String>> {
        match requested {
            Some(columns) if !columns.is_empty() => {
                if let Some(missing) = columns.iter().find(|c| !self.columns.contains(c)) {
                    return Err(AppError::Knowledge(format!(
                        "Column '{}' not found in dataset. Available: {}",
                        missing,
                        self.columns.join(", ")
                    )));
                }
                Ok(columns.to_vec())
            }
            _ => Ok(self.textual_columns()),
        }
    }
}

fn csv_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    if let Some(n) = cell
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        return Value::Number(n);
    }
    match cell {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}

/// Join a row's non-null values for `columns` with newlines, trimmed.
pub fn row_text(row: &Map<String, Value>, columns: &[String]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .filter_map(|column| match row.get(column) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        })
        .collect();

    parts.join("\n").trim().to_string()
}

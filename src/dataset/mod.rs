use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod schema;

pub use schema::{ColumnRule, DatasetSchema, SchemaReport};

/// A flat JSON object as returned by the open data API
pub type Record = serde_json::Map<String, Value>;

/// Tabular dataset with ordered column names and JSON cells
///
/// Every row holds exactly one cell per column; keys absent from a source
/// record are stored as `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset from columns and rows, padding or truncating rows to the column count
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dataset from API records, columns in first-seen key order
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| record.get(col).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Copy of this dataset with every column name passed through `rename`
    pub fn rename_columns<F>(&self, rename: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        Self {
            columns: self.columns.iter().map(|c| rename(c)).collect(),
            rows: self.rows.clone(),
        }
    }

    /// Apply `f` to every cell of one column in place
    pub fn map_column<F>(&mut self, index: usize, f: F)
    where
        F: Fn(&Value) -> Value,
    {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
    }

    /// Rows for which `keep` returns true, same columns
    pub fn filter_rows<F>(&self, keep: F) -> Self
    where
        F: Fn(&[Value]) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let object: Record = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(object)
            })
            .collect()
    }
}

/// Trim and lowercase a column name
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim, lowercase and replace spaces with underscores
pub fn snake_column_name(name: &str) -> String {
    normalize_column_name(name).replace(' ', "_")
}

/// Text form of a cell, `None` for nulls
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Trimmed lowercase text of a cell, empty for nulls
pub fn normalized_text(value: &Value) -> String {
    cell_text(value)
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default()
}

/// Numeric coercion: numbers and numeric strings parse, everything else is missing
pub fn to_numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Arithmetic mean of the present values, `None` when all are missing
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// JSON cell for an aggregated number, null when missing
pub fn number_cell(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

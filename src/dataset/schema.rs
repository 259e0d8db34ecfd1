//! Expected-schema descriptors for the three remote datasets.
//!
//! The remote API offers no schema guarantees, so each dataset declares the
//! columns its question handler depends on. Validation runs at load time and
//! the same rules are used by the handlers to locate their columns.

use serde::Serialize;

use super::{snake_column_name, Dataset};
use crate::error::{SamarthError, SamarthResult};

/// How a logical column is located among the dataset's column names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMatch {
    /// First of these exact names that exists, tried in listed order
    Exact(&'static [&'static str]),
    /// First column, in dataset order, whose name contains any of these substrings
    Containing(&'static [&'static str]),
}

/// A logical column a handler needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRule {
    pub label: &'static str,
    pub matcher: ColumnMatch,
}

impl ColumnRule {
    pub const fn exact(label: &'static str, names: &'static [&'static str]) -> Self {
        Self {
            label,
            matcher: ColumnMatch::Exact(names),
        }
    }

    pub const fn containing(label: &'static str, needles: &'static [&'static str]) -> Self {
        Self {
            label,
            matcher: ColumnMatch::Containing(needles),
        }
    }

    /// Index of the column this rule resolves to
    pub fn resolve(&self, columns: &[String]) -> Option<usize> {
        match self.matcher {
            ColumnMatch::Exact(names) => names
                .iter()
                .find_map(|name| columns.iter().position(|c| c == name)),
            ColumnMatch::Containing(needles) => columns.iter().position(|c| {
                let lower = c.to_lowercase();
                needles.iter().any(|needle| lower.contains(needle))
            }),
        }
    }

    fn describe(&self) -> String {
        match self.matcher {
            ColumnMatch::Exact(names) => names.join(" or "),
            ColumnMatch::Containing(needles) => format!("a column containing {}", needles.join("/")),
        }
    }
}

pub const RAINFALL_COLUMN: ColumnRule = ColumnRule::containing("rainfall", &["rain"]);
pub const RAINFALL_STATE_COLUMN: ColumnRule = ColumnRule::exact("state", &["state", "state_name"]);

pub const CROP_STATE_COLUMN: ColumnRule = ColumnRule::exact("state", &["state"]);
pub const CROP_COMMODITY_COLUMN: ColumnRule = ColumnRule::exact("commodity", &["commodity"]);
pub const CROP_PRICE_COLUMNS: ColumnRule =
    ColumnRule::exact("price", &["min_price", "max_price", "modal_price"]);

pub const MSP_CROP_COLUMN: ColumnRule =
    ColumnRule::containing("crop", &["crop", "commodity", "product", "name"]);

/// Expected schema of one dataset
#[derive(Debug, Clone)]
pub struct DatasetSchema {
    pub dataset: &'static str,
    pub rules: Vec<ColumnRule>,
    /// Resolve rules against snake_case column names
    pub snake_case: bool,
}

impl DatasetSchema {
    pub fn rainfall() -> Self {
        Self {
            dataset: "rainfall",
            rules: vec![RAINFALL_COLUMN, RAINFALL_STATE_COLUMN],
            snake_case: true,
        }
    }

    pub fn crop_price() -> Self {
        Self {
            dataset: "crop-price",
            rules: vec![CROP_STATE_COLUMN, CROP_COMMODITY_COLUMN, CROP_PRICE_COLUMNS],
            snake_case: false,
        }
    }

    pub fn msp() -> Self {
        Self {
            dataset: "msp",
            rules: vec![MSP_CROP_COLUMN],
            snake_case: false,
        }
    }

    /// Check every rule against the dataset's columns
    pub fn validate(&self, dataset: &Dataset) -> SchemaReport {
        let columns: Vec<String> = if self.snake_case {
            dataset.columns().iter().map(|c| snake_column_name(c)).collect()
        } else {
            dataset.columns().to_vec()
        };

        let mut resolved = Vec::new();
        let mut missing = Vec::new();

        for rule in &self.rules {
            match rule.resolve(&columns) {
                Some(index) => resolved.push(ResolvedColumn {
                    label: rule.label.to_string(),
                    column: columns[index].clone(),
                }),
                None => missing.push(format!("{} ({})", rule.label, rule.describe())),
            }
        }

        SchemaReport {
            dataset: self.dataset.to_string(),
            resolved,
            missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub label: String,
    pub column: String,
}

/// Outcome of validating a dataset against its schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub dataset: String,
    pub resolved: Vec<ResolvedColumn>,
    pub missing: Vec<String>,
}

impl SchemaReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn into_result(self) -> SamarthResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SamarthError::schema_drift(
                self.dataset,
                format!("missing {}", self.missing.join(", ")),
            ))
        }
    }
}

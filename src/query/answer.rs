use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::SamarthError;
use crate::source::DatasetKind;

/// Where an answer's numbers came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMeta {
    pub source: String,
    pub source_url: String,
    pub rows_used: usize,
}

impl SourceMeta {
    pub fn new(kind: DatasetKind, source_url: impl Into<String>, rows_used: usize) -> Self {
        Self {
            source: kind.source_label().to_string(),
            source_url: source_url.into(),
            rows_used,
        }
    }
}

/// Why a question could not be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The question lacks something the handler needs
    InputValidation,
    /// The dataset lacks a column the handler needs
    SchemaDrift,
    /// Filters left no rows
    NoData,
    Unexpected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InputValidation => "input_validation",
            FailureKind::SchemaDrift => "schema_drift",
            FailureKind::NoData => "no_data",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

/// Result of answering one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Dataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SourceMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl Answer {
    pub fn success(message: impl Into<String>, table: Dataset, meta: SourceMeta) -> Self {
        Self {
            success: true,
            message: message.into(),
            table: Some(table),
            meta: Some(meta),
            failure: None,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            table: None,
            meta: None,
            failure: Some(kind),
        }
    }

    /// Failure for an error a handler did not anticipate
    pub fn unexpected(error: &SamarthError) -> Self {
        Self::failure(FailureKind::Unexpected, format!("Error processing request: {}", error))
    }

    /// Failure for a question rejected before routing
    pub fn rejected(error: &SamarthError) -> Self {
        let message = match error {
            SamarthError::InputValidation { message } => message.clone(),
            other => other.to_string(),
        };
        Self::failure(FailureKind::InputValidation, message)
    }
}

/// Comma-separated names for user messages
pub(crate) fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names.iter().map(|n| n.as_ref()).collect::<Vec<_>>().join(", ")
}

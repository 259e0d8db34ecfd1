//! Question handlers.
//!
//! Each handler is a pure function of the question and an already loaded
//! dataset. Handlers never let an error escape: anything unanticipated is
//! turned into an [`Answer`] with [`FailureKind::Unexpected`].

use serde_json::Value;

use super::answer::{Answer, FailureKind};
use crate::config::QueryConfig;
use crate::dataset::Dataset;
use crate::error::{SamarthError, SamarthResult};

pub mod crop;
pub mod msp;
pub mod rainfall;

/// Everything a handler reads
#[derive(Debug, Clone, Copy)]
pub struct HandlerInput<'a> {
    pub question: &'a str,
    pub dataset: &'a Dataset,
    /// Provenance URL reported in the answer
    pub source_url: &'a str,
    pub options: &'a QueryConfig,
}

/// Early exit from a handler with a user-facing failure
pub(crate) enum Outcome {
    Fail(FailureKind, String),
    Error(SamarthError),
}

impl From<SamarthError> for Outcome {
    fn from(err: SamarthError) -> Self {
        Outcome::Error(err)
    }
}

pub(crate) fn fail<T>(kind: FailureKind, message: impl Into<String>) -> Result<T, Outcome> {
    Err(Outcome::Fail(kind, message.into()))
}

/// Collapse a handler body's result into an answer
pub(crate) fn finish(result: Result<Answer, Outcome>) -> Answer {
    match result {
        Ok(answer) => answer,
        Err(Outcome::Fail(kind, message)) => Answer::failure(kind, message),
        Err(Outcome::Error(err)) => Answer::unexpected(&err),
    }
}

/// Cell of a row, failing on rows narrower than the resolved column
pub(crate) fn cell(row: &[Value], index: usize) -> SamarthResult<&Value> {
    row.get(index).ok_or_else(|| {
        SamarthError::internal(format!(
            "row has {} cells, column {} requested",
            row.len(),
            index
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_narrow_row() -> Result<Answer, Outcome> {
        let row = vec![json!("Punjab")];
        cell(&row, 2)?;
        fail(FailureKind::NoData, "row was wide enough")
    }

    #[test]
    fn test_finish_maps_outcomes() {
        let failed = finish(fail(FailureKind::NoData, "nothing"));
        assert_eq!(failed.failure, Some(FailureKind::NoData));
        assert_eq!(failed.message, "nothing");

        let errored = finish(read_narrow_row());
        assert_eq!(errored.failure, Some(FailureKind::Unexpected));
        assert!(errored.message.starts_with("Error processing request: "));
    }
}

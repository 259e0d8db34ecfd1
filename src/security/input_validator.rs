use tracing::{debug, warn};

use crate::config::QueryConfig;
use crate::error::{SamarthError, SamarthResult};

/// Checks questions before they are routed
#[derive(Debug, Clone)]
pub struct QuestionValidator {
    max_length: usize,
}

impl QuestionValidator {
    pub fn new(config: &QueryConfig) -> Self {
        Self {
            max_length: config.max_question_length,
        }
    }

    /// Reject blank, over-long or binary questions
    pub fn validate(&self, question: &str) -> SamarthResult<()> {
        debug!("Validating question: {} characters", question.chars().count());

        if question.trim().is_empty() {
            return Err(SamarthError::input("Please enter a question."));
        }

        let length = question.chars().count();
        if length > self.max_length {
            warn!("Question too long: {} characters", length);
            return Err(SamarthError::input(format!(
                "Question too long: {} characters, max allowed: {}",
                length, self.max_length
            )));
        }

        if question.chars().any(|c| c.is_control() && !c.is_whitespace()) {
            warn!("Question contains control characters");
            return Err(SamarthError::input("Question contains control characters."));
        }

        Ok(())
    }

    /// Question with stray control characters dropped and its ends trimmed
    ///
    /// Inner whitespace is kept as typed, so entity matching sees the same text.
    pub fn sanitize(&self, question: &str) -> String {
        question
            .chars()
            .filter(|c| !c.is_control() || c.is_whitespace())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

use serde::{Deserialize, Serialize};

use crate::source::DatasetKind;

/// Category of question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Rainfall,
    Msp,
    CropProduction,
    Unknown,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Rainfall => "rainfall",
            Intent::Msp => "msp",
            Intent::CropProduction => "crop_production",
            Intent::Unknown => "unknown",
        }
    }

    /// Dataset the intent's handler reads
    pub fn dataset(&self) -> Option<DatasetKind> {
        match self {
            Intent::Rainfall => Some(DatasetKind::Rainfall),
            Intent::Msp => Some(DatasetKind::Msp),
            Intent::CropProduction => Some(DatasetKind::CropPrice),
            Intent::Unknown => None,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One routing rule: the intent applies when the lowercased question contains any keyword
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub keywords: &'static [&'static str],
    pub intent: Intent,
}

impl Route {
    pub fn matches(&self, question_lower: &str) -> bool {
        self.keywords.iter().any(|keyword| question_lower.contains(keyword))
    }
}

/// Routing table in priority order; the first matching route wins.
///
/// A question mentioning both rain and MSP or crops is a rainfall question.
pub const ROUTES: &[Route] = &[
    Route {
        keywords: &["rain"],
        intent: Intent::Rainfall,
    },
    Route {
        keywords: &["msp"],
        intent: Intent::Msp,
    },
    Route {
        keywords: &["crop", "production"],
        intent: Intent::CropProduction,
    },
];

pub const UNKNOWN_INTENT_MESSAGE: &str =
    "Please ask a question related to rainfall, crop production, or MSP.";

/// Pick the intent of a question
pub fn route(question: &str) -> Intent {
    let question = question.to_lowercase();
    ROUTES
        .iter()
        .find(|route| route.matches(&question))
        .map(|route| route.intent)
        .unwrap_or(Intent::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_each_intent() {
        assert_eq!(route("Compare the rainfall in Maharashtra and Gujarat"), Intent::Rainfall);
        assert_eq!(route("Show MSP data for Wheat"), Intent::Msp);
        assert_eq!(route("What is the crop production in Punjab"), Intent::CropProduction);
        assert_eq!(route("Total PRODUCTION of Kerala"), Intent::CropProduction);
    }

    #[test]
    fn test_route_priority() {
        assert_eq!(route("rain and msp"), Intent::Rainfall);
        assert_eq!(route("crop rain"), Intent::Rainfall);
        assert_eq!(route("msp for crop"), Intent::Msp);
    }

    #[test]
    fn test_route_unknown() {
        assert_eq!(route("how is the weather"), Intent::Unknown);
        assert_eq!(route(""), Intent::Unknown);
        assert_eq!(Intent::Unknown.dataset(), None);
    }

    #[test]
    fn test_substring_trigger() {
        // "rain" inside "grain"
        assert_eq!(route("grain prices"), Intent::Rainfall);
    }

    #[test]
    fn test_intent_datasets() {
        assert_eq!(Intent::CropProduction.dataset(), Some(DatasetKind::CropPrice));
        assert_eq!(Intent::Msp.dataset(), Some(DatasetKind::Msp));
    }
}

use thiserror::Error;

/// Error types for Samarth
#[derive(Error, Debug)]
pub enum SamarthError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // Network errors
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP request failed: {url} - {status}")]
    HttpRequest { url: String, status: u16 },

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("No 'records' key found in API response from {url}")]
    MissingRecords { url: String },

    // Dataset errors
    #[error("Schema drift in {dataset} dataset: {message}")]
    SchemaDrift { dataset: String, message: String },

    #[error("Unknown dataset: {name}")]
    UnknownDataset { name: String },

    // Question errors
    #[error("Input validation failed: {message}")]
    InputValidation { message: String },

    // Export errors
    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SamarthError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Create a schema drift error for a dataset
    pub fn schema_drift(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaDrift {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Create an input validation error
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputValidation { message: message.into() }
    }

    /// Create an export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export { message: message.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Check if error is recoverable by trying again later
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::HttpRequest { .. } => true,

            Self::Configuration { .. }
            | Self::SchemaDrift { .. }
            | Self::UnknownDataset { .. }
            | Self::InputValidation { .. }
            | Self::UnsupportedFormat { .. } => false,

            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Network { .. }
            | Self::HttpRequest { .. }
            | Self::InvalidResponse { .. }
            | Self::MissingRecords { .. } => "network",
            Self::SchemaDrift { .. } | Self::UnknownDataset { .. } => "dataset",
            Self::InputValidation { .. } => "input",
            Self::Export { .. } | Self::UnsupportedFormat { .. } => "export",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<reqwest::Error> for SamarthError {
    fn from(err: reqwest::Error) -> Self {
        // request URLs carry the API key
        Self::Network { message: err.without_url().to_string() }
    }
}

impl From<anyhow::Error> for SamarthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal { message: err.to_string() }
    }
}

/// Result type alias for Samarth
pub type SamarthResult<T> = std::result::Result<T, SamarthError>;

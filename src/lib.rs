//! Samarth - question answering over Indian agricultural open data
//!
//! This library provides:
//! - Dataset loading from the data.gov.in JSON API with pagination and caching
//! - Keyword intent routing and state/crop entity extraction
//! - Rainfall, crop market price and MSP question handlers
//! - Terminal rendering and CSV/JSON export of answers

pub mod config;
pub mod core;
pub mod dataset;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod query;
pub mod security;
pub mod source;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::core::{Response, Samarth};
pub use crate::error::{SamarthError, SamarthResult};
pub use crate::query::{Answer, FailureKind, Intent};

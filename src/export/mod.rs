use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod csv_exporter;
pub mod json_exporter;

use crate::config::ExportConfig;
use crate::dataset::Dataset;
use crate::error::{SamarthError, SamarthResult};

/// Writes answer tables to files
pub struct ExportManager {
    config: ExportConfig,
}

/// Export format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = SamarthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(SamarthError::UnsupportedFormat { format: s.to_string() }),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Export statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportStats {
    pub format: ExportFormat,
    pub file_path: PathBuf,
    pub record_count: usize,
    pub file_size_bytes: u64,
    pub export_duration_ms: u64,
}

#[derive(Debug)]
pub(crate) struct InternalExportStats {
    pub file_size_bytes: u64,
}

impl ExportManager {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Format used when the caller names none
    pub fn default_format(&self) -> SamarthResult<ExportFormat> {
        self.config.default_format.parse()
    }

    /// Write `table` to `output_path`, creating parent directories as needed
    pub async fn export(
        &self,
        table: &Dataset,
        output_path: &Path,
        format: ExportFormat,
    ) -> SamarthResult<ExportStats> {
        info!("Exporting {} rows to {} as {}", table.len(), output_path.display(), format);

        let start_time = std::time::Instant::now();

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                SamarthError::export(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let stats = match format {
            ExportFormat::Csv => csv_exporter::export_csv(table, output_path).await?,
            ExportFormat::Json => json_exporter::export_json(table, output_path).await?,
        };

        let final_stats = ExportStats {
            format,
            file_path: output_path.to_path_buf(),
            record_count: table.len(),
            file_size_bytes: stats.file_size_bytes,
            export_duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Export completed: {} rows in {}ms, file size: {} bytes",
            final_stats.record_count, final_stats.export_duration_ms, final_stats.file_size_bytes
        );

        Ok(final_stats)
    }

    /// Timestamped file name in the configured output directory
    pub fn default_path(&self, label: &str, format: ExportFormat) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.config
            .output_directory
            .join(format!("samarth_{}_{}.{}", label, timestamp, format.extension()))
    }
}

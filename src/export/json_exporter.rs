use std::path::Path;
use tracing::{debug, info};

use super::InternalExportStats;
use crate::dataset::Dataset;
use crate::error::{SamarthError, SamarthResult};

/// Write a table as a pretty-printed JSON array of row objects
pub(crate) async fn export_json(table: &Dataset, output_path: &Path) -> SamarthResult<InternalExportStats> {
    debug!("Exporting {} rows to JSON: {}", table.len(), output_path.display());

    let body = serde_json::to_vec_pretty(&table.to_records())
        .map_err(|e| SamarthError::export(format!("JSON encoding failed: {}", e)))?;

    tokio::fs::write(output_path, &body)
        .await
        .map_err(|e| SamarthError::export(format!("Failed to write {}: {}", output_path.display(), e)))?;

    info!("JSON export completed: {} rows, {} bytes", table.len(), body.len());

    Ok(InternalExportStats {
        file_size_bytes: body.len() as u64,
    })
}

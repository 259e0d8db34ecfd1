use csv::WriterBuilder;
use std::path::Path;
use tracing::{debug, info};

use super::InternalExportStats;
use crate::dataset::{cell_text, Dataset};
use crate::error::{SamarthError, SamarthResult};

/// Write a table as CSV, header row first, nulls as empty fields
pub(crate) async fn export_csv(table: &Dataset, output_path: &Path) -> SamarthResult<InternalExportStats> {
    debug!("Exporting {} rows to CSV: {}", table.len(), output_path.display());

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(output_path)
        .map_err(csv_error)?;

    writer.write_record(table.columns()).map_err(csv_error)?;

    for row in table.rows() {
        let record: Vec<String> = row
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect();
        writer.write_record(&record).map_err(csv_error)?;
    }

    writer
        .flush()
        .map_err(|e| SamarthError::export(format!("Failed to flush CSV: {}", e)))?;
    drop(writer);

    let file_size = tokio::fs::metadata(output_path)
        .await
        .map_err(|e| SamarthError::export(e.to_string()))?
        .len();

    info!("CSV export completed: {} rows, {} bytes", table.len(), file_size);

    Ok(InternalExportStats {
        file_size_bytes: file_size,
    })
}

fn csv_error(err: csv::Error) -> SamarthError {
    SamarthError::export(format!("CSV write failed: {}", err))
}

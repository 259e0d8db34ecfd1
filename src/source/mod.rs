use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

pub mod cache;
pub mod http_client;

pub use cache::DatasetCache;
pub use http_client::HttpClient;

use crate::config::SourcesConfig;
use crate::dataset::{normalize_column_name, Dataset, DatasetSchema, Record};
use crate::error::{SamarthError, SamarthResult};
use crate::logging::{LogContext, PerformanceLogger};

/// The three remote datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetKind {
    Rainfall,
    CropPrice,
    Msp,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [DatasetKind::Rainfall, DatasetKind::CropPrice, DatasetKind::Msp];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Rainfall => "rainfall",
            DatasetKind::CropPrice => "crop-price",
            DatasetKind::Msp => "msp",
        }
    }

    /// Provenance label shown with answers
    pub fn source_label(&self) -> &'static str {
        match self {
            DatasetKind::Rainfall => "IMD (via data.gov.in)",
            DatasetKind::CropPrice => "Agmarknet (via data.gov.in)",
            DatasetKind::Msp => "Department of Agriculture & Farmers Welfare",
        }
    }

    pub fn resource_id<'a>(&self, sources: &'a SourcesConfig) -> &'a str {
        match self {
            DatasetKind::Rainfall => &sources.rainfall_resource,
            DatasetKind::CropPrice => &sources.crop_price_resource,
            DatasetKind::Msp => &sources.msp_resource,
        }
    }

    /// Only the rainfall endpoint is fetched page by page
    pub fn paginated(&self) -> bool {
        matches!(self, DatasetKind::Rainfall)
    }

    pub fn schema(&self) -> DatasetSchema {
        match self {
            DatasetKind::Rainfall => DatasetSchema::rainfall(),
            DatasetKind::CropPrice => DatasetSchema::crop_price(),
            DatasetKind::Msp => DatasetSchema::msp(),
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DatasetKind {
    type Err = SamarthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rainfall" | "rain" => Ok(DatasetKind::Rainfall),
            "crop-price" | "crop_price" | "crop" | "crops" => Ok(DatasetKind::CropPrice),
            "msp" => Ok(DatasetKind::Msp),
            _ => Err(SamarthError::UnknownDataset { name: s.to_string() }),
        }
    }
}

/// Fetches one page of records from a dataset endpoint
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch_records(&self, url: &Url) -> SamarthResult<Vec<Record>>;
}

/// Pull the `records` array out of an API response body
pub fn extract_records(url: &Url, body: Value) -> SamarthResult<Vec<Record>> {
    let records = match body {
        Value::Object(mut object) => object.remove("records"),
        _ => None,
    };

    match records {
        Some(Value::Array(items)) => {
            let total = items.len();
            let records: Vec<Record> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect();

            if records.len() < total {
                warn!(
                    "Skipped {} non-object records from {}",
                    total - records.len(),
                    http_client::redact(url)
                );
            }
            Ok(records)
        }
        Some(_) => Err(SamarthError::InvalidResponse {
            url: http_client::redact(url),
            message: "'records' is not an array".to_string(),
        }),
        None => Err(SamarthError::MissingRecords { url: http_client::redact(url) }),
    }
}

/// A dataset as handed to the question handlers
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub kind: DatasetKind,
    pub dataset: Arc<Dataset>,
    /// User-facing fetch error; the dataset is empty when set
    pub notice: Option<String>,
}

/// Loads the remote datasets into [`Dataset`]s
pub struct DatasetLoader {
    fetcher: Arc<dyn RecordFetcher>,
    sources: SourcesConfig,
}

impl DatasetLoader {
    pub fn new(fetcher: Arc<dyn RecordFetcher>, sources: &SourcesConfig) -> Self {
        Self {
            fetcher,
            sources: sources.clone(),
        }
    }

    /// Request URL for a dataset, without pagination offset
    pub fn dataset_url(&self, kind: DatasetKind) -> SamarthResult<Url> {
        let base = self.sources.api_base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, kind.resource_id(&self.sources)))
            .map_err(|e| SamarthError::config(format!("Invalid dataset URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("api-key", &self.sources.api_key)
            .append_pair("format", "json")
            .append_pair("limit", &self.sources.record_limit.to_string());

        Ok(url)
    }

    /// Dataset URL shown as provenance, with the access key left out
    pub fn source_url(&self, kind: DatasetKind) -> String {
        let base = self.sources.api_base_url.trim_end_matches('/');
        format!(
            "{}/{}?format=json&limit={}",
            base,
            kind.resource_id(&self.sources),
            self.sources.record_limit
        )
    }

    /// Fetch a dataset and normalize its column names
    pub async fn fetch(&self, kind: DatasetKind) -> SamarthResult<Dataset> {
        let url = self.dataset_url(kind)?;

        let records = if kind.paginated() {
            self.fetch_paginated(&url).await?
        } else {
            self.fetcher.fetch_records(&url).await?
        };

        let mut dataset = Dataset::from_records(&records).rename_columns(normalize_column_name);

        if kind == DatasetKind::CropPrice {
            if let Some(index) = dataset.column_index("state") {
                dataset.map_column(index, |cell| match cell {
                    Value::String(s) => Value::String(s.trim().to_string()),
                    other => other.clone(),
                });
            }
        }

        Ok(dataset)
    }

    /// Accumulate pages until one is shorter than the page size or empty
    async fn fetch_paginated(&self, base: &Url) -> SamarthResult<Vec<Record>> {
        let mut all_records = Vec::new();
        let mut offset = 0usize;

        loop {
            let mut url = base.clone();
            url.query_pairs_mut().append_pair("offset", &offset.to_string());

            let page = match self.fetcher.fetch_records(&url).await {
                Ok(page) => page,
                Err(SamarthError::MissingRecords { .. }) if offset > 0 => {
                    warn!("Page at offset {} has no records key, stopping pagination", offset);
                    break;
                }
                Err(e) => return Err(e),
            };

            let page_len = page.len();
            debug!("Fetched {} records at offset {}", page_len, offset);

            if page_len == 0 {
                break;
            }

            all_records.extend(page);
            offset += page_len;

            if page_len < self.sources.page_size {
                break;
            }
        }

        Ok(all_records)
    }

    /// Fetch a dataset, degrading to an empty dataset with a notice on failure
    pub async fn load(&self, kind: DatasetKind) -> LoadedDataset {
        let context = LogContext::new("source", "load_dataset")
            .with_dataset(kind.name())
            .with_url(self.source_url(kind));
        let perf = PerformanceLogger::new(context.clone());

        match self.fetch(kind).await {
            Ok(dataset) => {
                let report = kind.schema().validate(&dataset);
                if !report.is_valid() {
                    let drift_context = context
                        .with_rows(dataset.len())
                        .with_error_category("dataset")
                        .with_string_field("missing", report.missing.join(", "));
                    crate::log_warn!(drift_context, "Dataset does not match its expected schema");
                }

                perf.with_rows(dataset.len())
                    .finish_with_status("Dataset loaded", "ok");

                LoadedDataset {
                    kind,
                    dataset: Arc::new(dataset),
                    notice: None,
                }
            }
            Err(e) => {
                if e.is_recoverable() {
                    debug!("Fetch of {} will be retried on the next question", kind);
                }
                perf.finish_with_error("Dataset fetch failed", &e);
                LoadedDataset {
                    kind,
                    dataset: Arc::new(Dataset::empty()),
                    notice: Some(format!("Error fetching data: {}", e)),
                }
            }
        }
    }
}

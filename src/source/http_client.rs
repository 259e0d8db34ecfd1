use async_trait::async_trait;
use reqwest::{header::{HeaderMap, HeaderValue}, Client};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::{extract_records, RecordFetcher};
use crate::config::SourcesConfig;
use crate::dataset::Record;
use crate::error::{SamarthError, SamarthResult};

/// HTTP client for the open data API with request statistics
pub struct HttpClient {
    client: Client,
    metrics: Arc<RwLock<HttpMetrics>>,
}

#[derive(Debug, Default)]
struct HttpMetrics {
    request_durations: Vec<Duration>,
    success_count: u64,
    error_count: u64,
    records_received: u64,
}

impl HttpClient {
    /// Create a client; no timeout is applied unless one is configured
    pub fn new(config: &SourcesConfig) -> SamarthResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .user_agent(concat!("samarth/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let client = builder
            .build()
            .map_err(|e| SamarthError::config(format!("Failed to build HTTP client: {}", e)))?;

        info!("HTTP client initialized");

        Ok(Self {
            client,
            metrics: Arc::new(RwLock::new(HttpMetrics::default())),
        })
    }

    async fn record_request(&self, duration: Duration, outcome: Option<usize>) {
        let mut metrics = self.metrics.write().await;

        metrics.request_durations.push(duration);
        match outcome {
            Some(records) => {
                metrics.success_count += 1;
                metrics.records_received += records as u64;
            }
            None => metrics.error_count += 1,
        }

        if metrics.request_durations.len() > 1000 {
            metrics.request_durations.drain(0..500);
        }
    }

    /// Get request statistics
    pub async fn stats(&self) -> HttpStats {
        let metrics = self.metrics.read().await;

        let avg_response_time = if metrics.request_durations.is_empty() {
            Duration::from_secs(0)
        } else {
            metrics.request_durations.iter().sum::<Duration>() / metrics.request_durations.len() as u32
        };

        HttpStats {
            total_requests: metrics.success_count + metrics.error_count,
            success_count: metrics.success_count,
            error_count: metrics.error_count,
            records_received: metrics.records_received,
            avg_response_time,
        }
    }

    async fn get_records(&self, url: &Url) -> SamarthResult<Vec<Record>> {
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SamarthError::HttpRequest {
                url: redact(url),
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| SamarthError::InvalidResponse {
            url: redact(url),
            message: e.without_url().to_string(),
        })?;

        extract_records(url, body)
    }
}

#[async_trait]
impl RecordFetcher for HttpClient {
    async fn fetch_records(&self, url: &Url) -> SamarthResult<Vec<Record>> {
        let start_time = Instant::now();
        debug!("HTTP GET {}", redact(url));

        let result = self.get_records(url).await;
        let duration = start_time.elapsed();

        match &result {
            Ok(records) => {
                debug!("Received {} records in {}ms", records.len(), duration.as_millis());
                self.record_request(duration, Some(records.len())).await;
            }
            Err(e) => {
                warn!("HTTP request failed for {}: {}", redact(url), e);
                self.record_request(duration, None).await;
            }
        }

        result
    }
}

/// URL with the `api-key` query parameter masked, for logs and error messages
pub fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "api-key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), value)
        })
        .collect();

    if pairs.is_empty() {
        return shown.to_string();
    }

    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

/// HTTP request statistics
#[derive(Debug, Clone)]
pub struct HttpStats {
    pub total_requests: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub records_received: u64,
    pub avg_response_time: Duration,
}

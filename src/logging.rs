use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Initialize logging system
///
/// `RUST_LOG` takes precedence over the configured level. Console output goes
/// to stderr so answers printed on stdout stay pipeable.
pub fn init_logging(config: &LoggingConfig, log_directory: &Path) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers = Vec::new();

    if config.console_enabled {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .boxed();

        layers.push(console_layer);
    }

    if config.file_enabled {
        std::fs::create_dir_all(log_directory)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("samarth")
            .filename_suffix("log")
            .max_log_files(config.max_files)
            .build(log_directory)?;

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(file_appender)
            .boxed();

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_enabled {
        info!("Log directory: {}", log_directory.display());
    }

    Ok(())
}

/// Structured logging context
#[derive(Debug, Clone, Serialize)]
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub request_id: Option<String>,
    pub dataset: Option<String>,
    pub intent: Option<String>,
    pub url: Option<String>,
    pub rows: Option<u64>,
    pub duration_ms: Option<u64>,
    pub status: Option<String>,
    pub error_category: Option<String>,
    pub additional_fields: HashMap<String, serde_json::Value>,
}

impl LogContext {
    pub fn new(component: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            request_id: None,
            dataset: None,
            intent: None,
            url: None,
            rows: None,
            duration_ms: None,
            status: None,
            error_category: None,
            additional_fields: HashMap::new(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows as u64);
        self
    }

    pub fn with_duration(mut self, duration: std::time::Duration) -> Self {
        self.duration_ms = Some(duration.as_millis() as u64);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_error_category(mut self, category: impl Into<String>) -> Self {
        self.error_category = Some(category.into());
        self
    }

    pub fn with_string_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_fields
            .insert(key.into(), serde_json::Value::String(value.into()));
        self
    }
}

/// Structured logging macros
#[macro_export]
macro_rules! log_info {
    ($context:expr, $message:expr) => {
        tracing::info!(
            component = $context.component,
            operation = $context.operation,
            request_id = $context.request_id,
            dataset = $context.dataset,
            intent = $context.intent,
            url = $context.url,
            rows = $context.rows,
            duration_ms = $context.duration_ms,
            status = $context.status,
            additional_fields = ?$context.additional_fields,
            $message
        );
    };
}

#[macro_export]
macro_rules! log_warn {
    ($context:expr, $message:expr) => {
        tracing::warn!(
            component = $context.component,
            operation = $context.operation,
            request_id = $context.request_id,
            dataset = $context.dataset,
            intent = $context.intent,
            url = $context.url,
            rows = $context.rows,
            status = $context.status,
            error_category = $context.error_category,
            additional_fields = ?$context.additional_fields,
            $message
        );
    };
}

#[macro_export]
macro_rules! log_error {
    ($context:expr, $error:expr, $message:expr) => {
        tracing::error!(
            component = $context.component,
            operation = $context.operation,
            request_id = $context.request_id,
            dataset = $context.dataset,
            url = $context.url,
            error_category = $context.error_category,
            additional_fields = ?$context.additional_fields,
            error = %$error,
            $message
        );
    };
}

#[macro_export]
macro_rules! log_debug {
    ($context:expr, $message:expr) => {
        tracing::debug!(
            component = $context.component,
            operation = $context.operation,
            request_id = $context.request_id,
            additional_fields = ?$context.additional_fields,
            $message
        );
    };
}

/// Times an operation and logs its duration on completion
pub struct PerformanceLogger {
    context: LogContext,
    start_time: std::time::Instant,
}

impl PerformanceLogger {
    pub fn new(context: LogContext) -> Self {
        Self {
            context,
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.context = self.context.with_rows(rows);
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.context = self.context.with_intent(intent);
        self
    }

    pub fn finish_with_status(self, message: &str, status: impl Into<String>) {
        let duration = self.start_time.elapsed();
        let context = self.context.with_duration(duration).with_status(status);
        tracing::info!(
            component = context.component,
            operation = context.operation,
            request_id = context.request_id,
            dataset = context.dataset,
            intent = context.intent,
            rows = context.rows,
            duration_ms = context.duration_ms,
            status = context.status,
            "{}", message
        );
    }

    pub fn finish_with_error(self, message: &str, error: &crate::error::SamarthError) {
        let duration = self.start_time.elapsed();
        let context = self
            .context
            .with_duration(duration)
            .with_status("error")
            .with_error_category(error.category());
        tracing::error!(
            component = context.component,
            operation = context.operation,
            request_id = context.request_id,
            dataset = context.dataset,
            url = context.url,
            duration_ms = context.duration_ms,
            status = context.status,
            error_category = context.error_category,
            error = %error,
            "{}", message
        );
    }
}

/// Request ID generation
pub struct RequestIdGenerator;

impl RequestIdGenerator {
    pub fn generate() -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let timestamp = chrono::Utc::now().timestamp_millis();
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

        format!("q-{}-{:04}", timestamp, counter % 10000)
    }
}

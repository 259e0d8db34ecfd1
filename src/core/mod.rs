use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::dataset::{Dataset, SchemaReport};
use crate::error::SamarthResult;
use crate::export::{ExportFormat, ExportManager, ExportStats};
use crate::logging::{LogContext, PerformanceLogger, RequestIdGenerator};
use crate::query::{dispatch, route, Answer, HandlerInput, Intent};
use crate::security::QuestionValidator;
use crate::source::http_client::HttpStats;
use crate::source::{DatasetCache, DatasetKind, DatasetLoader, HttpClient, RecordFetcher};

/// Core application: validates, routes and answers questions
pub struct Samarth {
    config: AppConfig,
    loader: DatasetLoader,
    cache: DatasetCache,
    validator: QuestionValidator,
    export_manager: ExportManager,
    http: Option<Arc<HttpClient>>,
}

/// A question together with its answer
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub request_id: String,
    pub question: String,
    pub intent: Intent,
    pub answer: Answer,
    /// Dataset fetch problems met while answering
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

/// Shape of a freshly fetched dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInspection {
    pub kind: DatasetKind,
    pub source_url: String,
    pub columns: Vec<String>,
    pub rows: usize,
    pub report: SchemaReport,
}

impl Samarth {
    /// Initialize against the live open data API
    pub fn new(config: AppConfig) -> SamarthResult<Self> {
        info!("Initializing Samarth core");

        let http = Arc::new(HttpClient::new(&config.sources)?);
        let mut app = Self::with_fetcher(config, http.clone())?;
        app.http = Some(http);
        Ok(app)
    }

    /// Initialize with any record source
    pub fn with_fetcher(config: AppConfig, fetcher: Arc<dyn RecordFetcher>) -> SamarthResult<Self> {
        let loader = DatasetLoader::new(fetcher, &config.sources);
        let cache = DatasetCache::new(&config.cache)?;
        let validator = QuestionValidator::new(&config.query);
        let export_manager = ExportManager::new(&config.export);

        Ok(Self {
            config,
            loader,
            cache,
            validator,
            export_manager,
            http: None,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Answer one question
    pub async fn ask(&self, question: &str) -> Response {
        let request_id = RequestIdGenerator::generate();
        let context = LogContext::new("core", "ask").with_request_id(&request_id);
        let perf = PerformanceLogger::new(context.clone());

        if let Err(e) = self.validator.validate(question) {
            let context = context.with_status("rejected").with_error_category(e.category());
            crate::log_warn!(context, "Question rejected");
            perf.finish_with_status("Question rejected", "rejected");

            return Response {
                request_id,
                question: question.to_string(),
                intent: Intent::Unknown,
                answer: Answer::rejected(&e),
                notices: Vec::new(),
            };
        }

        let question = self.validator.sanitize(question);
        let intent = route(&question);
        let context = context.with_intent(intent.name());
        let perf = perf.with_intent(intent.name());
        crate::log_debug!(context, "Question routed");

        let mut notices = Vec::new();
        let (dataset, source_url) = match intent.dataset() {
            Some(kind) => {
                let loaded = self.cache.get_or_load(kind, &self.loader).await;
                notices.extend(loaded.notice);
                (loaded.dataset, self.loader.source_url(kind))
            }
            None => (Arc::new(Dataset::empty()), String::new()),
        };

        let answer = dispatch(
            intent,
            &HandlerInput {
                question: &question,
                dataset: &dataset,
                source_url: &source_url,
                options: &self.config.query,
            },
        );

        match (&answer.meta, answer.failure) {
            (Some(meta), _) => perf
                .with_rows(meta.rows_used)
                .finish_with_status("Question answered", "ok"),
            (None, Some(failure)) => {
                let context = context
                    .with_status(failure.as_str())
                    .with_string_field("message", answer.message.clone());
                crate::log_warn!(context, "Question not answered");
                perf.finish_with_status("Question not answered", failure.as_str());
            }
            (None, None) => perf.finish_with_status("Question not answered", "failed"),
        }

        Response {
            request_id,
            question,
            intent,
            answer,
            notices,
        }
    }

    /// Fetch a dataset bypassing the cache and check it against its schema
    pub async fn inspect(&self, kind: DatasetKind) -> SamarthResult<DatasetInspection> {
        let dataset = match self.loader.fetch(kind).await {
            Ok(dataset) => dataset,
            Err(e) => {
                let context = LogContext::new("core", "inspect")
                    .with_dataset(kind.name())
                    .with_url(self.loader.source_url(kind))
                    .with_error_category(e.category());
                crate::log_error!(context, &e, "Dataset inspection failed");
                return Err(e);
            }
        };
        let report = kind.schema().validate(&dataset);

        Ok(DatasetInspection {
            kind,
            source_url: self.loader.source_url(kind),
            columns: dataset.columns().to_vec(),
            rows: dataset.len(),
            report,
        })
    }

    /// Forget cached datasets so the next question refetches
    pub fn refresh(&self) {
        info!("Refreshing dataset cache");
        self.cache.invalidate_all();
    }

    /// Write an answer's table; returns `None` when the answer has no table
    pub async fn export_answer(
        &self,
        response: &Response,
        output_path: Option<&Path>,
        format: Option<ExportFormat>,
    ) -> SamarthResult<Option<ExportStats>> {
        let Some(table) = &response.answer.table else {
            return Ok(None);
        };

        let format = match format {
            Some(format) => format,
            None => self.export_manager.default_format()?,
        };
        let path = match output_path {
            Some(path) => path.to_path_buf(),
            None => self.export_manager.default_path(response.intent.name(), format),
        };

        self.export_manager.export(table, &path, format).await.map(Some)
    }

    /// Request statistics of the live HTTP client
    pub async fn http_stats(&self) -> Option<HttpStats> {
        match &self.http {
            Some(http) => Some(http.stats().await),
            None => None,
        }
    }
}

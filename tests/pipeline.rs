use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

use samarth::config::AppConfig;
use samarth::dataset::Record;
use samarth::display::render_response;
use samarth::export::ExportFormat;
use samarth::source::RecordFetcher;
use samarth::{FailureKind, Intent, Samarth, SamarthResult};

/// In-memory stand-in for the open data API, keyed by resource id
struct FakeApi {
    config: AppConfig,
    requests: AtomicUsize,
}

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

impl FakeApi {
    fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
            requests: AtomicUsize::new(0),
        }
    }

    fn rainfall_page(offset: usize, page_size: usize) -> Vec<Record> {
        // 1500 rows: a full page followed by a short one
        let total = 1500;
        (offset..total.min(offset + page_size))
            .map(|i| {
                let (state, rain) = match i % 3 {
                    0 => ("Punjab", "100"),
                    1 => ("Gujarat", "50"),
                    _ => ("Kerala", "3000"),
                };
                record(json!({"State Name": state, "Annual Rainfall": rain, "Year": "2020"}))
            })
            .collect()
    }

    fn crop_prices() -> Vec<Record> {
        vec![
            record(json!({"State": " Punjab", "Commodity": "Wheat", "Min_Price": "2000", "Max_Price": "2200", "Modal_Price": "2100"})),
            record(json!({"State": "Punjab", "Commodity": "Wheat", "Min_Price": "2100", "Max_Price": "2300", "Modal_Price": "2300"})),
            record(json!({"State": "Punjab", "Commodity": "Potato", "Min_Price": "800", "Max_Price": "1000", "Modal_Price": "900"})),
            record(json!({"State": "Bihar", "Commodity": "Maize", "Min_Price": "1500", "Max_Price": "1700", "Modal_Price": "1600"})),
        ]
    }

    fn msp() -> Vec<Record> {
        vec![
            record(json!({"Crop": "Wheat", "MSP_2023_24": 2125, "MSP_2024_25": 2275})),
            record(json!({"Crop": "Paddy", "MSP_2023_24": 2183, "MSP_2024_25": 2300})),
            record(json!({"Crop": "Cotton", "MSP_2023_24": 6620, "MSP_2024_25": 7121})),
        ]
    }
}

#[async_trait]
impl RecordFetcher for FakeApi {
    async fn fetch_records(&self, url: &Url) -> SamarthResult<Vec<Record>> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let resource = url.path_segments().and_then(|s| s.last()).unwrap_or_default();
        let sources = &self.config.sources;

        if resource == sources.rainfall_resource {
            let offset = url
                .query_pairs()
                .find(|(k, _)| k == "offset")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(0);
            Ok(Self::rainfall_page(offset, sources.page_size))
        } else if resource == sources.crop_price_resource {
            Ok(Self::crop_prices())
        } else {
            Ok(Self::msp())
        }
    }
}

fn setup() -> (Arc<FakeApi>, Samarth) {
    let config = AppConfig::default();
    let api = Arc::new(FakeApi::new(&config));
    (api.clone(), Samarth::with_fetcher(config, api).unwrap())
}

#[tokio::test]
async fn test_rainfall_comparison_across_pages() {
    let (api, app) = setup();

    let response = app.ask("Compare the rainfall in Punjab and Gujarat").await;
    let answer = &response.answer;

    assert_eq!(response.intent, Intent::Rainfall);
    assert!(answer.success, "{}", answer.message);
    assert_eq!(answer.message, "Average Rainfall Comparison for Gujarat, Punjab:");

    let table = answer.table.as_ref().unwrap();
    assert_eq!(table.columns(), &["state_name", "annual_rainfall"]);
    assert_eq!(
        table.rows(),
        &[vec![json!("Gujarat"), json!(50.0)], vec![json!("Punjab"), json!(100.0)]]
    );
    assert_eq!(answer.meta.as_ref().unwrap().rows_used, 1000);

    // 1000 + 500 records
    assert_eq!(api.requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_crop_prices_for_state() {
    let (_, app) = setup();

    let response = app.ask("What is the crop production in Punjab").await;
    let answer = &response.answer;

    assert_eq!(response.intent, Intent::CropProduction);
    assert!(answer.success, "{}", answer.message);

    let table = answer.table.as_ref().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0][1], json!("wheat"));
    assert_eq!(table.rows()[0][4], json!(2200.0));
    assert_eq!(table.rows()[1][1], json!("potato"));

    let meta = answer.meta.as_ref().unwrap();
    assert_eq!(meta.rows_used, 3);
    assert!(!meta.source_url.contains("api-key"));
}

#[tokio::test]
async fn test_msp_with_misspelling_and_export() {
    let (_, app) = setup();

    let response = app.ask("show msp for whaet").await;
    assert_eq!(response.answer.message, "MSP Data for wheat:");

    let rendered = render_response(&response);
    assert!(rendered.contains("2275"));
    assert!(rendered.contains("Department of Agriculture & Farmers Welfare"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("msp.csv");
    let stats = app
        .export_answer(&response, Some(path.as_path()), Some(ExportFormat::Csv))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stats.record_count, 1);
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("crop,msp_2023_24,msp_2024_25"));
    assert!(contents.contains("Wheat,2125,2275"));
}

#[tokio::test]
async fn test_guidance_for_unanswerable_questions() {
    let (api, app) = setup();

    let unknown = app.ask("How is the weather today?").await;
    assert_eq!(
        unknown.answer.message,
        "Please ask a question related to rainfall, crop production, or MSP."
    );

    let no_state = app.ask("rainfall comparison please").await;
    assert_eq!(no_state.answer.failure, Some(FailureKind::InputValidation));
    assert_eq!(
        no_state.answer.message,
        "Please specify one or more states to compare rainfall."
    );

    // neither question needed more than the rainfall dataset
    assert_eq!(api.requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_repeated_question_is_idempotent_and_cached() {
    let (api, app) = setup();

    let first = app.ask("msp of paddy").await;
    let second = app.ask("msp of paddy").await;

    assert_eq!(first.answer, second.answer);
    assert_ne!(first.request_id, second.request_id);
    assert_eq!(api.requests.load(Ordering::SeqCst), 1);
}

use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::core::Samarth;

/// API request for a question
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/ask", web::post().to(ask))
            .route("/health", web::get().to(health_check)),
    );
}

/// Serve the API until the process is stopped
pub async fn serve(app: Arc<Samarth>, host: &str, port: u16) -> std::io::Result<()> {
    info!("API server listening on {}:{}", host, port);

    let data = web::Data::new(app);
    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure_routes))
        .bind((host, port))?
        .run()
        .await
}

/// Answer a question
async fn ask(app: web::Data<Arc<Samarth>>, req: web::Json<AskRequest>) -> ActixResult<HttpResponse> {
    info!("API: Answering question: {}", req.question);

    let response = app.ask(&req.question).await;
    Ok(HttpResponse::Ok().json(response))
}

/// Health check endpoint
async fn health_check() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::dataset::Record;
    use crate::error::SamarthResult;
    use crate::source::RecordFetcher;
    use actix_web::test;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use url::Url;

    struct StaticFetcher;

    #[async_trait]
    impl RecordFetcher for StaticFetcher {
        async fn fetch_records(&self, _url: &Url) -> SamarthResult<Vec<Record>> {
            Ok(vec![json!({"commodity": "Cotton", "msp": 6620}).as_object().cloned().unwrap()])
        }
    }

    fn app_data() -> web::Data<Arc<Samarth>> {
        web::Data::new(Arc::new(Samarth::with_fetcher(AppConfig::default(), Arc::new(StaticFetcher)).unwrap()))
    }

    #[actix_web::test]
    async fn test_ask_endpoint_returns_answer() {
        let service = test::init_service(App::new().app_data(app_data()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/ask")
            .set_json(json!({"question": "msp of cotton"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["intent"], "msp");
        assert_eq!(body["answer"]["success"], true);
        assert_eq!(body["answer"]["message"], "MSP Data for cotton:");
        assert_eq!(body["answer"]["meta"]["rows_used"], 1);
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let service = test::init_service(App::new().configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: Value = test::call_and_read_body_json(&service, req).await;

        assert_eq!(body["status"], "healthy");
    }
}

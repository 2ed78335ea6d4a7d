use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Region, Report, Review};
use crate::scrape;

use super::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub parser: CapabilityStatus,
    pub tagger: CapabilityStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapabilityStatus {
    pub status: String,
}

fn capability_status(available: bool) -> CapabilityStatus {
    CapabilityStatus {
        status: if available { "available" } else { "unavailable" }.to_string(),
    }
}

/// `GET /api/v1/health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthData> {
    Json(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        parser: capability_status(state.parser.is_available()),
        tagger: capability_status(state.tagger.is_available()),
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateReportsRequest {
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct CreateReportsResponse {
    pub reports: Vec<Report>,
}

/// `POST /api/v1/reports`
///
/// Analyzes a batch of reviews. The response is sent only once every report
/// has been produced, so a successful status acknowledges the whole batch;
/// reports come back in request order.
pub async fn create_reports(
    State(state): State<AppState>,
    Json(request): Json<CreateReportsRequest>,
) -> Result<Json<CreateReportsResponse>> {
    tracing::info!("Received {} reviews for analyzing", request.reviews.len());

    let reports = state.analyzer.process_many(&request.reviews).await?;

    tracing::info!("Finished analyzing {} reviews", reports.len());
    Ok(Json(CreateReportsResponse { reports }))
}

#[derive(Debug, Deserialize)]
pub struct ParseReviewsRequest {
    pub region: Region,
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct ParseReviewsResponse {
    pub reviews: Vec<Review>,
}

/// `POST /api/v1/reviews:parse`
///
/// Extracts reviews from a retail review-page HTML document.
pub async fn parse_reviews(
    Json(request): Json<ParseReviewsRequest>,
) -> Json<ParseReviewsResponse> {
    let reviews = scrape::amazon::parse_reviews(request.region, &request.html);
    Json(ParseReviewsResponse { reviews })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ReviewAnalyzer;
    use crate::classify::{
        BayesClassifier, CriticalityTable, LexiconSentiment, PhraseClassifier, SentimentScorer,
    };
    use crate::config::Config;
    use crate::nlp::{DependencyParser, HttpParser, HttpTagger, TemporalTagger};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        // No sidecar URLs configured: providers report unavailable.
        let config = Config {
            server: crate::config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            nlp: crate::config::NlpConfig {
                parser_url: None,
                tagger_url: None,
                timeout_secs: 1,
                tagger_cache_size: 10,
            },
            training: crate::config::TrainingConfig {
                relevance_path: String::new(),
                issue_detection_path: String::new(),
                issue_class_path: String::new(),
                sentiment_lexicon_path: String::new(),
            },
            analyzer: crate::config::AnalyzerConfig::default(),
        };

        let parser = Arc::new(HttpParser::new(&config.nlp).unwrap());
        let tagger = Arc::new(HttpTagger::new(&config.nlp).unwrap());

        let corpus = r#"[
            {"text": "bought it last week", "label": "relevant"},
            {"text": "my dog likes the yard", "label": "irrelevant"}
        ]"#;
        let relevance: Arc<dyn PhraseClassifier> =
            Arc::new(BayesClassifier::from_json(corpus).unwrap());
        let detect: Arc<dyn PhraseClassifier> = Arc::new(
            BayesClassifier::from_json(
                r#"[
                    {"text": "it broke", "label": "is_issue"},
                    {"text": "works fine", "label": "not_issue"}
                ]"#,
            )
            .unwrap(),
        );
        let class: Arc<dyn PhraseClassifier> = Arc::new(
            BayesClassifier::from_json(
                r#"[
                    {"text": "it shut down", "label": "Unexpected System Shutdown"},
                    {"text": "something odd", "label": "UNKNOWN_ISSUE"}
                ]"#,
            )
            .unwrap(),
        );
        let sentiment: Arc<dyn SentimentScorer> = Arc::new(LexiconSentiment::default());

        let analyzer = ReviewAnalyzer::new(
            parser.clone() as Arc<dyn DependencyParser>,
            tagger.clone() as Arc<dyn TemporalTagger>,
            relevance,
            detect,
            class,
            sentiment,
            Arc::new(CriticalityTable::default()),
            config.analyzer.clone(),
        );

        AppState::new(config, parser, tagger, analyzer)
    }

    #[tokio::test]
    async fn test_health_reports_capability_availability() {
        let app = crate::api::create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["parser"]["status"], "unavailable");
        assert_eq!(body["tagger"]["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_reports_endpoint_surfaces_unavailable_parser() {
        let app = crate::api::create_router(test_state());

        let review_json = serde_json::json!({
            "reviews": [{
                "author_id": null,
                "author_name": "A",
                "author_image_url": "",
                "title": "t",
                "text": "It broke.",
                "date": 1695686400,
                "date_text": "September 26, 2023",
                "review_id": "R1",
                "attributes": {},
                "verified_purchase": false,
                "found_helpful_count": 0,
                "is_top_positive_review": false,
                "is_top_critical_review": false,
                "images": [],
                "country_reviewed_in": "Canada",
                "region": "ca",
                "product_name": null,
                "manufacturer_name": null,
                "manufacturer_id": null
            }]
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/reports")
                    .header("content-type", "application/json")
                    .body(Body::from(review_json.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_parse_reviews_endpoint_returns_empty_for_blank_page() {
        let app = crate::api::create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/reviews:parse")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"region": "com", "html": "<html></html>"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["reviews"], serde_json::json!([]));
    }
}

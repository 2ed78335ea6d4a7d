use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReliaError {
    #[error("Parser error: {0}")]
    Parser(String),

    #[error("Parser unavailable: {0}")]
    ParserUnavailable(String),

    #[error("Temporal tagger error: {0}")]
    Tagger(String),

    #[error("Temporal tagger unavailable: {0}")]
    TaggerUnavailable(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Scrape error: {0}")]
    Scrape(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ReliaError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ReliaError::Parser(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ReliaError::ParserUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ReliaError::Tagger(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ReliaError::TaggerUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ReliaError::Classifier(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ReliaError::Scrape(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ReliaError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ReliaError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            ReliaError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ReliaError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ReliaError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ReliaError>;

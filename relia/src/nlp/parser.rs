use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::NlpConfig;
use crate::error::{ReliaError, Result};

use super::document::{ParsedDocument, ParsedToken};

/// External dependency-parsing capability.
///
/// The analyzer never parses text itself; it consumes the parse produced by
/// whatever stands behind this seam.
#[async_trait]
pub trait DependencyParser: Send + Sync {
    async fn parse(&self, text: &str) -> Result<ParsedDocument>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParserBackend {
    Http { base_url: String },
    Unavailable { reason: String },
}

/// Client for a spaCy-style dependency-parse sidecar.
#[derive(Debug, Clone)]
pub struct HttpParser {
    backend: ParserBackend,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ParseResponse {
    tokens: Vec<ParsedToken>,
}

impl HttpParser {
    pub fn new(config: &NlpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let backend = match &config.parser_url {
            Some(url) => ParserBackend::Http {
                base_url: url.trim_end_matches('/').to_string(),
            },
            None => ParserBackend::Unavailable {
                reason: "PARSER_URL is not set".to_string(),
            },
        };

        Ok(Self { backend, client })
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, ParserBackend::Unavailable { .. })
    }
}

#[async_trait]
impl DependencyParser for HttpParser {
    async fn parse(&self, text: &str) -> Result<ParsedDocument> {
        let base_url = match &self.backend {
            ParserBackend::Http { base_url } => base_url,
            ParserBackend::Unavailable { reason } => {
                return Err(ReliaError::ParserUnavailable(reason.clone()));
            }
        };

        let response = self
            .client
            .post(format!("{base_url}/parse"))
            .json(&ParseRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReliaError::Parser(format!(
                "parse service returned {}",
                response.status()
            )));
        }

        let body: ParseResponse = response.json().await?;
        Ok(ParsedDocument::new(text.to_string(), body.tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::document::{DepRel, Pos};
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_with(url: Option<String>) -> NlpConfig {
        NlpConfig {
            parser_url: url,
            tagger_url: None,
            timeout_secs: 5,
            tagger_cache_size: 10,
        }
    }

    #[test]
    fn test_parser_unavailable_without_url() {
        let parser = HttpParser::new(&config_with(None)).unwrap();
        assert!(!parser.is_available());
    }

    #[tokio::test]
    async fn test_parse_unavailable_returns_error() {
        let parser = HttpParser::new(&config_with(None)).unwrap();
        let err = parser.parse("It broke.").await.unwrap_err();
        assert!(matches!(err, ReliaError::ParserUnavailable(_)));
    }

    #[tokio::test]
    async fn test_parse_builds_document_from_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/parse"))
            .and(body_json_string(r#"{"text":"It broke"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tokens": [
                    {"text": "It", "whitespace": " ", "offset": 0,
                     "pos": "PRON", "dep": "nsubj", "head": 1, "sent": 0},
                    {"text": "broke", "whitespace": "", "offset": 3,
                     "pos": "VERB", "dep": "ROOT", "head": 1, "sent": 0}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let parser = HttpParser::new(&config_with(Some(server.uri()))).unwrap();
        let doc = parser.parse("It broke").await.unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.token(0).pos, Pos::Pron);
        assert_eq!(doc.token(0).dep, DepRel::Other);
        assert_eq!(doc.token(1).pos, Pos::Verb);
        assert_eq!(doc.token(1).dep, DepRel::Root);
        assert_eq!(doc.text(), "It broke");
    }

    #[tokio::test]
    async fn test_parse_service_error_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/parse"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let parser = HttpParser::new(&config_with(Some(server.uri()))).unwrap();
        let err = parser.parse("It broke").await.unwrap_err();
        assert!(matches!(err, ReliaError::Parser(_)));
    }
}

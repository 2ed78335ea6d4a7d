use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::config::NlpConfig;
use crate::error::{ReliaError, Result};

/// Category of a recognized time expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimexType {
    Date,
    Time,
    Duration,
    Set,
    #[serde(other)]
    Other,
}

/// One recognized time expression: its category, normalized value (an
/// ISO-8601 string or a sentinel such as `PRESENT_REF`) and byte offsets
/// into the tagged text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimexSpan {
    #[serde(rename = "type")]
    pub timex_type: TimexType,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// External temporal-tagging capability. `reference` anchors relative
/// expressions ("three days ago") to the review post date.
#[async_trait]
pub trait TemporalTagger: Send + Sync {
    async fn tag(&self, text: &str, reference: DateTime<Utc>) -> Result<Vec<TimexSpan>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TaggerBackend {
    Http { base_url: String },
    Unavailable { reason: String },
}

/// Client for a SUTime-style temporal tagging sidecar, with an LRU cache of
/// responses keyed by `(text, reference)`.
#[derive(Clone)]
pub struct HttpTagger {
    backend: TaggerBackend,
    client: reqwest::Client,
    cache: Arc<Mutex<LruCache<String, Vec<TimexSpan>>>>,
}

#[derive(Serialize)]
struct TagRequest<'a> {
    text: &'a str,
    reference: String,
}

impl HttpTagger {
    pub fn new(config: &NlpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let backend = match &config.tagger_url {
            Some(url) => TaggerBackend::Http {
                base_url: url.trim_end_matches('/').to_string(),
            },
            None => TaggerBackend::Unavailable {
                reason: "TAGGER_URL is not set".to_string(),
            },
        };

        let capacity = NonZeroUsize::new(config.tagger_cache_size).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            backend,
            client,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        })
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, TaggerBackend::Unavailable { .. })
    }

    fn cache_key(text: &str, reference: DateTime<Utc>) -> String {
        let mut hasher = DefaultHasher::new();
        text.as_bytes().hash(&mut hasher);
        reference.timestamp().hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}

#[async_trait]
impl TemporalTagger for HttpTagger {
    async fn tag(&self, text: &str, reference: DateTime<Utc>) -> Result<Vec<TimexSpan>> {
        let base_url = match &self.backend {
            TaggerBackend::Http { base_url } => base_url,
            TaggerBackend::Unavailable { reason } => {
                return Err(ReliaError::TaggerUnavailable(reason.clone()));
            }
        };

        let key = Self::cache_key(text, reference);
        if let Some(spans) = self.cache.lock().unwrap().get(&key) {
            return Ok(spans.clone());
        }

        let response = self
            .client
            .post(format!("{base_url}/tag"))
            .json(&TagRequest {
                text,
                reference: reference.to_rfc3339(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReliaError::Tagger(format!(
                "tagger service returned {}",
                response.status()
            )));
        }

        let spans: Vec<TimexSpan> = response.json().await?;
        self.cache.lock().unwrap().put(key, spans.clone());
        Ok(spans)
    }
}

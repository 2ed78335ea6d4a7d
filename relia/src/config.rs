use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub nlp: NlpConfig,
    pub training: TrainingConfig,
    pub analyzer: AnalyzerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Endpoints of the out-of-process language model sidecars.
///
/// The dependency parser and the temporal tagger are external capabilities:
/// the analyzer only consumes their output. Leaving a URL unset marks the
/// corresponding provider unavailable.
#[derive(Debug, Clone, Deserialize)]
pub struct NlpConfig {
    pub parser_url: Option<String>,
    pub tagger_url: Option<String>,
    pub timeout_secs: u64,
    pub tagger_cache_size: usize,
}

/// Paths to the pre-labeled classifier corpora and the sentiment lexicon.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    pub relevance_path: String,
    pub issue_detection_path: String,
    pub issue_class_path: String,
    pub sentiment_lexicon_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Minimum probability for a phrase to count as ownership-relevant.
    pub ownership_relevance_threshold: f64,
    /// Minimum probability for the binary issue-detection fallback.
    pub issue_detection_threshold: f64,
    /// Probability a class label must exceed to classify an issue directly.
    pub issue_class_threshold: f64,
    /// Maximum head distance for clausal-complement verbs to stay in a clause.
    pub clause_distance_threshold: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ownership_relevance_threshold: 0.9,
            issue_detection_threshold: 0.9,
            issue_class_threshold: 0.1,
            clause_distance_threshold: 25,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("RELIA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("RELIA_PORT", 3000),
            },
            nlp: NlpConfig {
                parser_url: env::var("PARSER_URL").ok(),
                tagger_url: env::var("TAGGER_URL").ok(),
                timeout_secs: parse_env_or("NLP_TIMEOUT", 30),
                tagger_cache_size: parse_env_or("TAGGER_CACHE_SIZE", 1000),
            },
            training: TrainingConfig {
                relevance_path: env::var("TRAIN_RELEVANCE_PATH")
                    .unwrap_or_else(|_| "data/train_relevance.json".to_string()),
                issue_detection_path: env::var("TRAIN_ISSUE_DETECTION_PATH")
                    .unwrap_or_else(|_| "data/train_issue_detection.json".to_string()),
                issue_class_path: env::var("TRAIN_ISSUE_CLASS_PATH")
                    .unwrap_or_else(|_| "data/train_issue_class.json".to_string()),
                sentiment_lexicon_path: env::var("SENTIMENT_LEXICON_PATH")
                    .unwrap_or_else(|_| "data/sentiment_lexicon.json".to_string()),
            },
            analyzer: AnalyzerConfig {
                ownership_relevance_threshold: parse_env_or(
                    "ANALYZER_THRESHOLD_OWNERSHIP_REL",
                    0.9,
                ),
                issue_detection_threshold: parse_env_or("ANALYZER_THRESHOLD_ISSUE_REL", 0.9),
                issue_class_threshold: parse_env_or("ANALYZER_THRESHOLD_ISSUE_CLASS", 0.1),
                clause_distance_threshold: parse_env_or("ANALYZER_THRESHOLD_CCOMP_MAX_DIST", 25),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

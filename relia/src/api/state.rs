use std::sync::Arc;

use crate::analysis::ReviewAnalyzer;
use crate::config::Config;
use crate::nlp::{HttpParser, HttpTagger};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Concrete provider handles, kept for availability reporting; the
    /// analyzer shares the same instances behind its trait seams.
    pub parser: Arc<HttpParser>,
    pub tagger: Arc<HttpTagger>,
    pub analyzer: ReviewAnalyzer,
}

impl AppState {
    pub fn new(
        config: Config,
        parser: Arc<HttpParser>,
        tagger: Arc<HttpTagger>,
        analyzer: ReviewAnalyzer,
    ) -> Self {
        Self {
            config: Arc::new(config),
            parser,
            tagger,
            analyzer,
        }
    }
}

pub mod clauses;
mod issues;
mod keyframes;


use std::sync::Arc;

use crate::classify::{CriticalityTable, PhraseClassifier, SentimentScorer};
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::models::{Report, Review};
use crate::nlp::{DependencyParser, TemporalTagger};

pub use issues::UNKNOWN_ISSUE;

/// The per-review analysis pipeline.
///
/// All capabilities are injected once at construction and shared read-only
/// across calls, so one analyzer serves any number of concurrent reviews.
#[derive(Clone)]
pub struct ReviewAnalyzer {
    parser: Arc<dyn DependencyParser>,
    tagger: Arc<dyn TemporalTagger>,
    relevance: Arc<dyn PhraseClassifier>,
    issue_detect: Arc<dyn PhraseClassifier>,
    issue_class: Arc<dyn PhraseClassifier>,
    sentiment: Arc<dyn SentimentScorer>,
    criticality: Arc<CriticalityTable>,
    config: AnalyzerConfig,
}

impl ReviewAnalyzer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        parser: Arc<dyn DependencyParser>,
        tagger: Arc<dyn TemporalTagger>,
        relevance: Arc<dyn PhraseClassifier>,
        issue_detect: Arc<dyn PhraseClassifier>,
        issue_class: Arc<dyn PhraseClassifier>,
        sentiment: Arc<dyn SentimentScorer>,
        criticality: Arc<CriticalityTable>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            parser,
            tagger,
            relevance,
            issue_detect,
            issue_class,
            sentiment,
            criticality,
            config,
        }
    }

    /// Processes one review into a reliability report.
    pub async fn process(&self, review: &Review) -> Result<Report> {
        let doc = self.parser.parse(&review.text).await?;

        let clauses = clauses::segment_clauses(&doc, self.config.clause_distance_threshold);
        tracing::debug!(
            review_id = %review.review_id,
            clauses = clauses.len(),
            "segmented review"
        );

        let keyframes = keyframes::extract_keyframes(
            &doc,
            &clauses,
            review.date,
            self.tagger.as_ref(),
            self.relevance.as_ref(),
            self.sentiment.as_ref(),
            self.config.ownership_relevance_threshold,
        )
        .await?;

        let issues = issues::extract_issues(
            &doc,
            &clauses,
            &keyframes,
            self.issue_class.as_ref(),
            self.issue_detect.as_ref(),
            &self.criticality,
            self.config.issue_class_threshold,
            self.config.issue_detection_threshold,
        );

        Ok(Report {
            review_id: review.review_id.clone(),
            report_weight: 1.0,
            reliability_keyframes: keyframes,
            issues,
        })
    }

    /// Processes a batch of reviews concurrently. Reports come back in input
    /// order; the first failing review fails the batch.
    pub async fn process_many(&self, reviews: &[Review]) -> Result<Vec<Report>> {
        futures::future::try_join_all(reviews.iter().map(|review| self.process(review))).await
    }
}

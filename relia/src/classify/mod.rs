mod bayes;
mod criticality;
mod sentiment;

pub use bayes::{BayesClassifier, PhraseClassifier, ProbDist};
pub use criticality::{CriticalityTable, DEFAULT_CRITICALITY};
pub use sentiment::{LexiconSentiment, SentimentScorer};

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{ReliaError, Result};

/// A probability distribution over labels.
#[derive(Debug, Clone)]
pub struct ProbDist {
    probs: Vec<(String, f64)>,
}

impl ProbDist {
    pub fn new(probs: Vec<(String, f64)>) -> Self {
        Self { probs }
    }

    /// Probability of `label`, 0 when the label is unknown.
    pub fn prob(&self, label: &str) -> f64 {
        self.probs
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    /// Labels by descending probability; ties keep training order.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .probs
            .iter()
            .map(|(l, p)| (l.as_str(), *p))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// Phrase-level statistical classification capability. Implementations are
/// pre-trained black boxes; the analyzer only reads label probabilities.
pub trait PhraseClassifier: Send + Sync {
    fn prob_classify(&self, text: &str) -> ProbDist;
}

#[derive(Debug, Deserialize)]
struct LabeledExample {
    text: String,
    label: String,
}

/// Bernoulli naive Bayes over word presence, with expected-likelihood
/// smoothing. Loaded from a pre-labeled JSON corpus of
/// `[{"text": …, "label": …}]` entries.
#[derive(Debug)]
pub struct BayesClassifier {
    labels: Vec<String>,
    doc_counts: Vec<usize>,
    vocab: Vec<String>,
    vocab_index: HashMap<String, usize>,
    /// `presence[label][word] = number of label docs containing word`.
    presence: Vec<HashMap<usize, usize>>,
    total_docs: usize,
}

fn words_of(text: &str) -> HashSet<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

impl BayesClassifier {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(&path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let examples: Vec<LabeledExample> = serde_json::from_str(raw)?;
        if examples.is_empty() {
            return Err(ReliaError::Classifier(
                "training corpus is empty".to_string(),
            ));
        }

        let mut labels: Vec<String> = Vec::new();
        let mut label_index: HashMap<String, usize> = HashMap::new();
        let mut doc_counts: Vec<usize> = Vec::new();
        let mut vocab: Vec<String> = Vec::new();
        let mut vocab_index: HashMap<String, usize> = HashMap::new();
        let mut presence: Vec<HashMap<usize, usize>> = Vec::new();

        for example in &examples {
            let l = *label_index.entry(example.label.clone()).or_insert_with(|| {
                labels.push(example.label.clone());
                doc_counts.push(0);
                presence.push(HashMap::new());
                labels.len() - 1
            });
            doc_counts[l] += 1;

            for word in words_of(&example.text) {
                let w = *vocab_index.entry(word.clone()).or_insert_with(|| {
                    vocab.push(word);
                    vocab.len() - 1
                });
                *presence[l].entry(w).or_insert(0) += 1;
            }
        }

        Ok(Self {
            labels,
            doc_counts,
            vocab,
            vocab_index,
            presence,
            total_docs: examples.len(),
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl PhraseClassifier for BayesClassifier {
    fn prob_classify(&self, text: &str) -> ProbDist {
        let present: HashSet<usize> = words_of(text)
            .iter()
            .filter_map(|w| self.vocab_index.get(w).copied())
            .collect();

        let mut log_probs: Vec<f64> = Vec::with_capacity(self.labels.len());
        for l in 0..self.labels.len() {
            let n = self.doc_counts[l] as f64;
            let mut logp = (n / self.total_docs as f64).ln();

            for w in 0..self.vocab.len() {
                let c = self.presence[l].get(&w).copied().unwrap_or(0) as f64;
                let p_present = (c + 0.5) / (n + 1.0);
                logp += if present.contains(&w) {
                    p_present.ln()
                } else {
                    (1.0 - p_present).ln()
                };
            }
            log_probs.push(logp);
        }

        let max = log_probs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let unnormalized: Vec<f64> = log_probs.iter().map(|lp| (lp - max).exp()).collect();
        let total: f64 = unnormalized.iter().sum();

        ProbDist::new(
            self.labels
                .iter()
                .zip(unnormalized)
                .map(|(label, p)| (label.clone(), p / total))
                .collect(),
        )
    }
}

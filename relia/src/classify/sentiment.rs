use std::collections::HashMap;
use std::path::Path;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;

/// Phrase-level sentiment capability. Returns a compound polarity in [-1, 1].
pub trait SentimentScorer: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

/// Words that flip the valence of what follows them.
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "isn't", "wasn't", "aren't", "don't", "doesn't",
    "didn't", "won't", "can't", "couldn't", "wouldn't", "shouldn't", "hardly", "barely",
];

/// How far back a negation reaches, in words.
const NEGATION_SCOPE: usize = 3;

/// Dampening applied to a negated valence.
const NEGATION_SCALAR: f64 = -0.74;

/// Normalization constant for the compound score.
const NORM_ALPHA: f64 = 15.0;

/// Lexicon-based sentiment scorer: sums word valences with negation scope,
/// then squashes the sum into [-1, 1].
pub struct LexiconSentiment {
    valences: HashMap<String, f64>,
}

impl LexiconSentiment {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(&path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let valences: HashMap<String, f64> = serde_json::from_str(raw)?;
        Ok(Self { valences })
    }
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::from_json(include_str!("../../data/sentiment_lexicon.json"))
            .expect("bundled sentiment lexicon is valid JSON")
    }
}

impl SentimentScorer for LexiconSentiment {
    fn compound(&self, text: &str) -> f64 {
        let words: Vec<String> = text.unicode_words().map(|w| w.to_lowercase()).collect();

        let mut sum = 0.0;
        for (i, word) in words.iter().enumerate() {
            let Some(&valence) = self.valences.get(word) else {
                continue;
            };

            let negated = words[i.saturating_sub(NEGATION_SCOPE)..i]
                .iter()
                .any(|w| NEGATIONS.contains(&w.as_str()));

            sum += if negated {
                valence * NEGATION_SCALAR
            } else {
                valence
            };
        }

        let compound = sum / (sum * sum + NORM_ALPHA).sqrt();
        compound.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> LexiconSentiment {
        LexiconSentiment::from_json(
            r#"{"great": 3.1, "broke": -2.4, "terrible": -2.9, "love": 3.2, "works": 1.4}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_positive_phrase_scores_positive() {
        let s = scorer();
        assert!(s.compound("I love it, it works great") > 0.5);
    }

    #[test]
    fn test_negative_phrase_scores_negative() {
        let s = scorer();
        assert!(s.compound("terrible, it broke") < -0.5);
    }

    #[test]
    fn test_negation_flips_valence() {
        let s = scorer();
        let plain = s.compound("it works");
        let negated = s.compound("it doesn't work works");
        assert!(plain > 0.0);
        assert!(negated < 0.0);
    }

    #[test]
    fn test_neutral_phrase_scores_zero() {
        let s = scorer();
        assert_eq!(s.compound("the box arrived on a Tuesday"), 0.0);
    }

    #[test]
    fn test_compound_stays_in_range() {
        let s = scorer();
        let very_positive = "great ".repeat(50);
        let c = s.compound(&very_positive);
        assert!((-1.0..=1.0).contains(&c));
        assert!(c > 0.9);
    }

    #[test]
    fn test_bundled_lexicon_loads() {
        let s = LexiconSentiment::default();
        assert!(s.compound("great product, love it") > 0.0);
        assert!(s.compound("it broke, terrible quality") < 0.0);
    }
}

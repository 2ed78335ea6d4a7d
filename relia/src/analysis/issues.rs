use std::collections::HashMap;

use crate::classify::{CriticalityTable, PhraseClassifier};
use crate::models::{Issue, Keyframe};
use crate::nlp::{ParsedDocument, TokenSpan};

/// Label for issues detected by the binary fallback classifier.
pub const UNKNOWN_ISSUE: &str = "UNKNOWN_ISSUE";

/// Separator used when merging clauses into one issue.
const MERGE_SEPARATOR: &str = " | ";

/// Identifies clauses that describe a product problem, classifies them and
/// merges duplicates.
///
/// Each clause first goes through the multi-class issue classifier; the top
/// non-unknown label wins if it clears the class threshold. Otherwise the
/// binary detection classifier can still accept the clause under
/// `UNKNOWN_ISSUE`. Accepted clauses inherit the timestamp of a keyframe
/// whose expression lies inside the clause, and clauses sharing
/// `(label, timestamp)` merge: with a timestamp the texts are joined, without
/// one the later clause replaces the earlier at its position.
#[allow(clippy::too_many_arguments)]
pub(crate) fn extract_issues(
    doc: &ParsedDocument,
    clauses: &[TokenSpan],
    keyframes: &[Keyframe],
    issue_class: &dyn PhraseClassifier,
    issue_detect: &dyn PhraseClassifier,
    criticality: &CriticalityTable,
    class_threshold: f64,
    detection_threshold: f64,
) -> Vec<Issue> {
    let mut issue_clauses: Vec<(TokenSpan, String)> = Vec::new();

    for clause in clauses {
        let text = doc.span_text(*clause);
        let dist = issue_class.prob_classify(&text);

        let classified = dist
            .ranked()
            .into_iter()
            .find(|(label, prob)| *label != UNKNOWN_ISSUE && *prob > class_threshold);

        if let Some((label, prob)) = classified {
            tracing::info!(
                "Found issue w/ class: {} => {}, p: {:.2}",
                text,
                label,
                prob
            );
            issue_clauses.push((*clause, label.to_string()));
        } else if issue_detect.prob_classify(&text).prob("is_issue") >= detection_threshold {
            tracing::info!("Found issue: {}", text);
            issue_clauses.push((*clause, UNKNOWN_ISSUE.to_string()));
        }
    }

    // Insertion-ordered accumulation keyed by (label, timestamp).
    let mut issues: Vec<Issue> = Vec::new();
    let mut by_key: HashMap<(String, Option<i64>), usize> = HashMap::new();

    for (clause, label) in issue_clauses {
        let rel_timestamp = keyframes
            .iter()
            .find(|k| k.time_start >= clause.start && k.time_end <= clause.end)
            .map(|k| k.rel_timestamp);

        let text = doc.span_text(clause);
        let key = (label.clone(), rel_timestamp);

        if let Some(&index) = by_key.get(&key) {
            if rel_timestamp.is_some() {
                issues[index].text.push_str(MERGE_SEPARATOR);
                issues[index].text.push_str(&text);
                continue;
            }
            // Same label without a timestamp: the later clause supersedes
            // the earlier one in place.
            issues[index] = build_issue(text, &label, rel_timestamp, criticality);
            continue;
        }

        by_key.insert(key, issues.len());
        issues.push(build_issue(text, &label, rel_timestamp, criticality));
    }

    issues
}

fn build_issue(
    text: String,
    label: &str,
    rel_timestamp: Option<i64>,
    criticality: &CriticalityTable,
) -> Issue {
    Issue {
        text,
        classification: Some(label.to_string()),
        criticality: Some(criticality.severity(label)),
        rel_timestamp,
        frequency: None,
        image: None,
        resolution: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ProbDist;
    use crate::nlp::document::fixtures::{build_doc, t, tn};
    use crate::nlp::{DepRel, Pos};
    use pretty_assertions::assert_eq;

    /// Classifier that assigns a fixed distribution when the text contains a
    /// trigger word, and `UNKNOWN_ISSUE` mass otherwise.
    struct TriggerClassifier {
        trigger: &'static str,
        label: &'static str,
        prob: f64,
    }

    impl PhraseClassifier for TriggerClassifier {
        fn prob_classify(&self, text: &str) -> ProbDist {
            if text.contains(self.trigger) {
                ProbDist::new(vec![
                    (self.label.to_string(), self.prob),
                    (UNKNOWN_ISSUE.to_string(), 1.0 - self.prob),
                ])
            } else {
                ProbDist::new(vec![
                    (self.label.to_string(), 0.01),
                    (UNKNOWN_ISSUE.to_string(), 0.99),
                ])
            }
        }
    }

    /// Binary detector keyed on a trigger word.
    struct TriggerDetector {
        trigger: &'static str,
    }

    impl PhraseClassifier for TriggerDetector {
        fn prob_classify(&self, text: &str) -> ProbDist {
            let p = if text.contains(self.trigger) { 0.95 } else { 0.05 };
            ProbDist::new(vec![("is_issue".to_string(), p)])
        }
    }

    // "It broke today. It failed today." as two clauses.
    fn two_clause_doc() -> (ParsedDocument, Vec<TokenSpan>) {
        let doc = build_doc(vec![
            t("It", Pos::Pron, DepRel::Other, 1, 0),
            t("broke", Pos::Verb, DepRel::Root, 1, 0),
            tn("today", Pos::Noun, DepRel::Other, 1, 0),
            t(".", Pos::Punct, DepRel::Other, 1, 0),
            t("It", Pos::Pron, DepRel::Other, 5, 1),
            t("failed", Pos::Verb, DepRel::Root, 5, 1),
            tn("today", Pos::Noun, DepRel::Other, 5, 1),
            tn(".", Pos::Punct, DepRel::Other, 5, 1),
        ]);
        let clauses = vec![TokenSpan::new(0, 3), TokenSpan::new(4, 7)];
        (doc, clauses)
    }

    fn keyframe(rel_timestamp: i64, time_start: usize, time_end: usize) -> Keyframe {
        Keyframe {
            rel_timestamp,
            text: String::new(),
            time_start,
            time_end,
            sentiment: 0.5,
            interp: None,
        }
    }

    #[test]
    fn test_confident_class_label_wins() {
        let (doc, clauses) = two_clause_doc();
        let issues = extract_issues(
            &doc,
            &clauses,
            &[],
            &TriggerClassifier {
                trigger: "broke",
                label: "System Inoperable",
                prob: 0.4,
            },
            &TriggerDetector { trigger: "never" },
            &CriticalityTable::default(),
            0.1,
            0.9,
        );

        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].classification.as_deref(),
            Some("System Inoperable")
        );
        assert_eq!(issues[0].criticality, Some(0.9));
        assert_eq!(issues[0].rel_timestamp, None);
    }

    #[test]
    fn test_detection_fallback_yields_unknown_issue() {
        let (doc, clauses) = two_clause_doc();
        let issues = extract_issues(
            &doc,
            &clauses,
            &[],
            &TriggerClassifier {
                trigger: "nomatch",
                label: "System Inoperable",
                prob: 0.4,
            },
            &TriggerDetector { trigger: "failed" },
            &CriticalityTable::default(),
            0.1,
            0.9,
        );

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].classification.as_deref(), Some(UNKNOWN_ISSUE));
        assert_eq!(issues[0].criticality, Some(0.5));
        assert_eq!(issues[0].text, "It failed today");
    }

    #[test]
    fn test_clause_below_both_thresholds_is_discarded() {
        let (doc, clauses) = two_clause_doc();
        let issues = extract_issues(
            &doc,
            &clauses,
            &[],
            &TriggerClassifier {
                trigger: "nomatch",
                label: "System Inoperable",
                prob: 0.4,
            },
            &TriggerDetector { trigger: "nomatch" },
            &CriticalityTable::default(),
            0.1,
            0.9,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_same_class_and_timestamp_merge_texts() {
        let (doc, clauses) = two_clause_doc();
        // Keyframes for "today" in each clause, same relative timestamp.
        let keyframes = vec![keyframe(0, 2, 3), keyframe(0, 6, 7)];

        let issues = extract_issues(
            &doc,
            &clauses,
            &keyframes,
            &TriggerClassifier {
                trigger: "It",
                label: "System Inoperable",
                prob: 0.4,
            },
            &TriggerDetector { trigger: "never" },
            &CriticalityTable::default(),
            0.1,
            0.9,
        );

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].text, "It broke today | It failed today");
        assert_eq!(issues[0].rel_timestamp, Some(0));
    }

    #[test]
    fn test_different_timestamps_stay_separate() {
        let (doc, clauses) = two_clause_doc();
        let keyframes = vec![keyframe(0, 2, 3), keyframe(5, 6, 7)];

        let issues = extract_issues(
            &doc,
            &clauses,
            &keyframes,
            &TriggerClassifier {
                trigger: "It",
                label: "System Inoperable",
                prob: 0.4,
            },
            &TriggerDetector { trigger: "never" },
            &CriticalityTable::default(),
            0.1,
            0.9,
        );

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].rel_timestamp, Some(0));
        assert_eq!(issues[1].rel_timestamp, Some(5));
    }

    #[test]
    fn test_keyframe_outside_clause_leaves_timestamp_null() {
        let (doc, clauses) = two_clause_doc();
        // Keyframe span sits in the second clause only.
        let keyframes = vec![keyframe(3, 6, 7)];

        let issues = extract_issues(
            &doc,
            &clauses,
            &keyframes,
            &TriggerClassifier {
                trigger: "broke",
                label: "System Inoperable",
                prob: 0.4,
            },
            &TriggerDetector { trigger: "never" },
            &CriticalityTable::default(),
            0.1,
            0.9,
        );

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rel_timestamp, None);
    }

    #[test]
    fn test_unknown_class_never_wins_directly() {
        // UNKNOWN_ISSUE at high probability is ignored by the class pass and
        // the detector stays silent, so nothing is emitted.
        let (doc, clauses) = two_clause_doc();
        let issues = extract_issues(
            &doc,
            &clauses,
            &[],
            &TriggerClassifier {
                trigger: "It",
                label: "System Inoperable",
                prob: 0.05,
            },
            &TriggerDetector { trigger: "nomatch" },
            &CriticalityTable::default(),
            0.1,
            0.9,
        );
        assert!(issues.is_empty());
    }
}

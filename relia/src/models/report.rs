use serde::{Deserialize, Serialize};
use std::fmt;

/// A timestamped, sentiment-scored ownership event extracted from a time
/// expression in the review text.
///
/// `rel_timestamp` counts days since the reference date (the earliest
/// accepted date expression, assumed to be the date of sale). `time_start`
/// and `time_end` are token offsets of the originating expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub rel_timestamp: i64,
    pub text: String,
    pub time_start: usize,
    pub time_end: usize,
    pub sentiment: f64,
    /// Reserved for keyframe interpolation.
    pub interp: Option<String>,
}

/// A detected product problem with optional timing and severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub text: String,
    pub classification: Option<String>,
    pub criticality: Option<f64>,
    pub rel_timestamp: Option<i64>,
    /// Reserved fields, always null in this version.
    pub frequency: Option<String>,
    pub image: Option<String>,
    pub resolution: Option<String>,
}

/// The per-review analysis result: an ownership timeline plus issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub review_id: String,
    /// Reserved for cross-review reliability weighting, currently always 1.
    pub report_weight: f64,
    pub reliability_keyframes: Vec<Keyframe>,
    pub issues: Vec<Issue>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "REPORT FOR REVIEW #{} (weight: {})",
            self.review_id, self.report_weight
        )?;
        writeln!(f, "Keyframes:")?;

        for keyframe in &self.reliability_keyframes {
            writeln!(
                f,
                "• Keyframe: {} (rel. timestamp: {}, sentiment: {})",
                keyframe.text, keyframe.rel_timestamp, keyframe.sentiment
            )?;
        }

        if !self.issues.is_empty() {
            writeln!(f, "Issues:")?;

            for issue in &self.issues {
                writeln!(
                    f,
                    "• Issue: {} (classification: {:?}, criticality: {:?}, rel. timestamp: {:?})",
                    issue.text, issue.classification, issue.criticality, issue.rel_timestamp
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display_lists_keyframes_and_issues() {
        let report = Report {
            review_id: "R42".to_string(),
            report_weight: 1.0,
            reliability_keyframes: vec![Keyframe {
                rel_timestamp: 0,
                text: "Bought this".to_string(),
                time_start: 3,
                time_end: 5,
                sentiment: 0.5,
                interp: None,
            }],
            issues: vec![Issue {
                text: "It broke".to_string(),
                classification: Some("System Inoperable".to_string()),
                criticality: Some(0.9),
                rel_timestamp: Some(16),
                frequency: None,
                image: None,
                resolution: None,
            }],
        };

        let rendered = report.to_string();
        assert!(rendered.contains("REPORT FOR REVIEW #R42"));
        assert!(rendered.contains("Bought this"));
        assert!(rendered.contains("System Inoperable"));
    }

    #[test]
    fn test_keyframe_roundtrips_through_json() {
        let keyframe = Keyframe {
            rel_timestamp: 16,
            text: "It broke".to_string(),
            time_start: 7,
            time_end: 8,
            sentiment: 0.23,
            interp: None,
        };

        let json = serde_json::to_string(&keyframe).unwrap();
        let back: Keyframe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, keyframe);
    }
}

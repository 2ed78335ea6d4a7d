use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::classify::{PhraseClassifier, SentimentScorer};
use crate::error::Result;
use crate::models::Keyframe;
use crate::nlp::{ParsedDocument, Pos, TemporalTagger, TimexType, TokenSpan};

/// Sentinel the tagger emits for "now"-like expressions.
const PRESENT_REF: &str = "PRESENT_REF";
/// Sentinels for indeterminate references; these cannot be placed on a
/// timeline and are dropped.
const INDETERMINATE_REFS: &[&str] = &["PAST_REF", "FUTURE_REF"];

/// Outcome of resolving one tagged value against the review post date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    Date(NaiveDate),
    /// The value is a tagger false positive (e.g. a bare number read as a
    /// far-past date); skip the expression.
    Skip,
}

fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    // Partial dates: year-month and bare year resolve to their first day.
    let bytes = value.as_bytes();
    if bytes.len() == 7 && bytes[4] == b'-' {
        let year: i32 = value[..4].parse().ok()?;
        let month: u32 = value[5..].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1)?
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc());
    }
    if bytes.len() == 4 && bytes.iter().all(u8::is_ascii_digit) {
        let year: i32 = value.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1)?
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc());
    }

    None
}

/// Resolves a tagged value to a calendar date.
///
/// `PRESENT_REF` maps to the post date. A value that parses to a pre-epoch
/// date is a tagger false positive (typically a bare number read as a year)
/// and skips the expression. Anything else that fails strict ISO parsing
/// falls back to the post date with a warning.
pub(crate) fn resolve_value(value: &str, post_date: DateTime<Utc>) -> Resolution {
    if value == PRESENT_REF {
        return Resolution::Date(post_date.date_naive());
    }

    match parse_iso(value) {
        Some(resolved) => {
            let date = resolved.date_naive();
            if date < NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN) {
                tracing::debug!("Skipping pre-epoch time expression '{}'", value);
                Resolution::Skip
            } else {
                Resolution::Date(date)
            }
        }
        None => {
            tracing::warn!(
                "Failed to parse expression '{}' from tagger result; defaulting to review date.",
                value
            );
            Resolution::Date(post_date.date_naive())
        }
    }
}

/// Snaps tagger byte offsets to token boundaries.
///
/// Tagger offsets drift when symbols sit next to the expression: `start` may
/// land inside the preceding token's trailing whitespace and `end` short of
/// the final token's end. Both are widened to the containing tokens.
pub(crate) fn snap_to_tokens(
    doc: &ParsedDocument,
    start: usize,
    end: usize,
) -> Option<TokenSpan> {
    if end == 0 {
        return None;
    }

    let mut token_start = start;
    let mut prev_whitespace = 0;
    for token in doc.tokens() {
        if token.offset.saturating_sub(prev_whitespace) <= start
            && start < token.offset + token.text.len()
        {
            token_start = token.offset;
            break;
        }
        prev_whitespace = token.whitespace.len();
    }

    let token_end = doc
        .tokens()
        .iter()
        .find(|t| t.offset <= end - 1 && end - 1 < t.offset + t.text.len() + t.whitespace.len())
        .map(|t| t.offset + t.text.len())?;

    doc.char_span(token_start, token_end)
}

fn strippable(pos: Pos) -> bool {
    matches!(pos, Pos::Cconj | Pos::Punct | Pos::Adp)
}

/// Builds the relevant phrase for a time expression: the enclosing clause's
/// tokens minus the expression itself, stripped of edge conjunctions,
/// punctuation and adpositions. Falls back to the full sentence when no
/// clause contains the expression.
pub(crate) fn relevant_phrase(
    doc: &ParsedDocument,
    clauses: &[TokenSpan],
    expression: TokenSpan,
) -> String {
    let expression_text = doc.span_text(expression);

    for clause in clauses {
        if !doc.span_text(*clause).contains(&expression_text) {
            continue;
        }

        let kept: Vec<usize> = (clause.start..clause.end)
            .filter(|i| !expression.contains(*i))
            .collect();

        let mut lo = 0;
        let mut hi = kept.len();
        while lo < hi && strippable(doc.token(kept[lo]).pos) {
            lo += 1;
        }
        while hi > lo && strippable(doc.token(kept[hi - 1]).pos) {
            hi -= 1;
        }

        if lo < hi {
            return doc.join_tokens(&kept[lo..hi]);
        }
        break;
    }

    doc.span_text(doc.sentence_of(expression.start))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Converts tagged time expressions into review-relative keyframes.
///
/// Only DATE and TIME expressions survive; each is resolved to a date,
/// snapped to token boundaries, linked to its clause and filtered by
/// ownership relevance. The reference date starts at the post date and is
/// lowered to the earliest accepted date, so every keyframe timestamp is a
/// non-negative day offset.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn extract_keyframes(
    doc: &ParsedDocument,
    clauses: &[TokenSpan],
    post_date: DateTime<Utc>,
    tagger: &dyn TemporalTagger,
    relevance: &dyn PhraseClassifier,
    sentiment: &dyn SentimentScorer,
    relevance_threshold: f64,
) -> Result<Vec<Keyframe>> {
    let mut accepted: Vec<(NaiveDate, String, TokenSpan)> = Vec::new();

    for timex in tagger.tag(doc.text(), post_date).await? {
        if !matches!(timex.timex_type, TimexType::Date | TimexType::Time) {
            continue;
        }
        if INDETERMINATE_REFS.contains(&timex.value.as_str()) {
            continue;
        }

        let date = match resolve_value(&timex.value, post_date) {
            Resolution::Date(date) => date,
            Resolution::Skip => continue,
        };

        let Some(expression) = snap_to_tokens(doc, timex.start, timex.end) else {
            tracing::warn!(
                "Time expression '{}' does not align with token boundaries; skipping.",
                timex.value
            );
            continue;
        };

        let phrase = relevant_phrase(doc, clauses, expression);

        let relevance_prob = relevance.prob_classify(&phrase).prob("relevant");
        if relevance_prob >= relevance_threshold {
            accepted.push((date, phrase, expression));
        } else {
            tracing::warn!(
                "Filtered expression '{}' based on relevance to ownership experience (prob = {:.2})",
                phrase,
                relevance_prob
            );
        }
    }

    // The earliest credible event is the reference point (assumed date of
    // sale); it is never later than the post date.
    let mut ref_date = post_date.date_naive();
    for (date, _, _) in &accepted {
        if *date <= ref_date {
            ref_date = *date;
        }
    }

    let mut keyframes: Vec<Keyframe> = accepted
        .into_iter()
        .map(|(date, phrase, expression)| Keyframe {
            rel_timestamp: (date - ref_date).num_days(),
            sentiment: round2((sentiment.compound(&phrase) + 1.0) / 2.0),
            text: phrase,
            time_start: expression.start,
            time_end: expression.end,
            interp: None,
        })
        .collect();

    keyframes.sort_by_key(|k| k.rel_timestamp);
    Ok(keyframes)
}

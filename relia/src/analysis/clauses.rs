use crate::nlp::{DepRel, ParsedDocument, Pos, TokenSpan};

/// Punctuation that stays inside clause spans.
const PUNCT_WHITELIST: &[&str] = &["(", ")", "\u{201c}", "\u{201d}", "\"", "'"];

/// Finds the verb token governing `token`'s clause, if any.
///
/// Walks head references upward until a verb or auxiliary is reached. A head
/// attached by `xcomp` is the inner part of a composite verb ("stopped
/// working"); only the outer verb governs the clause, so the walk continues
/// past it. Returns `None` when the walk reaches a self-headed root without
/// finding a verb.
pub fn governing_verb(doc: &ParsedDocument, token: usize) -> Option<usize> {
    let mut t = token;
    while doc.token(t).head != t {
        let head = doc.token(t).head;
        if doc.token(head).pos.is_verbal() && doc.token(head).dep != DepRel::Xcomp {
            return Some(head);
        }
        t = head;
    }
    None
}

fn keeps_token(doc: &ParsedDocument, index: usize) -> bool {
    let token = doc.token(index);
    token.pos != Pos::Cconj
        && (token.pos != Pos::Punct || PUNCT_WHITELIST.contains(&token.text.as_str()))
}

/// Partitions a parsed document into independent clauses.
///
/// For every verb, the clause span covers the subtree tokens governed by that
/// verb, plus verbs clausally related to it (`ccomp`/`xcomp`/`aux`) within
/// `max_head_distance` tokens of their head. Verbless sentences become one
/// non-verbal clause. Nested clauses whose governing verb sits inside another
/// clause are dropped, the rest are sorted by start offset, and clauses led
/// by a subordinating conjunction (or reduced to a single orphan token) fold
/// into their predecessor.
pub fn segment_clauses(doc: &ParsedDocument, max_head_distance: usize) -> Vec<TokenSpan> {
    let mut clauses: Vec<(TokenSpan, Option<usize>)> = Vec::new();

    for verb in 0..doc.len() {
        if !doc.token(verb).pos.is_verbal() {
            continue;
        }

        let mut start = None;
        let mut end = 0;

        for t in doc.subtree(verb) {
            let cur_verb = if doc.token(t).pos.is_verbal() {
                Some(t)
            } else {
                governing_verb(doc, t)
            };

            let mut in_current_clause = false;
            if let Some(cv) = cur_verb {
                let head = doc.token(cv).head;
                let head_dist = cv.abs_diff(head);

                if cv == verb {
                    in_current_clause = true;
                }
                if head == verb
                    && matches!(doc.token(cv).dep, DepRel::Ccomp | DepRel::Xcomp | DepRel::Aux)
                    && head_dist <= max_head_distance
                {
                    in_current_clause = true;
                }
            }

            if in_current_clause && keeps_token(doc, t) {
                if start.is_none() {
                    start = Some(t);
                }
                end = t + 1;
            }
        }

        if let Some(s) = start {
            // Pull a directly preceding coordinating conjunction into the
            // span ("and it broke").
            let s = if s > 0 && doc.token(s - 1).pos == Pos::Cconj {
                s - 1
            } else {
                s
            };
            clauses.push((TokenSpan::new(s, end), Some(verb)));
        }
    }

    // Verbless sentences contribute one non-verbal clause each.
    for sent in doc.sentences() {
        if (sent.start..sent.end).any(|i| doc.token(i).pos.is_verbal()) {
            continue;
        }

        let mut start = None;
        let mut end = 0;
        for t in sent.start..sent.end {
            if keeps_token(doc, t) {
                if start.is_none() {
                    start = Some(t);
                }
                end = t + 1;
            }
        }

        if let Some(s) = start {
            clauses.push((TokenSpan::new(s, end), None));
        }
    }

    // Drop verbal clauses whose governing verb is contained in a different
    // clause's span.
    let mut filtered: Vec<TokenSpan> = clauses
        .iter()
        .filter(|(span, verb)| match verb {
            None => true,
            Some(v) => !clauses
                .iter()
                .any(|(other, _)| other != span && other.contains(*v)),
        })
        .map(|(span, _)| *span)
        .collect();
    filtered.sort_by_key(|span| span.start);

    // Fold subordinated neighbours and single-token orphans into the
    // previous clause.
    let mut merged: Vec<TokenSpan> = Vec::new();
    for span in filtered {
        if let Some(prev) = merged.last_mut() {
            let subordinated = doc.token(span.start).pos == Pos::Sconj && span.start == prev.end;
            let orphan = span.len() == 1;
            if subordinated || orphan {
                *prev = TokenSpan::new(prev.start, span.end);
                continue;
            }
        }
        merged.push(span);
    }

    merged
}

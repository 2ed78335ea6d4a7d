use serde::Deserialize;

/// Universal POS tag of a parsed token, as emitted by the parse service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
    Space,
    #[serde(other)]
    Other,
}

impl Pos {
    /// Verbs and auxiliaries both act as clause governors.
    pub fn is_verbal(self) -> bool {
        matches!(self, Pos::Verb | Pos::Aux)
    }
}

/// Dependency relation of a token to its head.
///
/// Only the relations the pipeline inspects are distinguished; everything
/// else folds into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepRel {
    Aux,
    Ccomp,
    Xcomp,
    #[serde(rename = "ROOT", alias = "root")]
    Root,
    #[serde(other)]
    Other,
}

/// One token of a dependency parse.
///
/// `offset` is the byte offset of the token in the document text;
/// `whitespace` is the text between this token and the next. `head` indexes
/// into the owning document's token list and points at the token itself for
/// sentence roots.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedToken {
    pub text: String,
    #[serde(default)]
    pub whitespace: String,
    pub offset: usize,
    pub pos: Pos,
    pub dep: DepRel,
    pub head: usize,
    pub sent: usize,
}

/// A half-open `[start, end)` range of token indices within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A dependency-parsed document, owned for the lifetime of one review's
/// analysis. Clauses and time-expression spans index into it rather than
/// copying tokens out.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    text: String,
    tokens: Vec<ParsedToken>,
    children: Vec<Vec<usize>>,
}

impl ParsedDocument {
    pub fn new(text: String, tokens: Vec<ParsedToken>) -> Self {
        let mut children = vec![Vec::new(); tokens.len()];
        for (i, token) in tokens.iter().enumerate() {
            if token.head != i && token.head < tokens.len() {
                children[token.head].push(i);
            }
        }
        Self {
            text,
            tokens,
            children,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, index: usize) -> &ParsedToken {
        &self.tokens[index]
    }

    pub fn tokens(&self) -> &[ParsedToken] {
        &self.tokens
    }

    /// Token indices of `root` and all its dependency descendants, in
    /// document order.
    pub fn subtree(&self, root: usize) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            indices.push(i);
            stack.extend(self.children[i].iter().copied());
        }
        indices.sort_unstable();
        indices
    }

    /// Sentence ranges, in document order.
    pub fn sentences(&self) -> Vec<TokenSpan> {
        let mut spans = Vec::new();
        let mut start = 0;
        for i in 1..self.tokens.len() {
            if self.tokens[i].sent != self.tokens[start].sent {
                spans.push(TokenSpan::new(start, i));
                start = i;
            }
        }
        if !self.tokens.is_empty() {
            spans.push(TokenSpan::new(start, self.tokens.len()));
        }
        spans
    }

    /// The sentence containing the given token.
    pub fn sentence_of(&self, index: usize) -> TokenSpan {
        let sent = self.tokens[index].sent;
        let mut start = index;
        while start > 0 && self.tokens[start - 1].sent == sent {
            start -= 1;
        }
        let mut end = index + 1;
        while end < self.tokens.len() && self.tokens[end].sent == sent {
            end += 1;
        }
        TokenSpan::new(start, end)
    }

    /// Token span exactly covering `[start, end)` byte offsets, or `None`
    /// when the offsets do not land on token boundaries.
    pub fn char_span(&self, start: usize, end: usize) -> Option<TokenSpan> {
        let first = self.tokens.iter().position(|t| t.offset == start)?;
        let last = self
            .tokens
            .iter()
            .position(|t| t.offset + t.text.len() == end)?;
        if last < first {
            return None;
        }
        Some(TokenSpan::new(first, last + 1))
    }

    /// Text of a contiguous token span, without the final token's trailing
    /// whitespace.
    pub fn span_text(&self, span: TokenSpan) -> String {
        let mut out = String::new();
        for i in span.start..span.end {
            out.push_str(&self.tokens[i].text);
            if i + 1 < span.end {
                out.push_str(&self.tokens[i].whitespace);
            }
        }
        out
    }

    /// Text of an arbitrary (possibly non-contiguous) token selection,
    /// trailing whitespace trimmed.
    pub fn join_tokens(&self, indices: &[usize]) -> String {
        let mut out = String::new();
        for &i in indices {
            out.push_str(&self.tokens[i].text);
            out.push_str(&self.tokens[i].whitespace);
        }
        out.trim().to_string()
    }
}

pub mod document;
mod parser;
mod tagger;

pub use document::{DepRel, ParsedDocument, ParsedToken, Pos, TokenSpan};
pub use parser::{DependencyParser, HttpParser};
pub use tagger::{HttpTagger, TemporalTagger, TimexSpan, TimexType};

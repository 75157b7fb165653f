//=========================================================================
// Dialogue Markup
//=========================================================================
//
// Parses annotated dialogue text into a flat string, a delay map and a
// style tree.
//
// Vocabulary:
// ```text
//   <left/> <right/>                 literal '<' and '>'
//   <d time="S"/> or <d time="S">    S extra seconds before the next char
//   <c color="RRGGBB[AA]">…</c>      tint
//   <wavy offset="C">…</wavy>        vertical sine, phase C (default 0)
//   <shake strength="N">…</shake>    random fixed offset, N (default 1)
// ```
//
// Flat text and delays depend only on the source. Shake vectors are
// drawn once per element from the supplied random source.
//
//=========================================================================

//=== Submodules ==========================================================

mod document;
mod lexer;
mod parser;

//=== External Dependencies ===============================================

use rand::Rng;

//=== Internal Dependencies ===============================================

use crate::core::error::MarkupError;
use lexer::Lexer;
use parser::Builder;

//=== Public API ==========================================================

pub use document::{Color, Document, GlyphStyle, Node, NodeId, NodeKind, StyleSpan, Tag};

/// Parses `source` drawing shake vectors from the thread-local generator.
pub fn parse(source: &str) -> Result<Document, MarkupError> {
    parse_with_rng(source, &mut rand::rng())
}

/// Parses `source` drawing shake vectors from `rng`.
///
/// # Examples
///
/// ```
/// use aetheric_cutscene::core::markup::parse_with_rng;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let doc = parse_with_rng("Hi<d time=\"0.5\"/>!", &mut rng).unwrap();
/// assert_eq!(doc.text(), "Hi!");
/// assert_eq!(doc.delay_at(2), 0.5);
/// ```
pub fn parse_with_rng<R: Rng>(source: &str, rng: &mut R) -> Result<Document, MarkupError> {
    let mut builder = Builder::new(rng);
    for token in Lexer::new(source).tokenize()? {
        builder.push(token)?;
    }
    builder.finish()
}

/// Produces markup whose flat text is exactly `text`.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("<left/>"),
            '>' => escaped.push_str("<right/>"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Cutscene Errors
//=========================================================================
//
// Error types raised by the markup parser and the cutscene runtime.
//
// Taxonomy:
//   MarkupError     → authoring bug inside a single line of dialogue
//   CutsceneError   → anything that halts a running cutscene
//
// Recoverable conditions (unresolved choice target, missing voice cue or
// portrait) are NOT errors: they are logged and the presentation carries on.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== MarkupError =========================================================

/// Authoring error found while parsing dialogue markup.
///
/// Offsets are character offsets into the raw markup string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    /// A `<` was opened but never closed with `>`.
    #[error("unterminated tag starting at offset {offset}")]
    UnterminatedTag { offset: usize },

    /// Tag syntax could not be understood (bad attribute, stray quote...).
    #[error("malformed tag <{tag}> at offset {offset}: {reason}")]
    MalformedTag {
        tag: String,
        offset: usize,
        reason: &'static str,
    },

    /// Tag name is not part of the dialogue markup vocabulary.
    #[error("unknown tag <{tag}> at offset {offset}")]
    UnknownTag { tag: String, offset: usize },

    /// A closing tag does not match the innermost open element.
    #[error("mismatched closing tag </{found}> at offset {offset}, expected </{expected}>")]
    MismatchedClose {
        expected: String,
        found: String,
        offset: usize,
    },

    /// A closing tag appeared with no open element.
    #[error("unexpected closing tag </{tag}> at offset {offset}")]
    UnexpectedClose { tag: String, offset: usize },

    /// The line ended while an element was still open.
    #[error("element <{tag}> is never closed")]
    UnclosedElement { tag: String },

    /// `&name;` entity not recognised (or a bare `&`).
    #[error("unknown entity '&{entity}' at offset {offset}")]
    UnknownEntity { entity: String, offset: usize },

    /// Numeric attribute failed to parse.
    #[error("invalid number for attribute '{attribute}' in <{tag}> tag ({value})")]
    InvalidNumber {
        tag: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// Hexadecimal color attribute failed to parse.
    #[error("invalid hexadecimal value for attribute 'color' in <c> tag ({value})")]
    InvalidColor { value: String },

    /// Delays must be non-negative.
    #[error("negative delay in <d> tag ({value})")]
    NegativeDelay { value: f32 },
}

//=== CutsceneError =======================================================

/// Error that halts the cutscene currently running.
#[derive(Debug, Error)]
pub enum CutsceneError {
    /// A dialogue line contained malformed markup.
    #[error("dialogue line '{line}' has malformed markup: {source}")]
    Markup {
        line: String,
        #[source]
        source: MarkupError,
    },

    /// A speaker was asked to talk but has no conversation available.
    #[error("no dialogue available for '{speaker}' at index {index}")]
    MissingDialogue { speaker: String, index: usize },

    /// A line catalog could not be decoded.
    #[error("dialogue catalog could not be read: {0}")]
    Catalog(#[from] serde_json::Error),
}

impl CutsceneError {
    /// Wraps a markup error with the id of the line that produced it.
    pub fn markup(line: impl Into<String>, source: MarkupError) -> Self {
        Self::Markup {
            line: line.into(),
            source,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_number_names_attribute_and_value() {
        let err = MarkupError::InvalidNumber {
            tag: "d",
            attribute: "time",
            value: "soon".into(),
        };
        let message = err.to_string();
        assert!(message.contains("'time'"));
        assert!(message.contains("(soon)"));
    }

    #[test]
    fn markup_error_is_the_source_of_cutscene_error() {
        use std::error::Error as _;

        let err = CutsceneError::markup(
            "intro",
            MarkupError::InvalidColor { value: "zz".into() },
        );
        assert!(err.to_string().contains("intro"));
        assert!(err.source().is_some());
    }
}

//! Parse error types.
//!
//! Grounded in the teacher crate's `error.rs`: a `thiserror`-derived enum,
//! one variant per failure shape, each carrying the line/column it occurred
//! at so the driver can render spec.md §6's diagnostic block without
//! re-deriving position information after the fact.

use thiserror::Error;

/// Lexical or syntactic error raised by the scanner or parser.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("'{word}': unrecognised character")]
    UnrecognisedCharacter { line: usize, column: Option<usize>, word: String },

    #[error("'{word}': unexpected token")]
    UnexpectedToken { line: usize, column: Option<usize>, word: String },

    #[error("'{word}': {message}")]
    Expected { line: usize, column: Option<usize>, word: String, message: String },

    #[error("unexpected end of input")]
    UnexpectedEof { line: usize },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnrecognisedCharacter { line, .. }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::Expected { line, .. }
            | ParseError::UnexpectedEof { line } => *line,
        }
    }

    pub fn column(&self) -> Option<usize> {
        match self {
            ParseError::UnrecognisedCharacter { column, .. }
            | ParseError::UnexpectedToken { column, .. }
            | ParseError::Expected { column, .. } => *column,
            ParseError::UnexpectedEof { .. } => None,
        }
    }

    pub fn word(&self) -> &str {
        match self {
            ParseError::UnrecognisedCharacter { word, .. }
            | ParseError::UnexpectedToken { word, .. }
            | ParseError::Expected { word, .. } => word,
            ParseError::UnexpectedEof { .. } => "",
        }
    }

    /// Render the spec.md §6 diagnostic block given the source's line table.
    pub fn format_with_lines(&self, lines: &[String]) -> String {
        super::diagnostics::format_diagnostic(
            "ParseError",
            self.line(),
            self.column(),
            self.word(),
            &self.to_string(),
            lines,
        )
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

//! Resolve-time (`LogicError`) and run-time (`RuntimeError`) error
//! taxonomies, plus the top-level `InterpretError` that unifies them with
//! `pseudo9608_parser::ParseError` (spec.md §7).

use pseudo9608_parser::diagnostics::{format_diagnostic, format_runtime};
use pseudo9608_parser::ParseError;

/// Static (resolve-time) errors: undeclared names, type mismatches,
/// malformed `RETURN`s, and the rest of the resolver's per-node contract
/// (spec.md §4.4, §7). Exit code 65, same as `ParseError`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LogicError {
    #[error("'{word}' is not declared")]
    Undeclared { line: usize, column: usize, word: String },

    #[error("type '{word}' is not declared")]
    UndeclaredType { line: usize, column: usize, word: String },

    #[error("'{word}' is already declared")]
    DuplicateDeclaration { line: usize, column: usize, word: String },

    #[error("'{word}' is not callable")]
    NotCallable { line: usize, column: usize, word: String },

    #[error("expect {expected}, got {got}")]
    WrongOperandType { line: usize, column: usize, word: String, expected: String, got: String },

    #[error("expect {expected} arguments, got {got}")]
    WrongArgumentCount { line: usize, column: usize, word: String, expected: usize, got: usize },

    #[error("expect {expected}, got {got}")]
    WrongArgumentType { line: usize, column: usize, word: String, expected: String, got: String },

    #[error("expect comparable operands, got {left} and {right}")]
    IllegalComparison { line: usize, column: usize, word: String, left: String, right: String },

    #[error("expect {expected}, got {got}")]
    AssignmentTypeMismatch { line: usize, column: usize, word: String, expected: String, got: String },

    #[error("missing RETURN in function '{word}'")]
    MissingReturn { line: usize, column: usize, word: String },

    #[error("unexpected RETURN outside a function")]
    UnexpectedReturn { line: usize, column: usize, word: String },

    #[error("'{word}' has no field '{field}'")]
    MissingField { line: usize, column: usize, word: String, field: String },

    #[error("expect a non-ARRAY element type, got {got}")]
    ArrayFieldType { line: usize, column: usize, word: String, got: String },

    #[error("expect INTEGER index, got {got}")]
    InvalidIndexType { line: usize, column: usize, word: String, got: String },

    #[error("'{word}' is not an ARRAY")]
    NotAnArray { line: usize, column: usize, word: String },

    #[error("'{word}' is not a record")]
    NotARecord { line: usize, column: usize, word: String },

    #[error("'{word}' is not assignable")]
    NotAnLValue { line: usize, column: usize, word: String },

    #[error("BYREF argument '{word}' must be a variable, array element or field")]
    ByRefRequiresLValue { line: usize, column: usize, word: String },

    #[error("expect {expected}, got {got}")]
    CaseValueTypeMismatch { line: usize, column: usize, word: String, expected: String, got: String },

    #[error("expect RETURN {expected}, got {got}")]
    ReturnTypeMismatch { line: usize, column: usize, word: String, expected: String, got: String },
}

impl LogicError {
    pub fn line(&self) -> usize {
        match self {
            LogicError::Undeclared { line, .. }
            | LogicError::UndeclaredType { line, .. }
            | LogicError::DuplicateDeclaration { line, .. }
            | LogicError::NotCallable { line, .. }
            | LogicError::WrongOperandType { line, .. }
            | LogicError::WrongArgumentCount { line, .. }
            | LogicError::WrongArgumentType { line, .. }
            | LogicError::IllegalComparison { line, .. }
            | LogicError::AssignmentTypeMismatch { line, .. }
            | LogicError::MissingReturn { line, .. }
            | LogicError::UnexpectedReturn { line, .. }
            | LogicError::MissingField { line, .. }
            | LogicError::ArrayFieldType { line, .. }
            | LogicError::InvalidIndexType { line, .. }
            | LogicError::NotAnArray { line, .. }
            | LogicError::NotARecord { line, .. }
            | LogicError::NotAnLValue { line, .. }
            | LogicError::ByRefRequiresLValue { line, .. }
            | LogicError::CaseValueTypeMismatch { line, .. }
            | LogicError::ReturnTypeMismatch { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            LogicError::Undeclared { column, .. }
            | LogicError::UndeclaredType { column, .. }
            | LogicError::DuplicateDeclaration { column, .. }
            | LogicError::NotCallable { column, .. }
            | LogicError::WrongOperandType { column, .. }
            | LogicError::WrongArgumentCount { column, .. }
            | LogicError::WrongArgumentType { column, .. }
            | LogicError::IllegalComparison { column, .. }
            | LogicError::AssignmentTypeMismatch { column, .. }
            | LogicError::MissingReturn { column, .. }
            | LogicError::UnexpectedReturn { column, .. }
            | LogicError::MissingField { column, .. }
            | LogicError::ArrayFieldType { column, .. }
            | LogicError::InvalidIndexType { column, .. }
            | LogicError::NotAnArray { column, .. }
            | LogicError::NotARecord { column, .. }
            | LogicError::NotAnLValue { column, .. }
            | LogicError::ByRefRequiresLValue { column, .. }
            | LogicError::CaseValueTypeMismatch { column, .. }
            | LogicError::ReturnTypeMismatch { column, .. } => *column,
        }
    }

    pub fn word(&self) -> &str {
        match self {
            LogicError::Undeclared { word, .. }
            | LogicError::UndeclaredType { word, .. }
            | LogicError::DuplicateDeclaration { word, .. }
            | LogicError::NotCallable { word, .. }
            | LogicError::WrongOperandType { word, .. }
            | LogicError::WrongArgumentCount { word, .. }
            | LogicError::WrongArgumentType { word, .. }
            | LogicError::IllegalComparison { word, .. }
            | LogicError::AssignmentTypeMismatch { word, .. }
            | LogicError::MissingReturn { word, .. }
            | LogicError::UnexpectedReturn { word, .. }
            | LogicError::MissingField { word, .. }
            | LogicError::ArrayFieldType { word, .. }
            | LogicError::InvalidIndexType { word, .. }
            | LogicError::NotAnArray { word, .. }
            | LogicError::NotARecord { word, .. }
            | LogicError::NotAnLValue { word, .. }
            | LogicError::ByRefRequiresLValue { word, .. }
            | LogicError::CaseValueTypeMismatch { word, .. }
            | LogicError::ReturnTypeMismatch { word, .. } => word,
        }
    }

    /// Render via the parser crate's shared diagnostic formatter, so
    /// `LogicError` and `ParseError` print in the exact same shape
    /// (spec.md §6).
    pub fn format_with_lines(&self, lines: &[String]) -> String {
        format_diagnostic(
            "LogicError",
            self.line(),
            Some(self.column()),
            self.word(),
            &self.to_string(),
            lines,
        )
    }
}

/// Dynamic (run-time) errors: everything that can only fail once values are
/// actually flowing (spec.md §4.5, §7). Exit code 70, no caret — just the
/// message (`format_runtime`).
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("'{0}' has not been assigned a value")]
    UnassignedSlot(String),

    #[error("index {0:?} is out of range for '{1}'")]
    IndexOutOfRange(Vec<i64>, String),

    #[error("file '{0}' is not open")]
    FileNotOpen(String),

    #[error("file '{0}' is not open in {1} mode")]
    WrongFileMode(String, &'static str),

    #[error("division by zero")]
    DivisionByZero,

    #[error("RANDOMBETWEEN bounds are reversed: {0} > {1}")]
    ReversedRandomBounds(i64, i64),

    #[error("file '{0}' is already open")]
    FileAlreadyOpen(String),

    #[error("function '{0}' did not return a value")]
    NoReturnValue(String),

    #[error("{0}")]
    Io(String),
}

impl RuntimeError {
    pub fn format(&self) -> String {
        format_runtime(&self.to_string())
    }
}

/// The union of all three error families, carrying enough to compute an
/// exit code and render a diagnostic (spec.md §7: ParseError/LogicError ->
/// 65, RuntimeError -> 70).
#[derive(Debug, Clone, thiserror::Error)]
pub enum InterpretError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Logic(#[from] LogicError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl InterpretError {
    pub fn exit_code(&self) -> i32 {
        match self {
            InterpretError::Parse(_) | InterpretError::Logic(_) => 65,
            InterpretError::Runtime(_) => 70,
        }
    }

    pub fn render(&self, lines: &[String]) -> String {
        match self {
            InterpretError::Parse(e) => e.format_with_lines(lines),
            InterpretError::Logic(e) => e.format_with_lines(lines),
            InterpretError::Runtime(e) => e.format(),
        }
    }
}

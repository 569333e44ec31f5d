//! pseudo9608_parser
//!
//! Scanner and recursive-descent parser for 9608 Pseudocode, an imperative
//! teaching language used in A-level computer science. Produces a statement
//! tree with unresolved-name expressions; name resolution and type checking
//! happen downstream in `pseudo9608`.
//!
//! # Example
//!
//! ```
//! use pseudo9608_parser::parse_source;
//!
//! let stmts = parse_source("OUTPUT 1 + 2\n").expect("parse failed");
//! assert_eq!(stmts.len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod operator;
pub mod parser;
pub mod scanner;
pub mod token;

pub use ast::{CallableDecl, DeclMetadata, Expr, FileMode, LiteralValue, Param, PassBy, Stmt};
pub use error::{ParseError, ParseResult};
pub use operator::Operator;
pub use token::{Token, TokenKind, TokenValue};

/// Scan and parse a complete source string into its top-level statement
/// tree. The two pipeline stages are exposed separately (`scanner::scan`,
/// `parser::parse`) for callers that need the intermediate token stream,
/// e.g. for rendering a diagnostic against the original source lines.
pub fn parse_source(src: &str) -> ParseResult<Vec<Stmt>> {
    let (tokens, _lines) = scanner::scan(src)?;
    parser::parse(tokens)
}

/// Scan `src` and return both the statement tree and its line table, which
/// the driver needs to render `ParseError`/`LogicError` diagnostics without
/// re-splitting the source.
pub fn parse_source_with_lines(src: &str) -> ParseResult<(Vec<Stmt>, Vec<String>)> {
    let (tokens, lines) = scanner::scan(src)?;
    let stmts = parser::parse(tokens)?;
    Ok((stmts, lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_arithmetic_program() {
        let stmts = parse_source("DECLARE X : INTEGER\nX <- 3 + 4 * 2\nOUTPUT X\n").unwrap();
        assert_eq!(stmts.len(), 3);
    }

    #[test]
    fn parses_for_loop_with_array_declaration() {
        let src = "DECLARE AnArray : ARRAY[1:10] OF INTEGER\n\
                   FOR I <- 1 TO 10\n\
                   AnArray[I] <- I\n\
                   ENDFOR\n";
        let stmts = parse_source(src).unwrap();
        assert_eq!(stmts.len(), 2);
        match &stmts[1] {
            Stmt::While { init, .. } => assert!(init.is_some()),
            other => panic!("expected a desugared FOR loop, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_if_is_a_parse_error() {
        let err = parse_source("IF TRUE\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn records_type_declaration_with_three_fields() {
        let src = "TYPE Student\n\
                   DECLARE Surname : STRING\n\
                   DECLARE FirstName : STRING\n\
                   DECLARE YearGroup : INTEGER\n\
                   ENDTYPE\n";
        let stmts = parse_source(src).unwrap();
        match &stmts[0] {
            Stmt::Type { fields, .. } => assert_eq!(fields.len(), 3),
            other => panic!("expected a TYPE statement, got {other:?}"),
        }
    }

    #[test]
    fn string_concatenation_parses_at_additive_precedence() {
        let stmts = parse_source("OUTPUT \"A: \" & INTTOSTRING(1)\n").unwrap();
        match &stmts[0] {
            Stmt::Output { exprs, .. } => {
                assert!(matches!(&exprs[0], Expr::Binary { oper: Operator::Concat, .. }));
            }
            other => panic!("expected an OUTPUT statement, got {other:?}"),
        }
    }

    #[test]
    fn for_loop_with_negative_step_desugars_to_a_descending_comparison() {
        let stmts = parse_source("FOR I <- 3 TO 1 STEP -1\nOUTPUT I\nENDFOR\n").unwrap();
        match &stmts[0] {
            Stmt::While { cond, .. } => {
                assert!(matches!(cond, Expr::Binary { oper: Operator::Gte, .. }));
            }
            other => panic!("expected a desugared FOR loop, got {other:?}"),
        }
    }
}

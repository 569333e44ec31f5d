//! `DECLARE`-shaped parsing shared by top-level declarations, `TYPE` fields,
//! and callable parameters. Grounded in `parser.py`'s `declare`/`colonRange`.

use super::Parser;
use crate::ast::{DeclMetadata, Param, PassBy};
use crate::error::ParseResult;
use crate::token::TokenKind;

const BUILTIN_TYPES: &[&str] = &["BOOLEAN", "INTEGER", "REAL", "STRING", "FILE", "ARRAY", "NULL"];

fn expect_type_token(p: &mut Parser) -> ParseResult<()> {
    if p.expect_word(BUILTIN_TYPES) || p.expect_kind(&[TokenKind::Name]) {
        return Ok(());
    }
    Err(p.unexpected_token(""))
}

fn colon_range(p: &mut Parser) -> ParseResult<(i64, i64)> {
    let lo = p.match_kind_else_error(&[TokenKind::Integer], "in range")?;
    p.match_word_else_error(&[":"], "in range")?;
    let hi = p.match_kind_else_error(&[TokenKind::Integer], "in range")?;
    let lo = lo.value.clone();
    let hi = hi.value.clone();
    match (lo, hi) {
        (crate::token::TokenValue::Int(l), crate::token::TokenValue::Int(h)) => Ok((l, h)),
        _ => unreachable!("scanner only produces TokenValue::Int for INTEGER tokens"),
    }
}

/// Parse `name : type[, ARRAY metadata]`, used for `DECLARE` statements,
/// `TYPE` fields, and parameter lists alike.
pub fn declare(p: &mut Parser) -> ParseResult<(String, String, DeclMetadata, crate::token::Token)> {
    let name_token = p.match_kind_else_error(&[TokenKind::Name], "expected a variable name")?;
    let name = name_token.word.clone();
    p.match_word_else_error(&[":"], "after name")?;
    expect_type_token(p)?;
    let type_token = p.consume();
    let mut metadata = DeclMetadata::scalar();
    if type_token.word == "ARRAY" {
        p.match_word_else_error(&["["], "after ARRAY")?;
        let mut size = vec![colon_range(p)?];
        while p.match_word(&[","])?.is_some() {
            size.push(colon_range(p)?);
        }
        p.match_word_else_error(&["]"], "after array bounds")?;
        p.match_word_else_error(&["OF"], "after array bounds")?;
        expect_type_token(p)?;
        let elem_token = p.consume();
        metadata = DeclMetadata { size, element_type: Some(elem_token.word) };
    }
    Ok((name, type_token.word, metadata, name_token))
}

/// Parse a parenthesised parameter list: `( [BYVALUE|BYREF] decl {, decl} )`.
/// A single passby mode applies to every parameter in the list, matching
/// `procedureStmt`'s single `passbyToken` lookahead.
pub fn param_list(p: &mut Parser) -> ParseResult<Vec<Param>> {
    let mut params = Vec::new();
    if p.match_word(&["("])?.is_none() {
        return Ok(params);
    }
    let passby = match p.match_word(&["BYVALUE", "BYREF"])? {
        Some(t) if t.word == "BYREF" => PassBy::ByRef,
        _ => PassBy::ByValue,
    };
    let (name, type_name, metadata, token) = declare(p)?;
    params.push(Param { name, type_name, metadata, passby, token });
    while p.match_word(&[","])?.is_some() {
        let (name, type_name, metadata, token) = declare(p)?;
        params.push(Param { name, type_name, metadata, passby, token });
    }
    p.match_word_else_error(&[")"], "after parameters")?;
    Ok(params)
}

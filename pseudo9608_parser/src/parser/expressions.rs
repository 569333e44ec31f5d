//! Expression grammar: precedence climbing over `logical` → `equality` →
//! `comparison` → `additive` → `multiplicative` → `primary`, per spec.md
//! §4.2. Mirrors `parser.py`'s `value`/`muldiv`/`addsub`/`comparison`/
//! `equality`/`logical`/`expression` chain one level at a time.

use super::Parser;
use crate::ast::{Expr, LiteralValue};
use crate::error::ParseResult;
use crate::operator::Operator;
use crate::token::{Token, TokenKind, TokenValue};

fn identifier(p: &mut Parser) -> ParseResult<(String, Token)> {
    let token = p.match_kind_else_error(&[TokenKind::Name], "expected a variable name")?;
    let name = token.word.clone();
    Ok((name, token))
}

fn literal(p: &mut Parser) -> ParseResult<Expr> {
    let token = p.match_kind_else_error(
        &[TokenKind::Boolean, TokenKind::Integer, TokenKind::Real, TokenKind::String, TokenKind::Null],
        "expected a literal",
    )?;
    let (type_name, value) = match &token.value {
        TokenValue::Bool(b) => ("BOOLEAN", LiteralValue::Bool(*b)),
        TokenValue::Int(i) => ("INTEGER", LiteralValue::Int(*i)),
        TokenValue::Real(r) => ("REAL", LiteralValue::Real(*r)),
        TokenValue::Str(s) => ("STRING", LiteralValue::Str(s.clone())),
        TokenValue::None => ("NULL", LiteralValue::Null),
        TokenValue::Operator(_) => unreachable!("literal tokens never carry an operator value"),
    };
    Ok(Expr::Literal { type_name: type_name.to_string(), value, token })
}

fn unary(p: &mut Parser) -> ParseResult<Expr> {
    let oper_token = p.consume();
    let oper = if oper_token.word == "NOT" { Operator::Not } else { Operator::Neg };
    let right = value(p)?;
    Ok(Expr::Unary { oper, right: Box::new(right), token: oper_token })
}

fn call_expr(p: &mut Parser, callable: Expr, token: Token) -> ParseResult<Expr> {
    let mut args = Vec::new();
    while !p.expect_word(&[")"]) {
        if !args.is_empty() {
            p.match_word_else_error(&[","], "between arguments")?;
        }
        args.push(expression(p)?);
    }
    p.match_word_else_error(&[")"], "after '('")?;
    Ok(Expr::Call { callable: Box::new(callable), args, token })
}

fn attr_expr(p: &mut Parser, object: Expr, token: Token) -> ParseResult<Expr> {
    let (name, _) = identifier(p)?;
    Ok(Expr::GetAttr { object: Box::new(object), name, token })
}

/// Index expressions parse at full expression precedence. The retrieved
/// original source restricts these to bare literal tokens (and its
/// `arrayExpr` assignment-target path is outright undefined), which would
/// reject the variable/arithmetic indices (`Data[j]`, `Data[j + 1]`) its own
/// bubble-sort and insertion-sort test suites rely on; full-expression
/// parsing is what actually makes those programs parse.
fn index_expr(p: &mut Parser, array: Expr, token: Token) -> ParseResult<Expr> {
    let mut indices = vec![expression(p)?];
    while p.match_word(&[","])?.is_some() {
        indices.push(expression(p)?);
    }
    p.match_word_else_error(&["]"], "after index list")?;
    Ok(Expr::GetIndex { array: Box::new(array), indices, token })
}

/// Primary expression: unary, grouping, literal, or a name with a postfix
/// chain of `[index]` / `(args)` / `.field`.
pub fn value(p: &mut Parser) -> ParseResult<Expr> {
    if p.expect_word(&["-", "NOT"]) {
        return unary(p);
    }
    if p.match_word(&["("])?.is_some() {
        let expr = expression(p)?;
        p.match_word_else_error(&[")"], "after '('")?;
        return Ok(expr);
    }
    if p.expect_kind(&[
        TokenKind::Boolean,
        TokenKind::Integer,
        TokenKind::Real,
        TokenKind::String,
        TokenKind::Null,
    ]) {
        return literal(p);
    }
    if p.expect_kind(&[TokenKind::Name]) {
        let (name, token) = identifier(p)?;
        let mut expr = Expr::UnresolvedName { name, token: token.clone() };
        loop {
            if p.match_word(&["["])?.is_some() {
                expr = index_expr(p, expr, token.clone())?;
            } else if p.match_word(&["("])?.is_some() {
                expr = call_expr(p, expr, token.clone())?;
            } else if p.match_word(&["."])?.is_some() {
                expr = attr_expr(p, expr, token.clone())?;
            } else {
                break;
            }
        }
        return Ok(expr);
    }
    Err(p.unexpected_token(""))
}

fn muldiv(p: &mut Parser) -> ParseResult<Expr> {
    let mut expr = value(p)?;
    while p.expect_word(&["*", "/"]) {
        let oper_token = p.consume();
        let oper = oper_token.value.as_operator().expect("scanner assigns an operator to */");
        let right = value(p)?;
        expr = Expr::Binary { left: Box::new(expr), oper, right: Box::new(right), token: oper_token };
    }
    Ok(expr)
}

fn addsub(p: &mut Parser) -> ParseResult<Expr> {
    let mut expr = muldiv(p)?;
    while p.expect_word(&["+", "-", "&"]) {
        let oper_token = p.consume();
        let oper = oper_token.value.as_operator().expect("scanner assigns an operator to + - &");
        let right = muldiv(p)?;
        expr = Expr::Binary { left: Box::new(expr), oper, right: Box::new(right), token: oper_token };
    }
    Ok(expr)
}

fn comparison(p: &mut Parser) -> ParseResult<Expr> {
    let mut expr = addsub(p)?;
    while p.expect_word(&["<", "<=", ">", ">="]) {
        let oper_token = p.consume();
        let oper = oper_token.value.as_operator().expect("scanner assigns an operator to comparisons");
        let right = addsub(p)?;
        expr = Expr::Binary { left: Box::new(expr), oper, right: Box::new(right), token: oper_token };
    }
    Ok(expr)
}

fn equality(p: &mut Parser) -> ParseResult<Expr> {
    let mut expr = comparison(p)?;
    while p.expect_word(&["<>", "="]) {
        let oper_token = p.consume();
        let oper = oper_token.value.as_operator().expect("scanner assigns an operator to <> and =");
        let right = comparison(p)?;
        expr = Expr::Binary { left: Box::new(expr), oper, right: Box::new(right), token: oper_token };
    }
    Ok(expr)
}

fn logical(p: &mut Parser) -> ParseResult<Expr> {
    let mut expr = equality(p)?;
    while p.expect_word(&["AND", "OR"]) {
        let oper_token = p.consume();
        let oper = oper_token.value.as_operator().expect("scanner assigns an operator to AND/OR");
        let right = equality(p)?;
        expr = Expr::Binary { left: Box::new(expr), oper, right: Box::new(right), token: oper_token };
    }
    Ok(expr)
}

/// Entry point: the lowest-precedence level (spec.md §4.2's "logical").
pub fn expression(p: &mut Parser) -> ParseResult<Expr> {
    logical(p)
}

/// Assignment target: one identifier followed by zero or more `[index]` /
/// `.field` postfixes, then `<-` and the right-hand expression.
pub fn assignment(p: &mut Parser) -> ParseResult<Expr> {
    let (name, token) = identifier(p)?;
    let mut assignee = Expr::UnresolvedName { name, token: token.clone() };
    loop {
        if p.match_word(&["["])?.is_some() {
            assignee = index_expr(p, assignee, token.clone())?;
        } else if p.match_word(&["."])?.is_some() {
            assignee = attr_expr(p, assignee, token.clone())?;
        } else {
            break;
        }
    }
    let assign_token = p.match_word_else_error(&["<-"], "after name")?;
    let expr = expression(p)?;
    Ok(Expr::Assign { assignee: Box::new(assignee), expr: Box::new(expr), token: assign_token })
}

//! Statement grammar: the six-level nesting hierarchy from spec.md §4.2,
//! grounded in `parser.py`'s `statement1`..`statement6` chain plus the
//! individual `*Stmt` functions.

use super::declarations::{declare, param_list};
use super::expressions::{assignment, expression, value};
use super::Parser;
use crate::ast::{CallableDecl, Expr, FileMode, LiteralValue, PassBy, Stmt};
use crate::error::ParseResult;
use crate::operator::Operator;
use crate::token::{Token, TokenKind, TokenValue};
use std::rc::Rc;

pub fn statement1(p: &mut Parser) -> ParseResult<Stmt> {
    if let Some(token) = p.match_word(&["RETURN"])? {
        return return_stmt(p, token);
    }
    statement3(p)
}

pub fn statement2(p: &mut Parser) -> ParseResult<Stmt> {
    if let Some(token) = p.match_word(&["FUNCTION"])? {
        return function_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["PROCEDURE"])? {
        return procedure_stmt(p, token);
    }
    statement3(p)
}

pub fn statement3(p: &mut Parser) -> ParseResult<Stmt> {
    if let Some(token) = p.match_word(&["DECLARE"])? {
        return declare_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["TYPE"])? {
        return type_stmt(p, token);
    }
    statement4(p)
}

pub fn statement4(p: &mut Parser) -> ParseResult<Stmt> {
    if let Some(token) = p.match_word(&["IF"])? {
        return if_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["WHILE"])? {
        return while_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["REPEAT"])? {
        return repeat_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["FOR"])? {
        return for_stmt(p, token);
    }
    statement5(p)
}

pub fn statement5(p: &mut Parser) -> ParseResult<Stmt> {
    if let Some(token) = p.match_word(&["CASE"])? {
        return case_stmt(p, token);
    }
    statement6(p)
}

pub fn statement6(p: &mut Parser) -> ParseResult<Stmt> {
    if let Some(token) = p.match_word(&["OUTPUT"])? {
        return output_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["INPUT"])? {
        return input_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["CALL"])? {
        return call_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["OPENFILE"])? {
        return openfile_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["READFILE"])? {
        return readfile_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["WRITEFILE"])? {
        return writefile_stmt(p, token);
    }
    if let Some(token) = p.match_word(&["CLOSEFILE"])? {
        return closefile_stmt(p, token);
    }
    if p.expect_kind(&[TokenKind::Name]) {
        return assign_stmt(p);
    }
    Err(p.unexpected_token(""))
}

fn output_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let mut exprs = vec![expression(p)?];
    while p.match_word(&[","])?.is_some() {
        exprs.push(expression(p)?);
    }
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::Output { exprs, token })
}

fn input_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let name_token = p.match_kind_else_error(&[TokenKind::Name], "expected a variable name")?;
    let set_expr = Expr::UnresolvedName { name: name_token.word.clone(), token: name_token };
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::Input { set_expr, token })
}

fn declare_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let (name, type_name, metadata, _) = declare(p)?;
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::Declare { name, type_name, metadata, passby: PassBy::ByValue, token })
}

fn type_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let name_token = p.match_kind_else_error(&[TokenKind::Name], "expected a type name")?;
    p.match_word_else_error(&["\n"], "after TYPE name")?;
    let mut fields = Vec::new();
    while !p.expect_word(&["ENDTYPE"]) {
        p.match_word_else_error(&["DECLARE"], "inside TYPE body")?;
        let (name, type_name, metadata, field_token) = declare(p)?;
        fields.push(crate::ast::Param { name, type_name, metadata, passby: PassBy::ByValue, token: field_token });
        p.match_word_else_error(&["\n"], "after field declaration")?;
    }
    p.match_word_else_error(&["ENDTYPE"], "at end of TYPE")?;
    p.match_word_else_error(&["\n"], "after ENDTYPE")?;
    Ok(Stmt::Type { name: name_token.word, fields, token })
}

fn assign_stmt(p: &mut Parser) -> ParseResult<Stmt> {
    let assign = assignment(p)?;
    let token = assign.token().clone();
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::Assign { assign, token })
}

fn case_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    p.match_word_else_error(&["OF"], "after CASE")?;
    let cond = value(p)?;
    p.match_word_else_error(&["\n"], "after CASE OF")?;
    let mut cases = Vec::new();
    while !p.expect_word(&["OTHERWISE", "ENDCASE"]) {
        let lit_token = p.match_kind_else_error(
            &[TokenKind::Boolean, TokenKind::Integer, TokenKind::Real, TokenKind::String, TokenKind::Null],
            "as a CASE value",
        )?;
        let literal_value = token_literal_value(&lit_token);
        p.match_word_else_error(&[":"], "after CASE value")?;
        cases.push((literal_value, vec![statement1(p)?]));
    }
    let fallback = if p.match_word(&["OTHERWISE"])?.is_some() {
        Some(vec![statement6(p)?])
    } else {
        None
    };
    p.match_word_else_error(&["ENDCASE"], "at end of CASE")?;
    p.match_word_else_error(&["\n"], "after ENDCASE")?;
    Ok(Stmt::Case { cond, cases, fallback, token })
}

fn token_literal_value(token: &Token) -> LiteralValue {
    match &token.value {
        TokenValue::Bool(b) => LiteralValue::Bool(*b),
        TokenValue::Int(i) => LiteralValue::Int(*i),
        TokenValue::Real(r) => LiteralValue::Real(*r),
        TokenValue::Str(s) => LiteralValue::Str(s.clone()),
        TokenValue::None => LiteralValue::Null,
        TokenValue::Operator(_) => unreachable!("CASE values are never operator tokens"),
    }
}

fn if_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let cond = expression(p)?;
    p.match_word(&["\n"])?;
    p.match_word_else_error(&["THEN"], "")?;
    p.match_word_else_error(&["\n"], "after THEN")?;
    let mut then_body = Vec::new();
    while !p.expect_word(&["ELSE", "ENDIF"]) {
        then_body.push(statement1(p)?);
    }
    let else_body = if p.match_word(&["ELSE"])?.is_some() {
        p.match_word_else_error(&["\n"], "after ELSE")?;
        let mut stmts = Vec::new();
        while !p.expect_word(&["ENDIF"]) {
            stmts.push(statement5(p)?);
        }
        Some(stmts)
    } else {
        None
    };
    p.match_word_else_error(&["ENDIF"], "at end of IF")?;
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::If { cond, then_body, else_body, token })
}

fn while_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let cond = expression(p)?;
    p.match_word_else_error(&["DO"], "after WHILE condition")?;
    p.match_word_else_error(&["\n"], "after DO")?;
    let mut body = Vec::new();
    while p.match_word(&["ENDWHILE"])?.is_none() {
        body.push(statement5(p)?);
    }
    p.match_word_else_error(&["\n"], "after ENDWHILE")?;
    Ok(Stmt::While { init: None, cond, body, token })
}

fn repeat_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    p.match_word_else_error(&["\n"], "after REPEAT")?;
    let mut body = Vec::new();
    while p.match_word(&["UNTIL"])?.is_none() {
        body.push(statement5(p)?);
    }
    let cond = expression(p)?;
    p.match_word_else_error(&["\n"], "at end of UNTIL")?;
    Ok(Stmt::Repeat { body, cond, token })
}

/// Desugars `FOR` into a `While` with a synthesised initialiser and a
/// trailing increment statement, per spec.md §4.2. The comparison operator
/// is `<=` unless `STEP` is a literal (`-`-prefixed or not) negative integer
/// or real, in which case it is `>=` — the fix for the descending-loop
/// hazard spec.md §9 licenses.
fn for_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let init_assign = assignment(p)?;
    let counter_name = match &init_assign {
        Expr::Assign { assignee, .. } => match assignee.as_ref() {
            Expr::UnresolvedName { name, .. } => name.clone(),
            _ => return Err(p.unexpected_token("")),
        },
        _ => unreachable!("assignment() always returns Expr::Assign"),
    };
    p.match_word_else_error(&["TO"], "after FOR initialiser")?;
    let end = value(p)?;
    let step = if p.match_word(&["STEP"])?.is_some() {
        value(p)?
    } else {
        Expr::Literal { type_name: "INTEGER".to_string(), value: LiteralValue::Int(1), token: token.clone() }
    };
    p.match_word_else_error(&["\n"], "at end of FOR")?;
    let mut body = Vec::new();
    while p.match_word(&["ENDFOR"])?.is_none() {
        body.push(statement5(p)?);
    }
    p.match_word_else_error(&["\n"], "after ENDFOR")?;

    let descending = negative_step_literal(&step);
    let cmp_op = if descending { Operator::Gte } else { Operator::Lte };

    let get_counter = Expr::UnresolvedName { name: counter_name.clone(), token: token.clone() };
    let cond = Expr::Binary { left: Box::new(get_counter.clone()), oper: cmp_op, right: Box::new(end), token: token.clone() };
    let incr_assignee = Expr::UnresolvedName { name: counter_name, token: token.clone() };
    let incr_expr = Expr::Binary { left: Box::new(get_counter), oper: Operator::Add, right: Box::new(step), token: token.clone() };
    let incr = Expr::Assign { assignee: Box::new(incr_assignee), expr: Box::new(incr_expr), token: token.clone() };

    let init_stmt = Stmt::Assign { assign: init_assign, token: token.clone() };
    let incr_stmt = Stmt::Assign { assign: incr, token: token.clone() };
    let mut stmts = body;
    stmts.push(incr_stmt);
    Ok(Stmt::While { init: Some(Box::new(init_stmt)), cond, body: stmts, token })
}

/// Whether a parsed `STEP` expression is a literal (possibly `-`-prefixed,
/// since `value()` never folds a leading `-` into the literal itself)
/// integer or real with a negative value — the only shape spec.md's parser
/// note says `FOR` inspects to pick `>=` over `<=`.
fn negative_step_literal(step: &Expr) -> bool {
    fn is_negative_literal(e: &Expr) -> bool {
        matches!(e, Expr::Literal { value: LiteralValue::Int(n), .. } if *n < 0)
            || matches!(e, Expr::Literal { value: LiteralValue::Real(r), .. } if *r < 0.0)
    }
    match step {
        Expr::Unary { oper: Operator::Neg, right, .. } => matches!(
            right.as_ref(),
            Expr::Literal { value: LiteralValue::Int(_), .. } | Expr::Literal { value: LiteralValue::Real(_), .. }
        ),
        other => is_negative_literal(other),
    }
}

fn procedure_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let name_token = p.match_kind_else_error(&[TokenKind::Name], "expected a procedure name")?;
    let params = param_list(p)?;
    p.match_word_else_error(&["\n"], "after parameters")?;
    let mut stmts = Vec::new();
    while p.match_word(&["ENDPROCEDURE"])?.is_none() {
        stmts.push(statement3(p)?);
    }
    p.match_word_else_error(&["\n"], "after ENDPROCEDURE")?;
    Ok(Stmt::Procedure(Rc::new(CallableDecl {
        name: name_token.word,
        params,
        stmts,
        return_type: None,
        token,
    })))
}

fn function_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let name_token = p.match_kind_else_error(&[TokenKind::Name], "expected a function name")?;
    let params = param_list(p)?;
    p.match_word_else_error(&["RETURNS"], "after parameters")?;
    const TYPES: &[&str] = &["BOOLEAN", "INTEGER", "REAL", "STRING", "FILE", "ARRAY", "NULL"];
    let return_token = p.match_word_else_error(TYPES, "as a return type")?;
    p.match_word_else_error(&["\n"], "at end of FUNCTION")?;
    let mut stmts = Vec::new();
    while p.match_word(&["ENDFUNCTION"])?.is_none() {
        stmts.push(statement3(p)?);
    }
    p.match_word_else_error(&["\n"], "after ENDFUNCTION")?;
    Ok(Stmt::Function(Rc::new(CallableDecl {
        name: name_token.word,
        params,
        stmts,
        return_type: Some(return_token.word),
        token,
    })))
}

fn return_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let expr = expression(p)?;
    p.match_word_else_error(&["\n"], "at end of RETURN")?;
    Ok(Stmt::Return { expr: Some(expr), token })
}

fn call_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let call = value(p)?;
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::Call { call, token })
}

fn openfile_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let filename = value(p)?;
    p.match_word_else_error(&["FOR"], "after file identifier")?;
    let mode_token = p.match_word_else_error(&["READ", "WRITE", "APPEND"], "as a file mode")?;
    let mode = match mode_token.word.as_str() {
        "READ" => FileMode::Read,
        "WRITE" => FileMode::Write,
        "APPEND" => FileMode::Append,
        _ => unreachable!(),
    };
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::OpenFile { filename, mode, token })
}

fn readfile_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let filename = value(p)?;
    p.match_word_else_error(&[","], "after file identifier")?;
    let name_token = p.match_kind_else_error(&[TokenKind::Name], "expected a variable name")?;
    let set_expr = Expr::UnresolvedName { name: name_token.word.clone(), token: name_token };
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::ReadFile { filename, set_expr, token })
}

fn writefile_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let filename = value(p)?;
    p.match_word_else_error(&[","], "after file identifier")?;
    let data = expression(p)?;
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::WriteFile { filename, data, token })
}

fn closefile_stmt(p: &mut Parser, token: Token) -> ParseResult<Stmt> {
    let filename = value(p)?;
    p.match_word_else_error(&["\n"], "after statement")?;
    Ok(Stmt::CloseFile { filename, token })
}

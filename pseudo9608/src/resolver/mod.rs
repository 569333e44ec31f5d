//! Static resolver: binds every `UnresolvedName` to a frame depth, declares
//! variables/callables/types, and type-checks every operation (spec.md
//! §4.4). Builds and discards its own frame tree purely for this purpose —
//! the evaluator rebuilds a fresh one at run time and relies only on the
//! `frame_depth`s this pass writes onto `Expr::GetName` nodes, per
//! `pseudo9608_parser::ast`'s design note on why frames aren't shared
//! directly between the two passes.

use std::rc::Rc;

use pseudo9608_parser::ast::{CallableDecl, Expr, LiteralValue, PassBy, Stmt};
use pseudo9608_parser::operator::Operator;
use pseudo9608_parser::token::Token;

use crate::builtins;
use crate::declare::{materialize_declare, ResolvedType};
use crate::error::LogicError;
use crate::frame::{self, Frame};
use crate::typesystem::new_type_system;
use crate::value::{Callable, Slot, TypedValue, Value};

/// Resolve `stmts` in place. On success every `UnresolvedName` has become a
/// `GetName` with a valid `frame_depth`.
pub fn resolve_program(stmts: &mut Vec<Stmt>) -> Result<(), LogicError> {
    let types = new_type_system();
    let global = frame::new_root(types);
    builtins::seed(&global);
    resolve_block(stmts, &global, None)
}

fn resolve_block(stmts: &mut [Stmt], frame: &Frame, ctx: Option<&str>) -> Result<(), LogicError> {
    for stmt in stmts.iter_mut() {
        resolve_stmt(stmt, frame, ctx)?;
    }
    Ok(())
}

fn resolve_stmt(stmt: &mut Stmt, frame: &Frame, ctx: Option<&str>) -> Result<(), LogicError> {
    match stmt {
        Stmt::Output { exprs, .. } => {
            for e in exprs.iter_mut() {
                resolve_expr(e, frame)?;
            }
            Ok(())
        }
        Stmt::Input { set_expr, token } => {
            resolve_expr(set_expr, frame)?;
            if !set_expr.is_assignable() {
                return Err(LogicError::NotAnLValue { line: token.line, column: token.column, word: token.word.clone() });
            }
            Ok(())
        }
        Stmt::If { cond, then_body, else_body, token } => {
            require_boolean(resolve_expr(cond, frame)?, token)?;
            resolve_block(then_body, frame, ctx)?;
            if let Some(body) = else_body {
                resolve_block(body, frame, ctx)?;
            }
            Ok(())
        }
        Stmt::Case { cond, cases, fallback, token } => {
            let cond_type = resolve_expr(cond, frame)?;
            for (literal, body) in cases.iter_mut() {
                let lt = literal_type(literal);
                if lt != cond_type.type_name() {
                    return Err(LogicError::CaseValueTypeMismatch {
                        line: token.line,
                        column: token.column,
                        word: token.word.clone(),
                        expected: cond_type.type_name().to_string(),
                        got: lt.to_string(),
                    });
                }
                resolve_block(body, frame, ctx)?;
            }
            if let Some(body) = fallback {
                resolve_block(body, frame, ctx)?;
            }
            Ok(())
        }
        Stmt::While { init, cond, body, token } => {
            if let Some(init_stmt) = init {
                resolve_stmt(init_stmt, frame, ctx)?;
            }
            require_boolean(resolve_expr(cond, frame)?, token)?;
            resolve_block(body, frame, ctx)
        }
        Stmt::Repeat { body, cond, token } => {
            resolve_block(body, frame, ctx)?;
            require_boolean(resolve_expr(cond, frame)?, token)
        }
        Stmt::Procedure(decl) => resolve_callable(decl, frame, false),
        Stmt::Function(decl) => resolve_callable(decl, frame, true),
        Stmt::Type { name, fields, .. } => {
            let types = frame.borrow().types.clone();
            types.borrow_mut().declare(name);
            let mut template = std::collections::HashMap::new();
            for field in fields.iter() {
                if field.type_name == "ARRAY" {
                    return Err(LogicError::ArrayFieldType {
                        line: field.token.line,
                        column: field.token.column,
                        word: field.token.word.clone(),
                        got: "ARRAY".to_string(),
                    });
                }
                if !types.borrow().contains(&field.type_name) {
                    return Err(LogicError::UndeclaredType {
                        line: field.token.line,
                        column: field.token.column,
                        word: field.type_name.clone(),
                    });
                }
                template.insert(field.name.clone(), field.type_name.clone());
            }
            types.borrow_mut().set_template(name, template);
            Ok(())
        }
        Stmt::OpenFile { filename, token, .. } => {
            require_type(resolve_expr(filename, frame)?, "STRING", token)
        }
        Stmt::ReadFile { filename, set_expr, token } => {
            require_type(resolve_expr(filename, frame)?, "STRING", token)?;
            resolve_expr(set_expr, frame)?;
            if !set_expr.is_assignable() {
                return Err(LogicError::NotAnLValue { line: token.line, column: token.column, word: token.word.clone() });
            }
            Ok(())
        }
        Stmt::WriteFile { filename, data, token } => {
            require_type(resolve_expr(filename, frame)?, "STRING", token)?;
            resolve_expr(data, frame)?;
            Ok(())
        }
        Stmt::CloseFile { filename, token } => {
            require_type(resolve_expr(filename, frame)?, "STRING", token)
        }
        Stmt::Call { call, token } => match call {
            Expr::Call { callable, args, token: call_token } => {
                resolve_call(callable, args, frame, call_token, CallContext::Statement)?;
                Ok(())
            }
            _ => Err(LogicError::NotCallable { line: token.line, column: token.column, word: token.word.clone() }),
        },
        Stmt::Assign { assign, .. } => {
            resolve_expr(assign, frame)?;
            Ok(())
        }
        Stmt::Declare { name, type_name, metadata, passby, token } => {
            if *passby == PassBy::ByValue && frame.borrow().has_local(name) {
                return Err(LogicError::DuplicateDeclaration { line: token.line, column: token.column, word: name.clone() });
            }
            materialize_declare(frame, name, type_name, metadata, token.line, token.column)?;
            Ok(())
        }
        Stmt::Return { expr, token } => match ctx {
            None => Err(LogicError::UnexpectedReturn { line: token.line, column: token.column, word: token.word.clone() }),
            Some(return_type) => {
                let e = expr.as_mut().expect("RETURN always carries an expression");
                let resolved = resolve_expr(e, frame)?;
                if resolved.type_name() != return_type {
                    Err(LogicError::ReturnTypeMismatch {
                        line: token.line,
                        column: token.column,
                        word: token.word.clone(),
                        expected: return_type.to_string(),
                        got: resolved.type_name().to_string(),
                    })
                } else {
                    Ok(())
                }
            }
        },
    }
}

/// Two-phase resolution so recursive self-calls find their own name:
/// a throwaway signature clone (empty body) is declared into `frame` before
/// the real body is resolved, so a call inside the body sees a `Callable`
/// with the right shape without requiring two owners of the live
/// `Rc<CallableDecl>` the `Stmt` holds (which would make `Rc::get_mut` on
/// it fail once the body needs mutating in place).
fn resolve_callable(decl: &mut Rc<CallableDecl>, frame: &Frame, is_function: bool) -> Result<(), LogicError> {
    let env = frame::new_child(frame);
    for param in decl.params.iter() {
        materialize_declare(&env, &param.name, &param.type_name, &param.metadata, param.token.line, param.token.column)?;
    }

    let return_type = decl.return_type.clone().unwrap_or_else(|| "NULL".to_string());
    if !frame.borrow().types.borrow().contains(&return_type) {
        return Err(LogicError::UndeclaredType { line: decl.token.line, column: decl.token.column, word: return_type });
    }

    let stub = {
        let mut cloned = (**decl).clone();
        cloned.stmts = Vec::new();
        Rc::new(cloned)
    };
    let stub_value = if is_function {
        Value::Function(Rc::new(Callable { declaring_frame: frame.clone(), decl: stub }))
    } else {
        Value::Procedure(Rc::new(Callable { declaring_frame: frame.clone(), decl: stub }))
    };
    frame.borrow_mut().declare(&decl.name, TypedValue::with_value(return_type.clone(), stub_value).into_slot());

    let ctx = if is_function { Some(return_type.as_str()) } else { None };
    {
        let decl_mut = Rc::get_mut(decl).expect("decl uniquely owned by its Stmt at resolve time");
        resolve_block(&mut decl_mut.stmts, &env, ctx)?;
    }

    if is_function && !contains_return(&decl.stmts) {
        return Err(LogicError::MissingReturn { line: decl.token.line, column: decl.token.column, word: decl.name.clone() });
    }
    Ok(())
}

fn contains_return(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|s| match s {
        Stmt::Return { .. } => true,
        Stmt::If { then_body, else_body, .. } => {
            contains_return(then_body) || else_body.as_ref().map(|b| contains_return(b)).unwrap_or(false)
        }
        Stmt::Case { cases, fallback, .. } => {
            cases.iter().any(|(_, body)| contains_return(body))
                || fallback.as_ref().map(|b| contains_return(b)).unwrap_or(false)
        }
        Stmt::While { body, .. } => contains_return(body),
        Stmt::Repeat { body, .. } => contains_return(body),
        _ => false,
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CallContext {
    Statement,
    Expression,
}

enum CallKind {
    Procedure,
    Function,
    Builtin,
}

struct Signature {
    params: Vec<(String, PassBy)>,
    return_type: String,
    kind: CallKind,
}

fn resolve_call(
    callable: &mut Expr,
    args: &mut [Expr],
    frame: &Frame,
    token: &Token,
    ctx: CallContext,
) -> Result<ResolvedType, LogicError> {
    let name = match callable {
        Expr::UnresolvedName { name, .. } | Expr::GetName { name, .. } => name.clone(),
        _ => return Err(LogicError::NotCallable { line: token.line, column: token.column, word: token.word.clone() }),
    };
    let call_token = callable.token().clone();
    let depth = frame::lookup_depth(frame, &name)
        .ok_or_else(|| LogicError::Undeclared { line: call_token.line, column: call_token.column, word: name.clone() })?;
    match callable {
        Expr::UnresolvedName { .. } => {
            *callable = Expr::GetName { name: name.clone(), frame_depth: depth, token: call_token.clone() };
        }
        Expr::GetName { frame_depth, .. } => *frame_depth = depth,
        _ => unreachable!(),
    }

    let owner = frame::frame_at_depth(frame, depth);
    let slot: Slot = frame::get_slot(&owner, &name).expect("lookup_depth guarantees the name exists at this depth");
    let sig = {
        let tv = slot.borrow();
        match &tv.value {
            Some(Value::Procedure(c)) => Signature {
                params: c.decl.params.iter().map(|p| (p.type_name.clone(), p.passby)).collect(),
                return_type: "NULL".to_string(),
                kind: CallKind::Procedure,
            },
            Some(Value::Function(c)) => Signature {
                params: c.decl.params.iter().map(|p| (p.type_name.clone(), p.passby)).collect(),
                return_type: c.decl.return_type.clone().expect("FUNCTION always declares a return type"),
                kind: CallKind::Function,
            },
            Some(Value::Builtin(b)) => Signature {
                params: b.params.iter().map(|(_, t)| (t.clone(), PassBy::ByValue)).collect(),
                return_type: b.return_type.clone(),
                kind: CallKind::Builtin,
            },
            _ => return Err(LogicError::NotCallable { line: call_token.line, column: call_token.column, word: name.clone() }),
        }
    };

    match (ctx, &sig.kind) {
        (CallContext::Statement, CallKind::Function) => {
            return Err(LogicError::NotCallable { line: call_token.line, column: call_token.column, word: name.clone() });
        }
        (CallContext::Expression, CallKind::Procedure) => {
            return Err(LogicError::NotCallable { line: call_token.line, column: call_token.column, word: name.clone() });
        }
        _ => {}
    }

    if args.len() != sig.params.len() {
        return Err(LogicError::WrongArgumentCount {
            line: call_token.line,
            column: call_token.column,
            word: name.clone(),
            expected: sig.params.len(),
            got: args.len(),
        });
    }

    for (arg, (ptype, passby)) in args.iter_mut().zip(sig.params.iter()) {
        let resolved = resolve_expr(arg, frame)?;
        let arg_token = arg.token().clone();
        if resolved.type_name() != ptype {
            return Err(LogicError::WrongArgumentType {
                line: arg_token.line,
                column: arg_token.column,
                word: arg_token.word,
                expected: ptype.clone(),
                got: resolved.type_name().to_string(),
            });
        }
        if *passby == PassBy::ByRef && !arg.is_assignable() {
            return Err(LogicError::ByRefRequiresLValue { line: arg_token.line, column: arg_token.column, word: arg_token.word });
        }
    }

    Ok(ResolvedType::Named(sig.return_type))
}

fn resolve_expr(expr: &mut Expr, frame: &Frame) -> Result<ResolvedType, LogicError> {
    match expr {
        Expr::Literal { value, .. } => Ok(ResolvedType::Named(literal_type(value).to_string())),
        Expr::Unary { oper, right, token } => {
            let rt = resolve_expr(right, frame)?;
            match oper {
                Operator::Neg => {
                    if is_numeric(rt.type_name()) {
                        Ok(rt)
                    } else {
                        Err(LogicError::WrongOperandType {
                            line: token.line,
                            column: token.column,
                            word: token.word.clone(),
                            expected: "INTEGER or REAL".to_string(),
                            got: rt.type_name().to_string(),
                        })
                    }
                }
                Operator::Not => {
                    if rt.type_name() == "BOOLEAN" {
                        Ok(ResolvedType::Named("BOOLEAN".to_string()))
                    } else {
                        Err(LogicError::WrongOperandType {
                            line: token.line,
                            column: token.column,
                            word: token.word.clone(),
                            expected: "BOOLEAN".to_string(),
                            got: rt.type_name().to_string(),
                        })
                    }
                }
                _ => unreachable!("parser only emits Neg/Not for Unary"),
            }
        }
        Expr::Binary { left, oper, right, token } => {
            let lt = resolve_expr(left, frame)?;
            let rt = resolve_expr(right, frame)?;
            resolve_binary(*oper, &lt, &rt, token)
        }
        Expr::UnresolvedName { name, token } => {
            let depth = frame::lookup_depth(frame, name)
                .ok_or_else(|| LogicError::Undeclared { line: token.line, column: token.column, word: name.clone() })?;
            let owner = frame::frame_at_depth(frame, depth);
            let slot = frame::get_slot(&owner, name).expect("lookup_depth guarantees the name exists at this depth");
            let resolved = resolved_type_of_slot(&slot);
            *expr = Expr::GetName { name: name.clone(), frame_depth: depth, token: token.clone() };
            Ok(resolved)
        }
        Expr::GetName { name, frame_depth, token } => {
            let depth = frame::lookup_depth(frame, name)
                .ok_or_else(|| LogicError::Undeclared { line: token.line, column: token.column, word: name.clone() })?;
            *frame_depth = depth;
            let owner = frame::frame_at_depth(frame, depth);
            let slot = frame::get_slot(&owner, name).expect("lookup_depth guarantees the name exists at this depth");
            Ok(resolved_type_of_slot(&slot))
        }
        Expr::GetIndex { array, indices, token } => {
            let at = resolve_expr(array, frame)?;
            let element_type = match at {
                ResolvedType::Array { element_type } => element_type,
                ResolvedType::Named(_) => {
                    return Err(LogicError::NotAnArray { line: token.line, column: token.column, word: token.word.clone() })
                }
            };
            for idx in indices.iter_mut() {
                let it = resolve_expr(idx, frame)?;
                if it.type_name() != "INTEGER" {
                    let idx_token = idx.token().clone();
                    return Err(LogicError::InvalidIndexType {
                        line: idx_token.line,
                        column: idx_token.column,
                        word: idx_token.word,
                        got: it.type_name().to_string(),
                    });
                }
            }
            Ok(ResolvedType::Named(element_type))
        }
        Expr::GetAttr { object, name, token } => {
            let ot = resolve_expr(object, frame)?;
            let type_name = ot.type_name().to_string();
            let types = frame.borrow().types.clone();
            if !types.borrow().is_record(&type_name) {
                return Err(LogicError::NotARecord { line: token.line, column: token.column, word: token.word.clone() });
            }
            let field_type = {
                let ts = types.borrow();
                let template = ts.get(&type_name).expect("is_record implies a template is present");
                template.object_template.as_ref().and_then(|fields| fields.get(name).cloned())
            };
            match field_type {
                Some(ft) => Ok(ResolvedType::Named(ft)),
                None => Err(LogicError::MissingField {
                    line: token.line,
                    column: token.column,
                    word: token.word.clone(),
                    field: name.clone(),
                }),
            }
        }
        Expr::Call { callable, args, token } => resolve_call(callable, args, frame, token, CallContext::Expression),
        Expr::Assign { assignee, expr: value_expr, token } => {
            let at = resolve_expr(assignee, frame)?;
            if !assignee.is_assignable() {
                return Err(LogicError::NotAnLValue { line: token.line, column: token.column, word: token.word.clone() });
            }
            let vt = resolve_expr(value_expr, frame)?;
            if at.type_name() != vt.type_name() {
                return Err(LogicError::AssignmentTypeMismatch {
                    line: token.line,
                    column: token.column,
                    word: token.word.clone(),
                    expected: at.type_name().to_string(),
                    got: vt.type_name().to_string(),
                });
            }
            Ok(at)
        }
    }
}

fn resolve_binary(op: Operator, lt: &ResolvedType, rt: &ResolvedType, token: &Token) -> Result<ResolvedType, LogicError> {
    let l = lt.type_name();
    let r = rt.type_name();
    match op {
        Operator::And | Operator::Or => {
            if l == "BOOLEAN" && r == "BOOLEAN" {
                Ok(ResolvedType::Named("BOOLEAN".to_string()))
            } else {
                Err(LogicError::WrongOperandType {
                    line: token.line,
                    column: token.column,
                    word: token.word.clone(),
                    expected: "BOOLEAN".to_string(),
                    got: if l != "BOOLEAN" { l.to_string() } else { r.to_string() },
                })
            }
        }
        Operator::Eq | Operator::Ne => {
            let compatible = (l == "BOOLEAN" && r == "BOOLEAN") || (is_numeric(l) && is_numeric(r)) || l == r;
            if compatible {
                Ok(ResolvedType::Named("BOOLEAN".to_string()))
            } else {
                Err(LogicError::IllegalComparison {
                    line: token.line,
                    column: token.column,
                    word: token.word.clone(),
                    left: l.to_string(),
                    right: r.to_string(),
                })
            }
        }
        Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
            if is_numeric(l) && is_numeric(r) {
                Ok(ResolvedType::Named("BOOLEAN".to_string()))
            } else {
                Err(LogicError::IllegalComparison {
                    line: token.line,
                    column: token.column,
                    word: token.word.clone(),
                    left: l.to_string(),
                    right: r.to_string(),
                })
            }
        }
        Operator::Add | Operator::Sub | Operator::Mul | Operator::Div => {
            if !is_numeric(l) || !is_numeric(r) {
                return Err(LogicError::WrongOperandType {
                    line: token.line,
                    column: token.column,
                    word: token.word.clone(),
                    expected: "INTEGER or REAL".to_string(),
                    got: if !is_numeric(l) { l.to_string() } else { r.to_string() },
                });
            }
            if op == Operator::Div {
                Ok(ResolvedType::Named("REAL".to_string()))
            } else if l == "INTEGER" && r == "INTEGER" {
                Ok(ResolvedType::Named("INTEGER".to_string()))
            } else {
                Ok(ResolvedType::Named("REAL".to_string()))
            }
        }
        Operator::Concat => {
            if l == "STRING" && r == "STRING" {
                Ok(ResolvedType::Named("STRING".to_string()))
            } else {
                Err(LogicError::WrongOperandType {
                    line: token.line,
                    column: token.column,
                    word: token.word.clone(),
                    expected: "STRING".to_string(),
                    got: if l != "STRING" { l.to_string() } else { r.to_string() },
                })
            }
        }
        Operator::Not | Operator::Neg => unreachable!("unary-only operators never appear on Binary"),
    }
}

fn is_numeric(type_name: &str) -> bool {
    type_name == "INTEGER" || type_name == "REAL"
}

fn literal_type(value: &LiteralValue) -> &'static str {
    match value {
        LiteralValue::Null => "NULL",
        LiteralValue::Bool(_) => "BOOLEAN",
        LiteralValue::Int(_) => "INTEGER",
        LiteralValue::Real(_) => "REAL",
        LiteralValue::Str(_) => "STRING",
    }
}

fn resolved_type_of_slot(slot: &Slot) -> ResolvedType {
    let tv = slot.borrow();
    if tv.type_name == "ARRAY" {
        if let Some(Value::Array(arr)) = &tv.value {
            return ResolvedType::Array { element_type: arr.borrow().element_type.clone() };
        }
    }
    ResolvedType::Named(tv.type_name.clone())
}

fn require_boolean(rt: ResolvedType, token: &Token) -> Result<(), LogicError> {
    require_type(rt, "BOOLEAN", token)
}

fn require_type(rt: ResolvedType, expected: &str, token: &Token) -> Result<(), LogicError> {
    if rt.type_name() == expected {
        Ok(())
    } else {
        Err(LogicError::WrongOperandType {
            line: token.line,
            column: token.column,
            word: token.word.clone(),
            expected: expected.to_string(),
            got: rt.type_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pseudo9608_parser::parse_source;

    fn resolve(src: &str) -> Result<Vec<Stmt>, LogicError> {
        let mut stmts = parse_source(src).expect("parse failed");
        resolve_program(&mut stmts)?;
        Ok(stmts)
    }

    #[test]
    fn resolves_scalar_arithmetic() {
        let stmts = resolve("DECLARE X : INTEGER\nX <- 3 + 4 * 2\nOUTPUT X\n").unwrap();
        match &stmts[2] {
            Stmt::Output { exprs, .. } => match &exprs[0] {
                Expr::GetName { name, frame_depth, .. } => {
                    assert_eq!(name, "X");
                    assert_eq!(*frame_depth, 0);
                }
                other => panic!("expected GetName, got {other:?}"),
            },
            other => panic!("expected Output, got {other:?}"),
        }
    }

    #[test]
    fn undeclared_name_is_a_logic_error() {
        let err = resolve("OUTPUT X\n").unwrap_err();
        assert!(matches!(err, LogicError::Undeclared { .. }));
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let err = resolve("DECLARE X : INTEGER\nDECLARE X : INTEGER\n").unwrap_err();
        assert!(matches!(err, LogicError::DuplicateDeclaration { .. }));
    }

    #[test]
    fn case_value_type_mismatch_mentions_expect() {
        let src = "DECLARE S : STRING\n\
                   S <- \"x\"\n\
                   CASE OF S\n\
                   1: OUTPUT \"one\"\n\
                   ENDCASE\n";
        let err = resolve(src).unwrap_err();
        assert!(matches!(err, LogicError::CaseValueTypeMismatch { .. }));
        assert!(err.to_string().contains("expect"));
    }

    #[test]
    fn function_without_return_is_rejected() {
        let src = "FUNCTION F() RETURNS INTEGER\n\
                   DECLARE X : INTEGER\n\
                   ENDFUNCTION\n";
        let err = resolve(src).unwrap_err();
        assert!(matches!(err, LogicError::MissingReturn { .. }));
    }

    #[test]
    fn recursive_function_resolves_self_call() {
        let src = "FUNCTION Fact(N : INTEGER) RETURNS INTEGER\n\
                   IF N <= 1 THEN\n\
                   RETURN 1\n\
                   ELSE\n\
                   RETURN N * Fact(N - 1)\n\
                   ENDIF\n\
                   ENDFUNCTION\n";
        resolve(src).unwrap();
    }
}

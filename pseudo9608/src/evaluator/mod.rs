//! Tree-walking evaluator: executes a resolved statement tree against a
//! chain of runtime frames (spec.md §4.5).
//!
//! Builds its own global frame from scratch rather than reusing the
//! resolver's (discarded) one — see `pseudo9608_parser::ast`'s note on why
//! `GetName` stores a `frame_depth` rather than a frame handle. One
//! consequence: `DeclareStmt`/`TypeStmt`/`ProcedureStmt`/`FunctionStmt` are
//! *not* the no-ops spec.md §4.5 describes for a single shared frame — each
//! re-materializes its runtime binding the first time it runs, and
//! `DECLARE` does so on every re-entry of a loop body or callable (see
//! `crate::declare`'s doc comment on why that follows from allocating a
//! fresh `env` per call).

use std::fs::{File as StdFile, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write as _};
use std::rc::Rc;

use pseudo9608_parser::ast::{CallableDecl, Expr, FileMode, LiteralValue, PassBy, Stmt};
use pseudo9608_parser::operator::Operator;
use pseudo9608_parser::token::Token;

use crate::builtins;
use crate::declare::materialize_declare;
use crate::error::RuntimeError;
use crate::frame::{self, Frame};
use crate::rng::Rng;
use crate::typesystem::new_type_system;
use crate::value::{
    ArrayRef, Builtin, Callable, FileData, IoHandle, ObjectRef, Slot, TypedValue, Value,
};

/// Host I/O, injected by the driver (spec.md §6). `crate::terminal_handlers`
/// wires these to stdin/stdout; tests supply in-memory buffers instead.
pub struct Handlers {
    pub read: Box<dyn FnMut() -> String>,
    pub write: Box<dyn FnMut(&str)>,
}

struct EvalCtx<'a> {
    handlers: &'a mut Handlers,
    rng: Rng,
}

/// What happened after running a block: it ran to completion, or a
/// `RETURN` fired partway through and should propagate straight out to the
/// enclosing call without running the rest of the block (or any enclosing
/// loop/if/case it's nested in).
enum Flow {
    Normal,
    Return(Option<Value>),
}

/// Build a fresh global frame, seed the four builtins, and run `stmts`
/// against it. Returns the frame (for `--dump-frame`) on success; any
/// file left open in the global frame is flushed and closed either way.
pub fn evaluate_program(
    stmts: &[Stmt],
    handlers: &mut Handlers,
    seed: Option<u64>,
) -> Result<Frame, RuntimeError> {
    let types = new_type_system();
    let global = frame::new_root(types);
    builtins::seed(&global);
    let rng = match seed {
        Some(s) => Rng::new(s),
        None => Rng::from_time(),
    };
    let mut ctx = EvalCtx { handlers, rng };
    let result = exec_block(stmts, &global, &mut ctx).map(|_| ());
    close_all_open_files(&global);
    result?;
    Ok(global)
}

fn close_all_open_files(frame: &Frame) {
    for name in frame.borrow().names() {
        let Some(slot) = frame::get_slot(frame, &name) else { continue };
        let is_file = matches!(slot.borrow().value, Some(Value::File(_)));
        if !is_file {
            continue;
        }
        if let Some(Value::File(file)) = &slot.borrow().value {
            if let IoHandle::Writer(w) = &mut file.borrow_mut().handle {
                let _ = w.flush();
            }
        }
        frame.borrow_mut().delete(&name);
    }
}

fn exec_block(stmts: &[Stmt], frame: &Frame, ctx: &mut EvalCtx) -> Result<Flow, RuntimeError> {
    for stmt in stmts {
        match exec_stmt(stmt, frame, ctx)? {
            Flow::Normal => {}
            ret @ Flow::Return(_) => return Ok(ret),
        }
    }
    Ok(Flow::Normal)
}

fn exec_stmt(stmt: &Stmt, frame: &Frame, ctx: &mut EvalCtx) -> Result<Flow, RuntimeError> {
    match stmt {
        Stmt::Output { exprs, .. } => {
            let mut line = String::new();
            for e in exprs {
                line.push_str(&eval_expr(e, frame, ctx)?.display());
            }
            (ctx.handlers.write)(&line);
            Ok(Flow::Normal)
        }
        Stmt::Input { set_expr, .. } => {
            let line = (ctx.handlers.read)();
            let slot = resolve_slot(set_expr, frame, ctx)?;
            slot.borrow_mut().value = Some(Value::Str(line));
            Ok(Flow::Normal)
        }
        Stmt::If { cond, then_body, else_body, .. } => {
            if eval_bool(cond, frame, ctx)? {
                exec_block(then_body, frame, ctx)
            } else if let Some(body) = else_body {
                exec_block(body, frame, ctx)
            } else {
                Ok(Flow::Normal)
            }
        }
        Stmt::Case { cond, cases, fallback, .. } => {
            let value = eval_expr(cond, frame, ctx)?;
            for (literal, body) in cases {
                if literal_matches(literal, &value) {
                    return exec_block(body, frame, ctx);
                }
            }
            match fallback {
                Some(body) => exec_block(body, frame, ctx),
                None => Ok(Flow::Normal),
            }
        }
        Stmt::While { init, cond, body, .. } => {
            if let Some(init_stmt) = init {
                if let ret @ Flow::Return(_) = exec_stmt(init_stmt, frame, ctx)? {
                    return Ok(ret);
                }
            }
            while eval_bool(cond, frame, ctx)? {
                if let ret @ Flow::Return(_) = exec_block(body, frame, ctx)? {
                    return Ok(ret);
                }
            }
            Ok(Flow::Normal)
        }
        Stmt::Repeat { body, cond, .. } => loop {
            if let ret @ Flow::Return(_) = exec_block(body, frame, ctx)? {
                return Ok(ret);
            }
            if eval_bool(cond, frame, ctx)? {
                return Ok(Flow::Normal);
            }
        },
        Stmt::Procedure(decl) => {
            declare_callable(frame, decl, false);
            Ok(Flow::Normal)
        }
        Stmt::Function(decl) => {
            declare_callable(frame, decl, true);
            Ok(Flow::Normal)
        }
        Stmt::Type { name, fields, .. } => {
            let types = frame.borrow().types.clone();
            types.borrow_mut().declare(name);
            let mut template = std::collections::HashMap::new();
            for field in fields {
                template.insert(field.name.clone(), field.type_name.clone());
            }
            types.borrow_mut().set_template(name, template);
            Ok(Flow::Normal)
        }
        Stmt::OpenFile { filename, mode, .. } => {
            let name = eval_str(filename, frame, ctx)?;
            if frame.borrow().has_local(&name) {
                return Err(RuntimeError::FileAlreadyOpen(name));
            }
            let handle = open_handle(&name, *mode)?;
            let file = FileData { name: name.clone(), mode: *mode, handle };
            let slot = TypedValue::with_value("FILE", Value::File(Rc::new(std::cell::RefCell::new(file)))).into_slot();
            frame.borrow_mut().declare(&name, slot);
            Ok(Flow::Normal)
        }
        Stmt::ReadFile { filename, set_expr, .. } => {
            let name = eval_str(filename, frame, ctx)?;
            let owner = frame::lookup(frame, &name).ok_or_else(|| RuntimeError::FileNotOpen(name.clone()))?;
            let slot = frame::get_slot(&owner, &name).expect("lookup guarantees this name is local to owner");
            let line = {
                let tv = slot.borrow();
                match &tv.value {
                    Some(Value::File(file_ref)) => {
                        let mut file = file_ref.borrow_mut();
                        match &mut file.handle {
                            IoHandle::Reader(r) => {
                                read_line_stripped(r).map_err(|e| RuntimeError::Io(e.to_string()))?
                            }
                            IoHandle::Writer(_) => return Err(RuntimeError::WrongFileMode(name, "READ")),
                        }
                    }
                    _ => return Err(RuntimeError::FileNotOpen(name)),
                }
            };
            let target = resolve_slot(set_expr, frame, ctx)?;
            target.borrow_mut().value = Some(Value::Str(line));
            Ok(Flow::Normal)
        }
        Stmt::WriteFile { filename, data, .. } => {
            let name = eval_str(filename, frame, ctx)?;
            let text = eval_expr(data, frame, ctx)?.display();
            let owner = frame::lookup(frame, &name).ok_or_else(|| RuntimeError::FileNotOpen(name.clone()))?;
            let slot = frame::get_slot(&owner, &name).expect("lookup guarantees this name is local to owner");
            let tv = slot.borrow();
            match &tv.value {
                Some(Value::File(file_ref)) => {
                    let mut file = file_ref.borrow_mut();
                    match &mut file.handle {
                        IoHandle::Writer(w) => {
                            w.write_all(text.as_bytes()).map_err(|e| RuntimeError::Io(e.to_string()))?;
                            if !text.ends_with('\n') {
                                w.write_all(b"\n").map_err(|e| RuntimeError::Io(e.to_string()))?;
                            }
                            Ok(Flow::Normal)
                        }
                        IoHandle::Reader(_) => Err(RuntimeError::WrongFileMode(name, "WRITE or APPEND")),
                    }
                }
                _ => Err(RuntimeError::FileNotOpen(name)),
            }
        }
        Stmt::CloseFile { filename, .. } => {
            let name = eval_str(filename, frame, ctx)?;
            let owner = frame::lookup(frame, &name).ok_or_else(|| RuntimeError::FileNotOpen(name.clone()))?;
            if let Some(slot) = frame::get_slot(&owner, &name) {
                if let Some(Value::File(file_ref)) = &slot.borrow().value {
                    if let IoHandle::Writer(w) = &mut file_ref.borrow_mut().handle {
                        let _ = w.flush();
                    }
                }
            }
            owner.borrow_mut().delete(&name);
            Ok(Flow::Normal)
        }
        Stmt::Call { call, .. } => match call {
            Expr::Call { callable, args, .. } => {
                eval_call(callable, args, frame, ctx)?;
                Ok(Flow::Normal)
            }
            _ => unreachable!("resolver only accepts Expr::Call inside Stmt::Call"),
        },
        Stmt::Assign { assign, .. } => {
            eval_expr(assign, frame, ctx)?;
            Ok(Flow::Normal)
        }
        Stmt::Declare { name, type_name, metadata, token, .. } => {
            materialize_declare(frame, name, type_name, metadata, token.line, token.column)
                .expect("resolver already validated this DECLARE");
            Ok(Flow::Normal)
        }
        Stmt::Return { expr, .. } => {
            let value = match expr {
                Some(e) => Some(eval_expr(e, frame, ctx)?),
                None => None,
            };
            Ok(Flow::Return(value))
        }
    }
}

fn declare_callable(frame: &Frame, decl: &Rc<CallableDecl>, is_function: bool) {
    let return_type = decl.return_type.clone().unwrap_or_else(|| "NULL".to_string());
    let callable = Rc::new(Callable { declaring_frame: frame.clone(), decl: decl.clone() });
    let value = if is_function { Value::Function(callable) } else { Value::Procedure(callable) };
    let slot = TypedValue::with_value(return_type, value).into_slot();
    frame.borrow_mut().declare(&decl.name, slot);
}

fn open_handle(name: &str, mode: FileMode) -> Result<IoHandle, RuntimeError> {
    match mode {
        FileMode::Read => {
            let f = StdFile::open(name).map_err(|e| RuntimeError::Io(e.to_string()))?;
            Ok(IoHandle::Reader(BufReader::new(f)))
        }
        FileMode::Write => {
            let f = StdFile::create(name).map_err(|e| RuntimeError::Io(e.to_string()))?;
            Ok(IoHandle::Writer(BufWriter::new(f)))
        }
        FileMode::Append => {
            let f = OpenOptions::new()
                .append(true)
                .create(true)
                .open(name)
                .map_err(|e| RuntimeError::Io(e.to_string()))?;
            Ok(IoHandle::Writer(BufWriter::new(f)))
        }
    }
}

fn read_line_stripped(reader: &mut BufReader<StdFile>) -> std::io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}

fn literal_matches(literal: &LiteralValue, value: &Value) -> bool {
    match (literal, value) {
        (LiteralValue::Null, Value::Null) => true,
        (LiteralValue::Bool(a), Value::Bool(b)) => a == b,
        (LiteralValue::Int(a), Value::Int(b)) => a == b,
        (LiteralValue::Int(a), Value::Real(b)) => (*a as f64) == *b,
        (LiteralValue::Real(a), Value::Real(b)) => a == b,
        (LiteralValue::Real(a), Value::Int(b)) => *a == (*b as f64),
        (LiteralValue::Str(a), Value::Str(b)) => a == b,
        _ => false,
    }
}

/// Resolve one of the three assignable expression shapes to the slot it
/// names, for `Assign`/`Input`/`ReadFile` targets and `BYREF` arguments.
fn resolve_slot(expr: &Expr, frame: &Frame, ctx: &mut EvalCtx) -> Result<Slot, RuntimeError> {
    match expr {
        Expr::GetName { name, frame_depth, .. } => {
            let owner = frame::frame_at_depth(frame, *frame_depth);
            Ok(frame::get_slot(&owner, name).expect("resolver guarantees this name exists at this depth"))
        }
        Expr::GetIndex { array, indices, token } => {
            let arr = eval_array(array, frame, ctx)?;
            let mut idx = Vec::with_capacity(indices.len());
            for i in indices {
                idx.push(eval_int(i, frame, ctx)?);
            }
            let slot = arr.borrow().get(&idx);
            slot.ok_or_else(|| RuntimeError::IndexOutOfRange(idx.clone(), token.word.clone()))
        }
        Expr::GetAttr { object, name, .. } => {
            let obj = eval_object(object, frame, ctx)?;
            let slot = obj.borrow().fields.get(name).cloned();
            Ok(slot.expect("resolver guarantees this field exists"))
        }
        other => unreachable!("resolver only allows assignable exprs here, got {other:?}"),
    }
}

fn eval_array(expr: &Expr, frame: &Frame, ctx: &mut EvalCtx) -> Result<ArrayRef, RuntimeError> {
    match eval_expr(expr, frame, ctx)? {
        Value::Array(a) => Ok(a),
        other => unreachable!("resolver guarantees ARRAY here, got {other:?}"),
    }
}

fn eval_object(expr: &Expr, frame: &Frame, ctx: &mut EvalCtx) -> Result<ObjectRef, RuntimeError> {
    match eval_expr(expr, frame, ctx)? {
        Value::Object(o) => Ok(o),
        other => unreachable!("resolver guarantees a record type here, got {other:?}"),
    }
}

fn eval_int(expr: &Expr, frame: &Frame, ctx: &mut EvalCtx) -> Result<i64, RuntimeError> {
    match eval_expr(expr, frame, ctx)? {
        Value::Int(i) => Ok(i),
        other => unreachable!("resolver guarantees INTEGER here, got {other:?}"),
    }
}

fn eval_str(expr: &Expr, frame: &Frame, ctx: &mut EvalCtx) -> Result<String, RuntimeError> {
    match eval_expr(expr, frame, ctx)? {
        Value::Str(s) => Ok(s),
        other => unreachable!("resolver guarantees STRING here, got {other:?}"),
    }
}

fn eval_bool(expr: &Expr, frame: &Frame, ctx: &mut EvalCtx) -> Result<bool, RuntimeError> {
    match eval_expr(expr, frame, ctx)? {
        Value::Bool(b) => Ok(b),
        other => unreachable!("resolver guarantees BOOLEAN here, got {other:?}"),
    }
}

fn eval_expr(expr: &Expr, frame: &Frame, ctx: &mut EvalCtx) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Literal { value, .. } => Ok(literal_value(value)),
        Expr::Unary { oper, right, .. } => Ok(eval_unary(*oper, eval_expr(right, frame, ctx)?)),
        Expr::Binary { left, oper, right, token } => {
            let lv = eval_expr(left, frame, ctx)?;
            let rv = eval_expr(right, frame, ctx)?;
            eval_binary(*oper, lv, rv, token)
        }
        Expr::UnresolvedName { .. } => unreachable!("resolver eliminates UnresolvedName before evaluation"),
        Expr::GetName { name, frame_depth, .. } => {
            let owner = frame::frame_at_depth(frame, *frame_depth);
            let slot = frame::get_slot(&owner, name).expect("resolver guarantees this name exists at this depth");
            let value = slot.borrow().value.clone();
            value.ok_or_else(|| RuntimeError::UnassignedSlot(name.clone()))
        }
        Expr::GetIndex { array, indices, token } => {
            let arr = eval_array(array, frame, ctx)?;
            let mut idx = Vec::with_capacity(indices.len());
            for i in indices {
                idx.push(eval_int(i, frame, ctx)?);
            }
            let slot = arr.borrow().get(&idx).ok_or_else(|| RuntimeError::IndexOutOfRange(idx.clone(), token.word.clone()))?;
            let value = slot.borrow().value.clone();
            value.ok_or_else(|| RuntimeError::UnassignedSlot(token.word.clone()))
        }
        Expr::GetAttr { object, name, .. } => {
            let obj = eval_object(object, frame, ctx)?;
            let slot = obj.borrow().fields.get(name).cloned().expect("resolver guarantees this field exists");
            let value = slot.borrow().value.clone();
            value.ok_or_else(|| RuntimeError::UnassignedSlot(name.clone()))
        }
        Expr::Call { callable, args, .. } => eval_call(callable, args, frame, ctx),
        Expr::Assign { assignee, expr: value_expr, .. } => {
            let value = eval_expr(value_expr, frame, ctx)?;
            let slot = resolve_slot(assignee, frame, ctx)?;
            slot.borrow_mut().value = Some(value.clone());
            Ok(value)
        }
    }
}

fn literal_value(v: &LiteralValue) -> Value {
    match v {
        LiteralValue::Null => Value::Null,
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Int(i) => Value::Int(*i),
        LiteralValue::Real(r) => Value::Real(*r),
        LiteralValue::Str(s) => Value::Str(s.clone()),
    }
}

fn eval_unary(oper: Operator, v: Value) -> Value {
    match (oper, v) {
        (Operator::Neg, Value::Int(i)) => Value::Int(-i),
        (Operator::Neg, Value::Real(r)) => Value::Real(-r),
        (Operator::Not, Value::Bool(b)) => Value::Bool(!b),
        (op, v) => unreachable!("resolver guarantees Neg/Not apply to numeric/BOOLEAN, got {op:?} on {v:?}"),
    }
}

fn eval_binary(oper: Operator, l: Value, r: Value, token: &Token) -> Result<Value, RuntimeError> {
    let _ = token;
    match oper {
        Operator::And => Ok(Value::Bool(as_bool(l) && as_bool(r))),
        Operator::Or => Ok(Value::Bool(as_bool(l) || as_bool(r))),
        Operator::Eq => Ok(Value::Bool(values_equal(&l, &r))),
        Operator::Ne => Ok(Value::Bool(!values_equal(&l, &r))),
        Operator::Lt => Ok(Value::Bool(as_f64(&l) < as_f64(&r))),
        Operator::Lte => Ok(Value::Bool(as_f64(&l) <= as_f64(&r))),
        Operator::Gt => Ok(Value::Bool(as_f64(&l) > as_f64(&r))),
        Operator::Gte => Ok(Value::Bool(as_f64(&l) >= as_f64(&r))),
        Operator::Add => Ok(numeric_binop(l, r, |a, b| a + b, |a, b| a + b)),
        Operator::Sub => Ok(numeric_binop(l, r, |a, b| a - b, |a, b| a - b)),
        Operator::Mul => Ok(numeric_binop(l, r, |a, b| a * b, |a, b| a * b)),
        Operator::Div => {
            let rhs = as_f64(&r);
            if rhs == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Real(as_f64(&l) / rhs))
        }
        Operator::Concat => match (l, r) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (a, b) => unreachable!("resolver guarantees STRING & STRING, got {a:?} and {b:?}"),
        },
        Operator::Not | Operator::Neg => unreachable!("unary-only operators never reach eval_binary"),
    }
}

fn as_bool(v: Value) -> bool {
    match v {
        Value::Bool(b) => b,
        other => unreachable!("resolver guarantees BOOLEAN here, got {other:?}"),
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(i) => *i as f64,
        Value::Real(r) => *r,
        other => unreachable!("resolver guarantees a numeric operand here, got {other:?}"),
    }
}

fn numeric_binop(l: Value, r: Value, int_op: impl Fn(i64, i64) -> i64, real_op: impl Fn(f64, f64) -> f64) -> Value {
    match (&l, &r) {
        (Value::Int(a), Value::Int(b)) => Value::Int(int_op(*a, *b)),
        _ => Value::Real(real_op(as_f64(&l), as_f64(&r))),
    }
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Int(_) | Value::Real(_), Value::Int(_) | Value::Real(_)) => as_f64(l) == as_f64(r),
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
        (Value::File(a), Value::File(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

fn eval_call(callable: &Expr, args: &[Expr], frame: &Frame, ctx: &mut EvalCtx) -> Result<Value, RuntimeError> {
    let callee = eval_expr(callable, frame, ctx)?;
    match callee {
        Value::Builtin(b) => call_builtin(&b, args, frame, ctx),
        Value::Procedure(c) | Value::Function(c) => call_callable(&c, args, frame, ctx),
        other => unreachable!("resolver guarantees a callable value here, got {other:?}"),
    }
}

/// `EOF` is special-cased (rather than going through the generic
/// evaluate-args-then-invoke path every other builtin uses) because it
/// needs the calling frame to look up the named file, mirroring
/// `interpreter.py`'s `callable.func is system.EOF` branch in `evalCallable`.
fn call_builtin(b: &Builtin, args: &[Expr], frame: &Frame, ctx: &mut EvalCtx) -> Result<Value, RuntimeError> {
    match b.name.as_str() {
        builtins::RND => Ok(Value::Real(ctx.rng.next_f64())),
        builtins::RANDOMBETWEEN => {
            let lower = eval_int(&args[0], frame, ctx)?;
            let upper = eval_int(&args[1], frame, ctx)?;
            if lower > upper {
                return Err(RuntimeError::ReversedRandomBounds(lower, upper));
            }
            Ok(Value::Int(ctx.rng.next_range(lower, upper)))
        }
        builtins::EOF => {
            let name = eval_str(&args[0], frame, ctx)?;
            let slot = frame::lookup(frame, &name)
                .and_then(|f| frame::get_slot(&f, &name))
                .ok_or_else(|| RuntimeError::FileNotOpen(name.clone()))?;
            let tv = slot.borrow();
            match &tv.value {
                Some(Value::File(file_ref)) => {
                    let mut file = file_ref.borrow_mut();
                    match &mut file.handle {
                        IoHandle::Reader(r) => Ok(Value::Bool(r.fill_buf().map(|b| b.is_empty()).unwrap_or(true))),
                        IoHandle::Writer(_) => Err(RuntimeError::WrongFileMode(name, "READ")),
                    }
                }
                _ => Err(RuntimeError::FileNotOpen(name)),
            }
        }
        builtins::INTTOSTRING => Ok(Value::Str(eval_int(&args[0], frame, ctx)?.to_string())),
        other => unreachable!("builtins::seed only declares RND/RANDOMBETWEEN/EOF/INTTOSTRING, got {other:?}"),
    }
}

/// Per SPEC_FULL.md's REDESIGN FLAGS, every call gets a fresh `env` (rather
/// than the callable's declaring frame re-using one `env` across calls), so
/// recursion doesn't clobber a shared set of parameter/local slots.
fn call_callable(c: &Callable, args: &[Expr], frame: &Frame, ctx: &mut EvalCtx) -> Result<Value, RuntimeError> {
    let env = frame::new_child(&c.declaring_frame);
    bind_params(&c.decl, args, frame, &env, ctx)?;
    let flow = exec_block(&c.decl.stmts, &env, ctx)?;
    match (flow, &c.decl.return_type) {
        (Flow::Return(Some(v)), _) => Ok(v),
        (Flow::Return(None), None) => Ok(Value::Null),
        (Flow::Return(None) | Flow::Normal, Some(_)) => Err(RuntimeError::NoReturnValue(c.decl.name.clone())),
        (Flow::Normal, None) => Ok(Value::Null),
    }
}

fn bind_params(
    decl: &CallableDecl,
    args: &[Expr],
    caller: &Frame,
    env: &Frame,
    ctx: &mut EvalCtx,
) -> Result<(), RuntimeError> {
    for (param, arg) in decl.params.iter().zip(args.iter()) {
        match param.passby {
            PassBy::ByValue => {
                materialize_declare(env, &param.name, &param.type_name, &param.metadata, param.token.line, param.token.column)
                    .expect("resolver already validated this parameter's type");
                let value = eval_expr(arg, caller, ctx)?;
                let slot = frame::get_slot(env, &param.name).expect("just declared above");
                slot.borrow_mut().value = Some(value);
            }
            PassBy::ByRef => {
                let slot = resolve_slot(arg, caller, ctx)?;
                env.borrow_mut().declare(&param.name, slot);
            }
        }
    }
    Ok(())
}

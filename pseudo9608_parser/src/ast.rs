//! Tree produced by the parser: statements with embedded unresolved-name
//! expressions.
//!
//! Node shapes are grounded in spec.md §3's data model, not in the teacher
//! crate's CST/AST split — the teacher's nodes are Julia-expression shaped
//! and don't carry the assignable-target sum type (`GetName`/`GetIndex`/
//! `GetAttr`) this language needs. The resolver mutates `Expr::UnresolvedName`
//! nodes in place into `Expr::GetName` (see `pseudo9608::resolver`), which is
//! why every expression node still carries its originating `Token`: nothing
//! downstream needs to re-walk source text for diagnostics.

use crate::operator::Operator;
use crate::token::Token;
use std::rc::Rc;

/// Passing convention for a callable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassBy {
    ByValue,
    ByRef,
}

/// A single declared parameter or `DECLARE` target: `name : type`, with
/// array metadata populated when `type_name == "ARRAY"`.
#[derive(Debug, Clone)]
pub struct DeclMetadata {
    /// Inclusive `(lo, hi)` bounds, one pair per array dimension.
    pub size: Vec<(i64, i64)>,
    /// Element type, for arrays.
    pub element_type: Option<String>,
}

impl DeclMetadata {
    pub fn scalar() -> Self {
        Self { size: Vec::new(), element_type: None }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub type_name: String,
    pub metadata: DeclMetadata,
    pub passby: PassBy,
    pub token: Token,
}

/// Expression tree node. The resolver replaces `UnresolvedName` with
/// `GetName` and, where it cannot otherwise annotate information in place,
/// wraps nodes; no other variant is introduced post-parse.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal { type_name: String, value: LiteralValue, token: Token },
    Unary { oper: Operator, right: Box<Expr>, token: Token },
    Binary { left: Box<Expr>, oper: Operator, right: Box<Expr>, token: Token },
    /// Produced by the parser; eliminated by the resolver.
    UnresolvedName { name: String, token: Token },
    /// Resolved variable reference. `frame_depth` counts the number of
    /// `outer` hops from the frame active at resolve time to the frame that
    /// owns `name`; the evaluator walks that many links at run time. This
    /// stands in for the spec's "back-pointer to the exact frame", which
    /// isn't expressible as a plain field once frames are reference-counted
    /// trees rather than a single mutable reference.
    GetName { name: String, frame_depth: usize, token: Token },
    GetIndex { array: Box<Expr>, indices: Vec<Expr>, token: Token },
    GetAttr { object: Box<Expr>, name: String, token: Token },
    Call { callable: Box<Expr>, args: Vec<Expr>, token: Token },
    Assign { assignee: Box<Expr>, expr: Box<Expr>, token: Token },
}

impl Expr {
    pub fn token(&self) -> &Token {
        match self {
            Expr::Literal { token, .. }
            | Expr::Unary { token, .. }
            | Expr::Binary { token, .. }
            | Expr::UnresolvedName { token, .. }
            | Expr::GetName { token, .. }
            | Expr::GetIndex { token, .. }
            | Expr::GetAttr { token, .. }
            | Expr::Call { token, .. }
            | Expr::Assign { token, .. } => token,
        }
    }

    /// True for the three assignable shapes (spec.md glossary: Assignable /
    /// SetExpr).
    pub fn is_assignable(&self) -> bool {
        matches!(self, Expr::GetName { .. } | Expr::GetIndex { .. } | Expr::GetAttr { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
}

/// A parsed statement, one level of the nesting hierarchy (spec.md §4.2).
#[derive(Debug, Clone)]
pub enum Stmt {
    Output { exprs: Vec<Expr>, token: Token },
    Input { set_expr: Expr, token: Token },
    If { cond: Expr, then_body: Vec<Stmt>, else_body: Option<Vec<Stmt>>, token: Token },
    Case { cond: Expr, cases: Vec<(LiteralValue, Vec<Stmt>)>, fallback: Option<Vec<Stmt>>, token: Token },
    While { init: Option<Box<Stmt>>, cond: Expr, body: Vec<Stmt>, token: Token },
    Repeat { body: Vec<Stmt>, cond: Expr, token: Token },
    Procedure(Rc<CallableDecl>),
    Function(Rc<CallableDecl>),
    Type { name: String, fields: Vec<Param>, token: Token },
    OpenFile { filename: Expr, mode: FileMode, token: Token },
    ReadFile { filename: Expr, set_expr: Expr, token: Token },
    WriteFile { filename: Expr, data: Expr, token: Token },
    CloseFile { filename: Expr, token: Token },
    Call { call: Expr, token: Token },
    Assign { assign: Expr, token: Token },
    Declare { name: String, type_name: String, metadata: DeclMetadata, passby: PassBy, token: Token },
    Return { expr: Option<Expr>, token: Token },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    Append,
}

/// Shared shape for `PROCEDURE`/`FUNCTION` declarations. `return_type` is
/// `None` for procedures.
#[derive(Debug, Clone)]
pub struct CallableDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub stmts: Vec<Stmt>,
    pub return_type: Option<String>,
    pub token: Token,
}

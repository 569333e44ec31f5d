//! Operator identities.
//!
//! The spec's node definitions store "an operator function identity" on
//! `Unary`/`Binary` nodes rather than the raw token text, so that the
//! resolver and evaluator dispatch on a fixed, exhaustively-matchable set
//! instead of re-parsing strings. This crate expresses that identity as an
//! enum, per the design note in spec.md §9 ("An implementer may use an enum
//! of operator kinds instead").

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Lte,
    Gt,
    Gte,
    Ne,
    Eq,
    And,
    Or,
    Not,
    /// Unary negation (`-x`). Distinct from `Sub` since the latter is
    /// strictly binary at the resolver/evaluator.
    Neg,
    /// String concatenation, added per spec.md §9's open question.
    Concat,
}

impl Operator {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mul,
            "/" => Operator::Div,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<>" => Operator::Ne,
            "=" => Operator::Eq,
            "AND" => Operator::And,
            "OR" => Operator::Or,
            "NOT" => Operator::Not,
            "&" => Operator::Concat,
            _ => return None,
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Operator::Add => "+",
            Operator::Sub | Operator::Neg => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Ne => "<>",
            Operator::Eq => "=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
            Operator::Concat => "&",
        };
        write!(f, "{}", word)
    }
}

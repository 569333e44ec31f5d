//! The four host builtins (SPEC_FULL.md §4.5): `RND`, `RANDOMBETWEEN`,
//! `EOF`, `INTTOSTRING`. `seed` installs their signatures into a frame; both
//! the resolver (for type-checking call sites) and the evaluator (to build
//! the real dispatchable value) call it, so the two never drift apart.

use std::rc::Rc;

use crate::frame::Frame;
use crate::value::{Builtin, TypedValue, Value};

pub const RND: &str = "RND";
pub const RANDOMBETWEEN: &str = "RANDOMBETWEEN";
pub const EOF: &str = "EOF";
pub const INTTOSTRING: &str = "INTTOSTRING";

/// Declare all four builtins into `frame` (expected to be the global
/// frame).
pub fn seed(frame: &Frame) {
    declare_one(frame, RND, &[], "REAL");
    declare_one(frame, RANDOMBETWEEN, &[("Lower", "INTEGER"), ("Upper", "INTEGER")], "INTEGER");
    declare_one(frame, EOF, &[("Filename", "STRING")], "BOOLEAN");
    declare_one(frame, INTTOSTRING, &[("Value", "INTEGER")], "STRING");
}

fn declare_one(frame: &Frame, name: &str, params: &[(&str, &str)], return_type: &str) {
    let builtin = Builtin {
        name: name.to_string(),
        params: params.iter().map(|(n, t)| (n.to_string(), t.to_string())).collect(),
        return_type: return_type.to_string(),
    };
    let slot = TypedValue::with_value(return_type, Value::Builtin(Rc::new(builtin))).into_slot();
    frame.borrow_mut().declare(name, slot);
}

//! `materialize_declare`: the one routine that turns a `name : type [ARRAY
//! bounds OF elementType]` triple into a freshly-allocated slot.
//!
//! Shared by the resolver (which calls it once per `DECLARE`/parameter to
//! build the type-checking frame chain) and the evaluator (which calls it
//! again on every actual execution of that same node). Per SPEC_FULL.md's
//! REDESIGN FLAGS, a callable gets a fresh `env` on every call rather than
//! reusing one across calls, so unlike the original design, `DECLARE` is
//! not a no-op at run time: it must re-allocate a slot each time it runs,
//! or repeated calls and loop iterations would all alias the same storage.

use pseudo9608_parser::ast::DeclMetadata;

use crate::error::LogicError;
use crate::frame::Frame;
use crate::value::{ArrayData, TypedValue, Value};

/// What a `DECLARE`'s static type actually is, once array element types are
/// taken into account. Plain `Type` (a `String`) can't carry an array's
/// element type, so the resolver threads this richer shape through its
/// expression-typing instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    Named(String),
    Array { element_type: String },
}

impl ResolvedType {
    pub fn type_name(&self) -> &str {
        match self {
            ResolvedType::Named(name) => name,
            ResolvedType::Array { .. } => "ARRAY",
        }
    }

    pub fn element_type(&self) -> Option<&str> {
        match self {
            ResolvedType::Array { element_type } => Some(element_type),
            ResolvedType::Named(_) => None,
        }
    }
}

/// Allocate a slot for `name` in `frame`, per `type_name`/`metadata`, and
/// declare it. Returns the resolved type so callers (the resolver) can
/// record array element types without re-parsing `metadata`.
pub fn materialize_declare(
    frame: &Frame,
    name: &str,
    type_name: &str,
    metadata: &DeclMetadata,
    line: usize,
    column: usize,
) -> Result<ResolvedType, LogicError> {
    let types = frame.borrow().types.clone();
    if !types.borrow().contains(type_name) {
        return Err(LogicError::UndeclaredType {
            line,
            column,
            word: type_name.to_string(),
        });
    }

    if type_name == "ARRAY" {
        let element_type = metadata.element_type.clone().unwrap_or_else(|| "INTEGER".to_string());
        if !types.borrow().contains(&element_type) {
            return Err(LogicError::UndeclaredType {
                line,
                column,
                word: element_type,
            });
        }
        let array = ArrayData::new(metadata.size.clone(), element_type.clone());
        let slot = TypedValue::with_value("ARRAY", Value::Array(std::rc::Rc::new(std::cell::RefCell::new(array))))
            .into_slot();
        frame.borrow_mut().declare(name, slot);
        Ok(ResolvedType::Array { element_type })
    } else {
        let value = types.borrow().clone_type(type_name);
        frame.borrow_mut().declare(name, value.into_slot());
        Ok(ResolvedType::Named(type_name.to_string()))
    }
}

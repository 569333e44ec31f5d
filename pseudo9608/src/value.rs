//! The shared typed-value model: `TypedValue` slots, the `Value` sum type,
//! and the composite `Array`/`Object`/`File`/`Callable` shapes that sit
//! inside them.
//!
//! Grounded in spec.md §3. Per SPEC_FULL.md §3, every slot that must be
//! shared by reference (BYREF parameters, array cells, object attributes) is
//! a `Slot = Rc<RefCell<TypedValue>>`: BYREF aliasing clones the `Rc`, never
//! the value it points to.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs::File as StdFile;
use std::io::{BufReader, BufWriter};
use std::rc::Rc;

use pseudo9608_parser::ast::CallableDecl;
use pseudo9608_parser::FileMode;

use crate::frame::Frame;

/// A `(type, optional value)` storage cell. `value` is `None` until first
/// assignment; reading it unassigned is a `RuntimeError` (spec.md §3).
#[derive(Debug, Clone)]
pub struct TypedValue {
    pub type_name: String,
    pub value: Option<Value>,
}

/// The unit of storage shared between a frame, an array cell and an object
/// attribute (spec.md §9's "Frame chain" design note).
pub type Slot = Rc<RefCell<TypedValue>>;

impl TypedValue {
    pub fn empty(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), value: None }
    }

    pub fn with_value(type_name: impl Into<String>, value: Value) -> Self {
        Self { type_name: type_name.into(), value: Some(value) }
    }

    pub fn into_slot(self) -> Slot {
        Rc::new(RefCell::new(self))
    }
}

/// `Value = bool | int | float | string | Array | Object | File | Builtin |
/// Function | Procedure` (spec.md §3).
#[derive(Debug, Clone)]
pub enum Value {
    /// The sole value of type `NULL`. Practically only reachable through a
    /// literal `NULL` token; procedures return no value at all rather than
    /// this.
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
    Array(ArrayRef),
    Object(ObjectRef),
    File(FileRef),
    Builtin(Rc<Builtin>),
    /// `Function` — non-`NULL` return type.
    Function(Rc<Callable>),
    /// `Procedure` — return type `NULL`.
    Procedure(Rc<Callable>),
}

impl Value {
    /// Render the way `OUTPUT`/`WRITEFILE` stringify a value (spec.md §4.5:
    /// booleans upper-case, no quoting of strings).
    pub fn display(&self) -> String {
        match self {
            Value::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
            Value::Int(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Str(s) => s.clone(),
            Value::Array(_) => "ARRAY".to_string(),
            Value::Object(o) => o.borrow().type_name.clone(),
            Value::File(f) => f.borrow().name.clone(),
            Value::Builtin(b) => b.name.clone(),
            Value::Function(c) | Value::Procedure(c) => c.decl.name.clone(),
        }
    }
}

/// Statically-sized mapping `IndexKey -> TypedValue` (spec.md §3). All cells
/// are pre-allocated (empty `TypedValue(elementType, None)`) when the array
/// is built; accessing a missing index is a `RuntimeError`.
#[derive(Debug)]
pub struct ArrayData {
    pub ranges: Vec<(i64, i64)>,
    pub element_type: String,
    pub cells: HashMap<Vec<i64>, Slot>,
}

pub type ArrayRef = Rc<RefCell<ArrayData>>;

impl ArrayData {
    /// Build a fresh array with every cell pre-allocated to an empty
    /// `TypedValue` of `element_type`, per spec.md §3's "all slots
    /// pre-allocated" invariant.
    pub fn new(ranges: Vec<(i64, i64)>, element_type: String) -> Self {
        let mut cells = HashMap::new();
        for index in cartesian(&ranges) {
            cells.insert(index, TypedValue::empty(element_type.clone()).into_slot());
        }
        Self { ranges, element_type, cells }
    }

    pub fn dim(&self) -> usize {
        self.ranges.len()
    }

    pub fn get(&self, index: &[i64]) -> Option<Slot> {
        self.cells.get(index).cloned()
    }
}

/// Cartesian product of the inclusive `(lo, hi)` ranges, one coordinate
/// tuple per array cell. Mirrors `resolver.py`'s `rangeProduct`.
fn cartesian(ranges: &[(i64, i64)]) -> Vec<Vec<i64>> {
    let mut out: Vec<Vec<i64>> = vec![Vec::new()];
    for &(lo, hi) in ranges {
        let mut next = Vec::new();
        for prefix in &out {
            for v in lo..=hi {
                let mut tuple = prefix.clone();
                tuple.push(v);
                next.push(tuple);
            }
        }
        out = next;
    }
    out
}

/// Mapping `NameKey -> TypedValue`, used for user-defined record instances
/// (spec.md §3). Insertion order is not observable.
#[derive(Debug)]
pub struct ObjectData {
    pub type_name: String,
    pub fields: HashMap<String, Slot>,
}

pub type ObjectRef = Rc<RefCell<ObjectData>>;

/// One open file handle (spec.md §3). Lifetime runs from `OPENFILE` to
/// `CLOSEFILE`; the slot is also deleted from its owning frame on close.
#[derive(Debug)]
pub struct FileData {
    pub name: String,
    pub mode: FileMode,
    pub handle: IoHandle,
}

pub type FileRef = Rc<RefCell<FileData>>;

#[derive(Debug)]
pub enum IoHandle {
    Reader(BufReader<StdFile>),
    Writer(BufWriter<StdFile>),
}

/// `Procedure`/`Function` share `(env, params, stmts)` (spec.md §3). Per
/// SPEC_FULL.md's REDESIGN FLAGS, `env` is **not** stored here: a fresh
/// frame is allocated on every call instead, so only the frame the callable
/// was *declared in* (`declaring_frame`, the `outer` for that fresh frame)
/// needs to be captured. `decl` is the same `Rc<CallableDecl>` the parser
/// produced and the resolver mutated in place, so no parameter/statement
/// data is duplicated between the parse tree and this runtime value.
pub struct Callable {
    pub declaring_frame: Frame,
    pub decl: Rc<CallableDecl>,
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("name", &self.decl.name).finish()
    }
}

/// A host-provided function (spec.md §3's `Builtin(params, func)`). This
/// crate's four builtins (`RND`, `RANDOMBETWEEN`, `EOF`, `INTTOSTRING`,
/// SPEC_FULL.md §4.5) are dispatched by name in `evaluator::builtins`
/// rather than stored as a function pointer here, since `EOF` needs access
/// to the calling frame (to look up the named file) that a plain
/// `fn(Vec<Value>) -> Value` signature can't carry.
#[derive(Debug, Clone)]
pub struct Builtin {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub return_type: String,
}

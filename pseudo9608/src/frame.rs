//! `Frame`: an `Object` with an optional `outer` link (spec.md §3).
//! `lookup(name)` walks outward; a frame also carries the shared
//! `TypeSystem` by reference.
//!
//! Per SPEC_FULL.md §3, a `Frame` is `Rc<RefCell<FrameData>>` since
//! callables capture their declaring frame and are invoked from arbitrary
//! call sites. `GetName` nodes store a `frame_depth` (number of `outer`
//! hops) rather than a direct frame handle, since the resolved tree can't
//! hold a borrow of a runtime-only `Rc` across parse/resolve/evaluate — see
//! `pseudo9608_parser::ast::Expr::GetName`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::typesystem::TypeSystem;
use crate::value::Slot;

#[derive(Debug)]
pub struct FrameData {
    values: HashMap<String, Slot>,
    pub outer: Option<Frame>,
    pub types: TypeSystem,
}

pub type Frame = Rc<RefCell<FrameData>>;

/// The root (global) frame, seeded with the shared type system.
pub fn new_root(types: TypeSystem) -> Frame {
    Rc::new(RefCell::new(FrameData { values: HashMap::new(), outer: None, types }))
}

/// A child frame, e.g. a callable's per-call `env` (SPEC_FULL.md REDESIGN
/// FLAGS: allocated fresh on every call rather than reused).
pub fn new_child(outer: &Frame) -> Frame {
    let types = outer.borrow().types.clone();
    Rc::new(RefCell::new(FrameData { values: HashMap::new(), outer: Some(outer.clone()), types }))
}

impl FrameData {
    pub fn declare(&mut self, name: &str, slot: Slot) {
        self.values.insert(name.to_string(), slot);
    }

    pub fn has_local(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_local(&self, name: &str) -> Option<Slot> {
        self.values.get(name).cloned()
    }

    /// `delete(name)`: used by `CLOSEFILE` to remove the file's slot.
    pub fn delete(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Names declared directly in this frame, for `--dump-frame`.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Walk outward from `frame`, returning the nearest frame that declares
/// `name`, or `None` (spec.md §3: `lookup(name)`).
pub fn lookup(frame: &Frame, name: &str) -> Option<Frame> {
    let mut current = frame.clone();
    loop {
        if current.borrow().has_local(name) {
            return Some(current);
        }
        let next = current.borrow().outer.clone();
        match next {
            Some(outer) => current = outer,
            None => return None,
        }
    }
}

/// The number of `outer` hops from `frame` to the frame that declares
/// `name`, or `None` if undeclared. Stored on `GetName` nodes by the
/// resolver.
pub fn lookup_depth(frame: &Frame, name: &str) -> Option<usize> {
    let mut depth = 0;
    let mut current = frame.clone();
    loop {
        if current.borrow().has_local(name) {
            return Some(depth);
        }
        let next = current.borrow().outer.clone();
        match next {
            Some(outer) => {
                current = outer;
                depth += 1;
            }
            None => return None,
        }
    }
}

/// Walk `depth` `outer` hops from `frame`. The resolver guarantees the
/// chain is at least that deep for any `GetName` it produces.
pub fn frame_at_depth(frame: &Frame, depth: usize) -> Frame {
    let mut current = frame.clone();
    for _ in 0..depth {
        let next = current.borrow().outer.clone().expect(
            "resolver only emits GetName.frame_depth values reachable from the call site's frame chain",
        );
        current = next;
    }
    current
}

pub fn get_slot(frame: &Frame, name: &str) -> Option<Slot> {
    frame.borrow().get_local(name)
}

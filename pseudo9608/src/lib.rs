//! pseudo9608
//!
//! Resolver and tree-walking evaluator for 9608 Pseudocode. Consumes the
//! statement tree `pseudo9608_parser` produces, binds every name to a frame
//! slot and type-checks every operation (`resolver`), then executes the
//! resolved tree against a chain of runtime frames (`evaluator`).
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use pseudo9608::{run_source, Handlers};
//!
//! let output = Rc::new(RefCell::new(Vec::new()));
//! let captured = output.clone();
//! let mut handlers = Handlers {
//!     read: Box::new(|| String::new()),
//!     write: Box::new(move |line: &str| captured.borrow_mut().push(line.to_string())),
//! };
//! let (result, _lines) = run_source("OUTPUT 1 + 2\n", &mut handlers, None);
//! assert!(result.is_ok());
//! assert_eq!(*output.borrow(), vec!["3".to_string()]);
//! ```

pub mod builtins;
pub mod declare;
pub mod error;
pub mod evaluator;
pub mod frame;
pub mod resolver;
pub mod rng;
pub mod typesystem;
pub mod value;

use std::io::{self, BufRead, Write as _};

use pseudo9608_parser::parse_source_with_lines;

pub use error::{InterpretError, LogicError, RuntimeError};
pub use evaluator::Handlers;
pub use frame::Frame;

/// Scan, parse, resolve and run `src` end to end, using `handlers` for
/// `OUTPUT`/`INPUT`/file I/O (spec.md §6). `seed` fixes the PRNG for
/// reproducible `RND`/`RANDOMBETWEEN` runs (SPEC_FULL.md §4.8); `None` seeds
/// from the wall clock.
///
/// Returns the root frame on success (for `--dump-frame`) alongside the
/// program's source lines, which a caller needs to render a
/// `ParseError`/`LogicError` diagnostic (`InterpretError::render`).
pub fn run_source(
    src: &str,
    handlers: &mut Handlers,
    seed: Option<u64>,
) -> (Result<Frame, InterpretError>, Vec<String>) {
    let (mut stmts, lines) = match parse_source_with_lines(src) {
        Ok(pair) => pair,
        Err(e) => return (Err(e.into()), Vec::new()),
    };
    if let Err(e) = resolver::resolve_program(&mut stmts) {
        return (Err(e.into()), lines);
    }
    match evaluator::evaluate_program(&stmts, handlers, seed) {
        Ok(frame) => (Ok(frame), lines),
        Err(e) => (Err(e.into()), lines),
    }
}

/// Default terminal-backed handlers (spec.md §6): `readLine` from stdin,
/// `writeLine` to stdout.
pub fn terminal_handlers() -> Handlers {
    Handlers {
        read: Box::new(|| {
            let mut line = String::new();
            let _ = io::stdin().lock().read_line(&mut line);
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            line
        }),
        write: Box::new(|text: &str| {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", text);
        }),
    }
}

/// Render the global frame's declared names, types and values, one per
/// line, sorted by name — the payload behind `--dump-frame`
/// (SPEC_FULL.md §4.6).
pub fn dump_frame(frame: &Frame) -> String {
    let mut out = String::new();
    for name in frame.borrow().names() {
        let Some(slot) = frame::get_slot(frame, &name) else { continue };
        let tv = slot.borrow();
        let value = match &tv.value {
            Some(v) => v.display(),
            None => "<unassigned>".to_string(),
        };
        out.push_str(&format!("{name}: {} = {value}\n", tv.type_name));
    }
    out
}

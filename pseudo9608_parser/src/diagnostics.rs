//! Shared diagnostic rendering for `ParseError`, `LogicError` and
//! `RuntimeError` alike (spec.md §6's diagnostic format).
//!
//! `RuntimeError` renders without the caret block; `ParseError`/`LogicError`
//! render with it when a column is available. This lives in the parser
//! crate (rather than being duplicated per error kind) since `ParseError`
//! needs it and the main crate's errors depend on this crate already.

/// Format the `[Line L column C] <source line>` / caret / `<Kind>: '<word>':
/// <message>` block described in spec.md §6.
pub fn format_diagnostic(
    kind: &str,
    line: usize,
    column: Option<usize>,
    word: &str,
    message: &str,
    lines: &[String],
) -> String {
    let mut out = String::new();
    if let Some(source_line) = lines.get(line.saturating_sub(1)) {
        let lineinfo = format!("[Line {} column {}]", line, column.map(|c| c.to_string()).unwrap_or_default());
        let lineinfo = if column.is_some() {
            lineinfo
        } else {
            format!("[Line {}]", line)
        };
        out.push_str(&lineinfo);
        out.push(' ');
        out.push_str(source_line);
        out.push('\n');
        if let Some(col) = column {
            let margin = lineinfo.chars().count() + 1 + col;
            out.push_str(&" ".repeat(margin));
            out.push_str("^\n");
        }
    }
    out.push_str(&format!("{}: '{}': {}", kind, word, message));
    out
}

/// Render a `RuntimeError`: message only, no caret block (spec.md §6).
pub fn format_runtime(message: &str) -> String {
    format!("RuntimeError: {}", message)
}

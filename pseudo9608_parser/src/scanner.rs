//! Hand-rolled single-pass scanner.
//!
//! Grounded in `original_source/pseudocode/scanner.py`: one character of
//! lookahead, word/number/string/symbol sub-scanners, and a classification
//! order of keyword, then reserved value, then textual operator, then name.
//! `\n` is itself emitted as a keyword-kind token so the parser can use it as
//! an explicit statement terminator, which is why this can't be expressed as
//! a logos token table (logos treats newlines as trivia, not a token).

use crate::error::{ParseError, ParseResult};
use crate::operator::Operator;
use crate::token::{Token, TokenKind, TokenValue};

const KEYWORDS: &[&str] = &[
    "DECLARE", "OUTPUT", "INPUT",
    "CASE", "OF", "OTHERWISE", "ENDCASE",
    "IF", "THEN", "ELSE", "ENDIF",
    "WHILE", "DO", "ENDWHILE",
    "REPEAT", "UNTIL",
    "FOR", "TO", "STEP", "ENDFOR",
    "PROCEDURE", "ENDPROCEDURE", "CALL",
    "FUNCTION", "RETURNS", "ENDFUNCTION", "RETURN",
    "TYPE", "ENDTYPE",
    "BYREF", "BYVALUE",
    "OPENFILE", "READ", "WRITE", "APPEND",
    "READFILE", "WRITEFILE", "CLOSEFILE",
];

const VALUES: &[&str] = &["NULL", "TRUE", "FALSE"];

const SYM_SINGLE: &str = "()[]:,.&";
const SYM_MULTI: &str = "+-/*=<>";

/// Source text plus the cursor state the sub-scanners advance.
struct Code {
    chars: Vec<char>,
    cursor: usize,
    line: usize,
    line_start: usize,
    lines: Vec<String>,
}

impl Code {
    fn new(src: &str) -> Self {
        let src = if src.ends_with('\n') {
            src.to_string()
        } else {
            format!("{}\n", src)
        };
        Self {
            chars: src.chars().collect(),
            cursor: 0,
            line: 1,
            line_start: 0,
            lines: Vec::new(),
        }
    }

    fn at_end(&self) -> bool {
        self.cursor >= self.chars.len()
    }

    fn check(&self) -> char {
        self.chars[self.cursor]
    }

    fn consume(&mut self) -> char {
        let c = self.check();
        self.cursor += 1;
        c
    }

    fn next_line(&mut self) {
        let start = self.line_start;
        let end = self.cursor - 1;
        let text: String = self.chars[start..end].iter().collect();
        self.lines.push(text);
        self.line += 1;
        self.line_start = self.cursor;
    }

    /// Column of a token that is `word.len()` chars wide and ends at the
    /// current cursor, matching `scanner.py`'s `makeToken` column formula.
    fn column_for(&self, word_len: usize) -> usize {
        self.cursor - self.line_start - word_len
    }
}

fn scan_word(code: &mut Code) -> String {
    let mut s = String::new();
    s.push(code.consume());
    while !code.at_end() && (code.check().is_alphabetic() || code.check().is_ascii_digit()) {
        s.push(code.consume());
    }
    s
}

fn scan_number(code: &mut Code) -> String {
    let mut s = String::new();
    s.push(code.consume());
    while !code.at_end() && code.check().is_ascii_digit() {
        s.push(code.consume());
    }
    if code.at_end() || code.check() != '.' {
        return s;
    }
    s.push(code.consume());
    while !code.at_end() && code.check().is_ascii_digit() {
        s.push(code.consume());
    }
    s
}

fn scan_string(code: &mut Code) -> String {
    let mut s = String::new();
    s.push(code.consume());
    while !code.at_end() && code.check() != '"' {
        s.push(code.consume());
    }
    if !code.at_end() {
        s.push(code.consume());
    }
    s
}

fn scan_symbol(code: &mut Code) -> String {
    let mut s = String::new();
    let first = code.consume();
    s.push(first);
    if SYM_SINGLE.contains(first) {
        return s;
    }
    while !code.at_end() && SYM_MULTI.contains(code.check()) {
        s.push(code.consume());
    }
    s
}

/// Scan `src` into a token stream and the list of its source lines (used
/// later to render spec.md §6 diagnostics).
pub fn scan(src: &str) -> ParseResult<(Vec<Token>, Vec<String>)> {
    let mut code = Code::new(src);
    let mut tokens = Vec::new();

    while !code.at_end() {
        let c = code.check();
        if c == ' ' || c == '\r' || c == '\t' {
            code.consume();
            continue;
        } else if c == '\n' {
            code.consume();
            let column = code.column_for(1);
            tokens.push(Token::new(code.line, column, TokenKind::Keyword, "\n", TokenValue::None));
            code.next_line();
        } else if c.is_alphabetic() {
            let start_line = code.line;
            let text = scan_word(&mut code);
            let column = code.column_for(text.chars().count());
            let token = if KEYWORDS.contains(&text.as_str()) {
                Token::new(start_line, column, TokenKind::Keyword, text, TokenValue::None)
            } else if VALUES.contains(&text.as_str()) {
                match text.as_str() {
                    "NULL" => Token::new(start_line, column, TokenKind::Null, text, TokenValue::None),
                    "TRUE" => Token::new(start_line, column, TokenKind::Boolean, text, TokenValue::Bool(true)),
                    "FALSE" => Token::new(start_line, column, TokenKind::Boolean, text, TokenValue::Bool(false)),
                    _ => unreachable!(),
                }
            } else if let Some(op) = Operator::from_word(&text) {
                Token::new(start_line, column, TokenKind::Symbol, text, TokenValue::Operator(op))
            } else {
                Token::new(start_line, column, TokenKind::Name, text, TokenValue::None)
            };
            tokens.push(token);
        } else if c.is_ascii_digit() {
            let start_line = code.line;
            let text = scan_number(&mut code);
            let column = code.column_for(text.chars().count());
            let token = if text.contains('.') {
                let value: f64 = text.parse().map_err(|_| ParseError::UnrecognisedCharacter {
                    line: start_line,
                    column: Some(column),
                    word: text.clone(),
                })?;
                Token::new(start_line, column, TokenKind::Real, text, TokenValue::Real(value))
            } else {
                let value: i64 = text.parse().map_err(|_| ParseError::UnrecognisedCharacter {
                    line: start_line,
                    column: Some(column),
                    word: text.clone(),
                })?;
                Token::new(start_line, column, TokenKind::Integer, text, TokenValue::Int(value))
            };
            tokens.push(token);
        } else if c == '"' {
            let start_line = code.line;
            let text = scan_string(&mut code);
            let column = code.column_for(text.chars().count());
            // `text` always opens with `"`; it closes with one only if the
            // string wasn't cut off by EOF first (unclosed strings are
            // accepted here and rejected downstream by the parser). Strip by
            // char, not by byte index: a byte-index slice can land inside a
            // multibyte character when there's no closing quote to anchor
            // `len() - 1` against.
            let without_open = text.strip_prefix('"').unwrap_or(text.as_str());
            let inner = without_open.strip_suffix('"').unwrap_or(without_open).to_string();
            tokens.push(Token::new(start_line, column, TokenKind::String, text, TokenValue::Str(inner)));
        } else if SYM_SINGLE.contains(c) || SYM_MULTI.contains(c) {
            let start_line = code.line;
            let text = scan_symbol(&mut code);
            let column = code.column_for(text.chars().count());
            let value = Operator::from_word(&text).map(TokenValue::Operator).unwrap_or(TokenValue::None);
            tokens.push(Token::new(start_line, column, TokenKind::Symbol, text, value));
        } else {
            let column = code.column_for(1);
            let line = code.line;
            let word = c.to_string();
            code.consume();
            return Err(ParseError::UnrecognisedCharacter { line, column: Some(column), word });
        }
    }

    Ok((tokens, code.lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_declare_statement() {
        let (tokens, _) = scan("DECLARE X : INTEGER\n").unwrap();
        let words: Vec<&str> = tokens.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["DECLARE", "X", ":", "INTEGER", "\n"]);
    }

    #[test]
    fn scans_real_and_integer_literals() {
        let (tokens, _) = scan("3.14 42\n").unwrap();
        assert!(matches!(tokens[0].value, TokenValue::Real(v) if (v - 3.14).abs() < 1e-9));
        assert!(matches!(tokens[1].value, TokenValue::Int(42)));
    }

    #[test]
    fn scans_string_literal_stripping_quotes() {
        let (tokens, _) = scan("\"hello\"\n").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Str("hello".to_string()));
        assert_eq!(tokens[0].word, "\"hello\"");
    }

    #[test]
    fn scans_multi_char_symbol_operators() {
        let (tokens, _) = scan("<- <= <> >=\n").unwrap();
        let words: Vec<&str> = tokens.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["<-", "<=", "<>", ">=", "\n"]);
    }

    #[test]
    fn single_char_symbols_do_not_extend() {
        let (tokens, _) = scan("(A,B)\n").unwrap();
        let words: Vec<&str> = tokens.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["(", "A", ",", "B", ")", "\n"]);
    }

    #[test]
    fn newline_is_a_keyword_token() {
        let (tokens, _) = scan("X\n").unwrap();
        assert!(tokens.last().unwrap().is_newline());
    }

    #[test]
    fn unrecognised_character_is_a_parse_error() {
        let err = scan("X ~ Y\n").unwrap_err();
        match err {
            ParseError::UnrecognisedCharacter { word, .. } => assert_eq!(word, "~"),
            other => panic!("expected UnrecognisedCharacter, got {other:?}"),
        }
    }

    #[test]
    fn keywords_and_and_or_and_not_become_operators() {
        let (tokens, _) = scan("A AND B OR NOT C\n").unwrap();
        assert_eq!(tokens[1].value.as_operator(), Some(Operator::And));
        assert_eq!(tokens[3].value.as_operator(), Some(Operator::Or));
        assert_eq!(tokens[4].value.as_operator(), Some(Operator::Not));
    }

    #[test]
    fn source_without_trailing_newline_is_padded() {
        let (tokens, lines) = scan("X").unwrap();
        assert!(tokens.last().unwrap().is_newline());
        assert_eq!(lines, vec!["X"]);
    }
}

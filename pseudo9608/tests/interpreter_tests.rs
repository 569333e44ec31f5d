//! End-to-end tests driving the public `run_source` pipeline: scan, parse,
//! resolve, evaluate. Each scenario mirrors one of the retrieved reference
//! suite's programs (bubble sort, record types, file EOF, recursion, and
//! the two error scenarios) rather than a synthetic round-trip grid.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use pseudo9608::{dump_frame, frame, run_source, Handlers, InterpretError};
use tempfile::NamedTempFile;

/// Run `src` with in-memory I/O: `inputs` feeds successive `INPUT` reads,
/// `OUTPUT`/`WRITEFILE` go to the returned `Vec<String>` in order.
fn run(src: &str, inputs: Vec<&str>) -> (Result<pseudo9608::Frame, InterpretError>, Vec<String>) {
    let output = Rc::new(RefCell::new(Vec::new()));
    let captured = output.clone();
    let feed = Rc::new(RefCell::new(inputs.into_iter().map(str::to_string).collect::<Vec<_>>()));
    let feed_read = feed.clone();
    let mut handlers = Handlers {
        read: Box::new(move || {
            if feed_read.borrow().is_empty() {
                String::new()
            } else {
                feed_read.borrow_mut().remove(0)
            }
        }),
        write: Box::new(move |line: &str| captured.borrow_mut().push(line.to_string())),
    };
    let (result, _lines) = run_source(src, &mut handlers, Some(7));
    (result, output.borrow().clone())
}

fn expect_ok(src: &str) -> (pseudo9608::Frame, Vec<String>) {
    let (result, output) = run(src, Vec::new());
    match result {
        Ok(frame) => (frame, output),
        Err(e) => panic!("expected success, got {e:?}"),
    }
}

// ==================== Scenario 1: scalars and arithmetic ====================

#[test]
fn scalar_arithmetic_prints_and_stores_the_result() {
    let (frame, output) = expect_ok("DECLARE X : INTEGER\nX <- 3 + 4 * 2\nOUTPUT X\n");
    assert_eq!(output, vec!["11"]);
    let slot = frame::get_slot(&frame, "X").unwrap();
    let tv = slot.borrow();
    assert_eq!(tv.type_name, "INTEGER");
    assert!(matches!(tv.value, Some(pseudo9608::value::Value::Int(11))));
}

// ==================== Scenario 2: FOR loop over an array ====================

#[test]
fn for_loop_fills_and_prints_an_array() {
    let src = "DECLARE I : INTEGER\n\
               DECLARE AnArray : ARRAY[1:10] OF INTEGER\n\
               FOR I <- 1 TO 10\n\
               AnArray[I] <- I\n\
               OUTPUT AnArray[I]\n\
               ENDFOR\n";
    let (_frame, output) = expect_ok(src);
    let expected: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
    assert_eq!(output, expected);
}

#[test]
fn for_loop_with_negative_step_counts_down() {
    let src = "DECLARE I : INTEGER\n\
               FOR I <- 3 TO 1 STEP -1\n\
               OUTPUT I\n\
               ENDFOR\n";
    let (_frame, output) = expect_ok(src);
    assert_eq!(output, vec!["3", "2", "1"]);
}

// ==================== Scenario 3: record types ====================

#[test]
fn record_fields_are_assigned_and_read_independently() {
    let src = "TYPE Student\n\
               DECLARE Surname : STRING\n\
               DECLARE FirstName : STRING\n\
               DECLARE YearGroup : INTEGER\n\
               ENDTYPE\n\
               DECLARE S : Student\n\
               S.Surname <- \"Lovelace\"\n\
               S.FirstName <- \"Ada\"\n\
               S.YearGroup <- 6\n\
               OUTPUT S.Surname\n\
               OUTPUT S.FirstName\n\
               OUTPUT S.YearGroup\n";
    let (_frame, output) = expect_ok(src);
    assert_eq!(output, vec!["Lovelace", "Ada", "6"]);
}

// ==================== Scenario 4: BYREF mutation ====================

#[test]
fn byref_bubble_sort_mutates_the_callers_array() {
    let src = "PROCEDURE BubbleSort(BYREF Data : ARRAY[1:10] OF INTEGER)\n\
               DECLARE I : INTEGER\n\
               DECLARE J : INTEGER\n\
               DECLARE Temp : INTEGER\n\
               FOR I <- 1 TO 9\n\
               FOR J <- 1 TO 9\n\
               IF Data[J] > Data[J + 1] THEN\n\
               Temp <- Data[J]\n\
               Data[J] <- Data[J + 1]\n\
               Data[J + 1] <- Temp\n\
               ENDIF\n\
               ENDFOR\n\
               ENDFOR\n\
               ENDPROCEDURE\n\
               DECLARE Numbers : ARRAY[1:10] OF INTEGER\n\
               DECLARE K : INTEGER\n\
               FOR K <- 1 TO 10\n\
               Numbers[K] <- 11 - K\n\
               ENDFOR\n\
               CALL BubbleSort(Numbers)\n\
               FOR K <- 1 TO 10\n\
               OUTPUT Numbers[K]\n\
               ENDFOR\n";
    let (_frame, output) = expect_ok(src);
    let expected: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
    assert_eq!(output, expected);
}

#[test]
fn byref_parameters_alias_the_callers_slot_not_a_copy() {
    let src = "PROCEDURE Swap(BYREF A : INTEGER, BYREF B : INTEGER)\n\
               DECLARE Temp : INTEGER\n\
               Temp <- A\n\
               A <- B\n\
               B <- Temp\n\
               ENDPROCEDURE\n\
               DECLARE X : INTEGER\n\
               DECLARE Y : INTEGER\n\
               X <- 1\n\
               Y <- 2\n\
               CALL Swap(X, Y)\n\
               OUTPUT X\n\
               OUTPUT Y\n";
    let (_frame, output) = expect_ok(src);
    assert_eq!(output, vec!["2", "1"]);
}

// ==================== Scenario 5: string concatenation ====================

#[test]
fn string_concat_and_inttostring_build_one_line() {
    let src = "OUTPUT \"A: \" & INTTOSTRING(1) & \", B: \" & INTTOSTRING(999)\n";
    let (_frame, output) = expect_ok(src);
    assert_eq!(output, vec!["A: 1, B: 999"]);
}

// ==================== Scenario 6: file EOF ====================

#[test]
fn eof_is_false_immediately_after_opening_a_non_empty_file() {
    let file = NamedTempFile::new().expect("create temp file");
    std::fs::write(file.path(), "0\n1\n2\n3\n4\n5\n6\n7\n8\n9\n").expect("seed temp file");
    let path = file.path().to_str().expect("utf8 path").replace('\\', "\\\\");
    let src = format!(
        "OPENFILE \"{path}\" FOR READ\nOUTPUT EOF(\"{path}\")\nCLOSEFILE \"{path}\"\n"
    );
    let (_frame, output) = expect_ok(&src);
    assert_eq!(output, vec!["FALSE"]);
}

#[test]
fn closefile_removes_the_name_from_the_frame() {
    let file = NamedTempFile::new().expect("create temp file");
    std::fs::write(file.path(), "only line\n").expect("seed temp file");
    let path = file.path().to_str().expect("utf8 path").replace('\\', "\\\\");
    let src = format!("OPENFILE \"{path}\" FOR READ\nCLOSEFILE \"{path}\"\n");
    let (frame, _output) = expect_ok(&src);
    assert!(frame.borrow().names().is_empty());
}

#[test]
fn readfile_strips_the_trailing_newline() {
    let file = NamedTempFile::new().expect("create temp file");
    std::fs::write(file.path(), "hello\nworld\n").expect("seed temp file");
    let path = file.path().to_str().expect("utf8 path").replace('\\', "\\\\");
    let src = format!(
        "DECLARE Line : STRING\n\
         OPENFILE \"{path}\" FOR READ\n\
         READFILE \"{path}\", Line\n\
         OUTPUT Line\n\
         CLOSEFILE \"{path}\"\n"
    );
    let (_frame, output) = expect_ok(&src);
    assert_eq!(output, vec!["hello"]);
}

// ==================== Scenario 7: static CASE type mismatch ====================

#[test]
fn case_value_type_mismatch_is_a_logic_error_exiting_65() {
    let src = "DECLARE S : STRING\n\
               S <- \"hi\"\n\
               CASE OF S\n\
               1: OUTPUT \"one\"\n\
               ENDCASE\n";
    let (result, _output) = run(src, Vec::new());
    let err = result.expect_err("expected a LogicError");
    assert!(matches!(err, InterpretError::Logic(_)));
    assert_eq!(err.exit_code(), 65);
    assert!(err.render(&[]).contains("expect"));
}

// ==================== Scenario 8: unterminated IF is a parse error ====================

#[test]
fn unterminated_if_is_a_parse_error_exiting_65() {
    let (result, _output) = run("IF TRUE\n", Vec::new());
    let err = result.expect_err("expected a ParseError");
    assert!(matches!(err, InterpretError::Parse(_)));
    assert_eq!(err.exit_code(), 65);
}

// ==================== Additional coverage ====================

#[test]
fn recursive_factorial_terminates_at_its_base_case() {
    let src = "FUNCTION Fact(N : INTEGER) RETURNS INTEGER\n\
               IF N <= 1 THEN\n\
               RETURN 1\n\
               ELSE\n\
               RETURN N * Fact(N - 1)\n\
               ENDIF\n\
               ENDFUNCTION\n\
               OUTPUT Fact(5)\n";
    let (_frame, output) = expect_ok(src);
    assert_eq!(output, vec!["120"]);
}

#[test]
fn repeat_until_runs_the_body_at_least_once() {
    let src = "DECLARE N : INTEGER\n\
               N <- 0\n\
               REPEAT\n\
               N <- N + 1\n\
               OUTPUT N\n\
               UNTIL N = 3\n";
    let (_frame, output) = expect_ok(src);
    assert_eq!(output, vec!["1", "2", "3"]);
}

#[test]
fn input_is_read_as_a_string_regardless_of_declared_type() {
    let src = "DECLARE Name : STRING\nINPUT Name\nOUTPUT Name\n";
    let (result, output) = run(src, vec!["Ada"]);
    assert!(result.is_ok());
    assert_eq!(output, vec!["Ada"]);
}

#[test]
fn division_by_zero_is_a_runtime_error_exiting_70() {
    let src = "DECLARE X : INTEGER\nX <- 5 / 0\nOUTPUT X\n";
    let (result, _output) = run(src, Vec::new());
    let err = result.expect_err("expected a RuntimeError");
    assert!(matches!(err, InterpretError::Runtime(_)));
    assert_eq!(err.exit_code(), 70);
}

#[test]
fn randombetween_with_reversed_bounds_is_a_runtime_error() {
    let src = "OUTPUT RANDOMBETWEEN(10, 1)\n";
    let (result, _output) = run(src, Vec::new());
    let err = result.expect_err("expected a RuntimeError");
    assert!(matches!(err, InterpretError::Runtime(_)));
    assert_eq!(err.exit_code(), 70);
}

#[test]
fn dump_frame_lists_declared_globals_with_type_and_value() {
    let (frame, _output) = expect_ok("DECLARE X : INTEGER\nX <- 42\n");
    let dump = dump_frame(&frame);
    assert!(dump.contains("X: INTEGER = 42"));
}

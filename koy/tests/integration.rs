//! Integration tests for the Koy interpreter
//!
//! Drives source text through the full pipeline:
//! - Program execution (`call_main`)
//! - Statement sequences against a single interpreter
//! - Runtime error kinds
//! - Front-end diagnostics

use koy::interp::{ErrorCategory, ErrorKind, Interpreter, RuntimeError, Value};
use koy::parser::{parse_expression, parse_program, parse_statements};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// `println` sink readable after the run
#[derive(Clone, Default)]
struct Captured(Rc<RefCell<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

/// Helper to run a program's `main`, returning its value and printed output
fn run_program(source: &str) -> (Result<Value, RuntimeError>, String) {
    let program = parse_program(source).expect("Parse should succeed");
    let out = Captured::default();
    let mut interp = Interpreter::with_output(out.clone());
    let result = interp.call_main(&program);
    (result, out.text())
}

/// Helper to run statements in a fresh interpreter
fn run_lines(source: &str) -> (Interpreter, Result<Value, RuntimeError>) {
    let lines = parse_statements(source).expect("Parse should succeed");
    let mut interp = Interpreter::with_output(io::sink());
    let result = interp.interpret_statements(&lines);
    (interp, result)
}

fn error_kind(source: &str) -> ErrorKind {
    match run_lines(source).1 {
        Ok(value) => panic!("expected an error, got {value:?}"),
        Err(err) => err.kind,
    }
}

fn eval(source: &str) -> Result<Value, RuntimeError> {
    let expr = parse_expression(source).expect("Parse should succeed");
    Interpreter::with_output(io::sink()).interpret(&expr)
}

// ============================================
// Programs
// ============================================

#[test]
fn test_main_calls_function() {
    let (result, output) = run_program(
        r#"
        fn main() {
          println(add(10, 20));
        }
        fn add(v1, v2) {
          v1 + v2;
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::Int(30));
    assert_eq!(output, "30\n");
}

#[test]
fn test_factorial() {
    let (result, output) = run_program(
        r#"
        fn factorial(v) {
          if (v < 2) 1; else factorial(v - 1) * v;
        }
        fn main() {
          println(factorial(5));
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::Int(120));
    assert_eq!(output, "120\n");
}

#[test]
fn test_deep_recursion() {
    let (result, _) = run_program(
        r#"
        fn sum(n) {
          if (n == 0) 0; else n + sum(n - 1);
        }
        fn main() { sum(5000); }
        "#,
    );
    assert_eq!(result.unwrap(), Value::Int(5000 * 5001 / 2));
}

#[test]
fn test_labeled_and_positional_calls_agree() {
    let (result, output) = run_program(
        r#"
        fn add(x, y) { x + y; }
        fn main() {
          println(add(1, 2));
          println(add[y=2, x=1]);
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::Int(3));
    assert_eq!(output, "3\n3\n");
}

#[test]
fn test_labeled_call_missing_label() {
    let (result, _) = run_program(
        r#"
        fn add(x, y) { x + y; }
        fn main() { add[x=1]; }
        "#,
    );
    let err = result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingLabel);
    assert_eq!(err.category(), ErrorCategory::Name);
}

#[test]
fn test_labeled_call_ignores_unknown_labels() {
    let (result, _) = run_program(
        r#"
        fn power(v) { v * v; }
        fn main() { power[v=5, unused=1]; }
        "#,
    );
    assert_eq!(result.unwrap(), Value::Int(25));
}

#[test]
fn test_global_definitions_visible_in_main() {
    let (result, output) = run_program(
        r#"
        val limit = 10;
        mutable val counter = 0;
        fn bump() { counter = counter + 1; }
        fn main() {
          while (counter < limit) { bump(); }
          println(counter);
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::Int(10));
    assert_eq!(output, "10\n");
}

#[test]
fn test_object_with_methods() {
    let (result, output) = run_program(
        r#"
        val koy = {
          name: "Koy",
          greet: |msg| { "Hello, " + msg; }
        };
        fn main() {
          println(koy.name);
          println(koy.greet("Koy!"));
          println({ lang: "Koy" }.lang);
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::string("Koy"));
    assert_eq!(output, "Koy\nHello, Koy!\nKoy\n");
}

#[test]
fn test_method_sees_caller_frame() {
    let (result, _) = run_program(
        r#"
        val now = {
          age: 20,
          getOld: || { age + 1; }
        };
        fn main() {
          val age = now.age;
          now.getOld();
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::Int(21));
}

#[test]
fn test_function_literal_bound_by_val() {
    let (result, _) = run_program(
        r#"
        val greet = |msg| { "Hello, " + msg; };
        fn main() { greet[msg="Koy"]; }
        "#,
    );
    assert_eq!(result.unwrap(), Value::string("Hello, Koy"));
}

#[test]
fn test_missing_main() {
    let (result, _) = run_program("fn helper() { 1; }");
    assert_eq!(result.unwrap_err().kind, ErrorKind::UndefinedFunction);
}

#[test]
fn test_undefined_function_suggests_name() {
    let (result, _) = run_program(
        r#"
        fn factorial(v) { v; }
        fn main() { factorail(3); }
        "#,
    );
    let err = result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedFunction);
    insta::assert_snapshot!(err.to_string(), @r"
    Runtime error: undefined function: factorail
      hint: did you mean `factorial`?
    ");
}

#[test]
fn test_functions_are_not_closures() {
    // `x` inside `show` is whatever the caller has bound at call time
    let (result, output) = run_program(
        r#"
        fn show() { println(x); }
        fn first() { val x = 1; show(); }
        fn second() { val x = 2; show(); }
        fn main() { first(); second(); }
        "#,
    );
    assert_eq!(result.unwrap(), Value::Int(2));
    assert_eq!(output, "1\n2\n");
}

// ============================================
// Bindings
// ============================================

#[test]
fn test_val_is_immutable() {
    assert_eq!(error_kind("val n = 0; n = 1;"), ErrorKind::Immutable);
}

#[test]
fn test_mutable_val_reassign() {
    let (interp, result) = run_lines("mutable val n = 0; n = 1;");
    assert_eq!(result.unwrap(), Value::Int(1));
    assert_eq!(interp.get_value("n"), Some(Value::Int(1)));
}

#[test]
fn test_redeclaration_fails() {
    for source in [
        "val n = 0; val n = 1;",
        "mutable val n = 0; mutable val n = 1;",
        "val n = 0; mutable val n = 1;",
        "mutable val n = 0; val n = 1;",
    ] {
        assert_eq!(error_kind(source), ErrorKind::AlreadyDeclared, "{source}");
    }
}

#[test]
fn test_increment_and_decrement() {
    let (interp, result) = run_lines("mutable val x = 1; ++x;");
    assert_eq!(result.unwrap(), Value::Int(2));
    assert_eq!(interp.get_value("x"), Some(Value::Int(2)));

    let (interp, result) = run_lines("mutable val y = 1; --y;");
    assert_eq!(result.unwrap(), Value::Int(0));
    assert_eq!(interp.get_value("y"), Some(Value::Int(0)));
}

#[test]
fn test_undeclared_identifier() {
    assert_eq!(error_kind("missing;"), ErrorKind::UndefinedVariable);
}

// ============================================
// Control flow
// ============================================

#[test]
fn test_while_counts_to_ten() {
    let (interp, result) = run_lines("mutable val i = 0; while (i < 10) { i = i + 1; }");
    assert_eq!(result.unwrap(), Value::Bool(true));
    assert_eq!(interp.get_value("i"), Some(Value::Int(10)));
}

#[test]
fn test_for_loop_runs_body_per_value() {
    let lines = parse_statements("for (i in 0 to 10) { println(i); }").unwrap();
    let out = Captured::default();
    let mut interp = Interpreter::with_output(out.clone());
    interp.interpret_statements(&lines).unwrap();

    let printed: Vec<String> = out.text().lines().map(str::to_string).collect();
    let expected: Vec<String> = (0..10).map(|i| i.to_string()).collect();
    assert_eq!(printed, expected);
    assert_eq!(interp.get_value("i"), Some(Value::Int(10)));
}

#[test]
fn test_for_loop_body_may_step_variable() {
    let (interp, result) = run_lines("for (i in 0 to 9) { i = i + 1; }");
    assert!(result.is_ok());
    assert_eq!(interp.get_value("i"), Some(Value::Int(10)));
}

#[test]
fn test_if_else_assignment() {
    let (interp, _) = run_lines(
        r#"
        mutable val x = 5;
        if (x < 5) {
          x = 1;
        } else {
          x = 0;
        }
        "#,
    );
    assert_eq!(interp.get_value("x"), Some(Value::Int(0)));
}

#[test]
fn test_block_value_is_last_line() {
    let (_, result) = run_lines("{ 1; true; }");
    assert_eq!(result.unwrap(), Value::Bool(true));
}

// ============================================
// Values
// ============================================

#[test]
fn test_integer_arithmetic() {
    for (a, b) in [(7_i64, 2_i64), (-7, 2), (7, -2), (0, 5), (123, 10)] {
        let source = format!("[{a} + {b}, {a} - {b}, {a} * {b}, {a} / {b}, {a} % {b}]");
        let expected = Value::Array(vec![
            Value::Int(a + b),
            Value::Int(a - b),
            Value::Int(a * b),
            Value::Int(a / b),
            Value::Int(a % b),
        ]);
        assert_eq!(eval(&source).unwrap(), expected, "{source}");
    }
    assert_eq!(eval("1 / 0").unwrap_err().category(), ErrorCategory::Arithmetic);
}

#[test]
fn test_array_equality() {
    assert_eq!(eval("[1, 3, 5] == [1, 3, 5]").unwrap(), Value::Bool(true));
    assert_eq!(eval("[1, 3, 5] == %{1, 3, 5}").unwrap_err().kind, ErrorKind::TypeError);
}

#[test]
fn test_index_out_of_range_is_nil() {
    let (interp, result) = run_lines("val odd = [1, 3, 5]; odd->3;");
    assert_eq!(result.unwrap(), Value::Nil);
    let (_, result) = run_lines("val odd = [1, 3, 5]; odd->3 == nil;");
    assert_eq!(result.unwrap(), Value::Bool(true));
    assert_eq!(interp.get_value("odd").unwrap().to_string(), "[1, 3, 5]");
}

#[test]
fn test_nil_equals_nil() {
    assert_eq!(eval("nil == nil").unwrap(), Value::Bool(true));
}

#[test]
fn test_push_returns_new_collection() {
    let (interp, result) = run_lines("val odd = [1, 3]; val more = odd<-5; odd;");
    assert_eq!(result.unwrap().to_string(), "[1, 3]");
    assert_eq!(interp.get_value("more").unwrap().to_string(), "[1, 3, 5]");

    let (_, result) = run_lines("val s = %{1, 3}; s<-3;");
    assert_eq!(result.unwrap(), eval("%{3, 1}").unwrap());
}

#[test]
fn test_display_forms() {
    let (_, output) = run_program(
        r#"
        fn main() {
          println(1);
          println(true);
          println("raw");
          println([1, "a"]);
          println(%{2, 2, 1});
          println({ name: "Koy", age: 1 });
          println(|x, y| { x; });
        }
        "#,
    );
    insta::assert_snapshot!(output, @r"
    1
    true
    raw
    [1, a]
    [2, 1]
    {name=Koy, age=1}
    Function[params=[x, y]]
    ");
}

// ============================================
// Front end
// ============================================

#[test]
fn test_parse_error_is_reported_before_running() {
    let err = parse_program("fn main() { println(1) }").unwrap_err();
    assert!(err.message().starts_with("expected"), "{}", err.message());
    assert!(err.expected().contains(&"`;`".to_string()));
}

#[test]
fn test_program_round_trips_through_json() {
    let program = parse_program("fn main() { add[x=1, y=2]; } fn add(x, y) { x + y; }").unwrap();
    let json = serde_json::to_string(&program).unwrap();
    let back: koy::ast::Program = serde_json::from_str(&json).unwrap();
    assert_eq!(program, back);
}

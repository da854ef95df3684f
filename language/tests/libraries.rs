mod nexus_test;
use nexus_test::*;

use nexus_language::{LibraryRegistry, Value as LibraryValue};
use std::rc::Rc;

/// An in-memory stand-in for the native-library manager.
struct FakeRegistry;

impl LibraryRegistry for FakeRegistry {
  fn call_function(
    &self,
    alias: &str,
    name: &str,
    arguments: Vec<LibraryValue>,
  ) -> Result<LibraryValue, String> {
    match (alias, name) {
      ("mathlib", "add") => match (&arguments[0], &arguments[1]) {
        (LibraryValue::Number(a), LibraryValue::Number(b)) => Ok(LibraryValue::Number(a + b)),
        _ => Err("add() expects numbers".to_string()),
      },
      ("mathlib", "fail") => Err("native failure".to_string()),
      _ => Err(format!("unknown library function {}.{}", alias, name)),
    }
  }
}

fn interpreter_with_registry() -> Interpreter {
  let registry = Rc::new(FakeRegistry);
  let mut interpreter = Interpreter::new();
  interpreter.bind_library_function(Rc::clone(&registry) as Rc<dyn LibraryRegistry>, "mathlib", "add", 2);
  interpreter.bind_library_function(registry, "mathlib", "fail", 0);
  interpreter
}

fn run_with_registry(source: &str) -> Result<Interpreter, ()> {
  let mut reporter = ErrorReporter::new();
  let tokens = tokenize(source, &mut reporter);
  let ast = parse(source, &tokens, &mut reporter);
  assert!(!reporter.had_error());

  let mut interpreter = interpreter_with_registry();
  match interpreter.interpret(source, &ast) {
    Ok(()) => Ok(interpreter),
    Err(_) => Err(()),
  }
}

#[test]
fn registry_functions_are_callable_from_scripts() {
  let interpreter = run_with_registry("let result = add(2, 3)\n").unwrap();
  assert!(interpreter.get_global("result").unwrap() == Value::from(5.0));
}

#[test]
fn registry_functions_check_arity() {
  assert!(run_with_registry("add(1)\n").is_err());
}

#[test]
fn registry_errors_become_runtime_errors() {
  assert!(run_with_registry("fail()\n").is_err());
}

#[test]
fn registry_errors_are_catchable() {
  let source = "let caught = \"\"\ntry: \n { fail() \n } catch (e): \n { caught = e \n }\n";
  let interpreter = run_with_registry(source).unwrap();
  assert!(interpreter.get_global("caught").unwrap() == Value::from("native failure"));
}

#[test]
fn registry_functions_look_like_functions() {
  let interpreter = run_with_registry("let t = type(add)\n").unwrap();
  assert!(interpreter.get_global("t").unwrap() == Value::from("function"));
}

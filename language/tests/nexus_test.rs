pub use nexus_language::{parse, tokenize, ErrorReporter, Interpreter, Value};

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq)]
pub enum RunResult {
  Success,
  RuntimeError,
  ParseError,
}

pub fn run(source: &str) -> (RunResult, Interpreter) {
  let mut reporter = ErrorReporter::new();
  let tokens = tokenize(source, &mut reporter);
  let ast = parse(source, &tokens, &mut reporter);

  let mut interpreter = Interpreter::new();
  if reporter.had_error() {
    return (RunResult::ParseError, interpreter);
  }

  match interpreter.interpret(source, &ast) {
    Ok(()) => (RunResult::Success, interpreter),
    Err(_) => (RunResult::RuntimeError, interpreter),
  }
}

/// Runs with `print` output captured, for asserting on exact stdout.
pub fn run_capturing(source: &str) -> (RunResult, String) {
  let buffer = Rc::new(RefCell::new(Vec::new()));

  let mut reporter = ErrorReporter::new();
  let tokens = tokenize(source, &mut reporter);
  let ast = parse(source, &tokens, &mut reporter);
  if reporter.had_error() {
    return (RunResult::ParseError, String::new());
  }

  let mut interpreter = Interpreter::with_output(Rc::clone(&buffer) as Rc<RefCell<dyn std::io::Write>>);
  let result = match interpreter.interpret(source, &ast) {
    Ok(()) => RunResult::Success,
    Err(_) => RunResult::RuntimeError,
  };

  let output = String::from_utf8(buffer.borrow().clone()).unwrap_or_default();
  (result, output)
}

#[macro_export]
macro_rules! nexus_test {
  ($name:ident $code:literal $( $var:ident == $expected:literal)*) => {
    #[test]
    fn $name(){
      let (result, interpreter) = run($code);
      assert_eq!(result, RunResult::Success);

      $(
        {
          let variable = interpreter.get_global(stringify!($var)).unwrap();
          let expected = Value::from($expected);
          assert!(
            variable == expected,
            "Expected {} to equal {} but got {}",
            stringify!($var),
            expected,
            variable
          );
        };
      )*
    }
  };

  ($name:ident $code:literal RuntimeError) => {
    #[test]
    fn $name(){
      let (result, _interpreter) = run($code);
      assert_eq!(result, RunResult::RuntimeError);
    }
  };

  ($name:ident $code:literal ParseError) => {
    #[test]
    fn $name(){
      let (result, _interpreter) = run($code);
      assert_eq!(result, RunResult::ParseError);
    }
  };
}

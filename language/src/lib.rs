pub mod ast;
mod builtins;
mod diagnostic;
mod environment;
mod interpreter;
mod library;
mod parser;
mod tokens;
mod value;

// A parse or runtime diagnostic, and the sink lexing and parsing report into
pub use diagnostic::{Diagnostic, DiagnosticKind, ErrorReporter};

// Scan a source string into a token stream
pub use tokens::{tokenize, LineNumber, Token, TokenType};

// Parse a token stream into an AST
pub use parser::{parse, parse_number};

// Walk an AST against an environment chain
pub use interpreter::{Interpreter, Interrupt};

// A value produced by evaluation
pub use value::{Callable, Value};

// The contract a native-library manager exposes to the evaluator
pub use library::{LibraryFunction, LibraryRegistry};

/// Runs a source string through the whole pipeline with a fresh interpreter.
/// Returns the interpreter so callers can inspect the resulting globals.
pub fn interpret(source: &str) -> Result<Interpreter, Vec<Diagnostic>> {
  let mut reporter = ErrorReporter::new();
  let tokens = tokenize(source, &mut reporter);
  let ast = parse(source, &tokens, &mut reporter);

  if reporter.had_error() {
    return Err(reporter.into_diagnostics());
  }

  let mut interpreter = Interpreter::new();
  match interpreter.interpret(source, &ast) {
    Ok(()) => Ok(interpreter),
    Err(diagnostic) => Err(vec![diagnostic]),
  }
}

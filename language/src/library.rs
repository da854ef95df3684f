use crate::diagnostic::RuntimeError;
use crate::interpreter::{Interpreter, Interrupt};
use crate::value::{Callable, Value};
use std::rc::Rc;

/// The contract a native-library manager presents to the evaluator: a
/// registry keyed by library alias that can invoke a named function with an
/// argument list. Loading shared objects and marshalling live behind it.
pub trait LibraryRegistry {
  fn call_function(
    &self,
    alias: &str,
    name: &str,
    arguments: Vec<Value>,
  ) -> Result<Value, String>;
}

/// One registry function adapted into a callable value, so scripts invoke
/// library functions exactly like any other function.
pub struct LibraryFunction {
  pub registry: Rc<dyn LibraryRegistry>,
  pub alias: Rc<str>,
  pub name: Rc<str>,
  pub arity: i32,
}

impl Callable for LibraryFunction {
  fn name(&self) -> &str {
    &self.name
  }

  fn arity(&self) -> i32 {
    self.arity
  }

  fn call(
    &self,
    _interpreter: &mut Interpreter,
    arguments: Vec<Value>,
  ) -> Result<Value, Interrupt> {
    self
      .registry
      .call_function(&self.alias, &self.name, arguments)
      .map_err(|message| Interrupt::Error(RuntimeError { message, span: None }))
  }

  fn display_name(&self) -> String {
    format!("<native fn {}.{}>", self.alias, self.name)
  }
}

use crate::value::Value;
use ahash::AHashMap as HashMap;
use std::{cell::RefCell, rc::Rc};

/// A single lexical scope: bindings plus a link to the enclosing scope.
///
/// Environments are shared (closures and bound methods keep the scope they
/// were created in alive), so they always live behind `Rc<RefCell<…>>`.
pub struct Environment {
  values: HashMap<Rc<str>, Value>,
  enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
  pub fn new() -> Rc<RefCell<Self>> {
    Rc::new(RefCell::new(Self {
      values: HashMap::new(),
      enclosing: None,
    }))
  }

  pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
    Rc::new(RefCell::new(Self {
      values: HashMap::new(),
      enclosing: Some(enclosing),
    }))
  }

  /// Creates or overwrites a binding in this scope.
  pub fn define(&mut self, name: Rc<str>, value: Value) {
    self.values.insert(name, value);
  }

  /// Reads the binding from the nearest scope that defines `name`.
  pub fn get(&self, name: &str) -> Option<Value> {
    match self.values.get(name) {
      Some(value) => Some(value.clone()),
      None => self
        .enclosing
        .as_ref()
        .and_then(|enclosing| enclosing.borrow().get(name)),
    }
  }

  /// Rebinds `name` in the nearest scope that defines it. Returns false when
  /// no scope does.
  pub fn assign(&mut self, name: &str, value: Value) -> bool {
    if let Some(binding) = self.values.get_mut(name) {
      *binding = value;
      true
    } else if let Some(enclosing) = &self.enclosing {
      enclosing.borrow_mut().assign(name, value)
    } else {
      false
    }
  }
}

use crate::ast;
use crate::environment::Environment;
use crate::interpreter::{Interpreter, Interrupt};
use ahash::AHashMap as HashMap;
use std::{cell::RefCell, fmt, rc::Rc};

#[derive(Clone)]
pub enum Value {
  Nil,
  Boolean(bool),
  Number(f64),
  String(Rc<str>),
  List(Rc<RefCell<Vec<Value>>>),
  Callable(Rc<dyn Callable>),
  Class(Rc<Class>),
  Instance(Rc<RefCell<Instance>>),
}

impl Value {
  pub fn is_falsy(&self) -> bool {
    match self {
      Self::Nil => true,
      Self::Boolean(value) => !value,
      Self::Number(value) => *value == 0.0,
      Self::String(value) => value.is_empty(),
      Self::List(_) | Self::Callable(_) | Self::Class(_) | Self::Instance(_) => false,
    }
  }

  pub fn is_truthy(&self) -> bool {
    !self.is_falsy()
  }

  pub fn get_type(&self) -> &'static str {
    match self {
      Self::Nil => "nil",
      Self::Boolean(_) => "boolean",
      Self::Number(_) => "number",
      Self::String(_) => "string",
      Self::List(_) => "list",
      Self::Callable(_) => "function",
      Self::Class(_) => "class",
      Self::Instance(_) => "instance",
    }
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Nil, Self::Nil) => true,
      (Self::Boolean(value), Self::Boolean(other)) => value == other,
      (Self::Number(value), Self::Number(other)) => value == other,
      (Self::String(value), Self::String(other)) => value == other,
      // Heap values compare by identity, not structure.
      (Self::List(value), Self::List(other)) => Rc::ptr_eq(value, other),
      (Self::Callable(value), Self::Callable(other)) => {
        std::ptr::eq(Rc::as_ptr(value) as *const (), Rc::as_ptr(other) as *const ())
      }
      (Self::Class(value), Self::Class(other)) => Rc::ptr_eq(value, other),
      (Self::Instance(value), Self::Instance(other)) => Rc::ptr_eq(value, other),
      _ => false,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::Nil => write!(f, "nil"),
      Self::Boolean(value) => write!(f, "{}", value),
      // An integral number prints without a decimal point.
      Self::Number(value) => write!(f, "{}", value),
      Self::String(value) => write!(f, "{}", value),
      Self::List(value) => write!(
        f,
        "[{}]",
        value
          .borrow()
          .iter()
          .map(ToString::to_string)
          .collect::<Vec<String>>()
          .join(", ")
      ),
      Self::Callable(value) => write!(f, "{}", value.display_name()),
      Self::Class(value) => write!(f, "<class {}>", value.name),
      Self::Instance(value) => write!(f, "<{} instance>", value.borrow().class.name),
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::String(value) => write!(f, "String({:?})", value),
      value => write!(f, "{}", value),
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Boolean(value)
  }
}
impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Self::Number(value)
  }
}
impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Self::Number(f64::from(value))
  }
}
impl From<usize> for Value {
  #[allow(
    clippy::cast_precision_loss,
    reason = "used by builtins for lengths, rounding is expected of the number type"
  )]
  fn from(value: usize) -> Self {
    Self::Number(value as f64)
  }
}
impl From<String> for Value {
  fn from(value: String) -> Self {
    Self::String(Rc::from(value))
  }
}
impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Self::String(Rc::from(value))
  }
}
impl From<Vec<Self>> for Value {
  fn from(value: Vec<Self>) -> Self {
    Self::List(Rc::new(RefCell::new(value)))
  }
}
impl From<()> for Value {
  fn from(_value: ()) -> Self {
    Self::Nil
  }
}

/// The uniform call contract. A negative arity means variadic; the
/// interpreter checks the argument count before calling.
pub trait Callable {
  fn name(&self) -> &str;
  fn arity(&self) -> i32;
  fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>)
    -> Result<Value, Interrupt>;

  fn display_name(&self) -> String {
    format!("<fn {}>", self.name())
  }
}

/// A user function or lambda plus the environment it closed over. Lambdas
/// are functions without a name.
pub struct Function {
  pub declaration: Rc<ast::Function>,
  pub closure: Rc<RefCell<Environment>>,
}

impl Function {
  fn execute_body(
    &self,
    interpreter: &mut Interpreter,
    arguments: Vec<Value>,
    environment: Rc<RefCell<Environment>>,
  ) -> Result<Value, Interrupt> {
    for (parameter, argument) in self.declaration.parameters.iter().zip(arguments) {
      environment.borrow_mut().define(parameter.clone(), argument);
    }

    match interpreter.execute_block(&self.declaration.body, environment) {
      Ok(()) => Ok(Value::Nil),
      Err(Interrupt::Return(value)) => Ok(value),
      Err(interrupt) => Err(interrupt),
    }
  }
}

impl Callable for Function {
  fn name(&self) -> &str {
    self.declaration.name.as_deref().unwrap_or("lambda")
  }

  fn arity(&self) -> i32 {
    self.declaration.parameters.len() as i32
  }

  fn call(
    &self,
    interpreter: &mut Interpreter,
    arguments: Vec<Value>,
  ) -> Result<Value, Interrupt> {
    let environment = Environment::with_enclosing(Rc::clone(&self.closure));
    self.execute_body(interpreter, arguments, environment)
  }
}

/// A method looked up through an instance; defines `this` before delegating
/// to the wrapped function.
pub struct BoundMethod {
  pub instance: Value,
  pub method: Rc<Function>,
}

impl Callable for BoundMethod {
  fn name(&self) -> &str {
    self.method.name()
  }

  fn arity(&self) -> i32 {
    self.method.arity()
  }

  fn call(
    &self,
    interpreter: &mut Interpreter,
    arguments: Vec<Value>,
  ) -> Result<Value, Interrupt> {
    let environment = Environment::with_enclosing(Rc::clone(&self.method.closure));
    environment
      .borrow_mut()
      .define(Rc::from("this"), self.instance.clone());
    self.method.execute_body(interpreter, arguments, environment)
  }
}

/// A function provided by the host rather than the script.
pub struct NativeFunction {
  pub name: &'static str,
  pub arity: i32,
  pub func: fn(&mut Interpreter, Vec<Value>) -> Result<Value, Interrupt>,
}

impl NativeFunction {
  pub fn create(
    name: &'static str,
    arity: i32,
    func: fn(&mut Interpreter, Vec<Value>) -> Result<Value, Interrupt>,
  ) -> Value {
    Value::Callable(Rc::new(Self { name, arity, func }))
  }
}

impl Callable for NativeFunction {
  fn name(&self) -> &str {
    self.name
  }

  fn arity(&self) -> i32 {
    self.arity
  }

  fn call(
    &self,
    interpreter: &mut Interpreter,
    arguments: Vec<Value>,
  ) -> Result<Value, Interrupt> {
    (self.func)(interpreter, arguments)
  }

  fn display_name(&self) -> String {
    format!("<native fn {}>", self.name)
  }
}

/// A class: method table plus optional superclass. Calling a class (the
/// interpreter's call dispatch handles this) constructs an instance and runs
/// `init` when present.
pub struct Class {
  pub name: Rc<str>,
  pub superclass: Option<Rc<Class>>,
  pub methods: HashMap<Rc<str>, Rc<Function>>,
}

impl Class {
  pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
    match self.methods.get(name) {
      Some(method) => Some(Rc::clone(method)),
      None => self
        .superclass
        .as_ref()
        .and_then(|superclass| superclass.find_method(name)),
    }
  }

  pub fn arity(&self) -> i32 {
    self.find_method("init").map_or(0, |init| init.arity())
  }
}

pub struct Instance {
  pub class: Rc<Class>,
  pub fields: HashMap<Rc<str>, Value>,
}

impl Instance {
  pub fn new(class: Rc<Class>) -> Self {
    Self {
      class,
      fields: HashMap::new(),
    }
  }
}

use crate::{
  ast::{
    expression::{BinaryOperator, Expr, Expression, Literal, UnaryOperator},
    statement::{Statement, Stmt},
    Span,
  },
  builtins,
  diagnostic::{Diagnostic, RuntimeError},
  environment::Environment,
  library::{LibraryFunction, LibraryRegistry},
  value::{BoundMethod, Callable, Class, Function, Instance, Value},
};
use ahash::AHashMap as HashMap;
use std::{
  cell::RefCell,
  io::{self, Write},
  rc::Rc,
};

/// A non-local exit travelling up the evaluator: either a runtime error, or
/// a control signal that a matching construct absorbs. Signals skip all
/// intervening evaluation; block scopes are restored on the way out.
pub enum Interrupt {
  Error(RuntimeError),
  Return(Value),
  Break,
  Continue,
}

impl Interrupt {
  /// An error with no position yet; the nearest call site supplies one.
  pub fn error(message: impl Into<String>) -> Self {
    Self::Error(RuntimeError {
      message: message.into(),
      span: None,
    })
  }
}

impl From<RuntimeError> for Interrupt {
  fn from(error: RuntimeError) -> Self {
    Self::Error(error)
  }
}

fn error(message: String, span: Span) -> Interrupt {
  Interrupt::Error(RuntimeError::new(message, span))
}

macro_rules! numeric_operation {
  ($left:expr, $right:expr, $span:expr, $token:tt) => {
    match ($left, $right) {
      (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left $token right)),
      _ => Err(error("Operands must be numbers".to_string(), $span)),
    }
  };
}

macro_rules! comparison_operation {
  ($left:expr, $right:expr, $span:expr, $token:tt) => {
    match ($left, $right) {
      (Value::Number(left), Value::Number(right)) => Ok(Value::Boolean(left $token right)),
      _ => Err(error("Operands must be numbers".to_string(), $span)),
    }
  };
}

// Bitwise operators work on the operands truncated to 32-bit integers, with
// the result widened back to a number.
macro_rules! bitwise_operation {
  ($left:expr, $right:expr, $span:expr, $token:tt) => {
    match ($left, $right) {
      (Value::Number(left), Value::Number(right)) => {
        Ok(Value::Number(f64::from((left as i32) $token (right as i32))))
      }
      _ => Err(error("Operands must be numbers".to_string(), $span)),
    }
  };
}

pub struct Interpreter {
  globals: Rc<RefCell<Environment>>,
  environment: Rc<RefCell<Environment>>,
  output: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
  pub fn new() -> Self {
    Self::with_output(Rc::new(RefCell::new(io::stdout())))
  }

  /// An interpreter writing `print` output to the given sink instead of
  /// standard output.
  pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
    let globals = Environment::new();
    builtins::define_globals(&globals);

    Self {
      environment: Rc::clone(&globals),
      globals,
      output,
    }
  }

  pub fn define_global(&mut self, name: &str, value: Value) {
    self.globals.borrow_mut().define(Rc::from(name), value);
  }

  pub fn get_global(&self, name: &str) -> Option<Value> {
    self.globals.borrow().get(name)
  }

  /// Makes one function of a native library registry callable from scripts.
  pub fn bind_library_function(
    &mut self,
    registry: Rc<dyn LibraryRegistry>,
    alias: &str,
    name: &str,
    arity: i32,
  ) {
    let function = LibraryFunction {
      registry,
      alias: Rc::from(alias),
      name: Rc::from(name),
      arity,
    };
    self.define_global(name, Value::Callable(Rc::new(function)));
  }

  pub(crate) fn write_line(&mut self, text: &str) {
    let _ = writeln!(self.output.borrow_mut(), "{}", text);
  }

  pub(crate) fn write(&mut self, text: &str) {
    let mut output = self.output.borrow_mut();
    let _ = write!(output, "{}", text);
    let _ = output.flush();
  }

  pub fn interpret(&mut self, source: &str, statements: &[Statement]) -> Result<(), Diagnostic> {
    for statement in statements {
      if let Err(interrupt) = self.execute(statement) {
        return Err(Self::finish_interrupt(interrupt, source, statement.span));
      }
    }
    Ok(())
  }

  // A signal that reaches the top never found its construct; report it as a
  // runtime error rather than executing past it.
  fn finish_interrupt(interrupt: Interrupt, source: &str, span: Span) -> Diagnostic {
    let runtime_error = match interrupt {
      Interrupt::Error(runtime_error) => runtime_error,
      Interrupt::Return(_) => RuntimeError {
        message: "Cannot use 'return' outside of a function".to_string(),
        span: None,
      },
      Interrupt::Break => RuntimeError {
        message: "Cannot use 'break' outside of a loop".to_string(),
        span: None,
      },
      Interrupt::Continue => RuntimeError {
        message: "Cannot use 'continue' outside of a loop".to_string(),
        span: None,
      },
    };

    runtime_error.into_diagnostic(source, span)
  }

  pub(crate) fn execute_block(
    &mut self,
    statements: &[Statement],
    environment: Rc<RefCell<Environment>>,
  ) -> Result<(), Interrupt> {
    let previous = std::mem::replace(&mut self.environment, environment);

    let mut result = Ok(());
    for statement in statements {
      result = self.execute(statement);
      if result.is_err() {
        break;
      }
    }

    self.environment = previous;
    result
  }

  fn execute_in_environment(
    &mut self,
    statement: &Statement,
    environment: Rc<RefCell<Environment>>,
  ) -> Result<(), Interrupt> {
    let previous = std::mem::replace(&mut self.environment, environment);
    let result = self.execute(statement);
    self.environment = previous;
    result
  }

  fn execute(&mut self, statement: &Statement) -> Result<(), Interrupt> {
    match &statement.stmt {
      Stmt::Expression { expression } => {
        self.evaluate(expression)?;
        Ok(())
      }
      Stmt::Print { expression } => {
        let value = self.evaluate(expression)?;
        self.write_line(&value.to_string());
        Ok(())
      }
      Stmt::Declaration {
        identifier,
        expression,
      } => {
        let value = match expression {
          Some(expression) => self.evaluate(expression)?,
          None => Value::Nil,
        };
        self.environment.borrow_mut().define(Rc::clone(identifier), value);
        Ok(())
      }
      Stmt::Block { body } => {
        let environment = Environment::with_enclosing(Rc::clone(&self.environment));
        self.execute_block(body, environment)
      }
      Stmt::If {
        condition,
        then,
        otherwise,
      } => {
        if self.evaluate(condition)?.is_truthy() {
          self.execute(then)
        } else if let Some(otherwise) = otherwise {
          self.execute(otherwise)
        } else {
          Ok(())
        }
      }
      Stmt::While { condition, body } => {
        while self.evaluate(condition)?.is_truthy() {
          match self.execute(body) {
            Ok(()) => {}
            Err(Interrupt::Break) => break,
            Err(Interrupt::Continue) => {}
            Err(interrupt) => return Err(interrupt),
          }
        }
        Ok(())
      }
      Stmt::For {
        initializer,
        condition,
        increment,
        body,
      } => {
        let environment = Environment::with_enclosing(Rc::clone(&self.environment));
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.execute_for(initializer, condition.as_ref(), increment.as_ref(), body);
        self.environment = previous;
        result
      }
      Stmt::Function { function } => {
        let value = Value::Callable(Rc::new(Function {
          declaration: Rc::clone(function),
          closure: Rc::clone(&self.environment),
        }));
        if let Some(name) = &function.name {
          self.environment.borrow_mut().define(Rc::clone(name), value);
        }
        Ok(())
      }
      Stmt::Return { expression } => {
        let value = match expression {
          Some(expression) => self.evaluate(expression)?,
          None => Value::Nil,
        };
        Err(Interrupt::Return(value))
      }
      Stmt::Break => Err(Interrupt::Break),
      Stmt::Continue => Err(Interrupt::Continue),
      Stmt::Class {
        name,
        superclass,
        methods,
      } => self.execute_class(name, superclass.as_ref(), methods, statement.span),
      Stmt::Import { module, alias } => {
        // Module resolution is out of scope; the name is bound to a
        // placeholder so later references still resolve.
        let placeholder = Value::from("imported_module");
        self
          .environment
          .borrow_mut()
          .define(Rc::clone(module), placeholder.clone());
        if let Some(alias) = alias {
          self.environment.borrow_mut().define(Rc::clone(alias), placeholder);
        }
        Ok(())
      }
      Stmt::Try {
        block,
        catch_variable,
        catch,
        finally,
      } => {
        let mut result = match self.execute(block) {
          Err(Interrupt::Error(runtime_error)) => match catch {
            Some(catch) => {
              let environment = Environment::with_enclosing(Rc::clone(&self.environment));
              if let Some(variable) = catch_variable {
                environment
                  .borrow_mut()
                  .define(Rc::clone(variable), Value::from(runtime_error.message.as_str()));
              }
              self.execute_in_environment(catch, environment)
            }
            None => Err(Interrupt::Error(runtime_error)),
          },
          other => other,
        };

        // The finally block runs on every exit path; if it raises or
        // signals, that replaces whatever was in flight.
        if let Some(finally) = finally {
          let finally_result = self.execute(finally);
          if finally_result.is_err() {
            result = finally_result;
          }
        }

        result
      }
      Stmt::Throw { expression } => {
        let value = self.evaluate(expression)?;
        Err(error(value.to_string(), statement.span))
      }
      Stmt::Switch {
        discriminant,
        cases,
        default,
      } => {
        let value = self.evaluate(discriminant)?;

        for (case, body) in cases {
          if self.evaluate(case)? == value {
            return self.execute(body);
          }
        }
        if let Some(default) = default {
          return self.execute(default);
        }
        Ok(())
      }
    }
  }

  fn execute_for(
    &mut self,
    initializer: &Statement,
    condition: Option<&Expression>,
    increment: Option<&Expression>,
    body: &Statement,
  ) -> Result<(), Interrupt> {
    self.execute(initializer)?;

    loop {
      if let Some(condition) = condition {
        if self.evaluate(condition)?.is_falsy() {
          break;
        }
      }

      match self.execute(body) {
        Ok(()) => {}
        Err(Interrupt::Break) => break,
        // A continue still runs the increment before the next test.
        Err(Interrupt::Continue) => {}
        Err(interrupt) => return Err(interrupt),
      }

      if let Some(increment) = increment {
        self.evaluate(increment)?;
      }
    }

    Ok(())
  }

  fn execute_class(
    &mut self,
    name: &Rc<str>,
    superclass: Option<&Expression>,
    methods: &[Rc<crate::ast::Function>],
    span: Span,
  ) -> Result<(), Interrupt> {
    let superclass = match superclass {
      Some(expression) => match self.evaluate(expression)? {
        Value::Class(class) => Some(class),
        _ => return Err(error("Superclass must be a class".to_string(), expression.span)),
      },
      None => None,
    };

    // Pre-define the name so methods can refer to the class recursively.
    self
      .environment
      .borrow_mut()
      .define(Rc::clone(name), Value::Nil);

    // Methods of a subclass close over a scope that binds `super`.
    let closure = match &superclass {
      Some(superclass) => {
        let closure = Environment::with_enclosing(Rc::clone(&self.environment));
        closure
          .borrow_mut()
          .define(Rc::from("super"), Value::Class(Rc::clone(superclass)));
        closure
      }
      None => Rc::clone(&self.environment),
    };

    let mut method_table = HashMap::new();
    for method in methods {
      if let Some(method_name) = &method.name {
        method_table.insert(
          Rc::clone(method_name),
          Rc::new(Function {
            declaration: Rc::clone(method),
            closure: Rc::clone(&closure),
          }),
        );
      }
    }

    let class = Value::Class(Rc::new(Class {
      name: Rc::clone(name),
      superclass,
      methods: method_table,
    }));
    self.assign_variable(name, class, span)?;
    Ok(())
  }

  fn evaluate(&mut self, expression: &Expression) -> Result<Value, Interrupt> {
    match &expression.expr {
      Expr::Literal { value } => Ok(match value {
        Literal::Nil => Value::Nil,
        Literal::True => Value::Boolean(true),
        Literal::False => Value::Boolean(false),
        Literal::Number(number) => Value::Number(*number),
        Literal::String(string) => Value::String(Rc::clone(string)),
      }),
      Expr::Group { expression } => self.evaluate(expression),
      Expr::Unary {
        operator,
        expression: operand,
      } => {
        let value = self.evaluate(operand)?;
        self.unary_operation(*operator, value, expression.span)
      }
      Expr::Binary {
        operator,
        left,
        right,
      } => match operator {
        // Logical operators return the deciding operand, not a boolean.
        BinaryOperator::And => {
          let left = self.evaluate(left)?;
          if left.is_falsy() {
            Ok(left)
          } else {
            self.evaluate(right)
          }
        }
        BinaryOperator::Or => {
          let left = self.evaluate(left)?;
          if left.is_truthy() {
            Ok(left)
          } else {
            self.evaluate(right)
          }
        }
        _ => {
          let left = self.evaluate(left)?;
          let right = self.evaluate(right)?;
          self.binary_operation(*operator, left, right, expression.span)
        }
      },
      Expr::Ternary {
        condition,
        then,
        otherwise,
      } => {
        if self.evaluate(condition)?.is_truthy() {
          self.evaluate(then)
        } else {
          self.evaluate(otherwise)
        }
      }
      Expr::Variable { name } => self.lookup_variable(name, expression.span),
      Expr::Assignment {
        identifier,
        expression: value,
      } => {
        let value = self.evaluate(value)?;
        self.assign_variable(identifier, value.clone(), expression.span)?;
        Ok(value)
      }
      Expr::List { items } => {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
          values.push(self.evaluate(item)?);
        }
        Ok(Value::from(values))
      }
      Expr::Index {
        expression: object,
        index,
      } => {
        let object = self.evaluate(object)?;
        let index_value = self.evaluate(index)?;

        match (object, index_value) {
          (Value::List(list), Value::Number(number)) => {
            let list = list.borrow();
            let position = number.trunc();

            if position >= 0.0 && position < list.len() as f64 {
              Ok(list[position as usize].clone())
            } else {
              Err(error("List index out of range".to_string(), expression.span))
            }
          }
          (Value::List(_), _) => Err(error(
            "List index must be a number".to_string(),
            index.span,
          )),
          (object, _) => Err(error(
            format!("Only lists can be indexed, got {}", object.get_type()),
            expression.span,
          )),
        }
      }
      Expr::Call {
        expression: callee,
        arguments,
      } => {
        let callee = self.evaluate(callee)?;

        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
          values.push(self.evaluate(argument)?);
        }

        self.call_value(callee, values, Some(expression.span))
      }
      Expr::Get {
        expression: object,
        property,
      } => {
        let object = self.evaluate(object)?;

        if let Value::Instance(instance) = &object {
          let field = instance.borrow().fields.get(property.as_ref()).cloned();
          if let Some(value) = field {
            return Ok(value);
          }

          let method = instance.borrow().class.find_method(property);
          match method {
            Some(method) => Ok(Value::Callable(Rc::new(BoundMethod {
              instance: object.clone(),
              method,
            }))),
            None => Err(error(
              format!("Undefined property '{}'", property),
              expression.span,
            )),
          }
        } else {
          Err(error(
            "Only instances have properties".to_string(),
            expression.span,
          ))
        }
      }
      Expr::Set {
        expression: object,
        property,
        value,
      } => {
        let object = self.evaluate(object)?;

        if let Value::Instance(instance) = object {
          let value = self.evaluate(value)?;
          instance
            .borrow_mut()
            .fields
            .insert(Rc::clone(property), value.clone());
          Ok(value)
        } else {
          Err(error(
            "Only instances have fields".to_string(),
            expression.span,
          ))
        }
      }
      Expr::This => self.lookup_variable("this", expression.span),
      Expr::Super { method } => {
        let superclass = self.environment.borrow().get("super");
        let superclass = match superclass {
          Some(Value::Class(class)) => class,
          _ => {
            return Err(error(
              "Cannot use 'super' outside of a subclass method".to_string(),
              expression.span,
            ))
          }
        };
        let this = self.lookup_variable("this", expression.span)?;

        match superclass.find_method(method) {
          Some(method) => Ok(Value::Callable(Rc::new(BoundMethod {
            instance: this,
            method,
          }))),
          None => Err(error(
            format!("Undefined property '{}'", method),
            expression.span,
          )),
        }
      }
      Expr::Lambda { function } => Ok(Value::Callable(Rc::new(Function {
        declaration: Rc::clone(function),
        closure: Rc::clone(&self.environment),
      }))),
    }
  }

  pub(crate) fn call_value(
    &mut self,
    callee: Value,
    arguments: Vec<Value>,
    span: Option<Span>,
  ) -> Result<Value, Interrupt> {
    match self.dispatch_call(callee, arguments) {
      Err(Interrupt::Error(runtime_error)) if runtime_error.span.is_none() => {
        Err(Interrupt::Error(RuntimeError {
          message: runtime_error.message,
          span,
        }))
      }
      other => other,
    }
  }

  fn dispatch_call(&mut self, callee: Value, arguments: Vec<Value>) -> Result<Value, Interrupt> {
    match callee {
      Value::Callable(callable) => {
        Self::check_arity(callable.arity(), arguments.len())?;
        callable.call(self, arguments)
      }
      Value::Class(class) => {
        Self::check_arity(class.arity(), arguments.len())?;

        let instance = Value::Instance(Rc::new(RefCell::new(Instance::new(Rc::clone(&class)))));
        if let Some(init) = class.find_method("init") {
          let bound = BoundMethod {
            instance: instance.clone(),
            method: init,
          };
          bound.call(self, arguments)?;
        }
        Ok(instance)
      }
      _ => Err(Interrupt::error("Can only call functions and classes")),
    }
  }

  fn check_arity(arity: i32, count: usize) -> Result<(), Interrupt> {
    if arity >= 0 && count as i32 != arity {
      Err(Interrupt::error(format!(
        "Expected {} arguments but got {}",
        arity, count
      )))
    } else {
      Ok(())
    }
  }

  fn lookup_variable(&self, name: &str, span: Span) -> Result<Value, Interrupt> {
    self
      .environment
      .borrow()
      .get(name)
      .ok_or_else(|| error(format!("Undefined variable '{}'", name), span))
  }

  fn assign_variable(&mut self, name: &str, value: Value, span: Span) -> Result<(), Interrupt> {
    if self.environment.borrow_mut().assign(name, value) {
      Ok(())
    } else {
      Err(error(format!("Undefined variable '{}'", name), span))
    }
  }

  fn unary_operation(
    &self,
    operator: UnaryOperator,
    value: Value,
    span: Span,
  ) -> Result<Value, Interrupt> {
    match operator {
      UnaryOperator::Not => Ok(Value::Boolean(value.is_falsy())),
      UnaryOperator::Minus => match value {
        Value::Number(number) => Ok(Value::Number(-number)),
        _ => Err(error("Operand must be a number".to_string(), span)),
      },
      UnaryOperator::BitNot => match value {
        Value::Number(number) => Ok(Value::Number(f64::from(!(number as i32)))),
        _ => Err(error("Operand must be a number".to_string(), span)),
      },
    }
  }

  fn binary_operation(
    &self,
    operator: BinaryOperator,
    left: Value,
    right: Value,
    span: Span,
  ) -> Result<Value, Interrupt> {
    match operator {
      BinaryOperator::Plus => match (left, right) {
        (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left + right)),
        // String concatenation stringifies the other operand.
        (Value::String(left), right) => Ok(Value::from(format!("{}{}", left, right))),
        (left, Value::String(right)) => Ok(Value::from(format!("{}{}", left, right))),
        _ => Err(error(
          "Operands must be two numbers or strings".to_string(),
          span,
        )),
      },
      BinaryOperator::Minus => numeric_operation!(left, right, span, -),
      BinaryOperator::Multiply => numeric_operation!(left, right, span, *),
      BinaryOperator::Divide => match (left, right) {
        (Value::Number(_), Value::Number(right)) if right == 0.0 => {
          Err(error("Division by zero".to_string(), span))
        }
        (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left / right)),
        _ => Err(error("Operands must be numbers".to_string(), span)),
      },
      BinaryOperator::Modulo => match (left, right) {
        (Value::Number(_), Value::Number(right)) if right == 0.0 => {
          Err(error("Modulo by zero".to_string(), span))
        }
        (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left % right)),
        _ => Err(error("Operands must be numbers".to_string(), span)),
      },
      BinaryOperator::Power => match (left, right) {
        (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left.powf(right))),
        _ => Err(error("Operands must be numbers".to_string(), span)),
      },
      BinaryOperator::Equal => Ok(Value::Boolean(left == right)),
      BinaryOperator::NotEqual => Ok(Value::Boolean(left != right)),
      BinaryOperator::Greater => comparison_operation!(left, right, span, >),
      BinaryOperator::GreaterEqual => comparison_operation!(left, right, span, >=),
      BinaryOperator::Less => comparison_operation!(left, right, span, <),
      BinaryOperator::LessEqual => comparison_operation!(left, right, span, <=),
      BinaryOperator::BitAnd => bitwise_operation!(left, right, span, &),
      BinaryOperator::BitOr => bitwise_operation!(left, right, span, |),
      BinaryOperator::BitXor => bitwise_operation!(left, right, span, ^),
      BinaryOperator::LeftShift => match (left, right) {
        (Value::Number(left), Value::Number(right)) => Ok(Value::Number(f64::from(
          (left as i32).wrapping_shl(right as i32 as u32),
        ))),
        _ => Err(error("Operands must be numbers".to_string(), span)),
      },
      BinaryOperator::RightShift => match (left, right) {
        (Value::Number(left), Value::Number(right)) => Ok(Value::Number(f64::from(
          (left as i32).wrapping_shr(right as i32 as u32),
        ))),
        _ => Err(error("Operands must be numbers".to_string(), span)),
      },
      BinaryOperator::And | BinaryOperator::Or => {
        unreachable!("logical operators are evaluated with short-circuiting")
      }
    }
  }
}

impl Default for Interpreter {
  fn default() -> Self {
    Self::new()
  }
}

use crate::environment::Environment;
use crate::interpreter::{Interpreter, Interrupt};
use crate::value::{NativeFunction, Value};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn define_globals(globals: &Rc<RefCell<Environment>>) {
  type Native = fn(&mut Interpreter, Vec<Value>) -> Result<Value, Interrupt>;

  let mut globals = globals.borrow_mut();
  let mut define = |name: &'static str, arity: i32, func: Native| {
    globals.define(Rc::from(name), NativeFunction::create(name, arity, func));
  };

  define("print", -1, print);
  define("input", -1, input);
  define("len", 1, len);
  define("str", 1, str_);
  define("num", 1, num);
  define("type", 1, type_);
  define("clock", 0, clock);
  define("range", -1, range);
  define("map", 2, map);
  define("filter", 2, filter);
}

fn print(interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Interrupt> {
  let text = arguments
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<String>>()
    .join(" ");
  interpreter.write_line(&text);

  Ok(Value::Nil)
}

fn input(interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Interrupt> {
  if arguments.len() > 1 {
    return Err(Interrupt::error("input() takes at most one argument"));
  }

  if let Some(prompt) = arguments.first() {
    interpreter.write(&prompt.to_string());
  }

  let mut line = String::new();
  if io::stdin().read_line(&mut line).is_err() {
    return Ok(Value::from(""));
  }
  while line.ends_with('\n') || line.ends_with('\r') {
    line.pop();
  }

  Ok(Value::from(line))
}

fn len(_: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Interrupt> {
  match &arguments[0] {
    Value::String(string) => Ok(Value::from(string.len())),
    Value::List(list) => Ok(Value::from(list.borrow().len())),
    value => Err(Interrupt::error(format!(
      "Object of type '{}' has no len()",
      value.get_type()
    ))),
  }
}

fn str_(_: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Interrupt> {
  Ok(Value::from(arguments[0].to_string()))
}

fn num(_: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Interrupt> {
  match &arguments[0] {
    Value::Number(number) => Ok(Value::Number(*number)),
    Value::String(string) => match string.trim().parse::<f64>() {
      Ok(number) => Ok(Value::Number(number)),
      Err(_) => Err(Interrupt::error(format!(
        "Cannot convert '{}' to number",
        string
      ))),
    },
    value => Err(Interrupt::error(format!(
      "Cannot convert {} to number",
      value.get_type()
    ))),
  }
}

fn type_(_: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Interrupt> {
  Ok(Value::from(arguments[0].get_type()))
}

fn clock(_: &mut Interpreter, _arguments: Vec<Value>) -> Result<Value, Interrupt> {
  let seconds = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map_or(0.0, |duration| duration.as_secs_f64());

  Ok(Value::Number(seconds))
}

fn range(_: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Interrupt> {
  let mut numbers = Vec::with_capacity(arguments.len());
  for argument in &arguments {
    match argument {
      Value::Number(number) => numbers.push(*number),
      value => {
        return Err(Interrupt::error(format!(
          "range() expects numbers, got {}",
          value.get_type()
        )))
      }
    }
  }

  let (start, stop, step) = match numbers.as_slice() {
    [stop] => (0.0, *stop, 1.0),
    [start, stop] => (*start, *stop, 1.0),
    [start, stop, step] => (*start, *stop, *step),
    _ => return Err(Interrupt::error("range() takes 1 to 3 arguments")),
  };
  if step == 0.0 {
    return Err(Interrupt::error("range() step cannot be zero"));
  }

  let mut values = Vec::new();
  let mut current = start;
  while (step > 0.0 && current < stop) || (step < 0.0 && current > stop) {
    values.push(Value::Number(current));
    current += step;
  }

  Ok(Value::from(values))
}

fn map(interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Interrupt> {
  let function = arguments[0].clone();
  let items = match &arguments[1] {
    Value::List(list) => list.borrow().clone(),
    value => {
      return Err(Interrupt::error(format!(
        "map() expects a list, got {}",
        value.get_type()
      )))
    }
  };

  let mut results = Vec::with_capacity(items.len());
  for item in items {
    results.push(interpreter.call_value(function.clone(), vec![item], None)?);
  }

  Ok(Value::from(results))
}

fn filter(interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, Interrupt> {
  let predicate = arguments[0].clone();
  let items = match &arguments[1] {
    Value::List(list) => list.borrow().clone(),
    value => {
      return Err(Interrupt::error(format!(
        "filter() expects a list, got {}",
        value.get_type()
      )))
    }
  };

  let mut results = Vec::new();
  for item in items {
    if interpreter
      .call_value(predicate.clone(), vec![item.clone()], None)?
      .is_truthy()
    {
      results.push(item);
    }
  }

  Ok(Value::from(results))
}

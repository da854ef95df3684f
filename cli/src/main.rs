use clap::{Arg, Command, ErrorKind};
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::fs;
use std::process::exit;

use nexus_language::{parse, tokenize, ErrorReporter, Interpreter};

mod print;

fn main() {
  let app = Command::new("nexus")
    .version("1.0")
    .about("The Focus Nexus interpreter")
    .arg(Arg::new("file").help("The script to run"));

  match app.try_get_matches() {
    Ok(matches) => match matches.value_of("file") {
      Some(filename) => run_file(filename),
      None => repl(),
    },
    Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
      error.exit()
    }
    Err(_) => {
      eprintln!("Usage: nexus [script]");
      exit(64);
    }
  }
}

fn run_file(filename: &str) {
  let source = match fs::read_to_string(filename) {
    Ok(source) => source,
    Err(_) => {
      print::error_message(&format!("Problem reading file '{}'", filename));
      exit(74);
    }
  };

  let mut reporter = ErrorReporter::new();
  let tokens = tokenize(&source, &mut reporter);
  let ast = parse(&source, &tokens, &mut reporter);

  if reporter.had_error() {
    for diagnostic in reporter.diagnostics() {
      print::diagnostic(filename, &source, diagnostic);
    }
    exit(65);
  }

  let mut interpreter = Interpreter::new();
  if let Err(diagnostic) = interpreter.interpret(&source, &ast) {
    print::diagnostic(filename, &source, &diagnostic);
    exit(70);
  }
}

fn repl() {
  println!("Focus Nexus Interactive Interpreter v1.0");
  println!("Type 'exit' to quit");

  let mut rl = Editor::<()>::new();
  let mut interpreter = Interpreter::new();

  loop {
    let readline = rl.readline("> ");
    match readline {
      Ok(line) => {
        if line == "exit" || line == "quit" {
          break;
        }
        if line.is_empty() {
          continue;
        }
        rl.add_history_entry(line.as_str());

        let source = line + "\n";
        let mut reporter = ErrorReporter::new();
        let tokens = tokenize(&source, &mut reporter);
        let ast = parse(&source, &tokens, &mut reporter);

        if reporter.had_error() {
          for diagnostic in reporter.diagnostics() {
            print::diagnostic("repl", &source, diagnostic);
          }
          continue;
        }

        // The interpreter (and its globals) lives across lines.
        if let Err(diagnostic) = interpreter.interpret(&source, &ast) {
          print::diagnostic("repl", &source, &diagnostic);
        }
      }
      Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
      Err(error) => {
        println!("Error: {:?}", error);
        break;
      }
    }
  }
}

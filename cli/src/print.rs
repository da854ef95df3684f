use ansi_term::Colour::Red;
use ansi_term::Style;
use nexus_language::{Diagnostic, LineNumber};

pub fn error_message(message: &str) {
  eprintln!(
    "{} {}",
    Red.bold().paint("Error:"),
    Style::new().bold().paint(message)
  );
}

pub fn diagnostic(filename: &str, source: &str, diagnostic: &Diagnostic) {
  eprintln!("{}", Red.bold().paint(diagnostic.to_string()));
  code_frame(filename, source, diagnostic.line);
}

fn code_frame(file: &str, source: &str, line_number: LineNumber) {
  eprintln!("    ╭─[{}]", file);
  if line_number > 2 {
    eprintln!("    ·");
  } else {
    eprintln!("    │");
  }

  let start = if line_number > 2 { line_number - 2 } else { 1 };
  for line in start..=line_number {
    if let Some(text) = source.lines().nth(line as usize - 1) {
      eprintln!("{:>3} │ {}", line, text);
    }
  }
  if (line_number as usize) < source.lines().count() {
    eprintln!("    ·");
  }
  eprintln!("────╯");
}

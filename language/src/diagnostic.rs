use crate::ast::Span;
use crate::tokens::LineNumber;
use std::{error, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
  Parse,
  Runtime,
}

/// A finished, user-facing diagnostic.
///
/// `line` and `column` are 1-based. For parse diagnostics `token` holds the
/// lexeme the error points at, when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub kind: DiagnosticKind,
  pub message: String,
  pub token: Option<String>,
  pub line: LineNumber,
  pub column: u32,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self.kind {
      DiagnosticKind::Parse => {
        write!(f, "[line {}, column {}] Error", self.line, self.column)?;
        if let Some(token) = &self.token {
          write!(f, " at '{}'", token)?;
        }
        write!(f, ": {}", self.message)
      }
      DiagnosticKind::Runtime => write!(
        f,
        "[line {}, column {}] Runtime Error: {}",
        self.line, self.column, self.message
      ),
    }
  }
}
impl error::Error for Diagnostic {}

/// A runtime failure before it has been located in the source.
///
/// The span is missing when the error was raised by a native function, which
/// has no position of its own; the nearest call site fills it in.
#[derive(Debug, Clone)]
pub struct RuntimeError {
  pub message: String,
  pub span: Option<Span>,
}

impl RuntimeError {
  pub fn new(message: String, span: Span) -> Self {
    Self {
      message,
      span: Some(span),
    }
  }

  pub fn into_diagnostic(self, source: &str, fallback: Span) -> Diagnostic {
    let span = self.span.unwrap_or(fallback);

    Diagnostic {
      kind: DiagnosticKind::Runtime,
      message: self.message,
      token: None,
      line: span.get_line_number(source),
      column: span.get_column(source),
    }
  }
}

/// Collects lexical and parse diagnostics so scanning and parsing can keep
/// going after an error. Passed explicitly into `tokenize` and `parse`.
#[derive(Default)]
pub struct ErrorReporter {
  diagnostics: Vec<Diagnostic>,
}

impl ErrorReporter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn report(&mut self, diagnostic: Diagnostic) {
    self.diagnostics.push(diagnostic);
  }

  pub fn error(&mut self, line: LineNumber, column: u32, message: String) {
    self.report(Diagnostic {
      kind: DiagnosticKind::Parse,
      message,
      token: None,
      line,
      column,
    });
  }

  pub fn had_error(&self) -> bool {
    !self.diagnostics.is_empty()
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn into_diagnostics(self) -> Vec<Diagnostic> {
    self.diagnostics
  }
}

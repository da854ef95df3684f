use crate::{
  ast::{
    expression::{expression, BinaryOperator, Expr, Expression, Literal},
    statement::{statement, Statement, Stmt},
    Ast, Function, Span,
  },
  diagnostic::{Diagnostic, DiagnosticKind, ErrorReporter},
  tokens::{Token, TokenType},
};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Eq)]
enum Precedence {
  None = 1,
  Ternary,    // ?:
  Assignment, // =
  Or,         // or
  And,        // and
  BitOr,      // |
  BitXor,     // ^
  BitAnd,     // &
  Equality,   // == !=
  Comparison, // < > <= >=
  Shift,      // << >>
  Term,       // + -
  Factor,     // * / %
  Exponent,   // **
  Unary,      // ! - ~
  Call,       // () [] .
  Primary,
}

impl Precedence {
  fn next(self) -> Self {
    match self {
      Self::None => Self::Ternary,
      Self::Ternary => Self::Assignment,
      Self::Assignment => Self::Or,
      Self::Or => Self::And,
      Self::And => Self::BitOr,
      Self::BitOr => Self::BitXor,
      Self::BitXor => Self::BitAnd,
      Self::BitAnd => Self::Equality,
      Self::Equality => Self::Comparison,
      Self::Comparison => Self::Shift,
      Self::Shift => Self::Term,
      Self::Term => Self::Factor,
      Self::Factor => Self::Exponent,
      Self::Exponent => Self::Unary,
      Self::Unary => Self::Call,
      Self::Call | Self::Primary => Self::Primary,
    }
  }

  fn from(token_type: TokenType) -> Self {
    match token_type {
      TokenType::Question => Self::Ternary,
      TokenType::Or => Self::Or,
      TokenType::And => Self::And,
      TokenType::Pipe => Self::BitOr,
      TokenType::Caret => Self::BitXor,
      TokenType::Ampersand => Self::BitAnd,
      TokenType::EqualEqual | TokenType::BangEqual => Self::Equality,
      TokenType::Greater | TokenType::GreaterEqual | TokenType::Less | TokenType::LessEqual => {
        Self::Comparison
      }
      TokenType::LeftShift | TokenType::RightShift => Self::Shift,
      TokenType::Plus | TokenType::Minus => Self::Term,
      TokenType::Star | TokenType::Slash | TokenType::Percent => Self::Factor,
      TokenType::StarStar => Self::Exponent,
      TokenType::LeftParen | TokenType::LeftSquare | TokenType::Dot => Self::Call,
      _ => Self::None,
    }
  }
}

#[derive(Clone, Copy, Debug)]
enum Error {
  Expected(&'static str),
  ExpectedExpression,
  InvalidAssignmentTarget,
  TooManyParameters,
  TooManyArguments,
}

impl Error {
  fn get_message(&self) -> String {
    match self {
      Self::Expected(what) => format!("Expected {}", what),
      Self::ExpectedExpression => "Expected expression".to_string(),
      Self::InvalidAssignmentTarget => "Invalid assignment target".to_string(),
      Self::TooManyParameters => "Can't have more than 255 parameters".to_string(),
      Self::TooManyArguments => "Can't have more than 255 arguments".to_string(),
    }
  }

  fn get_diagnostic(&self, source: &str, token: Token) -> Diagnostic {
    let lexeme = match token.ttype {
      TokenType::EndOfFile => None,
      TokenType::Newline => Some("\\n".to_string()),
      _ => Some(token.get_value(source).to_string()),
    };

    Diagnostic {
      kind: DiagnosticKind::Parse,
      message: self.get_message(),
      token: lexeme,
      line: token.line,
      column: token.column,
    }
  }
}

type ExpressionResult = Result<Expression, Error>;
type StatementResult = Result<Statement, Error>;

struct Parser<'source, 'reporter> {
  source: &'source str,
  tokens: &'source [Token],
  position: usize,
  reporter: &'reporter mut ErrorReporter,
}

impl<'source, 'reporter> Parser<'source, 'reporter> {
  fn new(
    source: &'source str,
    tokens: &'source [Token],
    reporter: &'reporter mut ErrorReporter,
  ) -> Self {
    Self {
      source,
      tokens,
      position: 0,
      reporter,
    }
  }

  fn get(&self, position: usize) -> Token {
    self.tokens.get(position).copied().unwrap_or(Token {
      ttype: TokenType::EndOfFile,
      start: 0,
      end: 0,
      line: 0,
      column: 0,
    })
  }

  fn current(&self) -> Token {
    self.get(self.position)
  }

  fn previous(&self) -> Token {
    self.get(self.position.saturating_sub(1))
  }

  fn at_end(&self) -> bool {
    self.current().ttype == TokenType::EndOfFile
  }

  fn advance(&mut self) -> Token {
    let token = self.current();
    if !self.at_end() {
      self.position += 1;
    }
    token
  }

  fn check(&self, token_type: TokenType) -> bool {
    self.current().ttype == token_type
  }

  fn matches(&mut self, token_type: TokenType) -> bool {
    if self.check(token_type) {
      self.advance();
      true
    } else {
      false
    }
  }

  fn consume(&mut self, token_type: TokenType, error: Error) -> Result<Token, Error> {
    if self.check(token_type) {
      Ok(self.advance())
    } else {
      Err(error)
    }
  }

  // The end of the file terminates a statement just like a newline, so a
  // final line without a trailing newline still parses.
  fn expect_newline(&mut self, error: Error) -> Result<(), Error> {
    if self.matches(TokenType::Newline) || self.at_end() {
      Ok(())
    } else {
      Err(error)
    }
  }

  fn get_name(&self, token: Token) -> Rc<str> {
    Rc::from(token.get_value(self.source))
  }

  fn synchronize(&mut self) {
    self.advance();

    while !self.at_end() {
      if self.previous().ttype == TokenType::Newline {
        return;
      }

      match self.current().ttype {
        TokenType::Class
        | TokenType::Function
        | TokenType::Var
        | TokenType::Let
        | TokenType::For
        | TokenType::If
        | TokenType::While
        | TokenType::Print
        | TokenType::Return
        | TokenType::Try
        | TokenType::Throw
        | TokenType::Switch
        | TokenType::Import => return,
        _ => {
          self.advance();
        }
      }
    }
  }

  fn declaration_with_recovery(&mut self) -> Option<Statement> {
    match self.declaration() {
      Ok(statement) => Some(statement),
      Err(error) => {
        let token = self.current();
        self
          .reporter
          .report(error.get_diagnostic(self.source, token));
        self.synchronize();
        None
      }
    }
  }

  fn declaration(&mut self) -> StatementResult {
    match self.current().ttype {
      TokenType::Class => self.class_declaration(),
      TokenType::Import => self.import_statement(),
      TokenType::Function => self.function_statement(),
      TokenType::Var | TokenType::Let => self.var_declaration(),
      _ => self.statement(),
    }
  }

  fn statement(&mut self) -> StatementResult {
    match self.current().ttype {
      TokenType::Try => self.try_statement(),
      TokenType::Throw => self.throw_statement(),
      TokenType::Switch => self.switch_statement(),
      TokenType::If => self.if_statement(),
      TokenType::Print => self.print_statement(),
      TokenType::Return => self.return_statement(),
      TokenType::While => self.while_statement(),
      TokenType::For => self.for_statement(),
      TokenType::LeftBrace => self.block_statement(),
      TokenType::Break => self.break_statement(),
      TokenType::Continue => self.continue_statement(),
      _ => self.expression_statement(),
    }
  }

  fn var_declaration(&mut self) -> StatementResult {
    let keyword = self.advance();
    let name = self.consume(TokenType::Identifier, Error::Expected("variable name"))?;

    let expression = if self.matches(TokenType::Equal) {
      Some(self.expression()?)
    } else {
      None
    };
    self.expect_newline(Error::Expected("newline after variable declaration"))?;

    let end = expression.as_ref().map_or(Span::from(&name), |e| e.span);
    Ok(statement!(
      Declaration {
        identifier: self.get_name(name),
        expression,
      },
      (keyword, end)
    ))
  }

  fn expression_statement(&mut self) -> StatementResult {
    let expression = self.expression()?;
    self.expect_newline(Error::Expected("newline after expression"))?;

    let span = expression.span;
    Ok(statement!(Expression { expression }, span))
  }

  fn print_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    let expression = self.expression()?;
    self.expect_newline(Error::Expected("newline after value"))?;

    let end = expression.span;
    Ok(statement!(Print { expression }, (keyword, end)))
  }

  fn return_statement(&mut self) -> StatementResult {
    let keyword = self.advance();

    let expression = if self.check(TokenType::Newline) || self.at_end() {
      None
    } else {
      Some(self.expression()?)
    };
    self.expect_newline(Error::Expected("newline after return value"))?;

    let end = expression.as_ref().map_or(Span::from(&keyword), |e| e.span);
    Ok(statement!(Return { expression }, (keyword, end)))
  }

  fn break_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    self.expect_newline(Error::Expected("newline after 'break'"))?;

    Ok(Statement {
      stmt: Stmt::Break,
      span: Span::from(&keyword),
    })
  }

  fn continue_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    self.expect_newline(Error::Expected("newline after 'continue'"))?;

    Ok(Statement {
      stmt: Stmt::Continue,
      span: Span::from(&keyword),
    })
  }

  fn block_statement(&mut self) -> StatementResult {
    let open = self.advance();
    let (body, close) = self.block_body()?;

    Ok(statement!(Block { body }, (open, close)))
  }

  fn block_body(&mut self) -> Result<(Vec<Statement>, Token), Error> {
    let mut statements = Vec::new();

    loop {
      if self.matches(TokenType::Newline) {
        continue;
      }
      if self.check(TokenType::RightBrace) || self.at_end() {
        break;
      }
      if let Some(statement) = self.declaration_with_recovery() {
        statements.push(statement);
      }
    }

    let close = self.consume(TokenType::RightBrace, Error::Expected("'}' after block"))?;
    Ok((statements, close))
  }

  fn block_header(&mut self, colon_error: Error) -> Result<(), Error> {
    self.consume(TokenType::Colon, colon_error)?;
    self.consume(TokenType::Newline, Error::Expected("newline after ':'"))?;
    Ok(())
  }

  fn if_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    let condition = self.expression()?;
    self.block_header(Error::Expected("':' after if condition"))?;

    let then = Box::new(self.statement()?);
    let otherwise = if self.matches(TokenType::Else) {
      self.block_header(Error::Expected("':' after 'else'"))?;
      Some(Box::new(self.statement()?))
    } else {
      None
    };

    let end = otherwise.as_ref().map_or(then.span, |o| o.span);
    Ok(statement!(
      If {
        condition,
        then,
        otherwise,
      },
      (keyword, end)
    ))
  }

  fn while_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    let condition = self.expression()?;
    self.block_header(Error::Expected("':' after while condition"))?;

    let body = Box::new(self.statement()?);
    let end = body.span;
    Ok(statement!(While { condition, body }, (keyword, end)))
  }

  fn for_statement(&mut self) -> StatementResult {
    let keyword = self.advance();

    let name = self.consume(TokenType::Identifier, Error::Expected("variable name"))?;
    self.consume(
      TokenType::Equal,
      Error::Expected("'=' after for loop variable"),
    )?;
    let initial = self.expression()?;
    let initializer_span = Span {
      start: name.start,
      end: initial.span.end,
    };
    let initializer = Box::new(Statement {
      stmt: Stmt::Declaration {
        identifier: self.get_name(name),
        expression: Some(initial),
      },
      span: initializer_span,
    });
    self.consume(
      TokenType::Semicolon,
      Error::Expected("';' after for loop initializer"),
    )?;

    let condition = if self.check(TokenType::Semicolon) {
      None
    } else {
      Some(self.expression()?)
    };
    self.consume(
      TokenType::Semicolon,
      Error::Expected("';' after for loop condition"),
    )?;

    let increment = if self.check(TokenType::Colon) {
      None
    } else {
      Some(self.expression()?)
    };
    self.block_header(Error::Expected("':' after for clauses"))?;

    let body = Box::new(self.statement()?);
    let end = body.span;
    Ok(statement!(
      For {
        initializer,
        condition,
        increment,
        body,
      },
      (keyword, end)
    ))
  }

  fn function_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    let (function, span) = self.function_body(Error::Expected("function name"))?;

    Ok(statement!(
      Function { function },
      (keyword, span)
    ))
  }

  fn function_body(&mut self, name_error: Error) -> Result<(Rc<Function>, Span), Error> {
    let name = self.consume(TokenType::Identifier, name_error)?;
    self.consume(
      TokenType::LeftParen,
      Error::Expected("'(' after function name"),
    )?;
    let parameters = self.parameters()?;
    self.consume(
      TokenType::RightParen,
      Error::Expected("')' after parameters"),
    )?;
    self.block_header(Error::Expected("':' before function body"))?;
    self.consume(
      TokenType::LeftBrace,
      Error::Expected("'{' before function body"),
    )?;
    let (body, close) = self.block_body()?;

    let span = Span {
      start: name.start,
      end: close.end,
    };
    let function = Rc::new(Function {
      name: Some(self.get_name(name)),
      parameters,
      body,
    });
    Ok((function, span))
  }

  fn parameters(&mut self) -> Result<Vec<Rc<str>>, Error> {
    let mut parameters = Vec::new();

    if !self.check(TokenType::RightParen) {
      loop {
        if parameters.len() >= 255 {
          return Err(Error::TooManyParameters);
        }
        let name = self.consume(TokenType::Identifier, Error::Expected("parameter name"))?;
        parameters.push(self.get_name(name));

        if !self.matches(TokenType::Comma) {
          break;
        }
      }
    }

    Ok(parameters)
  }

  fn class_declaration(&mut self) -> StatementResult {
    let keyword = self.advance();
    let name = self.consume(TokenType::Identifier, Error::Expected("class name"))?;

    let superclass = if self.matches(TokenType::Extends) {
      let parent = self.consume(TokenType::Identifier, Error::Expected("superclass name"))?;
      Some(expression!(
        Variable {
          name: self.get_name(parent),
        },
        parent
      ))
    } else {
      None
    };

    self.block_header(Error::Expected("':' before class body"))?;
    self.consume(
      TokenType::LeftBrace,
      Error::Expected("'{' before class body"),
    )?;

    let mut methods = Vec::new();
    loop {
      if self.matches(TokenType::Newline) {
        continue;
      }
      if self.check(TokenType::RightBrace) || self.at_end() {
        break;
      }

      self.consume(
        TokenType::Function,
        Error::Expected("'function' before method"),
      )?;
      let (method, _) = self.function_body(Error::Expected("method name"))?;
      methods.push(method);
    }

    let close = self.consume(
      TokenType::RightBrace,
      Error::Expected("'}' after class body"),
    )?;

    Ok(statement!(
      Class {
        name: self.get_name(name),
        superclass,
        methods,
      },
      (keyword, close)
    ))
  }

  fn import_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    let module = self.consume(TokenType::Identifier, Error::Expected("module name"))?;

    let alias = if self.matches(TokenType::As) {
      let alias = self.consume(TokenType::Identifier, Error::Expected("alias name"))?;
      Some(self.get_name(alias))
    } else {
      None
    };
    self.expect_newline(Error::Expected("newline after import"))?;

    let end = self.previous();
    Ok(statement!(
      Import {
        module: self.get_name(module),
        alias,
      },
      (keyword, end)
    ))
  }

  fn try_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    self.block_header(Error::Expected("':' after 'try'"))?;
    let block = Box::new(self.statement()?);
    let mut end = block.span;

    let (catch_variable, catch) = if self.matches(TokenType::Catch) {
      let variable = if self.matches(TokenType::LeftParen) {
        let variable = self.consume(TokenType::Identifier, Error::Expected("variable name"))?;
        self.consume(
          TokenType::RightParen,
          Error::Expected("')' after catch variable"),
        )?;
        Some(self.get_name(variable))
      } else {
        None
      };
      self.block_header(Error::Expected("':' after catch"))?;
      let catch = Box::new(self.statement()?);
      end = catch.span;
      (variable, Some(catch))
    } else {
      (None, None)
    };

    let finally = if self.matches(TokenType::Finally) {
      self.block_header(Error::Expected("':' after 'finally'"))?;
      let finally = Box::new(self.statement()?);
      end = finally.span;
      Some(finally)
    } else {
      None
    };

    Ok(statement!(
      Try {
        block,
        catch_variable,
        catch,
        finally,
      },
      (keyword, end)
    ))
  }

  fn throw_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    let expression = self.expression()?;
    self.expect_newline(Error::Expected("newline after throw expression"))?;

    let end = expression.span;
    Ok(statement!(Throw { expression }, (keyword, end)))
  }

  fn switch_statement(&mut self) -> StatementResult {
    let keyword = self.advance();
    let discriminant = self.expression()?;
    self.block_header(Error::Expected("':' after switch expression"))?;
    self.consume(
      TokenType::LeftBrace,
      Error::Expected("'{' before switch body"),
    )?;

    let mut cases = Vec::new();
    let mut default = None;
    loop {
      if self.matches(TokenType::Newline) {
        continue;
      }

      if self.matches(TokenType::Case) {
        let value = self.expression()?;
        self.block_header(Error::Expected("':' after case value"))?;
        cases.push((value, self.statement()?));
      } else if self.matches(TokenType::Default) {
        self.block_header(Error::Expected("':' after 'default'"))?;
        default = Some(Box::new(self.statement()?));
      } else {
        break;
      }
    }

    let close = self.consume(
      TokenType::RightBrace,
      Error::Expected("'}' after switch body"),
    )?;

    Ok(statement!(
      Switch {
        discriminant,
        cases,
        default,
      },
      (keyword, close)
    ))
  }
}

// Expressions
impl Parser<'_, '_> {
  fn expression(&mut self) -> ExpressionResult {
    self.parse_expression(Precedence::Ternary)
  }

  fn parse_expression(&mut self, precedence: Precedence) -> ExpressionResult {
    let can_assign = precedence <= Precedence::Assignment;
    let mut previous = self.prefix_rule(can_assign)?;

    while precedence <= Precedence::from(self.current().ttype) {
      previous = self.infix_rule(previous, can_assign)?;
    }

    if can_assign && self.matches(TokenType::Equal) {
      Err(Error::InvalidAssignmentTarget)
    } else {
      Ok(previous)
    }
  }

  fn prefix_rule(&mut self, can_assign: bool) -> ExpressionResult {
    match self.current().ttype {
      TokenType::LeftParen => self.grouping(),
      TokenType::Minus | TokenType::Bang | TokenType::Tilde => self.unary(),
      TokenType::Identifier => self.variable(can_assign),
      TokenType::Number
      | TokenType::String
      | TokenType::True
      | TokenType::False
      | TokenType::Nil => self.literal(),
      TokenType::LeftSquare => self.list(),
      TokenType::This => self.this_expression(),
      TokenType::Super => self.super_expression(),
      TokenType::Lambda => self.lambda(),
      _ => Err(Error::ExpectedExpression),
    }
  }

  fn infix_rule(&mut self, previous: Expression, can_assign: bool) -> ExpressionResult {
    match self.current().ttype {
      TokenType::LeftParen => self.call(previous),
      TokenType::LeftSquare => self.index(previous),
      TokenType::Dot => self.property(previous, can_assign),
      TokenType::Question => self.ternary(previous),
      _ => self.binary(previous),
    }
  }

  fn literal(&mut self) -> ExpressionResult {
    let token = self.advance();
    let value = match token.ttype {
      TokenType::Number => Literal::Number(parse_number(token.get_value(self.source))),
      TokenType::String => Literal::String(Rc::from(parse_string(token.get_value(self.source)))),
      TokenType::True => Literal::True,
      TokenType::False => Literal::False,
      TokenType::Nil => Literal::Nil,
      _ => unreachable!("literal prefix only dispatches literal tokens"),
    };

    Ok(expression!(Literal { value }, token))
  }

  fn grouping(&mut self) -> ExpressionResult {
    let open = self.advance();
    let expression = self.expression()?;
    let close = self.consume(
      TokenType::RightParen,
      Error::Expected("')' after expression"),
    )?;

    Ok(expression!(
      Group {
        expression: Box::new(expression),
      },
      (open, close)
    ))
  }

  fn unary(&mut self) -> ExpressionResult {
    let operator = self.advance();
    let expression = self.parse_expression(Precedence::Unary)?;

    let end = expression.span;
    Ok(expression!(
      Unary {
        operator: operator.ttype.into(),
        expression: Box::new(expression),
      },
      (operator, end)
    ))
  }

  fn variable(&mut self, can_assign: bool) -> ExpressionResult {
    let token = self.advance();
    let name = self.get_name(token);

    if can_assign && self.matches(TokenType::Equal) {
      let value = self.parse_expression(Precedence::Assignment)?;
      let end = value.span;
      Ok(expression!(
        Assignment {
          identifier: name,
          expression: Box::new(value),
        },
        (token, end)
      ))
    } else if can_assign && self.current().ttype.is_assignment_operator() {
      let operator = self.advance();
      let value = self.parse_expression(Precedence::Assignment)?;
      let end = value.span;

      let variable = expression!(
        Variable {
          name: name.clone(),
        },
        token
      );
      let combined = expression!(
        Binary {
          operator: operator.ttype.into(),
          left: Box::new(variable),
          right: Box::new(value),
        },
        (token, end)
      );
      Ok(expression!(
        Assignment {
          identifier: name,
          expression: Box::new(combined),
        },
        (token, end)
      ))
    } else {
      Ok(expression!(Variable { name }, token))
    }
  }

  fn list(&mut self) -> ExpressionResult {
    let open = self.advance();

    let mut items = Vec::new();
    if !self.check(TokenType::RightSquare) {
      loop {
        items.push(self.expression()?);
        if !self.matches(TokenType::Comma) {
          break;
        }
      }
    }

    let close = self.consume(
      TokenType::RightSquare,
      Error::Expected("']' after list elements"),
    )?;

    Ok(expression!(List { items }, (open, close)))
  }

  fn this_expression(&mut self) -> ExpressionResult {
    let token = self.advance();

    Ok(Expression {
      expr: Expr::This,
      span: Span::from(&token),
    })
  }

  fn super_expression(&mut self) -> ExpressionResult {
    let keyword = self.advance();
    self.consume(TokenType::Dot, Error::Expected("'.' after 'super'"))?;
    let method = self.consume(
      TokenType::Identifier,
      Error::Expected("superclass method name"),
    )?;

    Ok(expression!(
      Super {
        method: self.get_name(method),
      },
      (keyword, method)
    ))
  }

  fn lambda(&mut self) -> ExpressionResult {
    let keyword = self.advance();
    self.consume(TokenType::LeftParen, Error::Expected("'(' after 'lambda'"))?;
    let parameters = self.parameters()?;
    self.consume(
      TokenType::RightParen,
      Error::Expected("')' after parameters"),
    )?;
    self.block_header(Error::Expected("':' before lambda body"))?;

    let (body, end) = if self.check(TokenType::LeftBrace) {
      self.advance();
      let (body, close) = self.block_body()?;
      (body, Span::from(&close))
    } else {
      // A single expression body is an implicit return.
      let value = self.expression()?;
      let span = value.span;
      let body = vec![Statement {
        stmt: Stmt::Return {
          expression: Some(value),
        },
        span,
      }];
      (body, span)
    };

    let function = Rc::new(Function {
      name: None,
      parameters,
      body,
    });
    Ok(expression!(Lambda { function }, (keyword, end)))
  }

  fn call(&mut self, previous: Expression) -> ExpressionResult {
    self.advance();

    let mut arguments = Vec::new();
    if !self.check(TokenType::RightParen) {
      loop {
        if arguments.len() >= 255 {
          return Err(Error::TooManyArguments);
        }
        arguments.push(self.expression()?);
        if !self.matches(TokenType::Comma) {
          break;
        }
      }
    }

    let close = self.consume(TokenType::RightParen, Error::Expected("')' after arguments"))?;

    let start = previous.span;
    Ok(expression!(
      Call {
        expression: Box::new(previous),
        arguments,
      },
      (start, close)
    ))
  }

  fn index(&mut self, previous: Expression) -> ExpressionResult {
    self.advance();
    let index = self.expression()?;
    let close = self.consume(TokenType::RightSquare, Error::Expected("']' after index"))?;

    let start = previous.span;
    Ok(expression!(
      Index {
        expression: Box::new(previous),
        index: Box::new(index),
      },
      (start, close)
    ))
  }

  fn property(&mut self, previous: Expression, can_assign: bool) -> ExpressionResult {
    self.advance();
    let property = self.consume(
      TokenType::Identifier,
      Error::Expected("property name after '.'"),
    )?;
    let name = self.get_name(property);
    let start = previous.span;

    if can_assign && self.matches(TokenType::Equal) {
      let value = self.parse_expression(Precedence::Assignment)?;
      let end = value.span;
      Ok(expression!(
        Set {
          expression: Box::new(previous),
          property: name,
          value: Box::new(value),
        },
        (start, end)
      ))
    } else if can_assign && self.current().ttype.is_assignment_operator() {
      let operator = self.advance();
      let value = self.parse_expression(Precedence::Assignment)?;
      let end = value.span;

      let get = expression!(
        Get {
          expression: Box::new(previous.clone()),
          property: name.clone(),
        },
        (start, property)
      );
      let combined = expression!(
        Binary {
          operator: operator.ttype.into(),
          left: Box::new(get),
          right: Box::new(value),
        },
        (start, end)
      );
      Ok(expression!(
        Set {
          expression: Box::new(previous),
          property: name,
          value: Box::new(combined),
        },
        (start, end)
      ))
    } else {
      Ok(expression!(
        Get {
          expression: Box::new(previous),
          property: name,
        },
        (start, property)
      ))
    }
  }

  fn ternary(&mut self, previous: Expression) -> ExpressionResult {
    self.advance();
    let then = self.parse_expression(Precedence::Ternary)?;
    self.consume(
      TokenType::Colon,
      Error::Expected("':' after ternary then expression"),
    )?;
    let otherwise = self.parse_expression(Precedence::Ternary)?;

    let start = previous.span;
    let end = otherwise.span;
    Ok(expression!(
      Ternary {
        condition: Box::new(previous),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
      },
      (start, end)
    ))
  }

  fn binary(&mut self, previous: Expression) -> ExpressionResult {
    let operator = self.advance();
    let precedence = Precedence::from(operator.ttype);

    // `**` is right-associative, so its right operand parses at the same
    // precedence rather than the next one up.
    let right_precedence = if operator.ttype == TokenType::StarStar {
      precedence
    } else {
      precedence.next()
    };
    let right = self.parse_expression(right_precedence)?;

    let operator: BinaryOperator = operator.ttype.into();
    let start = previous.span;
    let end = right.span;
    Ok(expression!(
      Binary {
        operator,
        left: Box::new(previous),
        right: Box::new(right),
      },
      (start, end)
    ))
  }
}

pub fn parse_number(raw: &str) -> f64 {
  raw.parse().unwrap_or_default()
}

fn parse_string(raw: &str) -> String {
  let inner = &raw[1..raw.len() - 1];
  let mut value = String::with_capacity(inner.len());

  let mut characters = inner.chars();
  while let Some(character) = characters.next() {
    if character == '\\' {
      match characters.next() {
        Some('n') => value.push('\n'),
        Some('t') => value.push('\t'),
        Some('r') => value.push('\r'),
        Some('\\') => value.push('\\'),
        Some('"') => value.push('"'),
        Some(other) => value.push(other),
        None => {}
      }
    } else {
      value.push(character);
    }
  }

  value
}

pub fn parse(source: &str, tokens: &[Token], reporter: &mut ErrorReporter) -> Ast {
  let mut parser = Parser::new(source, tokens, reporter);
  let mut statements = Vec::new();

  while !parser.at_end() {
    if parser.matches(TokenType::Newline) {
      continue;
    }
    if let Some(statement) = parser.declaration_with_recovery() {
      statements.push(statement);
    }
  }

  statements
}

//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! Token classes are tried in a fixed order at the current position: numbers,
//! operators, whitespace, then parentheses. The first class that matches right
//! here wins; nothing scans ahead. Characters that fit no class are reported
//! as warnings and skipped so a stray symbol never stops the pipeline.

use std::fmt;

use tracing::{debug, warn};

use crate::error::LexWarning;

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Number,
  Operator,
  Paren,
}

impl TokenKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Number => "NUMBER",
      Self::Operator => "OPERATOR",
      Self::Paren => "PAREN",
    }
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A lexeme together with its class and byte offset in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub text: String,
  pub loc: usize,
}

impl Token {
  pub fn new(kind: TokenKind, text: impl Into<String>, loc: usize) -> Self {
    Self {
      kind,
      text: text.into(),
      loc,
    }
  }

  /// True for an operator token spelling exactly `op`.
  pub fn is_operator(&self, op: &str) -> bool {
    self.kind == TokenKind::Operator && self.text == op
  }

  pub fn is_paren(&self, paren: &str) -> bool {
    self.kind == TokenKind::Paren && self.text == paren
  }
}

/// Renders as `KIND: text`, the format used by token listings.
impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.kind, self.text)
  }
}

/// Tokens produced from one input, plus whatever was skipped along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexed {
  pub tokens: Vec<Token>,
  pub warnings: Vec<LexWarning>,
}

/// What a single anchored match at the current position produced.
enum Lexeme {
  Token(TokenKind, usize),
  Whitespace(usize),
}

/// Lex the input into a flat vector of tokens.
pub fn tokenize(input: &str) -> Lexed {
  let mut lexed = Lexed::default();
  let mut i = 0;

  while i < input.len() {
    let rest = &input[i..];

    match next_lexeme(rest) {
      Some(Lexeme::Token(kind, len)) => {
        lexed.tokens.push(Token::new(kind, &rest[..len], i));
        i += len;
      }
      Some(Lexeme::Whitespace(len)) => i += len,
      None => {
        let Some(ch) = rest.chars().next() else {
          break;
        };
        warn!(position = i, character = %ch, "unexpected character");
        lexed.warnings.push(LexWarning { ch, loc: i });
        i += ch.len_utf8();
      }
    }
  }

  debug!(
    tokens = lexed.tokens.len(),
    warnings = lexed.warnings.len(),
    "tokenized input"
  );
  lexed
}

fn next_lexeme(rest: &str) -> Option<Lexeme> {
  let digits = prefix_len(rest, |c| c.is_ascii_digit());
  if digits > 0 {
    return Some(Lexeme::Token(TokenKind::Number, digits));
  }

  let first = rest.chars().next()?;
  if matches!(first, '+' | '-' | '*' | '/') {
    return Some(Lexeme::Token(TokenKind::Operator, 1));
  }

  let blank = prefix_len(rest, is_blank);
  if blank > 0 {
    return Some(Lexeme::Whitespace(blank));
  }

  if matches!(first, '(' | ')') {
    return Some(Lexeme::Token(TokenKind::Paren, 1));
  }

  None
}

/// Unicode `White_Space` minus NEL, plus the byte order mark.
fn is_blank(c: char) -> bool {
  c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Byte length of the longest prefix whose chars all satisfy `pred`.
fn prefix_len(s: &str, pred: impl Fn(char) -> bool) -> usize {
  s.char_indices()
    .find(|&(_, c)| !pred(c))
    .map_or(s.len(), |(idx, _)| idx)
}

//! Error types shared across the compilation pipeline.
//!
//! Lexing never fails: unrecognised characters become [`LexWarning`]s and the
//! tokenizer moves on. Parsing and code generation stop at the first problem
//! and hand back a single [`CompileError`]. Diagnostics can be rendered in a
//! chibicc-like style, pointing at the offending byte with a caret.

use std::fmt;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

/// Ways the recursive-descent parser can reject a token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
  UnexpectedEnd,
  UnexpectedToken,
  MissingCloseParen,
  TrailingTokens,
}

/// Problems found while walking a well-formed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
  DivisionByZero,
}

/// A character the tokenizer could not place in any token class.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("Unexpected character '{ch}' at position {loc}"))]
pub struct LexWarning {
  pub ch: char,
  pub loc: usize,
}

/// Fatal error raised by a pipeline stage. `Display` yields the bare message.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum CompileError {
  #[snafu(display("{message}"))]
  Parse {
    kind: ParseErrorKind,
    message: String,
    loc: usize,
  },
  #[snafu(display("{message}"))]
  Semantic {
    kind: SemanticErrorKind,
    message: String,
    loc: usize,
  },
}

impl CompileError {
  pub fn parse(kind: ParseErrorKind, loc: usize, message: impl Into<String>) -> Self {
    Self::Parse {
      kind,
      message: message.into(),
      loc,
    }
  }

  pub fn semantic(kind: SemanticErrorKind, loc: usize, message: impl Into<String>) -> Self {
    Self::Semantic {
      kind,
      message: message.into(),
      loc,
    }
  }

  pub fn stage(&self) -> Stage {
    match self {
      Self::Parse { .. } => Stage::Parse,
      Self::Semantic { .. } => Stage::Semantic,
    }
  }

  pub fn parse_kind(&self) -> Option<ParseErrorKind> {
    match self {
      Self::Parse { kind, .. } => Some(*kind),
      Self::Semantic { .. } => None,
    }
  }

  pub fn semantic_kind(&self) -> Option<SemanticErrorKind> {
    match self {
      Self::Semantic { kind, .. } => Some(*kind),
      Self::Parse { .. } => None,
    }
  }

  pub fn message(&self) -> &str {
    match self {
      Self::Parse { message, .. } | Self::Semantic { message, .. } => message,
    }
  }

  /// Byte offset in the source the error is anchored at.
  pub fn loc(&self) -> usize {
    match self {
      Self::Parse { loc, .. } | Self::Semantic { loc, .. } => *loc,
    }
  }

  /// Format the error against its source, with a caret under the offending byte.
  pub fn render(&self, source: &str) -> String {
    render_at(source, self.loc(), self.message())
  }
}

/// The pipeline stage that produced a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Parse,
  Semantic,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Parse => f.write_str("Parsing error"),
      Self::Semantic => f.write_str("Semantic Analysis error"),
    }
  }
}

pub(crate) fn render_at(source: &str, loc: usize, message: &str) -> String {
  let expr_line = format!("'{source}'");
  let safe_loc = floor_char_boundary(source, loc.min(source.len()));
  let char_offset = source[..safe_loc].chars().count() + 1; // account for opening quote
  let marker = format!("{}^", " ".repeat(char_offset));
  format!("{expr_line}\n{marker} {message}")
}

fn floor_char_boundary(source: &str, mut idx: usize) -> usize {
  while !source.is_char_boundary(idx) {
    idx -= 1;
  }
  idx
}

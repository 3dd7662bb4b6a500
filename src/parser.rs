//! Recursive-descent parser producing the expression tree.
//!
//! One function per grammar rule, lowest precedence first:
//!
//! ```text
//! Expression := Term (('+'|'-') Term)*
//! Term       := Factor (('*'|'/') Factor)*
//! Factor     := NUMBER | '(' Expression ')'
//! ```
//!
//! Precedence falls out of the call structure and each loop folds to the
//! left, so `8-3-2` becomes `(8-3)-2`. The only mutable state is the
//! [`TokenStream`] cursor, which lives for exactly one call to [`parse`].

use std::fmt;

use tracing::debug;

use crate::error::{CompileError, CompileResult, ParseErrorKind};
use crate::tokenizer::{Token, TokenKind};

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
}

impl BinaryOp {
  pub fn symbol(self) -> &'static str {
    match self {
      Self::Add => "+",
      Self::Sub => "-",
      Self::Mul => "*",
      Self::Div => "/",
    }
  }
}

impl fmt::Display for BinaryOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.symbol())
  }
}

/// Expression tree produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
  /// Integer literal, kept as written.
  Leaf { value: String, loc: usize },
  Binary {
    op: BinaryOp,
    lhs: Box<AstNode>,
    rhs: Box<AstNode>,
    loc: usize,
  },
}

impl AstNode {
  pub fn leaf(value: impl Into<String>, loc: usize) -> Self {
    Self::Leaf {
      value: value.into(),
      loc,
    }
  }

  pub fn binary(op: BinaryOp, lhs: AstNode, rhs: AstNode, loc: usize) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
      loc,
    }
  }

  pub fn loc(&self) -> usize {
    match self {
      Self::Leaf { loc, .. } | Self::Binary { loc, .. } => *loc,
    }
  }

  /// Move both children out, leaving empty leaves behind.
  fn take_children(&mut self) -> Option<(AstNode, AstNode)> {
    match self {
      Self::Leaf { .. } => None,
      Self::Binary { lhs, rhs, .. } => Some((
        std::mem::replace(&mut **lhs, Self::leaf(String::new(), 0)),
        std::mem::replace(&mut **rhs, Self::leaf(String::new(), 0)),
      )),
    }
  }
}

/// Left-deep chains can be as deep as the input is long, so tear trees down
/// with an explicit stack instead of the default recursive drop.
impl Drop for AstNode {
  fn drop(&mut self) {
    let Some((lhs, rhs)) = self.take_children() else {
      return;
    };
    let mut pending = vec![lhs, rhs];
    while let Some(mut node) = pending.pop() {
      if let Some((lhs, rhs)) = node.take_children() {
        pending.push(lhs);
        pending.push(rhs);
      }
    }
  }
}

/// Parse a complete expression, rejecting anything left over.
pub fn parse(tokens: &[Token]) -> CompileResult<AstNode> {
  let mut stream = TokenStream::new(tokens);
  let tree = parse_expr(&mut stream)?;

  if let Some(token) = stream.peek() {
    return Err(CompileError::parse(
      ParseErrorKind::TrailingTokens,
      token.loc,
      "Unexpected tokens remaining",
    ));
  }

  debug!(tokens = tokens.len(), "parsed expression");
  Ok(tree)
}

fn parse_expr(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_term(stream)?;

  while let Some((op, loc)) = stream.consume_op(&[BinaryOp::Add, BinaryOp::Sub]) {
    let rhs = parse_term(stream)?;
    node = AstNode::binary(op, node, rhs, loc);
  }

  Ok(node)
}

fn parse_term(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_factor(stream)?;

  while let Some((op, loc)) = stream.consume_op(&[BinaryOp::Mul, BinaryOp::Div]) {
    let rhs = parse_factor(stream)?;
    node = AstNode::binary(op, node, rhs, loc);
  }

  Ok(node)
}

fn parse_factor(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let Some(token) = stream.peek() else {
    return Err(CompileError::parse(
      ParseErrorKind::UnexpectedEnd,
      stream.end_loc(),
      "Unexpected end of input",
    ));
  };

  if token.kind == TokenKind::Number {
    let node = AstNode::leaf(token.text.as_str(), token.loc);
    stream.bump();
    return Ok(node);
  }

  if token.is_paren("(") {
    stream.bump();
    let node = parse_expr(stream)?;
    stream.expect_close_paren()?;
    return Ok(node);
  }

  Err(CompileError::parse(
    ParseErrorKind::UnexpectedToken,
    token.loc,
    format!("Unexpected token: {}", token.text),
  ))
}

/// Lightweight cursor over the token slice, owned by a single parse.
struct TokenStream<'a> {
  tokens: &'a [Token],
  pos: usize,
}

impl<'a> TokenStream<'a> {
  fn new(tokens: &'a [Token]) -> Self {
    Self { tokens, pos: 0 }
  }

  fn peek(&self) -> Option<&'a Token> {
    self.tokens.get(self.pos)
  }

  fn bump(&mut self) {
    self.pos += 1;
  }

  /// Offset just past the last token, used when input runs out.
  fn end_loc(&self) -> usize {
    self
      .tokens
      .last()
      .map_or(0, |token| token.loc + token.text.len())
  }

  /// Consume the current token if it is one of `ops`.
  fn consume_op(&mut self, ops: &[BinaryOp]) -> Option<(BinaryOp, usize)> {
    let token = self.peek()?;
    let op = ops
      .iter()
      .copied()
      .find(|op| token.is_operator(op.symbol()))?;
    self.bump();
    Some((op, token.loc))
  }

  fn expect_close_paren(&mut self) -> CompileResult<()> {
    match self.peek() {
      Some(token) if token.is_paren(")") => {
        self.bump();
        Ok(())
      }
      token => Err(CompileError::parse(
        ParseErrorKind::MissingCloseParen,
        token.map_or_else(|| self.end_loc(), |token| token.loc),
        "Expected ')'",
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use expect_test::{Expect, expect};

  use super::*;
  use crate::tokenizer::tokenize;

  fn parse_str(input: &str) -> CompileResult<AstNode> {
    parse(&tokenize(input).tokens)
  }

  fn sexpr(node: &AstNode) -> String {
    match node {
      AstNode::Leaf { value, .. } => value.clone(),
      AstNode::Binary { op, lhs, rhs, .. } => format!("({op} {} {})", sexpr(lhs), sexpr(rhs)),
    }
  }

  fn check(input: &str, expect: Expect) {
    let actual = match parse_str(input) {
      Ok(tree) => sexpr(&tree),
      Err(err) => format!("{:?} at {}: {err}", err.parse_kind(), err.loc()),
    };
    expect.assert_eq(&actual);
  }

  #[test]
  fn precedence_is_structural() {
    check("2+3*4", expect!["(+ 2 (* 3 4))"]);
    check("2*3+4", expect!["(+ (* 2 3) 4)"]);
    check("(2+3)*4", expect!["(* (+ 2 3) 4)"]);
  }

  #[test]
  fn same_precedence_folds_left() {
    check("8-3-2", expect!["(- (- 8 3) 2)"]);
    check("64/8/2", expect!["(/ (/ 64 8) 2)"]);
    check("1+2-3+4", expect!["(+ (- (+ 1 2) 3) 4)"]);
  }

  #[test]
  fn nested_parens() {
    check("((7))", expect!["7"]);
    check("8-(3-2)", expect!["(- 8 (- 3 2))"]);
  }

  #[test]
  fn literal_text_is_kept_verbatim() {
    check("007", expect!["007"]);
  }

  #[test]
  fn errors() {
    check("", expect!["Some(UnexpectedEnd) at 0: Unexpected end of input"]);
    check("1+", expect!["Some(UnexpectedEnd) at 2: Unexpected end of input"]);
    check("*2", expect!["Some(UnexpectedToken) at 0: Unexpected token: *"]);
    check("1+)", expect!["Some(UnexpectedToken) at 2: Unexpected token: )"]);
    check("(1+2", expect!["Some(MissingCloseParen) at 4: Expected ')'"]);
    check("(1 2)", expect!["Some(MissingCloseParen) at 3: Expected ')'"]);
    check("1 2", expect!["Some(TrailingTokens) at 2: Unexpected tokens remaining"]);
    check("(1))", expect!["Some(TrailingTokens) at 3: Unexpected tokens remaining"]);
  }

  #[test]
  fn operator_nodes_remember_their_token() {
    let tree = parse_str("10 / 5").unwrap();
    assert_eq!(tree.loc(), 3);
  }

  #[test]
  fn independent_parses_do_not_share_state() {
    let first = tokenize("1+2").tokens;
    let second = tokenize("(3").tokens;
    assert!(parse(&second).is_err());
    assert_eq!(parse(&first), parse(&first));
    assert_eq!(sexpr(&parse(&first).unwrap()), "(+ 1 2)");
  }

  #[test]
  fn deep_left_chains_drop_without_recursing() {
    let input = vec!["2"; 200_000].join("-");
    let tree = parse_str(&input).unwrap();
    assert_eq!(tree.loc(), input.len() - 2);
    drop(tree);
  }
}

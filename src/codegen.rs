//! Semantic check and code generation: lower the tree into postfix notation.
//!
//! A single post-order walk both emits code and checks for division by a
//! literal zero. The check only looks at the immediate right operand of `/`,
//! so `1/(2-2)` still compiles. Operand text is never evaluated.

use tracing::debug;

use crate::error::{CompileError, CompileResult, SemanticErrorKind};
use crate::parser::{AstNode, BinaryOp};

/// Emit the postfix form of `tree`, operands and operators separated by single spaces.
pub fn generate(tree: &AstNode) -> CompileResult<String> {
  let mut out = String::new();
  let mut stack = vec![Step::Visit(tree)];

  while let Some(step) = stack.pop() {
    match step {
      Step::Visit(AstNode::Leaf { value, .. }) => emit(&mut out, value),
      Step::Visit(node @ AstNode::Binary { lhs, rhs, .. }) => {
        stack.push(Step::Combine(node));
        stack.push(Step::Visit(rhs));
        stack.push(Step::Visit(lhs));
      }
      Step::Combine(AstNode::Binary { op, rhs, loc, .. }) => {
        if *op == BinaryOp::Div && is_literal_zero(rhs) {
          return Err(CompileError::semantic(
            SemanticErrorKind::DivisionByZero,
            *loc,
            "Division by zero detected during semantic analysis.",
          ));
        }
        emit(&mut out, op.symbol());
      }
      Step::Combine(AstNode::Leaf { .. }) => {}
    }
  }

  debug!(len = out.len(), "generated postfix");
  Ok(out)
}

/// Post-order work item: operands are visited before their operator is combined.
enum Step<'a> {
  Visit(&'a AstNode),
  Combine(&'a AstNode),
}

fn emit(out: &mut String, piece: &str) {
  if !out.is_empty() {
    out.push(' ');
  }
  out.push_str(piece);
}

fn is_literal_zero(node: &AstNode) -> bool {
  match node {
    AstNode::Leaf { value, .. } => value.parse::<f64>().is_ok_and(|v| v == 0.0),
    AstNode::Binary { .. } => false,
  }
}

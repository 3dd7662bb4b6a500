//! Generic `{label, children}` view of the expression tree for renderers.
//!
//! The AST stays free of display concerns; anything that draws trees gets a
//! [`TreeShape`] instead.

use std::{fmt, mem};

use serde::Serialize;

use crate::parser::AstNode;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeShape {
  pub label: String,
  pub children: Vec<TreeShape>,
}

/// Flattens nested children onto one stack so deep outlines drop in constant stack space.
impl Drop for TreeShape {
  fn drop(&mut self) {
    let mut pending = mem::take(&mut self.children);
    while let Some(mut shape) = pending.pop() {
      pending.append(&mut shape.children);
    }
  }
}

enum Step<'a> {
  Visit(&'a AstNode),
  Build(&'static str),
}

pub fn to_shape(node: &AstNode) -> TreeShape {
  let mut stack = vec![Step::Visit(node)];
  let mut built: Vec<TreeShape> = Vec::new();

  while let Some(step) = stack.pop() {
    match step {
      Step::Visit(AstNode::Leaf { value, .. }) => built.push(TreeShape {
        label: value.clone(),
        children: Vec::new(),
      }),
      Step::Visit(AstNode::Binary { op, lhs, rhs, .. }) => {
        stack.push(Step::Build(op.symbol()));
        stack.push(Step::Visit(rhs));
        stack.push(Step::Visit(lhs));
      }
      Step::Build(label) => {
        let rhs = built.pop();
        let lhs = built.pop();
        built.push(TreeShape {
          label: label.to_string(),
          children: lhs.into_iter().chain(rhs).collect(),
        });
      }
    }
  }

  built.pop().unwrap_or_default()
}

/// Indented outline, two spaces per level.
impl fmt::Display for TreeShape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut stack = vec![(self, 0)];
    while let Some((shape, depth)) = stack.pop() {
      writeln!(f, "{:indent$}{}", "", shape.label, indent = depth * 2)?;
      stack.extend(shape.children.iter().rev().map(|child| (child, depth + 1)));
    }
    Ok(())
  }
}

//! Crate root: wires together the compilation pipeline.
//!
//! Each stage is a plain function of its input and runs strictly after the
//! previous one:
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` builds the expression tree by recursive descent.
//! - `codegen` checks for division by zero and emits postfix notation.
//! - `shape` maps the tree to a generic outline for external renderers.
//! - `error` holds the warning and error types shared by the other modules.

pub mod codegen;
pub mod error;
pub mod parser;
pub mod shape;
pub mod tokenizer;

use serde::Serialize;

pub use error::{CompileError, CompileResult, LexWarning, ParseErrorKind, SemanticErrorKind, Stage};
pub use shape::TreeShape;
pub use tokenizer::{Lexed, Token, TokenKind, tokenize};

/// Everything a successful run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
  pub tokens: Vec<Token>,
  pub warnings: Vec<LexWarning>,
  pub tree: TreeShape,
  pub postfix: String,
}

/// Output of the stages that run after tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lowered {
  pub tree: TreeShape,
  pub postfix: String,
}

/// Compile a source string into postfix notation.
pub fn compile(source: &str) -> CompileResult<Compilation> {
  let tokenizer::Lexed { tokens, warnings } = tokenizer::tokenize(source);
  let Lowered { tree, postfix } = lower(&tokens)?;
  Ok(Compilation {
    tokens,
    warnings,
    tree,
    postfix,
  })
}

/// Parse and generate code for an already tokenized input.
///
/// Callers that want to show the tokens even when a later stage fails can
/// tokenize first and keep the [`tokenizer::Lexed`] around.
pub fn lower(tokens: &[Token]) -> CompileResult<Lowered> {
  let ast = parser::parse(tokens)?;
  let postfix = codegen::generate(&ast)?;
  Ok(Lowered {
    tree: shape::to_shape(&ast),
    postfix,
  })
}

#[derive(Serialize)]
struct TokenView<'a> {
  kind: &'static str,
  text: &'a str,
}

#[derive(Serialize)]
struct CompilationView<'a> {
  tokens: Vec<TokenView<'a>>,
  tree: &'a TreeShape,
  postfix: &'a str,
}

impl Compilation {
  /// JSON document with the token list, tree outline and postfix output.
  pub fn to_json(&self) -> serde_json::Result<String> {
    let view = CompilationView {
      tokens: self
        .tokens
        .iter()
        .map(|token| TokenView {
          kind: token.kind.as_str(),
          text: &token.text,
        })
        .collect(),
      tree: &self.tree,
      postfix: &self.postfix,
    };
    serde_json::to_string_pretty(&view)
  }
}

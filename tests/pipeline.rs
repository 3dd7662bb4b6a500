use expect_test::expect;
use rpnc::{ParseErrorKind, SemanticErrorKind, Stage, TokenKind, compile, lower, tokenize};

fn postfix(input: &str) -> String {
  compile(input).unwrap().postfix
}

fn parse_kind(input: &str) -> Option<ParseErrorKind> {
  compile(input).unwrap_err().parse_kind()
}

#[test]
fn precedence_and_grouping() {
  assert_eq!(postfix("2+3*4"), "2 3 4 * +");
  assert_eq!(postfix("(2+3)*4"), "2 3 + 4 *");
  assert_eq!(postfix(" 12 * ( 3 + 4 ) / 2 "), "12 3 4 + * 2 /");
}

#[test]
fn left_associativity() {
  assert_eq!(postfix("8-3-2"), "8 3 - 2 -");
  assert_ne!(postfix("8-3-2"), "8 3 2 - -");
}

#[test]
fn division_by_zero() {
  let err = compile("10/0").unwrap_err();
  assert_eq!(err.stage(), Stage::Semantic);
  assert_eq!(err.semantic_kind(), Some(SemanticErrorKind::DivisionByZero));
}

#[test]
fn division_by_computed_zero_is_not_detected() {
  assert_eq!(postfix("1/(2-2)"), "1 2 2 - /");
}

#[test]
fn parse_failures() {
  assert_eq!(parse_kind("(1+2"), Some(ParseErrorKind::MissingCloseParen));
  assert_eq!(parse_kind("1 2"), Some(ParseErrorKind::TrailingTokens));
  assert_eq!(parse_kind("3*"), Some(ParseErrorKind::UnexpectedEnd));
  assert_eq!(parse_kind("3*/4"), Some(ParseErrorKind::UnexpectedToken));
}

#[test]
fn parse_errors_win_over_semantic_errors() {
  let err = compile("1/0 +").unwrap_err();
  assert_eq!(err.stage(), Stage::Parse);
}

#[test]
fn unknown_characters_do_not_abort() {
  let compilation = compile("1 + a2").unwrap();
  assert_eq!(compilation.postfix, "1 2 +");
  assert_eq!(compilation.warnings.len(), 1);
  assert_eq!(compilation.warnings[0].ch, 'a');
}

#[test]
fn error_rendering() {
  let err = compile("(1+2").unwrap_err();
  expect![[r#"
      '(1+2'
           ^ Expected ')'"#]]
  .assert_eq(&err.render("(1+2"));
}

#[test]
fn token_listing() {
  let compilation = compile("(10-4)").unwrap();
  let kinds: Vec<_> = compilation.tokens.iter().map(|t| t.kind).collect();
  assert_eq!(
    kinds,
    [
      TokenKind::Paren,
      TokenKind::Number,
      TokenKind::Operator,
      TokenKind::Number,
      TokenKind::Paren
    ]
  );
  let listing: Vec<_> = compilation.tokens.iter().map(ToString::to_string).collect();
  assert_eq!(
    listing,
    ["PAREN: (", "NUMBER: 10", "OPERATOR: -", "NUMBER: 4", "PAREN: )"]
  );
}

#[test]
fn json_report() {
  expect![[r#"
      {
        "tokens": [
          {
            "kind": "NUMBER",
            "text": "6"
          },
          {
            "kind": "OPERATOR",
            "text": "/"
          },
          {
            "kind": "NUMBER",
            "text": "3"
          }
        ],
        "tree": {
          "label": "/",
          "children": [
            {
              "label": "6",
              "children": []
            },
            {
              "label": "3",
              "children": []
            }
          ]
        },
        "postfix": "6 3 /"
      }"#]]
  .assert_eq(&compile("6/3").unwrap().to_json().unwrap());
}

#[test]
fn repeated_runs_are_identical() {
  let input = "(1+2)*3-4/5";
  let first = compile(input).unwrap();
  let _ = compile("(9").unwrap_err();
  let second = compile(input).unwrap();
  assert_eq!(first, second);
  assert_eq!(first.postfix, "1 2 + 3 * 4 5 / -");
}

#[test]
fn tokens_survive_a_failed_lowering() {
  let lexed = tokenize("(1 + @2");
  let err = lower(&lexed.tokens).unwrap_err();
  assert_eq!(err.parse_kind(), Some(ParseErrorKind::MissingCloseParen));
  assert_eq!(lexed.tokens.len(), 4);
  assert_eq!(lexed.warnings.len(), 1);
  assert_eq!(lexed.warnings[0].loc, 5);
}

#[test]
fn long_sums_compile_end_to_end() {
  let terms = 200_000;
  let compilation = compile(&vec!["1"; terms].join("+")).unwrap();
  assert_eq!(compilation.tokens.len(), 2 * terms - 1);
  assert_eq!(compilation.tree.label, "+");
  assert!(compilation.postfix.ends_with("1 + 1 +"));
}

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use rpnc::{Compilation, Lexed, Lowered, lower, tokenize};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(version, about = "Compile arithmetic expressions into postfix notation")]
struct Args {
  /// Expression to compile, e.g. "(2+3)*4"
  #[arg(conflicts_with = "file", required_unless_present = "file")]
  expr: Option<String>,

  /// Read the expression from a file, or `-` for stdin
  #[arg(short, long)]
  file: Option<PathBuf>,

  /// Which sections to print
  #[arg(long, value_enum, default_value_t = Emit::All)]
  emit: Emit,

  /// Exit with failure when the input contained unrecognised characters
  #[arg(long)]
  strict: bool,

  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
  Tokens,
  Tree,
  Postfix,
  Json,
  All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
  Success,
  Failure,
}

impl From<Status> for ExitCode {
  fn from(status: Status) -> Self {
    match status {
      Status::Success => Self::SUCCESS,
      Status::Failure => Self::FAILURE,
    }
  }
}

fn main() -> anyhow::Result<ExitCode> {
  let args = Args::parse();

  let level = match args.verbose {
    0 => LevelFilter::INFO,
    1 => LevelFilter::DEBUG,
    _ => LevelFilter::TRACE,
  };
  tracing_subscriber::fmt()
    .with_max_level(level)
    .with_target(false)
    .with_writer(io::stderr)
    .init();

  let source = read_source(&args)?;
  let status = run(
    &source,
    args.emit,
    args.strict,
    &mut io::stdout().lock(),
    &mut io::stderr().lock(),
  )?;
  Ok(status.into())
}

fn read_source(args: &Args) -> anyhow::Result<String> {
  match (&args.expr, &args.file) {
    (Some(expr), _) => Ok(expr.clone()),
    (None, Some(path)) if path.as_os_str() == "-" => {
      let mut text = String::new();
      io::stdin()
        .read_to_string(&mut text)
        .context("failed to read stdin")?;
      Ok(text)
    }
    (None, Some(path)) => {
      fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
    }
    (None, None) => bail!("no expression given"),
  }
}

/// Compile `source` and print the requested sections.
///
/// Tokens and lex warnings are printed before parsing starts, so they stay
/// visible when a later stage fails.
fn run(
  source: &str,
  emit: Emit,
  strict: bool,
  out: &mut impl Write,
  err: &mut impl Write,
) -> anyhow::Result<Status> {
  if source.trim().is_empty() {
    bail!("Please enter some code.");
  }

  let Lexed { tokens, warnings } = tokenize(source);
  for warning in &warnings {
    writeln!(err, "warning: {warning}")?;
  }

  if emit == Emit::All {
    writeln!(out, "Tokens:")?;
  }
  if matches!(emit, Emit::Tokens | Emit::All) {
    for token in &tokens {
      writeln!(out, "{token}")?;
    }
  }

  let Lowered { tree, postfix } = match lower(&tokens) {
    Ok(lowered) => lowered,
    Err(error) => {
      writeln!(err, "{}: {error}", error.stage())?;
      writeln!(err, "{}", error.render(source))?;
      return Ok(Status::Failure);
    }
  };

  match emit {
    Emit::Tokens => {}
    Emit::Tree => write!(out, "{tree}")?,
    Emit::Postfix => writeln!(out, "{postfix}")?,
    Emit::Json => {
      let compilation = Compilation {
        tokens,
        warnings: warnings.clone(),
        tree,
        postfix,
      };
      let json = compilation.to_json().context("failed to encode json")?;
      writeln!(out, "{json}")?;
    }
    Emit::All => {
      writeln!(out, "Parse tree:")?;
      write!(out, "{tree}")?;
      writeln!(out, "Postfix:")?;
      writeln!(out, "{postfix}")?;
    }
  }

  if strict && !warnings.is_empty() {
    info!(
      warnings = warnings.len(),
      "strict mode: failing on lex warnings"
    );
    return Ok(Status::Failure);
  }
  Ok(Status::Success)
}

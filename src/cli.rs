use crate::config::{Config, DEFAULT_OLLAMA_MODEL};
use crate::llm::Provider;
use crate::model::Selector;
use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(
    name = "namewise",
    version,
    about = "Suggest better names for Go identifiers",
    after_help = r#"Examples:
  namewise sample.go 10:2
  namewise -llm claude order.go 7:2
  namewise --function ComputeStats --variable count sample.go
  namewise --dry-run order.go 7:2
"#
)]
pub struct Args {
    /// Go source file to analyze.
    pub file: PathBuf,

    /// Identifier position as ROW:COL, both 1-based.
    #[arg(
        value_name = "ROW:COL",
        required_unless_present = "function",
        conflicts_with_all = ["function", "variable"]
    )]
    pub position: Option<Position>,

    /// Model provider to shell out to.
    #[arg(long, value_enum, default_value_t = Provider::Ollama)]
    pub llm: Provider,

    /// Model name for ollama.
    #[arg(long, default_value = DEFAULT_OLLAMA_MODEL)]
    pub model: String,

    /// Select a variable by enclosing function name instead of position.
    #[arg(long, requires = "variable")]
    pub function: Option<String>,

    /// Variable name inside --function.
    #[arg(long, requires = "function")]
    pub variable: Option<String>,

    /// Print the extracted context and prompt as JSON without calling a model.
    #[arg(long)]
    pub dry_run: bool,

    /// Echo the prompt sent to the model on stderr.
    #[arg(long)]
    pub show_prompt: bool,

    /// Raise the log level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parses a full argument list, program name first.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    pub fn selector(&self) -> Selector {
        match (&self.position, &self.function, &self.variable) {
            (_, Some(function), Some(variable)) => {
                Selector::function_variable(function.as_str(), variable.as_str())
            }
            (Some(pos), _, _) => Selector::position(pos.row, pos.col),
            // clap enforces one of the two forms
            _ => Selector::position(0, 0),
        }
    }

    pub fn config(&self) -> Config {
        Config::default()
            .with_provider(self.llm)
            .with_ollama_model(self.model.as_str())
    }

    /// Default log filter when RUST_LOG is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Rewrites the single-dash `-llm` spelling to `--llm`. Stops at `--`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    arg
                }
                Some("-llm") => OsString::from("--llm"),
                Some(flag) if flag.starts_with("-llm=") => OsString::from(format!("-{flag}")),
                _ => arg,
            }
        })
        .collect()
}

/// Process exit status for a failed parse: help and version output succeed.
pub fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl FromStr for Position {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (row, col) = value
            .split_once(':')
            .ok_or_else(|| format!("expected ROW:COL, got {value:?}"))?;
        let parse = |part: &str, what: &str| -> Result<usize, String> {
            match part.trim().parse::<usize>() {
                Ok(0) => Err(format!("{what} is 1-based, got 0")),
                Ok(n) => Ok(n),
                Err(err) => Err(format!("invalid {what} {part:?}: {err}")),
            }
        };
        Ok(Position {
            row: parse(row, "row")?,
            col: parse(col, "column")?,
        })
    }
}

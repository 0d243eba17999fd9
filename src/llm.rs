//! Model invocation. The adapter only runs a process and captures its
//! output; the exactly-N-lines retry contract lives in [`request_lines`].

use crate::config::Config;
use crate::error::{RenameError, Result};
use crate::model::Suggestion;
use crate::util;
use clap::ValueEnum;
use std::fmt;
use std::io;
use std::process::Command;
use std::thread;

/// Lines a well-shaped model answer has.
pub const REQUIRED_LINES: usize = 3;

const SUGGESTION_SEPARATOR: &str = " - ";

#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Provider {
    #[default]
    Ollama,
    Claude,
}

impl Provider {
    pub fn command(self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::Claude => "claude",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

pub trait LlmAdapter {
    /// Sends `payload` to `provider` and returns its raw standard output.
    fn invoke(&self, payload: &str, provider: Provider) -> Result<String>;
}

/// Shells out to the provider's command-line tool.
#[derive(Debug, Clone)]
pub struct CommandAdapter {
    ollama_model: String,
}

impl CommandAdapter {
    pub fn new(ollama_model: impl Into<String>) -> Self {
        Self {
            ollama_model: ollama_model.into(),
        }
    }

    fn command(&self, payload: &str, provider: Provider) -> Command {
        let mut cmd = Command::new(provider.command());
        match provider {
            Provider::Claude => {
                cmd.arg("-p").arg(payload);
            }
            Provider::Ollama => {
                cmd.arg("run").arg(&self.ollama_model).arg(payload);
            }
        }
        cmd
    }
}

impl LlmAdapter for CommandAdapter {
    fn invoke(&self, payload: &str, provider: Provider) -> Result<String> {
        let output = match self.command(payload, provider).output() {
            Ok(output) => output,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(RenameError::LlmInvocation(format!(
                    "{provider} not found on PATH"
                )));
            }
            Err(err) => {
                return Err(RenameError::LlmInvocation(format!(
                    "failed to run {provider}: {err}"
                )));
            }
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(%provider, stderr = %stderr.trim(), "model command failed");
            return Err(RenameError::LlmInvocation(format!(
                "{provider} exited with {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Calls the adapter until the answer has exactly [`REQUIRED_LINES`]
/// non-blank lines, sleeping a constant delay before each retry. Adapter
/// errors end the loop at once.
pub fn request_lines(adapter: &dyn LlmAdapter, payload: &str, config: &Config) -> Result<Vec<String>> {
    for attempt in 1..=config.max_attempts {
        if attempt > 1 {
            thread::sleep(config.retry_delay);
        }
        tracing::debug!(attempt, provider = %config.provider, "invoking model");
        let raw = adapter.invoke(payload, config.provider)?;
        let lines = util::non_blank_lines(&raw);
        if lines.len() == REQUIRED_LINES {
            return Ok(lines);
        }
        tracing::warn!(
            attempt,
            got = lines.len(),
            expected = REQUIRED_LINES,
            raw = %util::truncate_str_bytes(raw.trim(), 500),
            "model answer has the wrong shape, retrying"
        );
    }
    Err(RenameError::RetryExhausted {
        attempts: config.max_attempts,
        expected: REQUIRED_LINES,
    })
}

/// Splits each `name - reason` line on the first separator. Lines without
/// one are dropped; no pair at all is an error.
pub fn parse_suggestions(lines: &[String]) -> Result<Vec<Suggestion>> {
    let suggestions: Vec<Suggestion> = lines
        .iter()
        .filter_map(|line| line.split_once(SUGGESTION_SEPARATOR))
        .map(|(name, reason)| Suggestion {
            name: name.trim().to_string(),
            reason: reason.trim().to_string(),
        })
        .collect();
    if suggestions.is_empty() {
        return Err(RenameError::NoSuggestions);
    }
    Ok(suggestions)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays canned answers and records what it was sent.
    pub(crate) struct ScriptedAdapter {
        answers: RefCell<VecDeque<Result<String>>>,
        pub calls: Cell<usize>,
        pub payloads: RefCell<Vec<String>>,
    }

    impl ScriptedAdapter {
        pub(crate) fn new(answers: Vec<Result<String>>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                calls: Cell::new(0),
                payloads: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn repeating(answer: &str, times: usize) -> Self {
            Self::new((0..times).map(|_| Ok(answer.to_string())).collect())
        }
    }

    impl LlmAdapter for ScriptedAdapter {
        fn invoke(&self, payload: &str, _provider: Provider) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.payloads.borrow_mut().push(payload.to_string());
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    pub(crate) fn fast_config() -> Config {
        Config {
            retry_delay: Duration::ZERO,
            ..Config::default()
        }
    }

    #[test]
    fn accepts_three_lines_after_trimming_blanks() {
        let adapter = ScriptedAdapter::repeating("\n\nn - concise\n\ncount - idiomatic\nsum - clear\n\n", 1);
        let lines = request_lines(&adapter, "payload", &fast_config()).unwrap();
        assert_eq!(lines, vec!["n - concise", "count - idiomatic", "sum - clear"]);
        assert_eq!(adapter.calls.get(), 1);
    }

    #[test]
    fn retries_until_the_shape_is_right() {
        let adapter = ScriptedAdapter::new(vec![
            Ok("Sure! Here are some names:\na - b\nc - d\ne - f".to_string()),
            Ok("a - b\nc - d\ne - f".to_string()),
        ]);
        let lines = request_lines(&adapter, "payload", &fast_config()).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(adapter.calls.get(), 2);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let adapter = ScriptedAdapter::repeating("a - b\nc - d", 5);
        let err = request_lines(&adapter, "payload", &fast_config()).unwrap_err();
        assert!(
            matches!(err, RenameError::RetryExhausted { attempts: 3, expected: 3 }),
            "{err:?}"
        );
        assert_eq!(adapter.calls.get(), 3);
    }

    #[test]
    fn adapter_failures_are_not_retried() {
        let adapter = ScriptedAdapter::new(vec![Err(RenameError::LlmInvocation(
            "ollama not found on PATH".to_string(),
        ))]);
        let err = request_lines(&adapter, "payload", &fast_config()).unwrap_err();
        assert!(matches!(err, RenameError::LlmInvocation(_)), "{err:?}");
        assert_eq!(adapter.calls.get(), 1);
    }

    #[test]
    fn parses_on_first_separator_and_drops_the_rest() {
        let lines = vec![
            "total - sums all - values".to_string(),
            "no separator here".to_string(),
            "  acc  -   short   ".to_string(),
        ];
        let suggestions = parse_suggestions(&lines).unwrap();
        assert_eq!(
            suggestions,
            vec![
                Suggestion {
                    name: "total".to_string(),
                    reason: "sums all - values".to_string(),
                },
                Suggestion {
                    name: "acc".to_string(),
                    reason: "short".to_string(),
                },
            ]
        );
    }

    #[test]
    fn no_pairs_is_an_error() {
        let lines = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        assert!(matches!(
            parse_suggestions(&lines),
            Err(RenameError::NoSuggestions)
        ));
    }

    #[test]
    fn builds_provider_commands() {
        let adapter = CommandAdapter::new("llama3:8b");
        let ollama = adapter.command("hi", Provider::Ollama);
        assert_eq!(ollama.get_program(), "ollama");
        assert_eq!(
            ollama.get_args().collect::<Vec<_>>(),
            vec!["run", "llama3:8b", "hi"]
        );
        let claude = adapter.command("hi", Provider::Claude);
        assert_eq!(claude.get_program(), "claude");
        assert_eq!(claude.get_args().collect::<Vec<_>>(), vec!["-p", "hi"]);
    }
}

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, RenameError>;

/// Everything that can stop a rename request. There is no partial
/// success: a request yields suggestions or one of these.
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("classification error: {0}")]
    Classification(String),

    #[error("llm invocation failed: {0}")]
    LlmInvocation(String),

    #[error("failed to get exactly {expected} lines after {attempts} attempts")]
    RetryExhausted { attempts: u32, expected: usize },

    #[error("no valid suggestions from LLM")]
    NoSuggestions,
}

impl RenameError {
    pub fn not_found(message: impl Into<String>) -> Self {
        RenameError::NotFound(message.into())
    }
}

use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the generation backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    /// The request could not be built or the response carried nothing usable.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Transport failure or non-success HTTP status.
    #[error("Process error (status {status_code:?}): {message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    #[error("{0}")]
    Other(String),
}

impl AgentError {
    pub fn process_error_with_retry_after(
        status_code: u16,
        message: impl Into<String>,
        is_retryable: bool,
        retry_after: Duration,
    ) -> Self {
        Self::ProcessError {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
            retry_after: Some(retry_after),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProcessError { is_retryable: true, .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::ProcessError { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<minijinja::Error> for AgentError {
    fn from(err: minijinja::Error) -> Self {
        AgentError::Other(format!("Prompt template error: {err}"))
    }
}

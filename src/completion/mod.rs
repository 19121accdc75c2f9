// src/completion/mod.rs
//! Completion client: one prompt in, one summary (or a typed failure) out.
//!
//! The remote call sits behind [`CompletionBackend`] so the same bounded retry
//! loop drives the Groq backend in production and scripted backends in tests.

pub mod groq;
pub mod mock;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use tracing::{info, warn};

use crate::error::SummaryError;
use crate::metrics::{COMPLETION_ATTEMPTS_TOTAL, COMPLETION_FAILURES_TOTAL};
use crate::prompt::Prompt;

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a professional news analyst who writes concise, factual summaries. \
Use simple language, neutral tone, and avoid markdown.";

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Why a single backend call did not produce text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("completion api key is missing")]
    MissingApiKey,

    #[error("completion request failed: {0}")]
    Transport(String),

    #[error("completion service returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("could not decode completion response: {0}")]
    Decode(String),

    #[error("empty response from completion service")]
    EmptyResponse,

    #[error("completion attempt timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl CompletionError {
    /// Retrying cannot fix a missing key.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CompletionError::MissingApiKey)
    }
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
    fn name(&self) -> &'static str;
}

pub type DynBackend = Arc<dyn CompletionBackend>;

/// Bounded retry: fixed attempt ceiling, fixed delay, and a retryable predicate.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub retryable: fn(&CompletionError) -> bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            retryable: CompletionError::is_retryable,
        }
    }

    pub fn with_predicate(mut self, retryable: fn(&CompletionError) -> bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500))
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Trimmed, non-empty summary text.
    Text(String),
    Failed { last_error: String, attempts: u32 },
}

pub struct CompletionClient {
    backend: DynBackend,
    policy: RetryPolicy,
    system_instruction: String,
    attempt_timeout: Duration,
}

impl CompletionClient {
    pub fn new(backend: DynBackend) -> Self {
        Self {
            backend,
            policy: RetryPolicy::default(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = RetryPolicy {
            max_attempts: policy.max_attempts.max(1),
            ..policy
        };
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout.min(MAX_ATTEMPT_TIMEOUT);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Run the retry loop for one prompt.
    ///
    /// A blank prompt is a caller error and is rejected before any attempt.
    /// Backend failures never escape as `Err`; they end up in
    /// [`CompletionOutcome::Failed`] with the last error seen.
    pub async fn summarize(&self, prompt: &Prompt) -> Result<CompletionOutcome, SummaryError> {
        if prompt.is_blank() {
            return Err(SummaryError::InvalidInput(
                "Prompt cannot be empty.".to_string(),
            ));
        }

        let backend = self.backend.name();
        let max_attempts = self.policy.max_attempts;
        let mut last_error: Option<CompletionError> = None;
        let mut attempts = 0u32;

        for attempt in 1..=max_attempts {
            attempts = attempt;
            counter!(COMPLETION_ATTEMPTS_TOTAL, "backend" => backend).increment(1);

            match self.attempt(prompt).await {
                Ok(text) => {
                    info!(target: "completion", backend, attempt, chars = text.chars().count(), "completion ok");
                    return Ok(CompletionOutcome::Text(text));
                }
                Err(e) => {
                    warn!(target: "completion", backend, attempt, max_attempts, error = %e, "completion attempt failed");
                    let retry = (self.policy.retryable)(&e);
                    last_error = Some(e);
                    if !retry {
                        break;
                    }
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        counter!(COMPLETION_FAILURES_TOTAL, "backend" => backend).increment(1);
        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt was made".to_string());
        Ok(CompletionOutcome::Failed {
            last_error,
            attempts,
        })
    }

    async fn attempt(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        let raw = tokio::time::timeout(
            self.attempt_timeout,
            self.backend
                .complete(&self.system_instruction, prompt.as_str()),
        )
        .await
        .map_err(|_| CompletionError::Timeout(self.attempt_timeout))??;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(trimmed.to_string())
    }
}

// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod completion;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod orchestrator;
pub mod prompt;
pub mod sources;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::error::SummaryError;
pub use crate::model::{SourceKind, SourceSelection, SummaryResult, Topic};
pub use crate::orchestrator::SummaryOrchestrator;

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::completion::{
    groq::GroqBackend,
    mock::{ScriptedBackend, MOCK_SUMMARY},
    CompletionClient, DynBackend, RetryPolicy,
};
use crate::config::Settings;
use crate::sources::{
    google_news::GoogleNewsProvider, reddit::RedditProvider, DynSource, IsolatedSource,
};

/// Wire adapters and the completion client from settings.
///
/// * If `AI_TEST_MODE=mock`, the completion backend is a scripted mock.
/// * Otherwise the Groq backend is used; a missing key surfaces per request
///   as a generation failure rather than at startup.
pub fn build_orchestrator(settings: &Settings) -> anyhow::Result<SummaryOrchestrator> {
    let fetch_timeout = settings.fetch_timeout();

    let headlines: DynSource = Arc::new(IsolatedSource::new(
        GoogleNewsProvider::from_settings(&settings.sources)?,
        fetch_timeout,
    ));
    let discussion: DynSource = Arc::new(IsolatedSource::new(
        RedditProvider::from_settings(&settings.sources)?,
        fetch_timeout,
    ));

    let backend: DynBackend = if settings.mock_mode() {
        Arc::new(ScriptedBackend::always_ok(MOCK_SUMMARY))
    } else {
        Arc::new(GroqBackend::from_settings(&settings.groq)?)
    };

    let mut client = CompletionClient::new(backend)
        .with_policy(RetryPolicy::new(
            settings.retry.attempts,
            settings.retry_delay(),
        ))
        .with_attempt_timeout(settings.completion_timeout());
    if let Some(instruction) = settings.groq.system_instruction.as_deref() {
        client = client.with_system_instruction(instruction);
    }

    info!(
        mock = settings.mock_mode(),
        model = %settings.groq.model,
        key_present = !settings.groq.api_key.is_empty(),
        attempts = settings.retry.attempts,
        "summary pipeline configured"
    );

    Ok(SummaryOrchestrator::new(headlines, discussion, client))
}

/// Full router (API + `/metrics`) for explicit settings.
pub fn app_with_settings(settings: &Settings) -> anyhow::Result<Router> {
    let metrics = crate::metrics::Metrics::init()?;
    let orchestrator = build_orchestrator(settings)?;
    let state = AppState::new(orchestrator, settings.request_timeout());
    Ok(router(state).merge(metrics.router()))
}

/// Full router with settings resolved from file + environment.
pub async fn app() -> anyhow::Result<Router> {
    let settings = Settings::load()?;
    app_with_settings(&settings)
}

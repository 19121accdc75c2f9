// src/orchestrator.rs
//! Summary pipeline: validate, fetch, build, generate, validate output.

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::completion::{CompletionClient, CompletionOutcome};
use crate::error::SummaryError;
use crate::metrics::{SUMMARY_DURATION_MS, SUMMARY_REQUESTS_TOTAL};
use crate::model::{SourceKind, SourceSelection, SummaryResult, Topic};
use crate::prompt::PromptBuilder;
use crate::sources::{DynSource, SourceResult};
use crate::telemetry::anon_id;

pub struct SummaryOrchestrator {
    headlines: DynSource,
    discussion: DynSource,
    client: CompletionClient,
}

impl SummaryOrchestrator {
    pub fn new(headlines: DynSource, discussion: DynSource, client: CompletionClient) -> Self {
        Self {
            headlines,
            discussion,
            client,
        }
    }

    /// Produce one summary for `raw_topic`.
    ///
    /// Terminal states are success, `InvalidInput`, and `GenerationFailure`.
    /// Source outages only change the prompt. Dropping the returned future
    /// aborts in-flight fetches; if that happens before generation starts the
    /// completion backend is never called.
    pub async fn generate(
        &self,
        raw_topic: &str,
        selection: SourceSelection,
    ) -> Result<SummaryResult, SummaryError> {
        let t0 = Instant::now();
        let res = self.run(raw_topic, selection).await;

        let outcome = match &res {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        counter!(SUMMARY_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
        histogram!(SUMMARY_DURATION_MS).record(t0.elapsed().as_secs_f64() * 1_000.0);
        res
    }

    async fn run(
        &self,
        raw_topic: &str,
        selection: SourceSelection,
    ) -> Result<SummaryResult, SummaryError> {
        let topic = Topic::parse(raw_topic)?;
        let topic_id = anon_id(topic.as_str());

        let (headlines, discussion) = tokio::join!(
            fetch_if(&self.headlines, SourceKind::Headlines, selection, &topic),
            fetch_if(&self.discussion, SourceKind::Discussion, selection, &topic),
        );
        info!(
            target: "orchestrator",
            %topic_id,
            ?selection,
            headlines = headlines.is_available(),
            discussion = discussion.is_available(),
            "sources collected"
        );

        let prompt = PromptBuilder::build(&topic, &headlines, &discussion);

        match self.client.summarize(&prompt).await? {
            CompletionOutcome::Text(text) => {
                let summary = text.trim();
                if summary.is_empty() {
                    warn!(target: "orchestrator", %topic_id, "client reported success with empty text");
                    return Err(SummaryError::GenerationFailure {
                        message: "empty summary".to_string(),
                        attempts: 1,
                    });
                }
                Ok(SummaryResult {
                    topic: topic.into_inner(),
                    summary: summary.to_string(),
                })
            }
            CompletionOutcome::Failed {
                last_error,
                attempts,
            } => {
                warn!(target: "orchestrator", %topic_id, attempts, error = %last_error, "generation failed");
                Err(SummaryError::GenerationFailure {
                    message: last_error,
                    attempts,
                })
            }
        }
    }
}

async fn fetch_if(
    source: &DynSource,
    kind: SourceKind,
    selection: SourceSelection,
    topic: &Topic,
) -> SourceResult {
    if selection.includes(kind) {
        source.fetch(topic).await
    } else {
        SourceResult::not_requested(kind)
    }
}

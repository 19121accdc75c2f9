// tests/common/mod.rs
//
// Fakes shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use news_ninja::completion::mock::ScriptedBackend;
use news_ninja::completion::{CompletionClient, RetryPolicy};
use news_ninja::sources::{SourceAdapter, SourceResult};
use news_ninja::{SourceKind, SummaryOrchestrator, Topic};

/// Source adapter with a canned result and a call counter.
pub struct FakeSource {
    kind: SourceKind,
    result: SourceResult,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn available(kind: SourceKind, items: &[&str]) -> Self {
        Self::with_result(kind, SourceResult::from_items(kind, items))
    }

    pub fn unavailable(kind: SourceKind, reason: &str) -> Self {
        Self::with_result(kind, SourceResult::unavailable(kind, reason))
    }

    fn with_result(kind: SourceKind, result: SourceResult) -> Self {
        Self {
            kind,
            result,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for FakeSource {
    async fn fetch(&self, _topic: &Topic) -> SourceResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }
}

pub struct Harness {
    pub headlines: Arc<FakeSource>,
    pub discussion: Arc<FakeSource>,
    pub backend: Arc<ScriptedBackend>,
    pub orchestrator: SummaryOrchestrator,
}

/// Handles to the fakes once the orchestrator has been moved elsewhere.
pub struct Fakes {
    pub headlines: Arc<FakeSource>,
    pub discussion: Arc<FakeSource>,
    pub backend: Arc<ScriptedBackend>,
}

impl Harness {
    pub fn split(self) -> (SummaryOrchestrator, Fakes) {
        let fakes = Fakes {
            headlines: self.headlines,
            discussion: self.discussion,
            backend: self.backend,
        };
        (self.orchestrator, fakes)
    }
}

/// Orchestrator over fakes with the default policy (2 attempts, 500 ms).
pub fn harness(headlines: FakeSource, discussion: FakeSource, backend: ScriptedBackend) -> Harness {
    harness_with_policy(headlines, discussion, backend, RetryPolicy::default())
}

pub fn harness_with_policy(
    headlines: FakeSource,
    discussion: FakeSource,
    backend: ScriptedBackend,
    policy: RetryPolicy,
) -> Harness {
    let headlines = Arc::new(headlines);
    let discussion = Arc::new(discussion);
    let backend = Arc::new(backend);
    let client = CompletionClient::new(backend.clone()).with_policy(policy);
    let orchestrator = SummaryOrchestrator::new(headlines.clone(), discussion.clone(), client);
    Harness {
        headlines,
        discussion,
        backend,
        orchestrator,
    }
}

pub fn three_headlines() -> FakeSource {
    FakeSource::available(
        SourceKind::Headlines,
        &[
            "India unveils national AI compute mission",
            "Bengaluru startups raise record funding",
            "Government drafts AI safety framework",
        ],
    )
}

pub fn three_posts() -> FakeSource {
    FakeSource::available(
        SourceKind::Discussion,
        &[
            "Is the AI hiring boom real?",
            "Entry level roles and LLM tools",
            "AI mission explained",
        ],
    )
}

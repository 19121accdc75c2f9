// src/sources/mod.rs
//! Source adapters: the headline feed and the discussion feed.
//!
//! Concrete providers implement [`FeedProvider`] and are free to fail. They are
//! always wrapped in [`IsolatedSource`], which is the [`SourceAdapter`] the
//! orchestrator sees: every failure mode collapses into
//! [`SourceResult::Unavailable`], so a broken source only degrades the prompt.

pub mod google_news;
pub mod reddit;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::{debug, warn};

use crate::metrics::SOURCE_FETCH_TOTAL;
use crate::model::{SourceKind, Topic};
use crate::telemetry::anon_id;

/// Most items a source contributes to a prompt.
pub const MAX_ITEMS: usize = 10;

/// Upper bound for a single source fetch.
pub const MAX_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub const NOT_REQUESTED: &str = "not requested";

/// Longest single item kept; titles are short and anything longer is scraped noise.
pub const MAX_ITEM_CHARS: usize = 500;

/// Outcome of one source fetch. Consumed only by the prompt builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceResult {
    /// Newline-joined items, never empty, at most [`MAX_ITEMS`] lines.
    Available { kind: SourceKind, text: String },
    Unavailable { kind: SourceKind, reason: String },
}

impl SourceResult {
    /// Normalize, drop empties, cap, and join. Nothing left means `Unavailable`.
    pub fn from_items<I, S>(kind: SourceKind, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kept: Vec<String> = items
            .into_iter()
            .map(|s| normalize_text(s.as_ref()))
            .filter(|s| !s.is_empty())
            .take(MAX_ITEMS)
            .collect();

        if kept.is_empty() {
            return Self::unavailable(kind, "no items");
        }
        SourceResult::Available {
            kind,
            text: kept.join("\n"),
        }
    }

    pub fn unavailable(kind: SourceKind, reason: impl Into<String>) -> Self {
        SourceResult::Unavailable {
            kind,
            reason: reason.into(),
        }
    }

    /// Placeholder for an adapter the selection skipped.
    pub fn not_requested(kind: SourceKind) -> Self {
        Self::unavailable(kind, NOT_REQUESTED)
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceResult::Available { kind, .. } | SourceResult::Unavailable { kind, .. } => *kind,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SourceResult::Available { text, .. } => Some(text),
            SourceResult::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SourceResult::Available { .. })
    }
}

/// Raw access to one external feed. Errors are expected and carry context.
#[async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_items(&self, topic: &Topic) -> anyhow::Result<Vec<String>>;
    fn kind(&self) -> SourceKind;
    fn name(&self) -> &'static str;
}

/// What the orchestrator calls. Never fails and never panics on I/O.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, topic: &Topic) -> SourceResult;
    fn kind(&self) -> SourceKind;
}

pub type DynSource = Arc<dyn SourceAdapter>;

/// Fault-isolating wrapper shared by every provider.
pub struct IsolatedSource<P: FeedProvider> {
    inner: P,
    timeout: Duration,
}

impl<P: FeedProvider> IsolatedSource<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self {
            inner,
            timeout: timeout.min(MAX_FETCH_TIMEOUT),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<P: FeedProvider> SourceAdapter for IsolatedSource<P> {
    async fn fetch(&self, topic: &Topic) -> SourceResult {
        let kind = self.inner.kind();
        let provider = self.inner.name();

        let result = match tokio::time::timeout(self.timeout, self.inner.fetch_items(topic)).await
        {
            Ok(Ok(items)) => SourceResult::from_items(kind, items),
            Ok(Err(e)) => {
                warn!(target: "sources", provider, error = %format!("{e:#}"), "provider error");
                SourceResult::unavailable(kind, format!("{e:#}"))
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(target: "sources", provider, timeout_ms, "provider timed out");
                SourceResult::unavailable(kind, "timeout")
            }
        };

        let outcome = if result.is_available() {
            "available"
        } else {
            "unavailable"
        };
        debug!(target: "sources", provider, topic_id = %anon_id(topic.as_str()), outcome, "source fetched");
        counter!(SOURCE_FETCH_TOTAL, "source" => provider, "outcome" => outcome).increment(1);

        result
    }

    fn kind(&self) -> SourceKind {
        self.inner.kind()
    }
}

/// Normalize one feed item: strip markup tags, decode entities, collapse
/// whitespace, trim. Tags go first so escaped `&lt;`/`&gt;` stay literal.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags =
        RE_TAGS.get_or_init(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("static regex"));
    let stripped = re_tags.replace_all(s, "");

    let decoded = html_escape::decode_html_entities(&stripped);

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    let mut out = re_ws.replace_all(&decoded, " ").trim().to_string();

    let chars = out.chars().count();
    if chars > MAX_ITEM_CHARS {
        debug!(target: "sources", chars, max = MAX_ITEM_CHARS, "item truncated");
        out = out.chars().take(MAX_ITEM_CHARS).collect();
    }

    out
}

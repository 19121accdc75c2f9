// src/model.rs
//! Request-scoped value types shared by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SummaryError;

/// Subject a summary is requested for. Never empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Trim and validate raw caller input.
    pub fn parse(raw: &str) -> Result<Self, SummaryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SummaryError::InvalidInput(
                "Topic cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Headlines,
    Discussion,
}

impl SourceKind {
    /// Placeholder substituted into the prompt when this source has nothing.
    pub fn sentinel(self) -> &'static str {
        match self {
            SourceKind::Headlines => "No official news available.",
            SourceKind::Discussion => "No Reddit discussions available.",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Headlines => "headlines",
            SourceKind::Discussion => "discussion",
        }
    }
}

/// Which adapters run for a request. Wire names follow the public form: `news`, `reddit`, `both`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceSelection {
    #[serde(rename = "news")]
    HeadlinesOnly,
    #[serde(rename = "reddit")]
    DiscussionOnly,
    #[default]
    #[serde(rename = "both")]
    Both,
}

impl SourceSelection {
    pub fn includes(self, kind: SourceKind) -> bool {
        matches!(
            (self, kind),
            (SourceSelection::Both, _)
                | (SourceSelection::HeadlinesOnly, SourceKind::Headlines)
                | (SourceSelection::DiscussionOnly, SourceKind::Discussion)
        )
    }
}

/// Successful pipeline product; the only value returned to callers on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub topic: String,
    pub summary: String,
}

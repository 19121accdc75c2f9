// src/prompt.rs
//! Prompt assembly. Pure: the output depends only on the arguments.

use std::fmt;

use crate::model::{SourceKind, Topic};
use crate::sources::SourceResult;

/// Rendered user prompt for the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Wrap externally built text. Emptiness is checked by the completion client.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct PromptBuilder;

impl PromptBuilder {
    /// Sections appear as: role, topic, headlines, discussion, constraints.
    /// A slot without text gets the sentinel of the kind it stands for.
    pub fn build(topic: &Topic, headlines: &SourceResult, discussion: &SourceResult) -> Prompt {
        let news_text = slot_text(headlines, SourceKind::Headlines);
        let reddit_text = slot_text(discussion, SourceKind::Discussion);

        Prompt(format!(
            "You are a professional broadcast journalist.\n\
             \n\
             Topic:\n\
             {topic}\n\
             \n\
             Official News:\n\
             {news_text}\n\
             \n\
             Reddit Discussions:\n\
             {reddit_text}\n\
             \n\
             Write a clear, factual, and concise news-style summary.\n\
             Do not use markdown, bullet points, or emojis.\n\
             Keep the length suitable for 60 to 90 seconds of spoken delivery, about 120 to 220 words.\n\
             Start directly with the content.\n"
        ))
    }
}

fn slot_text(result: &SourceResult, slot: SourceKind) -> &str {
    result
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| slot.sentinel())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> Topic {
        Topic::parse("AI in India").unwrap()
    }

    #[test]
    fn sections_are_in_contract_order() {
        let h = SourceResult::from_items(SourceKind::Headlines, ["H1", "H2"]);
        let d = SourceResult::from_items(SourceKind::Discussion, ["D1"]);
        let p = PromptBuilder::build(&topic(), &h, &d);
        let s = p.as_str();

        let role = s.find("broadcast journalist").unwrap();
        let t = s.find("AI in India").unwrap();
        let news = s.find("H1\nH2").unwrap();
        let reddit = s.find("D1").unwrap();
        let rules = s.find("Do not use markdown").unwrap();
        assert!(role < t && t < news && news < reddit && reddit < rules);
        assert!(!s.contains(SourceKind::Headlines.sentinel()));
        assert!(!s.contains(SourceKind::Discussion.sentinel()));
    }

    #[test]
    fn unavailable_slots_get_their_own_sentinel() {
        let h = SourceResult::unavailable(SourceKind::Headlines, "timeout");
        let d = SourceResult::not_requested(SourceKind::Discussion);
        let p = PromptBuilder::build(&topic(), &h, &d);
        assert_eq!(p.as_str().matches("No official news available.").count(), 1);
        assert_eq!(
            p.as_str().matches("No Reddit discussions available.").count(),
            1
        );
        assert!(!p.as_str().contains("timeout"));
    }

    #[test]
    fn identical_inputs_give_identical_prompts() {
        let h = SourceResult::from_items(SourceKind::Headlines, ["a", "b"]);
        let d = SourceResult::unavailable(SourceKind::Discussion, "HTTP 429");
        let a = PromptBuilder::build(&topic(), &h, &d);
        let b = PromptBuilder::build(&topic(), &h.clone(), &d.clone());
        assert_eq!(a.as_str().as_bytes(), b.as_str().as_bytes());
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SourceSettings;
use crate::model::{SourceKind, Topic};
use crate::sources::FeedProvider;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}
#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}
#[derive(Debug, Deserialize)]
struct Child {
    #[serde(default)]
    data: Post,
}
#[derive(Debug, Default, Deserialize)]
struct Post {
    title: Option<String>,
}

/// Discussion feed backed by the public Reddit search endpoint.
pub struct RedditProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        search_url: String,
        limit: u32,
    },
}

impl RedditProvider {
    /// Parse a fixed search listing regardless of topic.
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_settings(cfg: &SourceSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.reddit_user_agent.as_str())
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(cfg.fetch_timeout_secs))
            .build()
            .context("building reddit http client")?;
        Ok(Self {
            mode: Mode::Http {
                client,
                search_url: cfg.reddit_search_url.clone(),
                limit: cfg.reddit_limit,
            },
        })
    }

    fn parse_titles(s: &str) -> Result<Vec<String>> {
        // Reddit answers rate-limited clients with an HTML page and a 200.
        let listing: Listing = serde_json::from_str(s).context("parsing reddit search json")?;
        Ok(listing
            .data
            .children
            .into_iter()
            .filter_map(|c| c.data.title)
            .collect())
    }
}

#[async_trait]
impl FeedProvider for RedditProvider {
    async fn fetch_items(&self, topic: &Topic) -> Result<Vec<String>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_titles(s),
            Mode::Http {
                client,
                search_url,
                limit,
            } => {
                let limit = limit.to_string();
                let resp = client
                    .get(search_url.as_str())
                    .query(&[
                        ("q", topic.as_str()),
                        ("sort", "new"),
                        ("limit", limit.as_str()),
                    ])
                    .send()
                    .await
                    .context("reddit http get()")?
                    .error_for_status()
                    .context("reddit http status")?;
                let body = resp.text().await.context("reddit http .text()")?;
                if body.trim().is_empty() {
                    anyhow::bail!("reddit returned an empty body");
                }
                Self::parse_titles(&body)
            }
        }
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Discussion
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_extracted_and_missing_ones_skipped() {
        let json = r#"{"kind":"Listing","data":{"children":[
            {"kind":"t3","data":{"title":"Is AI hiring real?","score":10}},
            {"kind":"t3","data":{}},
            {"kind":"t3","data":{"title":"Bangalore startups"}}
        ]}}"#;
        let titles = RedditProvider::parse_titles(json).unwrap();
        assert_eq!(titles, vec!["Is AI hiring real?", "Bangalore startups"]);
    }

    #[test]
    fn empty_listing_yields_no_titles() {
        let titles = RedditProvider::parse_titles(r#"{"data":{"children":[]}}"#).unwrap();
        assert!(titles.is_empty());
    }

    #[test]
    fn html_block_page_is_a_parse_error() {
        let err = RedditProvider::parse_titles("<!doctype html><p>whoa there, pardner</p>")
            .unwrap_err();
        assert!(format!("{err:#}").contains("parsing reddit search json"));
    }
}

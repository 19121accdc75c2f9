use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SourceSettings;
use crate::model::{SourceKind, Topic};
use crate::sources::FeedProvider;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
}

/// Headline feed backed by the Google News RSS search endpoint.
pub struct GoogleNewsProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        feed_url: String,
        language: String,
        country: String,
        ceid: String,
    },
}

impl GoogleNewsProvider {
    /// Parse a fixed RSS document regardless of topic.
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_settings(cfg: &SourceSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("news-ninja/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(cfg.fetch_timeout_secs))
            .build()
            .context("building google news http client")?;
        Ok(Self {
            mode: Mode::Http {
                client,
                feed_url: cfg.news_feed_url.clone(),
                language: cfg.news_language.clone(),
                country: cfg.news_country.clone(),
                ceid: cfg.news_ceid.clone(),
            },
        })
    }

    fn parse_titles(s: &str) -> Result<Vec<String>> {
        let rss: Rss = from_str(s).context("parsing google news rss xml")?;
        Ok(rss
            .channel
            .item
            .into_iter()
            .filter_map(|it| it.title)
            .collect())
    }
}

#[async_trait]
impl FeedProvider for GoogleNewsProvider {
    async fn fetch_items(&self, topic: &Topic) -> Result<Vec<String>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_titles(s),
            Mode::Http {
                client,
                feed_url,
                language,
                country,
                ceid,
            } => {
                let resp = client
                    .get(feed_url.as_str())
                    .query(&[
                        ("q", topic.as_str()),
                        ("hl", language.as_str()),
                        ("gl", country.as_str()),
                        ("ceid", ceid.as_str()),
                    ])
                    .send()
                    .await
                    .context("google news http get()")?
                    .error_for_status()
                    .context("google news http status")?;
                let body = resp.text().await.context("google news http .text()")?;
                if body.trim().is_empty() {
                    anyhow::bail!("google news returned an empty body");
                }
                Self::parse_titles(&body)
            }
        }
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Headlines
    }

    fn name(&self) -> &'static str {
        "google_news"
    }
}

// src/config/settings.rs
//! Process settings, built once at startup and passed by reference.
//!
//! Resolution order: built-in defaults, then a TOML file, then environment
//! variables. Every value is sanitized afterwards so downstream code can rely
//! on the documented bounds.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;
use std::{env, fmt, fs, path::Path, path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_CONFIG_PATH: &str = "config/newsninja.toml";
pub const ENV_CONFIG_PATH: &str = "NEWSNINJA_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub groq: GroqSettings,
    pub sources: SourceSettings,
    pub retry: RetrySettings,
    pub server: ServerSettings,
    /// "mock" swaps the completion backend for a scripted one.
    pub test_mode: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroqSettings {
    /// Empty means missing. "ENV" means: read GROQ_API_KEY.
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-attempt timeout, 1..=60 seconds.
    pub timeout_secs: u64,
    pub system_instruction: Option<String>,
}

impl Default for GroqSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.3,
            max_tokens: 600,
            timeout_secs: 30,
            system_instruction: None,
        }
    }
}

// Never print the key itself.
impl fmt::Debug for GroqSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqSettings")
            .field("api_key_set", &!self.api_key.is_empty())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("system_instruction", &self.system_instruction)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceSettings {
    pub news_feed_url: String,
    pub news_language: String,
    pub news_country: String,
    pub news_ceid: String,
    pub reddit_search_url: String,
    pub reddit_user_agent: String,
    /// Posts requested from the search endpoint, 1..=10.
    pub reddit_limit: u32,
    /// Per-source timeout, 1..=30 seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            news_feed_url: "https://news.google.com/rss/search".to_string(),
            news_language: "en-IN".to_string(),
            news_country: "IN".to_string(),
            news_ceid: "IN:en".to_string(),
            reddit_search_url: "https://www.reddit.com/search.json".to_string(),
            reddit_user_agent: "NewsNinjaBot/1.0".to_string(),
            reddit_limit: 5,
            fetch_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    pub attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: 2,
            delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    /// Whole-request bound applied at the HTTP layer.
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
        }
    }
}

impl Settings {
    /// Load settings using env var + fallbacks:
    /// 1) $NEWSNINJA_CONFIG_PATH (must exist when set)
    /// 2) config/newsninja.toml if present
    /// 3) built-in defaults
    ///
    /// Environment overrides are applied on top in every case.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        pb.display()
                    ));
                }
                Self::parse_file(&pb)?
            }
            Err(_) => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::parse_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env()?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load from an explicit TOML file without environment overrides
    /// (the api key "ENV" placeholder is still resolved).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut cfg = Self::parse_file(path.as_ref())?;
        cfg.sanitize();
        Ok(cfg)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut cfg: Settings = toml::from_str(&data)
            .with_context(|| format!("parsing settings TOML {}", path.display()))?;

        // An unset variable leaves the key empty; requests then fail with
        // a missing-key error instead of the process refusing to start.
        if cfg.groq.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.groq.api_key = env::var("GROQ_API_KEY").unwrap_or_else(|_| {
                warn!(target: "config", "api_key = \"ENV\" but GROQ_API_KEY is not set");
                String::new()
            });
        }
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_string("GROQ_API_KEY") {
            self.groq.api_key = v;
        }
        if let Some(v) = env_string("GROQ_BASE_URL") {
            self.groq.base_url = v;
        }
        if let Some(v) = env_string("GROQ_MODEL") {
            self.groq.model = v;
        }
        if let Some(v) = env_parse("COMPLETION_TIMEOUT_SECS")? {
            self.groq.timeout_secs = v;
        }
        if let Some(v) = env_string("NEWS_FEED_URL") {
            self.sources.news_feed_url = v;
        }
        if let Some(v) = env_string("REDDIT_SEARCH_URL") {
            self.sources.reddit_search_url = v;
        }
        if let Some(v) = env_string("REDDIT_USER_AGENT") {
            self.sources.reddit_user_agent = v;
        }
        if let Some(v) = env_parse("SOURCE_FETCH_TIMEOUT_SECS")? {
            self.sources.fetch_timeout_secs = v;
        }
        if let Some(v) = env_parse("SUMMARY_RETRIES")? {
            self.retry.attempts = v;
        }
        if let Some(v) = env_parse("SUMMARY_RETRY_DELAY_MS")? {
            self.retry.delay_ms = v;
        }
        if let Some(v) = env_parse("REQUEST_TIMEOUT_SECS")? {
            self.server.request_timeout_secs = v;
        }
        if let Some(v) = env_string("AI_TEST_MODE") {
            self.test_mode = Some(v);
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        self.groq.api_key = self.groq.api_key.trim().to_string();
        self.groq.base_url = self.groq.base_url.trim_end_matches('/').to_string();
        self.groq.timeout_secs = self.groq.timeout_secs.clamp(1, 60);
        if !(0.0..=2.0).contains(&self.groq.temperature) {
            self.groq.temperature = GroqSettings::default().temperature;
        }
        if self.groq.max_tokens == 0 {
            self.groq.max_tokens = GroqSettings::default().max_tokens;
        }
        if self
            .groq
            .system_instruction
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            self.groq.system_instruction = None;
        }

        self.sources.reddit_limit = self.sources.reddit_limit.clamp(1, 10);
        self.sources.fetch_timeout_secs = self.sources.fetch_timeout_secs.clamp(1, 30);

        self.retry.attempts = self.retry.attempts.clamp(1, 10);
        self.retry.delay_ms = self.retry.delay_ms.min(10_000);

        self.server.request_timeout_secs = self.server.request_timeout_secs.max(1);

        if self
            .test_mode
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            self.test_mode = None;
        }
    }

    pub fn mock_mode(&self) -> bool {
        self.test_mode
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("mock"))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.fetch_timeout_secs)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.groq.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry.delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env_string(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("invalid {name}={raw:?}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(s: &str) -> Settings {
        let mut cfg: Settings = toml::from_str(s).unwrap();
        cfg.sanitize();
        cfg
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Settings::default();
        assert_eq!(cfg.retry.attempts, 2);
        assert_eq!(cfg.retry_delay(), Duration::from_millis(500));
        assert_eq!(cfg.groq.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.groq.max_tokens, 600);
        assert_eq!(cfg.sources.reddit_limit, 5);
        assert!(!cfg.mock_mode());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = from_toml(
            r#"
            [retry]
            attempts = 4

            [groq]
            model = "llama-3.3-70b-versatile"
            "#,
        );
        assert_eq!(cfg.retry.attempts, 4);
        assert_eq!(cfg.retry.delay_ms, 500);
        assert_eq!(cfg.groq.model, "llama-3.3-70b-versatile");
        assert_eq!(cfg.groq.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = from_toml(
            r#"
            [groq]
            timeout_secs = 600
            temperature = 9.0
            base_url = "http://localhost:9000/v1/"

            [sources]
            fetch_timeout_secs = 120
            reddit_limit = 50

            [retry]
            attempts = 0
            "#,
        );
        assert_eq!(cfg.groq.timeout_secs, 60);
        assert_eq!(cfg.groq.temperature, 0.3);
        assert_eq!(cfg.groq.base_url, "http://localhost:9000/v1");
        assert_eq!(cfg.sources.fetch_timeout_secs, 30);
        assert_eq!(cfg.sources.reddit_limit, 10);
        assert_eq!(cfg.retry.attempts, 1);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let mut cfg = Settings::default();
        cfg.groq.api_key = "gsk_secret_value".to_string();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("gsk_secret_value"));
        assert!(dbg.contains("api_key_set: true"));
        assert!(!dbg.contains("api_key_len"));
    }
}

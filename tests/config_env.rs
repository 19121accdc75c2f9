// tests/config_env.rs
//
// Settings resolution: file location, "ENV" key placeholder, environment
// overrides. Env-mutating tests run serially.

use std::env;
use std::fs;
use std::time::Duration;

use news_ninja::config::{Settings, ENV_CONFIG_PATH};
use serial_test::serial;

const VARS: &[&str] = &[
    ENV_CONFIG_PATH,
    "GROQ_API_KEY",
    "GROQ_BASE_URL",
    "GROQ_MODEL",
    "COMPLETION_TIMEOUT_SECS",
    "NEWS_FEED_URL",
    "REDDIT_SEARCH_URL",
    "REDDIT_USER_AGENT",
    "SOURCE_FETCH_TIMEOUT_SECS",
    "SUMMARY_RETRIES",
    "SUMMARY_RETRY_DELAY_MS",
    "REQUEST_TIMEOUT_SECS",
    "AI_TEST_MODE",
];

fn clear_env() {
    for v in VARS {
        env::remove_var(v);
    }
}

#[test]
#[serial]
fn env_overrides_file_values() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("newsninja.toml");
    fs::write(
        &p,
        r#"
        [groq]
        api_key = "from-file"
        model = "file-model"

        [retry]
        attempts = 3
        delay_ms = 100
        "#,
    )
    .unwrap();

    env::set_var(ENV_CONFIG_PATH, p.display().to_string());
    env::set_var("GROQ_MODEL", "env-model");
    env::set_var("SUMMARY_RETRY_DELAY_MS", "750");
    env::set_var("AI_TEST_MODE", "mock");

    let cfg = Settings::load().unwrap();
    assert_eq!(cfg.groq.api_key, "from-file");
    assert_eq!(cfg.groq.model, "env-model");
    assert_eq!(cfg.retry.attempts, 3);
    assert_eq!(cfg.retry_delay(), Duration::from_millis(750));
    assert!(cfg.mock_mode());

    clear_env();
}

#[test]
#[serial]
fn env_placeholder_in_file_reads_groq_key() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("newsninja.toml");
    fs::write(&p, "[groq]\napi_key = \"ENV\"\n").unwrap();

    let cfg = Settings::load_from_file(&p).unwrap();
    assert_eq!(cfg.groq.api_key, "", "unset GROQ_API_KEY leaves the key empty");

    env::set_var("GROQ_API_KEY", "gsk_from_env");
    let cfg = Settings::load_from_file(&p).unwrap();
    assert_eq!(cfg.groq.api_key, "gsk_from_env");

    clear_env();
}

#[test]
#[serial]
fn example_config_boots_in_mock_mode_without_a_key() {
    clear_env();
    env::set_var(ENV_CONFIG_PATH, "config/newsninja.example.toml");
    env::set_var("AI_TEST_MODE", "mock");

    let cfg = Settings::load().unwrap();
    assert!(cfg.groq.api_key.is_empty());
    assert!(cfg.mock_mode());
    news_ninja::build_orchestrator(&cfg).unwrap();

    clear_env();
}

#[test]
#[serial]
fn config_path_pointing_nowhere_is_an_error() {
    clear_env();
    env::set_var(ENV_CONFIG_PATH, "/definitely/not/here/newsninja.toml");
    let err = Settings::load().unwrap_err();
    assert!(err.to_string().contains("non-existent"), "{err}");
    clear_env();
}

#[test]
#[serial]
fn unparsable_numbers_are_reported() {
    clear_env();
    env::set_var("SUMMARY_RETRIES", "two");
    let err = Settings::load().unwrap_err();
    assert!(err.to_string().contains("SUMMARY_RETRIES"), "{err}");
    clear_env();
}

#[test]
#[serial]
fn env_values_are_clamped() {
    clear_env();
    env::set_var("SOURCE_FETCH_TIMEOUT_SECS", "600");
    env::set_var("COMPLETION_TIMEOUT_SECS", "0");
    env::set_var("SUMMARY_RETRIES", "0");
    let cfg = Settings::load().unwrap();
    assert_eq!(cfg.fetch_timeout(), Duration::from_secs(30));
    assert_eq!(cfg.completion_timeout(), Duration::from_secs(1));
    assert_eq!(cfg.retry.attempts, 1);
    clear_env();
}

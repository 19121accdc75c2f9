// src/config/mod.rs
pub mod settings;

pub use settings::{
    GroqSettings, RetrySettings, ServerSettings, Settings, SourceSettings,
    DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH,
};

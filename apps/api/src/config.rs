use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::llm_client::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables once at startup.
/// Startup fails if a required variable is missing or a value is out of range.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm: LlmConfig,
    pub app_name: String,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("Required environment variable 'OPENAI_API_KEY' is not set")?;

        let model = lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            bail!("OPENAI_MODEL must not be blank");
        }

        let llm = LlmConfig {
            model,
            temperature: parse_in_range(&lookup, "OPENAI_TEMPERATURE", 0.1, 0.0, 2.0)?,
            max_tokens: parse_in_range(&lookup, "OPENAI_MAX_TOKENS", 4000, 1, 8000)?,
            max_retries: parse_in_range(&lookup, "MAX_RETRIES", 3, 1, 10)?,
            timeout_seconds: parse_in_range(&lookup, "TIMEOUT_SECONDS", 60, 10, 300)?,
        };

        Ok(Config {
            openai_api_key,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            llm,
            app_name: lookup("APP_NAME").unwrap_or_else(|| "CV Matching API".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_in_range<F, T>(lookup: &F, key: &str, default: T, min: T, max: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + std::fmt::Display + Copy,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'"))?,
        None => default,
    };

    if value < min || value > max {
        bail!("{key} must be between {min} and {max}, got {value}");
    }
    Ok(value)
}

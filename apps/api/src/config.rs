use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::extraction::{DEFAULT_LINE_TOLERANCE, MIN_CONTENT_CHARS};

const DEFAULT_CLEANUP_BASE_URL: &str = "http://127.0.0.1:11434/v1";
const DEFAULT_CLEANUP_MODEL: &str = "llama3.2";
const DEFAULT_ANALYSIS_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_ANALYSIS_MODEL: &str = "llama-3.3-70b-versatile";

/// Connection settings for one OpenAI-compatible completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmEndpoint {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Application configuration loaded from environment variables.
/// Every key has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    pub line_tolerance: f64,
    pub min_content_chars: usize,
    pub cleanup_enabled: bool,
    pub cleanup_llm: LlmEndpoint,
    /// `None` when `GROQ_API_KEY` is unset: ATS analysis is then unavailable.
    pub analysis_llm: Option<LlmEndpoint>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_timeout = Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 45u64)?);

        let cleanup_llm = LlmEndpoint {
            base_url: lookup("CLEANUP_LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CLEANUP_BASE_URL.to_string()),
            model: lookup("CLEANUP_LLM_MODEL").unwrap_or_else(|| DEFAULT_CLEANUP_MODEL.to_string()),
            api_key: lookup("CLEANUP_LLM_API_KEY").filter(|k| !k.trim().is_empty()),
            timeout: llm_timeout,
        };

        let analysis_llm = lookup("GROQ_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| LlmEndpoint {
                base_url: lookup("ANALYSIS_LLM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ANALYSIS_BASE_URL.to_string()),
                model: lookup("ANALYSIS_LLM_MODEL")
                    .unwrap_or_else(|| DEFAULT_ANALYSIS_MODEL.to_string()),
                api_key: Some(api_key),
                timeout: llm_timeout,
            });

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080u16)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 60u64)?),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
            line_tolerance: parse_or(&lookup, "LINE_TOLERANCE", DEFAULT_LINE_TOLERANCE)?,
            min_content_chars: parse_or(&lookup, "MIN_CONTENT_CHARS", MIN_CONTENT_CHARS)?,
            cleanup_enabled: parse_or(&lookup, "CLEANUP_ENABLED", true)?,
            cleanup_llm,
            analysis_llm,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on concurrent scoring calls issued by one ranking request.
    pub match_max_in_flight: usize,
    /// Upper bound on concurrent scoring calls across all ranking requests.
    pub match_max_total_in_flight: usize,
    /// Deadline for a whole ranking request, in seconds.
    pub match_timeout_secs: u64,
    /// Per-call HTTP timeout for the inference provider, in seconds.
    pub llm_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let match_max_in_flight = optional_env("MATCH_MAX_IN_FLIGHT", 8usize)?;
        if match_max_in_flight == 0 {
            bail!("MATCH_MAX_IN_FLIGHT must be at least 1");
        }
        let match_max_total_in_flight = optional_env("MATCH_MAX_TOTAL_IN_FLIGHT", 16usize)?;
        if match_max_total_in_flight == 0 {
            bail!("MATCH_MAX_TOTAL_IN_FLIGHT must be at least 1");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_max_in_flight,
            match_max_total_in_flight,
            match_timeout_secs: optional_env("MATCH_TIMEOUT_SECS", 90u64)?,
            llm_timeout_secs: optional_env("LLM_TIMEOUT_SECS", 60u64)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

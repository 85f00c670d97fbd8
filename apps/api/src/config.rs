use anyhow::{Context, Result};

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_api_url: String,
    pub llm_timeout_secs: u64,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Sender identity for every outgoing message.
    pub mail_from: String,
    /// Upper bound on concurrent per-skill resource lookups while building a roadmap.
    pub resource_fetch_concurrency: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 60)?,
            smtp_host: require_env("SMTP_HOST")?,
            smtp_port: parse_env("SMTP_PORT", 587)?,
            smtp_username: require_env("SMTP_USERNAME")?,
            smtp_password: require_env("SMTP_PASSWORD")?,
            mail_from: require_env("MAIL_FROM")?,
            resource_fetch_concurrency: parse_env::<usize>("RESOURCE_FETCH_CONCURRENCY", 4)?
                .max(1),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            openai_api_key: "test-key".to_string(),
            openai_api_url: DEFAULT_OPENAI_API_URL.to_string(),
            llm_timeout_secs: 5,
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: "user".to_string(),
            smtp_password: "password".to_string(),
            mail_from: "roadmaps@example.com".to_string(),
            resource_fetch_concurrency: 2,
            port: 8080,
            rust_log: "debug".to_string(),
        }
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Application configuration loaded from environment variables.
///
/// The provider API key is optional here: a missing key is reported per call by
/// the model gateway, so the server still starts and serves the status routes.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub http_referer: String,
    pub app_title: String,
    pub request_timeout_secs: u64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            openrouter_base_url: env_or("OPENROUTER_BASE_URL", DEFAULT_BASE_URL),
            http_referer: env_or("OPENROUTER_HTTP_REFERER", "http://localhost:3000"),
            app_title: env_or("OPENROUTER_APP_TITLE", "JobMatch AI"),
            request_timeout_secs: parse_env("MODEL_REQUEST_TIMEOUT_SECS", 120)?,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            port: parse_env("PORT", 3001)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

/// Reads a variable, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for router tests: no API key, uploads under `upload_dir`.
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        Config {
            openrouter_api_key: None,
            openrouter_base_url: DEFAULT_BASE_URL.to_string(),
            http_referer: "http://localhost:3000".to_string(),
            app_title: "JobMatch AI".to_string(),
            request_timeout_secs: 5,
            upload_dir,
            max_upload_bytes: 1024 * 1024,
            cors_origin: "http://localhost:5173".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("JOBMATCH_TEST_UNSET_PORT", 3001).unwrap();
        assert_eq!(port, 3001);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("JOBMATCH_TEST_BAD_TIMEOUT", "soon");
        let result: Result<u64> = parse_env("JOBMATCH_TEST_BAD_TIMEOUT", 120);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("JOBMATCH_TEST_BAD_TIMEOUT"));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        std::env::set_var("JOBMATCH_TEST_BLANK_KEY", "   ");
        assert!(optional_env("JOBMATCH_TEST_BLANK_KEY").is_none());
        assert_eq!(env_or("JOBMATCH_TEST_BLANK_KEY", "fallback"), "fallback");
    }
}

use anyhow::{Context, Result};

use crate::calculation::engine::DEFAULT_SOCIAL_SECURITY_WAGE_BASE;

pub const DEFAULT_HISTORY_NAMESPACE: &str = "paydocs:history";
pub const DEFAULT_GENERATOR_SIGNATURE: &str = "PayDocs Generator";

/// Application configuration loaded from environment variables.
/// Every key has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// History goes to Redis when set, to process memory otherwise.
    pub redis_url: Option<String>,
    pub history_namespace: String,
    pub generator_signature: String,
    pub generation_delay_ms: u64,
    pub social_security_wage_base: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            redis_url: None,
            history_namespace: DEFAULT_HISTORY_NAMESPACE.to_string(),
            generator_signature: DEFAULT_GENERATOR_SIGNATURE.to_string(),
            generation_delay_ms: 0,
            social_security_wage_base: DEFAULT_SOCIAL_SECURITY_WAGE_BASE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            redis_url: optional_env("REDIS_URL"),
            history_namespace: optional_env("HISTORY_NAMESPACE")
                .unwrap_or(defaults.history_namespace),
            generator_signature: optional_env("GENERATOR_SIGNATURE")
                .unwrap_or(defaults.generator_signature),
            generation_delay_ms: parse_env("GENERATION_DELAY_MS", defaults.generation_delay_ms)
                .context("GENERATION_DELAY_MS must be a whole number of milliseconds")?,
            social_security_wage_base: parse_env(
                "SOCIAL_SECURITY_WAGE_BASE",
                defaults.social_security_wage_base,
            )
            .context("SOCIAL_SECURITY_WAGE_BASE must be a number")?,
        })
    }
}

/// Unset and blank both count as missing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for {key}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.history_namespace, "paydocs:history");
        assert_eq!(config.generation_delay_ms, 0);
        assert_eq!(config.social_security_wage_base, 160_200.0);
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_parse_env_falls_back_and_rejects_garbage() {
        std::env::remove_var("PAYDOC_TEST_UNSET_KEY");
        assert_eq!(parse_env("PAYDOC_TEST_UNSET_KEY", 7u64).unwrap(), 7);

        std::env::set_var("PAYDOC_TEST_BAD_PORT", "eighty");
        assert!(parse_env::<u16>("PAYDOC_TEST_BAD_PORT", 8080).is_err());
        std::env::set_var("PAYDOC_TEST_BAD_PORT", " 9000 ");
        assert_eq!(parse_env::<u16>("PAYDOC_TEST_BAD_PORT", 8080).unwrap(), 9000);
    }
}

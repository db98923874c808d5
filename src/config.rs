use thiserror::Error;

use crate::api::coingecko::CoinGeckoClient;

const DEFAULT_TOP_ASSETS_LIMIT: u32 = 20;
const DEFAULT_HISTORY_DAYS: u32 = 30;

#[derive(Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Startup settings read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub firebase_api_key: String,
    pub session_encryption_key: String,
    pub coingecko_api_key: Option<String>,
    pub coingecko_base_url: String,
    pub top_assets_limit: u32,
    pub history_days: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let number = |name: &'static str, default: u32| -> Result<u32, ConfigError> {
            match get(name) {
                None => Ok(default),
                Some(raw) => match raw.parse::<u32>() {
                    Ok(0) => Err(ConfigError::Invalid { name, reason: "must be greater than zero".to_string() }),
                    Ok(value) => Ok(value),
                    Err(e) => Err(ConfigError::Invalid { name, reason: e.to_string() }),
                },
            }
        };

        let session_encryption_key = required("SESSION_ENCRYPTION_KEY")?;
        if session_encryption_key.len() != 64 || !session_encryption_key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Invalid {
                name: "SESSION_ENCRYPTION_KEY",
                reason: "expected 64 hex characters (32 bytes)".to_string(),
            });
        }

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            database_url: required("DATABASE_URL")?,
            firebase_api_key: required("FIREBASE_API_KEY")?,
            session_encryption_key,
            coingecko_api_key: get("COINGECKO_API_KEY"),
            coingecko_base_url: get("COINGECKO_BASE_URL")
                .unwrap_or_else(|| CoinGeckoClient::DEFAULT_BASE_URL.to_string()),
            top_assets_limit: number("TOP_ASSETS_LIMIT", DEFAULT_TOP_ASSETS_LIMIT)?,
            history_days: number("HISTORY_DAYS", DEFAULT_HISTORY_DAYS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn base() -> HashMap<String, String> {
        env(&[
            ("DISCORD_TOKEN", "discord"),
            ("DATABASE_URL", "mysql://localhost/cryptocast"),
            ("FIREBASE_API_KEY", "firebase"),
            ("SESSION_ENCRYPTION_KEY", KEY),
        ])
    }

    #[test]
    fn test_defaults() {
        let vars = base();
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.top_assets_limit, 20);
        assert_eq!(config.history_days, 30);
        assert_eq!(config.coingecko_api_key, None);
        assert_eq!(config.coingecko_base_url, CoinGeckoClient::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_required() {
        let mut vars = base();
        vars.insert("FIREBASE_API_KEY".to_string(), "  ".to_string());
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing("FIREBASE_API_KEY"));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = base();
        vars.insert("TOP_ASSETS_LIMIT".to_string(), "0".to_string());
        assert!(matches!(
            Config::from_lookup(|k| vars.get(k).cloned()),
            Err(ConfigError::Invalid { name: "TOP_ASSETS_LIMIT", .. })
        ));

        let mut vars = base();
        vars.insert("SESSION_ENCRYPTION_KEY".to_string(), "abcd".to_string());
        assert!(matches!(
            Config::from_lookup(|k| vars.get(k).cloned()),
            Err(ConfigError::Invalid { name: "SESSION_ENCRYPTION_KEY", .. })
        ));
    }
}

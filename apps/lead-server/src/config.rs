//! Server configuration.

use std::env;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TAGS: &str = "Hot,Warm,Cold,High Value,Follow-up";

/// Storage backend selected by `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store; data is lost on exit.
    Memory,
    /// SQLite database at the given URL.
    Sqlite(String),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL, or `memory` for the in-memory store.
    pub database_url: String,
    /// Log level.
    pub log_level: String,
    /// Tag vocabulary seeded at startup.
    pub tags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let tags = lookup("LEADS_TAGS").unwrap_or_else(|| DEFAULT_TAGS.to_string());

        Self {
            host: lookup("LEADS_SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("LEADS_SERVER_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "memory".to_string()),
            log_level: lookup("LEADS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            tags: parse_list(&tags),
        }
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the storage backend named by the database URL.
    pub fn store_backend(&self) -> StoreBackend {
        match self.database_url.trim() {
            "" | "memory" => StoreBackend::Memory,
            url => StoreBackend::Sqlite(url.to_string()),
        }
    }
}

/// Splits a comma-separated list, dropping blanks.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.store_backend(), StoreBackend::Memory);
        assert_eq!(config.log_level, "info");
        assert!(config.tags.contains(&"Hot".to_string()));
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("LEADS_SERVER_PORT", "8080"),
            ("DATABASE_URL", "sqlite:leads.db?mode=rwc"),
            ("LEADS_TAGS", " vip , ,churn-risk"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.store_backend(),
            StoreBackend::Sqlite("sqlite:leads.db?mode=rwc".to_string())
        );
        assert_eq!(config.tags, vec!["vip", "churn-risk"]);
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = config_with(&[("LEADS_SERVER_PORT", "not-a-port")]);
        assert_eq!(config.port, 3000);
    }
}

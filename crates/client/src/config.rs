use std::time::Duration;

/// Default catalog service URL for local development.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default delay between a category selection and its schema fetch.
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a service running locally.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the catalog service.
    pub api_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Debounce applied before fetching a newly selected category's schema.
    /// Zero disables the debounce.
    pub schema_debounce: Duration,
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            schema_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `CATALOG_API_URL`      | `http://127.0.0.1:8000`  |
    /// | `CATALOG_TIMEOUT_SECS` | `30`                     |
    /// | `CATALOG_DEBOUNCE_MS`  | `250`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("CATALOG_API_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = parse_u64(&lookup, "CATALOG_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "CATALOG_TIMEOUT_SECS",
                expected: "a positive number of seconds",
                value: "0".into(),
            });
        }
        let debounce_ms = parse_u64(&lookup, "CATALOG_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?;

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            schema_debounce: Duration::from_millis(debounce_ms),
        })
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected: "a non-negative integer",
            value: raw,
        }),
    }
}

//! Client configuration.
//!
//! Values come from defaults, then the environment, then command-line flags
//! (applied by the binary on top of [`Config::from_env`]).
//!
//! Environment variables:
//! - `DOCTALK_API_URL`: base URL of the annotation API (default
//!   `http://localhost:8000`)
//! - `DOCTALK_TIMEOUT_SECS`: request timeout in seconds, `0` disables it
//!   (default 30)
//! - `DOCTALK_DOC_UUID`: document id forwarded with each request

use std::fmt;
use std::time::Duration;

/// Default base URL of the annotation API.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Path of the detect endpoint, relative to the base URL.
pub const DETECT_PATH: &str = "/api/v1/detect";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for talking to the annotation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL, without the endpoint path.
    pub api_url: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Document id the API uses to remember acronyms across requests.
    pub doc_uuid: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            doc_uuid: None,
        }
    }
}

/// Raw environment values, read once.
#[derive(Debug, Clone, Default)]
pub struct EnvSettings {
    pub api_url: Option<String>,
    pub timeout_secs: Option<String>,
    pub doc_uuid: Option<String>,
}

impl EnvSettings {
    /// Read the `DOCTALK_*` variables from the process environment.
    #[must_use]
    pub fn read() -> Self {
        Self {
            api_url: std::env::var("DOCTALK_API_URL").ok(),
            timeout_secs: std::env::var("DOCTALK_TIMEOUT_SECS").ok(),
            doc_uuid: std::env::var("DOCTALK_DOC_UUID").ok(),
        }
    }
}

impl Config {
    /// Build a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_settings(&EnvSettings::read())
    }

    /// Build a configuration from already-read environment values.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is unusable.
    pub fn from_settings(env: &EnvSettings) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = non_blank(env.api_url.as_deref()) {
            config.api_url = parse_api_url(url)?;
        }
        if let Some(raw) = non_blank(env.timeout_secs.as_deref()) {
            config.timeout = parse_timeout(raw)?;
        }
        config.doc_uuid = non_blank(env.doc_uuid.as_deref()).map(str::to_string);

        Ok(config)
    }

    /// Full URL of the detect endpoint.
    #[must_use]
    pub fn detect_url(&self) -> String {
        format!("{}{DETECT_PATH}", self.api_url.trim_end_matches('/'))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validate a base URL: it must use `http` or `https`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidApiUrl` otherwise.
pub fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim();
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        url.len() > scheme.len()
            && url
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    if has_scheme {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidApiUrl(raw.to_string()))
    }
}

/// Parse a timeout in whole seconds; `0` disables the timeout.
///
/// # Errors
///
/// Returns `ConfigError::InvalidTimeout` if the value is not a number.
pub fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Ok(None),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(_) => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

/// Error type for configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidApiUrl(String),
    InvalidTimeout(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidApiUrl(s) => {
                write!(f, "Invalid API URL `{s}` (expected http:// or https://)")
            }
            Self::InvalidTimeout(s) => {
                write!(f, "Invalid timeout `{s}` (expected whole seconds)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_settings(&EnvSettings::default()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.detect_url(), "http://localhost:8000/api/v1/detect");
    }

    #[test]
    fn test_env_overrides() {
        let env = EnvSettings {
            api_url: Some("https://nlp.example.org/".to_string()),
            timeout_secs: Some("5".to_string()),
            doc_uuid: Some("note-17".to_string()),
        };
        let config = Config::from_settings(&env).unwrap();
        assert_eq!(config.detect_url(), "https://nlp.example.org/api/v1/detect");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.doc_uuid.as_deref(), Some("note-17"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let env = EnvSettings {
            api_url: Some("  ".to_string()),
            timeout_secs: Some(String::new()),
            doc_uuid: Some(" ".to_string()),
        };
        assert_eq!(Config::from_settings(&env).unwrap(), Config::default());
    }

    #[test]
    fn test_zero_timeout_disables() {
        assert_eq!(parse_timeout("0"), Ok(None));
    }

    #[test]
    fn test_invalid_values() {
        let env = EnvSettings {
            api_url: Some("localhost:8000".to_string()),
            ..EnvSettings::default()
        };
        assert_eq!(
            Config::from_settings(&env),
            Err(ConfigError::InvalidApiUrl("localhost:8000".to_string()))
        );
        assert!(matches!(
            parse_timeout("soon"),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert!(parse_api_url("http://").is_err());
    }
}

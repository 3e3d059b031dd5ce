//! Environment-driven configuration.
//!
//! Credentials and endpoint URLs are supplied externally; the library never
//! persists local state. The host binary loads `.env` via `dotenvy` before
//! calling [`AppConfig::from_env`].

use std::time::Duration;

use url::Url;

/// Default directory/mailbox API base.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0/";

/// Environment variable holding a pre-issued bearer token.
pub const TOKEN_ENV_VAR: &str = "OOO_ACCESS_TOKEN";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DEBOUNCE_MS: u64 = 400;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{variable} environment variable not set")]
    Missing { variable: &'static str },

    #[error("{variable} is not a valid URL: {value}")]
    BadUrl { variable: &'static str, value: String },

    #[error("{variable} is not a valid integer: {value}")]
    BadNumber { variable: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory/mailbox API base, always with a trailing slash so joins
    /// keep the version segment.
    pub graph_base_url: Url,
    /// Workflow-automation endpoint receiving the scheduling notice.
    pub workflow_endpoint: Url,
    /// Bound on every outbound HTTP call.
    pub http_timeout: Duration,
    /// Typeahead quiet period.
    pub search_debounce: Duration,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `OOO_WORKFLOW_URL` is required; everything else has a default
    /// (`OOO_GRAPH_BASE_URL`, `OOO_HTTP_TIMEOUT_SECS`, `OOO_DEBOUNCE_MS`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let graph_base_url = match std::env::var("OOO_GRAPH_BASE_URL") {
            Ok(raw) => parse_base_url("OOO_GRAPH_BASE_URL", &raw)?,
            Err(_) => Url::parse(DEFAULT_GRAPH_BASE_URL).expect("default base URL parses"),
        };

        let workflow_raw = std::env::var("OOO_WORKFLOW_URL").map_err(|_| ConfigError::Missing {
            variable: "OOO_WORKFLOW_URL",
        })?;
        let workflow_endpoint =
            Url::parse(&workflow_raw).map_err(|_| ConfigError::BadUrl {
                variable: "OOO_WORKFLOW_URL",
                value: workflow_raw,
            })?;

        let http_timeout = Duration::from_secs(env_u64(
            "OOO_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let search_debounce =
            Duration::from_millis(env_u64("OOO_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?);

        Ok(Self {
            graph_base_url,
            workflow_endpoint,
            http_timeout,
            search_debounce,
        })
    }
}

fn parse_base_url(variable: &'static str, raw: &str) -> Result<Url, ConfigError> {
    // A missing trailing slash would make Url::join drop the last path
    // segment (the API version), so normalize here.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|_| ConfigError::BadUrl {
        variable,
        value: raw.to_string(),
    })
}

fn env_u64(variable: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(variable) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::BadNumber {
            variable,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = parse_base_url("X", "https://graph.example.com/v1.0").expect("url");
        assert_eq!(url.as_str(), "https://graph.example.com/v1.0/");
        assert_eq!(url.join("users").unwrap().path(), "/v1.0/users");
    }

    #[test]
    fn default_base_url_is_well_formed() {
        let url = Url::parse(DEFAULT_GRAPH_BASE_URL).expect("default");
        assert_eq!(url.join("users").unwrap().path(), "/v1.0/users");
    }
}

use std::env;
use std::time::Duration;

use crate::QueryError;

pub const DEFAULT_LOCAL_URL: &str = "http://localhost:11434";
pub const DEFAULT_LOCAL_MODEL: &str = "medgemma";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedConfig {
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOCAL_URL.to_string(),
            model: DEFAULT_LOCAL_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaConfig {
    pub url: String,
}

/// Which backends exist and how to reach them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterConfig {
    pub hosted: Option<HostedConfig>,
    pub local: Option<LocalConfig>,
    pub qa: Option<QaConfig>,
    /// Per-request timeout. `None` blocks until the backend responds.
    pub timeout: Option<Duration>,
}

impl RouterConfig {
    /// Read `COPILOT_*` variables from the process environment.
    pub fn from_env() -> Result<Self, QueryError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source.
    ///
    /// - `COPILOT_HOSTED_ENDPOINT` + `COPILOT_API_KEY`: hosted backend (both required)
    /// - `COPILOT_LOCAL_URL`, `COPILOT_LOCAL_MODEL`: local backend, always configured
    /// - `COPILOT_QA_URL`: question-answering backend
    /// - `COPILOT_TIMEOUT_SECS`: optional request timeout, at least one second
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QueryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let hosted = match (var("COPILOT_HOSTED_ENDPOINT"), var("COPILOT_API_KEY")) {
            (Some(endpoint), Some(api_key)) => Some(HostedConfig { endpoint, api_key }),
            (Some(_), None) => {
                return Err(QueryError::Config(
                    "COPILOT_API_KEY must be set together with COPILOT_HOSTED_ENDPOINT".to_string(),
                ))
            }
            _ => None,
        };

        let defaults = LocalConfig::default();
        let local = LocalConfig {
            base_url: var("COPILOT_LOCAL_URL").unwrap_or(defaults.base_url),
            model: var("COPILOT_LOCAL_MODEL").unwrap_or(defaults.model),
        };

        let qa = var("COPILOT_QA_URL").map(|url| QaConfig { url });

        let timeout = match var("COPILOT_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    QueryError::Config(format!("COPILOT_TIMEOUT_SECS is not a number: {raw}"))
                })?;
                if secs == 0 {
                    return Err(QueryError::Config(
                        "COPILOT_TIMEOUT_SECS must be at least 1; unset it to wait without a limit"
                            .to_string(),
                    ));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            hosted,
            local: Some(local),
            qa,
            timeout,
        })
    }
}

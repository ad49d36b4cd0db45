//! Validated configuration snapshot.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use debrix_core::{ApiCredential, ResolverSettings};
use url::Url;

use crate::defaults::{ENV_API_KEY, ENV_PREFIX};
use crate::error::{ConfigError, ConfigResult};
use crate::loader;

/// Runtime configuration assembled from `DEBRIX_*` variables.
#[derive(Clone, PartialEq, Eq)]
pub struct DebridConfig {
    /// Provider API root.
    pub api_url: Url,
    /// Bound applied to every provider call.
    pub request_timeout: Duration,
    /// Identifiers per availability lookup.
    pub chunk_size: usize,
    /// Announce URLs appended to created magnets.
    pub trackers: Vec<String>,
    /// Log level directive handed to the subscriber.
    pub log_level: String,
    /// Explicit log format (`json` or `pretty`); inferred when absent.
    pub log_format: Option<String>,
    api_key: Option<String>,
}

impl DebridConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a recognised variable holds an invalid value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_map(std::env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX)))
    }

    /// Load from explicit key/value pairs; blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error when a recognised variable holds an invalid value.
    pub fn from_map<I, K, V>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();
        loader::load(&vars)
    }

    /// Timeout and chunking settings for the resolution core.
    #[must_use]
    pub const fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            request_timeout: self.request_timeout,
            chunk_size: self.chunk_size,
        }
    }

    /// Credential from `DEBRIX_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the variable is unset.
    pub fn credential(&self) -> ConfigResult<ApiCredential> {
        self.api_key
            .as_deref()
            .map(ApiCredential::new)
            .ok_or(ConfigError::MissingField { field: ENV_API_KEY })
    }

    pub(crate) const fn new(
        api_url: Url,
        request_timeout: Duration,
        chunk_size: usize,
        trackers: Vec<String>,
        log_level: String,
        log_format: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            api_url,
            request_timeout,
            chunk_size,
            trackers,
            log_level,
            log_format,
            api_key,
        }
    }
}

impl fmt::Debug for DebridConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DebridConfig")
            .field("api_url", &self.api_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("chunk_size", &self.chunk_size)
            .field("trackers", &self.trackers)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

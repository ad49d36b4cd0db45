//! CLI error type and the application context shared by command handlers.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use anyhow::anyhow;
use debrix_config::DebridConfig;
use debrix_core::{
    ApiCredential, DebridError, DebridOrchestrator, DebridProvider, TrackerMagnetSource,
};
use debrix_easydebrid::EasyDebridClient;
use debrix_events::EventBus;

/// CLI-level error type separating bad input, operational failures and
/// rejected credentials.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    AuthRejected(String),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::AuthRejected(_) => 4,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::AuthRejected(operation) => {
                format!("provider rejected the API key during {operation}")
            }
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<DebridError> for CliError {
    fn from(err: DebridError) -> Self {
        match err {
            DebridError::AuthRejected { operation } => Self::AuthRejected(operation.to_string()),
        }
    }
}

/// Orchestrator wired against the configured provider, plus the credential to use.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) orchestrator: DebridOrchestrator,
    pub(crate) credential: ApiCredential,
}

impl AppContext {
    /// Build the provider client and orchestrator from `config`.
    ///
    /// `api_key` overrides `DEBRIX_API_KEY`.
    pub(crate) fn from_config(config: &DebridConfig, api_key: Option<String>) -> CliResult<Self> {
        let credential = match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => ApiCredential::new(key.trim()),
            None => config.credential().map_err(|_| {
                CliError::validation("an API key is required (--api-key or DEBRIX_API_KEY)")
            })?,
        };

        let client = EasyDebridClient::new(config.api_url.clone(), config.request_timeout)
            .map_err(|err| CliError::failure(anyhow!(err).context("failed to build provider client")))?;
        let provider: Arc<dyn DebridProvider> = Arc::new(client);

        let orchestrator = DebridOrchestrator::new(
            provider,
            Arc::new(TrackerMagnetSource::new(config.trackers.clone())),
            EventBus::new(),
            config.resolver_settings(),
        );
        Ok(Self {
            orchestrator,
            credential,
        })
    }
}

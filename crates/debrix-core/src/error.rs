//! Error types and the single classification boundary for provider failures.
//!
//! # Design
//! - `ProviderError` is the raw failure returned by a provider call.
//! - `classify` turns it into an `ErrorKind` exactly once, where the call is made.
//! - Only `DebridError::AuthRejected` ever crosses the public API as an error.

use std::error::Error;
use std::time::Duration;

use debrix_events::ErrorClass;
use thiserror::Error;

/// Provider message signalling a rejected credential.
const NOT_LOGGED_IN: &str = "not logged in";
/// Provider message signalling a missing entitlement.
const NOT_PREMIUM: &str = "account not premium";

/// Raw failure reported by a provider or collaborator call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with an API error payload.
    #[error("provider api error: {message}")]
    Api {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status when the transport exposes one.
        status: Option<u16>,
        /// Provider error message.
        message: String,
    },
    /// The request never produced a response.
    #[error("provider transport failure")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The call exceeded its time bound.
    #[error("provider call timed out after {after:?}")]
    Timeout {
        /// Operation identifier.
        operation: &'static str,
        /// Bound that expired.
        after: Duration,
    },
    /// The response could not be decoded.
    #[error("provider response malformed: {message}")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Decoder detail.
        message: String,
    },
    /// A non-provider collaborator failed (e.g. magnet-link lookup).
    #[error("collaborator failure: {message}")]
    Collaborator {
        /// Operation identifier.
        operation: &'static str,
        /// Failure detail.
        message: String,
    },
}

impl ProviderError {
    /// Operation the failure is attached to.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Api { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Timeout { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Collaborator { operation, .. } => operation,
        }
    }

    /// Message preserved for diagnostics, including the source chain.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// Convenience alias for provider call results.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Domain meaning of a provider failure.
#[derive(Debug)]
pub enum ErrorKind {
    /// Credential rejected; the caller must re-authenticate.
    AuthError,
    /// Account lacks the entitlement for the operation.
    AccessDenied,
    /// Transient provider or network failure.
    SoftProviderError(ProviderError),
    /// Failure outside the provider API.
    Unclassified(ProviderError),
}

impl ErrorKind {
    /// Event-level class.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::AuthError => ErrorClass::Auth,
            Self::AccessDenied => ErrorClass::AccessDenied,
            Self::SoftProviderError(_) => ErrorClass::SoftProvider,
            Self::Unclassified(_) => ErrorClass::Unclassified,
        }
    }
}

/// Map a raw failure to its domain meaning.
#[must_use]
pub fn classify(error: ProviderError) -> ErrorKind {
    let api_message = match &error {
        ProviderError::Api { message, .. } => Some(message.to_ascii_lowercase()),
        _ => None,
    };

    match api_message {
        Some(message) if message.contains(NOT_LOGGED_IN) => ErrorKind::AuthError,
        Some(message) if message.contains(NOT_PREMIUM) => ErrorKind::AccessDenied,
        Some(_) => ErrorKind::SoftProviderError(error),
        None => match error {
            ProviderError::Collaborator { .. } => ErrorKind::Unclassified(error),
            other => ErrorKind::SoftProviderError(other),
        },
    }
}

/// Errors surfaced by the public debrid operations.
#[derive(Debug, Error)]
pub enum DebridError {
    /// The provider rejected the credential.
    #[error("provider rejected the credential")]
    AuthRejected {
        /// Operation that observed the rejection.
        operation: &'static str,
    },
}

/// Convenience alias for public debrid operation results.
pub type DebridResult<T> = Result<T, DebridError>;

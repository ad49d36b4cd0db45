//! Variable names and default values.

/// Prefix shared by every recognised variable.
pub const ENV_PREFIX: &str = "DEBRIX_";

/// Provider API root.
pub const ENV_API_URL: &str = "DEBRIX_API_URL";
/// Per-call timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "DEBRIX_TIMEOUT_MS";
/// Availability lookup chunk size.
pub const ENV_CHUNK_SIZE: &str = "DEBRIX_CHUNK_SIZE";
/// Comma-separated tracker announce URLs.
pub const ENV_TRACKERS: &str = "DEBRIX_TRACKERS";
/// Log level directive.
pub const ENV_LOG_LEVEL: &str = "DEBRIX_LOG_LEVEL";
/// `json` or `pretty`.
pub const ENV_LOG_FORMAT: &str = "DEBRIX_LOG_FORMAT";
/// Provider API key.
pub const ENV_API_KEY: &str = "DEBRIX_API_KEY";

/// Default provider API root.
pub const DEFAULT_API_URL: &str = "https://easydebrid.com/api/v1";
/// Default per-call timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Default identifiers per availability lookup.
pub const DEFAULT_CHUNK_SIZE: usize = 100;
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub(crate) const MAX_TIMEOUT_MS: u64 = 120_000;
pub(crate) const MAX_CHUNK_SIZE: usize = 1_000;

//! Command handlers grouped by concern.

pub(crate) mod check;
pub(crate) mod resolve;

use debrix_core::magnet;

use crate::client::{CliError, CliResult};

/// Validate and normalise an info hash argument.
pub(crate) fn parse_hash(raw: &str) -> CliResult<String> {
    let trimmed = raw.trim();
    if magnet::is_info_hash(trimmed) {
        Ok(trimmed.to_ascii_lowercase())
    } else {
        Err(CliError::validation(format!(
            "'{raw}' is not a 40-character hex or 32-character base32 info hash"
        )))
    }
}

//! Renderers for command results.

use std::fmt::Write as _;

use anyhow::anyhow;
use debrix_core::{AvailabilityResult, ResolutionOutcome};
use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_availability(
    result: &AvailabilityResult,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(result),
        OutputFormat::Table => {
            let mut text = format!("{:<40} CACHED", "INFO HASH");
            for (info_hash, availability) in result.iter() {
                let _ = write!(text, "\n{info_hash:<40} {}", cached_label(availability.cached));
            }
            Ok(text)
        }
    }
}

pub(crate) fn render_outcome(outcome: &ResolutionOutcome, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(outcome),
        OutputFormat::Table => Ok(match outcome {
            ResolutionOutcome::DirectLink { url } => format!("outcome: direct_link\nurl: {url}"),
            ResolutionOutcome::Downloading => "outcome: downloading".to_string(),
            ResolutionOutcome::ArchiveOnly => "outcome: archive_only".to_string(),
            ResolutionOutcome::AccessDenied => "outcome: access_denied".to_string(),
            ResolutionOutcome::Failed(reason) => format!("outcome: failed\nreason: {reason}"),
        }),
    }
}

const fn cached_label(cached: Option<bool>) -> &'static str {
    match cached {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

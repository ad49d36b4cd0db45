//! `debrix resolve`: turn one info hash into a playable outcome.

use debrix_core::{ContentRequest, RequesterContext};
use tracing::info;

use crate::cli::{OutputFormat, ResolveArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::parse_hash;
use crate::output::render_outcome;

pub(crate) async fn handle_resolve(
    ctx: &AppContext,
    args: ResolveArgs,
    output: OutputFormat,
) -> CliResult<String> {
    let info_hash = parse_hash(&args.hash)?;
    let mut request = ContentRequest::new(info_hash, ctx.credential.clone()).with_requester(
        RequesterContext {
            ip: args.ip,
            is_browser: args.browser,
        },
    );
    match (args.file_index, args.filename) {
        (Some(index), Some(filename)) => request = request.with_file(index, filename),
        (None, None) => {}
        _ => {
            return Err(CliError::validation(
                "--file-index and --filename must be given together",
            ));
        }
    }

    let outcome = ctx.orchestrator.resolve(&request).await?;
    info!(outcome = ?outcome.kind(), "resolve finished");
    render_outcome(&outcome, output)
}

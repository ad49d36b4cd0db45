//! `debrix check`: cached availability for a list of info hashes.

use debrix_core::StreamCandidate;
use tracing::info;

use crate::cli::{CheckArgs, OutputFormat};
use crate::client::{AppContext, CliResult};
use crate::commands::parse_hash;
use crate::output::render_availability;

pub(crate) async fn handle_check(
    ctx: &AppContext,
    args: CheckArgs,
    output: OutputFormat,
) -> CliResult<String> {
    let candidates = args
        .hashes
        .iter()
        .map(|raw| {
            parse_hash(raw).map(|info_hash| StreamCandidate {
                info_hash,
                file_index: None,
                title: String::new(),
            })
        })
        .collect::<CliResult<Vec<_>>>()?;

    let result = ctx
        .orchestrator
        .check_availability(&candidates, &ctx.credential)
        .await?;
    info!(requested = candidates.len(), "availability checked");
    render_availability(&result, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CliError;
    use anyhow::{Result, anyhow};
    use debrix_config::DebridConfig;
    use httpmock::prelude::*;
    use serde_json::{Value, json};

    const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const HASH_B: &str = "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

    fn context(server: &MockServer) -> Result<AppContext> {
        let config = DebridConfig::from_map([
            ("DEBRIX_API_URL", format!("{}/api/v1", server.base_url())),
            ("DEBRIX_API_KEY", "token".to_string()),
        ])?;
        AppContext::from_config(&config, None).map_err(|err| anyhow!(err.display_message()))
    }

    #[tokio::test]
    async fn check_reports_cached_flags_as_json() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/link/lookup")
                .header("authorization", "Bearer token");
            then.status(200).json_body(json!({ "cached": [true, false] }));
        });
        let ctx = context(&server)?;

        let text = handle_check(
            &ctx,
            CheckArgs {
                hashes: vec![HASH_A.to_string(), HASH_B.to_string()],
            },
            OutputFormat::Json,
        )
        .await
        .map_err(|err| anyhow!(err.display_message()))?;

        mock.assert();
        let value: Value = serde_json::from_str(&text)?;
        assert_eq!(value[HASH_A]["cached"], json!(true));
        assert_eq!(value[HASH_B.to_ascii_lowercase()]["cached"], json!(false));
        Ok(())
    }

    #[tokio::test]
    async fn rejected_key_maps_to_auth_exit_code() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/link/lookup");
            then.status(401).json_body(json!({ "error": "Not logged in." }));
        });
        let ctx = context(&server)?;

        let err = handle_check(
            &ctx,
            CheckArgs {
                hashes: vec![HASH_A.to_string()],
            },
            OutputFormat::Table,
        )
        .await
        .err()
        .ok_or_else(|| anyhow!("expected auth failure"))?;

        assert!(matches!(err, CliError::AuthRejected(_)));
        assert_eq!(err.exit_code(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_hash_is_a_validation_error() -> Result<()> {
        let server = MockServer::start_async().await;
        let ctx = context(&server)?;

        let err = handle_check(
            &ctx,
            CheckArgs {
                hashes: vec!["not-a-hash".to_string()],
            },
            OutputFormat::Json,
        )
        .await
        .err()
        .ok_or_else(|| anyhow!("expected validation failure"))?;

        assert_eq!(err.exit_code(), 2);
        Ok(())
    }
}

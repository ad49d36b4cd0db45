//! Argument parsing and command dispatch.

use std::net::IpAddr;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand, ValueEnum};
use debrix_config::DebridConfig;
use debrix_telemetry::{LogFormat, LoggingConfig, command_span, init_logging};
use tracing::{Instrument, debug};

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::{check, resolve};

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    let config = DebridConfig::from_env().map_err(|err| CliError::validation(err.to_string()))?;
    let format = LogFormat::from_setting(config.log_format.as_deref())
        .map_err(|err| CliError::validation(err.to_string()))?;
    init_logging(&LoggingConfig {
        level: &config.log_level,
        format,
        build_sha: env!("CARGO_PKG_VERSION"),
    })
    .map_err(|err| CliError::failure(anyhow!(err)))?;
    let span = command_span(cli.command.label());
    debug!(parent: &span, api_url = %config.api_url, "starting");

    let ctx = AppContext::from_config(&config, cli.api_key)?;
    let rendered = dispatch(&ctx, cli.command, cli.output)
        .instrument(span)
        .await?;
    println!("{rendered}");

    if cli.events {
        for envelope in ctx.orchestrator.events().recent() {
            let line = serde_json::to_string(&envelope)
                .map_err(|err| CliError::failure(anyhow!("failed to format event: {err}")))?;
            eprintln!("{line}");
        }
    }
    Ok(())
}

pub(crate) async fn dispatch(
    ctx: &AppContext,
    command: Command,
    output: OutputFormat,
) -> CliResult<String> {
    match command {
        Command::Check(args) => check::handle_check(ctx, args, output).await,
        Command::Resolve(args) => resolve::handle_resolve(ctx, args, output).await,
    }
}

#[derive(Parser)]
#[command(
    name = "debrix",
    about = "Check and resolve torrents through a debrid provider",
    version
)]
pub(crate) struct Cli {
    /// Provider API key; falls back to DEBRIX_API_KEY.
    #[arg(long, global = true)]
    api_key: Option<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Json,
        help = "Select output format"
    )]
    output: OutputFormat,
    /// Print published resolution events to stderr as JSON lines.
    #[arg(long, global = true)]
    events: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Report which info hashes are cached.
    Check(CheckArgs),
    /// Resolve one info hash to a playable outcome.
    Resolve(ResolveArgs),
}

impl Command {
    const fn label(&self) -> &'static str {
        match self {
            Self::Check(_) => "check",
            Self::Resolve(_) => "resolve",
        }
    }
}

#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Info hashes to look up.
    #[arg(required = true)]
    pub(crate) hashes: Vec<String>,
}

#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Info hash to resolve.
    pub(crate) hash: String,
    /// Index of the wanted file inside the torrent.
    #[arg(long, requires = "filename")]
    pub(crate) file_index: Option<u32>,
    /// Name of the wanted file.
    #[arg(long)]
    pub(crate) filename: Option<String>,
    /// Requester IP forwarded to the provider.
    #[arg(long)]
    pub(crate) ip: Option<IpAddr>,
    /// Mark the requester as a browser.
    #[arg(long)]
    pub(crate) browser: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Json,
    Table,
}

//! CLI binary for sof2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExportConfig`, runs the export and turns any error into a one-line
//! diagnostic and a non-zero exit code.

use anyhow::{Context, Result};
use clap::Parser;
use sof2pdf::{export, ExportConfig, RequestIdentity, DEFAULT_WKHTMLTOPDF};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

const AFTER_HELP: &str = "\
Environment:
  CIPAPI_URL, CIPAPI_TOKEN_URL, CIPAPI_CLIENT_ID, CIPAPI_CLIENT_SECRET and
  CIPAPI_RESOURCE supply the connection settings when the flags are omitted.
  RUST_LOG overrides the log filter chosen by --verbose/--quiet.

Example:
  sof2pdf --ir_id 12345 --ir_version 1 -o 12345-1.pdf";

#[derive(Parser, Debug)]
#[command(
    name = "sof2pdf",
    version,
    about = "Downloads summary of findings for given interpretation request",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Interpretation request ID.
    #[arg(long = "ir_id")]
    ir_id: String,

    /// Interpretation request version.
    #[arg(long = "ir_version")]
    ir_version: String,

    /// Output PDF.
    #[arg(short = 'o', long = "output_file")]
    output_file: PathBuf,

    /// CIP-API base URL.
    #[arg(long, env = "CIPAPI_URL")]
    api_url: String,

    /// OAuth2 token endpoint.
    #[arg(long, env = "CIPAPI_TOKEN_URL")]
    token_url: Option<String>,

    /// OAuth2 client id.
    #[arg(long, env = "CIPAPI_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth2 client secret.
    #[arg(long, env = "CIPAPI_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// OAuth2 resource (defaults to the client id).
    #[arg(long, env = "CIPAPI_RESOURCE")]
    resource: Option<String>,

    /// Path to the wkhtmltopdf executable.
    #[arg(long, env = "WKHTMLTOPDF_PATH", default_value = DEFAULT_WKHTMLTOPDF)]
    wkhtmltopdf: PathBuf,

    /// HTTP timeout in seconds (default: wait indefinitely).
    #[arg(long, env = "SOF2PDF_TIMEOUT")]
    timeout: Option<u64>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SOF2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SOF2PDF_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let identity = RequestIdentity::new(&cli.ir_id, &cli.ir_version)?;
    let config = build_config(cli)?;

    let summary = export(&identity, &cli.output_file, &config)
        .await
        .with_context(|| format!("Export of {identity} failed"))?;

    if !cli.quiet {
        eprintln!(
            "{}  {}  →  {}",
            green("✔"),
            identity,
            bold(&summary.output_path.display().to_string()),
        );
    }
    Ok(())
}

/// Map CLI args to `ExportConfig`.
fn build_config(cli: &Cli) -> Result<ExportConfig> {
    let mut builder = ExportConfig::builder()
        .api_url(&cli.api_url)
        .wkhtmltopdf(&cli.wkhtmltopdf);

    if let Some(ref url) = cli.token_url {
        builder = builder.token_url(url);
    }
    if let Some(ref id) = cli.client_id {
        builder = builder.client_id(id);
    }
    if let Some(ref secret) = cli.client_secret {
        builder = builder.client_secret(secret);
    }
    if let Some(ref resource) = cli.resource {
        builder = builder.resource(resource);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}

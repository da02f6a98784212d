//! Export entry points: fetch, fix up and render one summary of findings.
//!
//! [`export`] wires the live CIP-API client and `wkhtmltopdf` together from
//! an [`ExportConfig`]. [`export_with`] takes the collaborators explicitly
//! and is what tests and embedding applications call.

use crate::cipapi::{CipApiClient, ReportSession, RequestLookup};
use crate::config::ExportConfig;
use crate::error::Sof2PdfError;
use crate::model::{ExportSummary, RequestIdentity};
use crate::pipeline::render::{PdfRenderer, RenderOptions, WkhtmltopdfRenderer};
use crate::pipeline::{fetch, fixup};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Export the summary of findings for `identity` to a PDF at `output`.
///
/// # Errors
/// Returns the first failure of any stage; see [`Sof2PdfError`]. Nothing is
/// written to `output` unless the renderer runs.
pub async fn export(
    identity: &RequestIdentity,
    output: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportSummary, Sof2PdfError> {
    let client = CipApiClient::new(config)?;
    let renderer = WkhtmltopdfRenderer::new(&config.wkhtmltopdf);
    export_with(
        identity,
        output,
        &client,
        &client,
        &renderer,
        &config.render_options,
    )
    .await
}

/// Run the pipeline against caller-supplied collaborators.
pub async fn export_with(
    identity: &RequestIdentity,
    output: impl AsRef<Path>,
    lookup: &dyn RequestLookup,
    session: &dyn ReportSession,
    renderer: &dyn PdfRenderer,
    options: &RenderOptions,
) -> Result<ExportSummary, Sof2PdfError> {
    let start = Instant::now();
    let output = output.as_ref();
    info!("Exporting summary of findings for {}", identity);

    // ── Step 1: Fetch ────────────────────────────────────────────────────
    let report = fetch::fetch_report(lookup, session, identity).await?;

    // ── Step 2: Fix up layout ────────────────────────────────────────────
    let html = fixup::fix_formatting(&report.html)?;

    // ── Step 3: Render ───────────────────────────────────────────────────
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Sof2PdfError::OutputWriteFailed {
                path: output.to_path_buf(),
                source: e,
            })?;
    }
    renderer.render(&html, output, options).await?;

    info!(
        "Exported {} to {} in {}ms",
        identity,
        output.display(),
        start.elapsed().as_millis()
    );

    Ok(ExportSummary {
        output_path: output.to_path_buf(),
        source_url: report.source_url,
        fetched_bytes: report.html.len(),
        rendered_html_bytes: html.len(),
    })
}

/// Synchronous wrapper around [`export`].
///
/// Creates a temporary tokio runtime internally.
pub fn export_sync(
    identity: &RequestIdentity,
    output: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportSummary, Sof2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Sof2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(export(identity, output, config))
}

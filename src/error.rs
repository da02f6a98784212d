//! Error type for the sof2pdf library.
//!
//! Every failure in the export pipeline is fatal: there is no partial output
//! and nothing to retry. Library functions therefore return a single
//! [`Sof2PdfError`] and leave the decision to exit to the caller. The
//! `sof2pdf` binary prints the message and exits non-zero; tests inspect the
//! variant instead.
//!
//! The cardinality and status messages keep the wording operators already
//! grep for in batch logs ("number of interpretation requests 2",
//! "response code 404").

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the sof2pdf library.
#[derive(Debug, Error)]
pub enum Sof2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request identity or another caller-supplied value is unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── CIP-API errors ────────────────────────────────────────────────────
    /// The token endpoint refused the credentials or returned no token.
    #[error("Authentication against CIP-API failed: {detail}")]
    AuthFailed { detail: String },

    /// The interpretation-request listing returned a non-success status.
    #[error("Interpretation request lookup failed with HTTP {status} for '{url}'")]
    LookupFailed { url: String, status: u16 },

    /// A CIP-API response body could not be decoded.
    #[error("Unexpected response from '{url}': {detail}")]
    InvalidResponse { url: String, detail: String },

    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("HTTP request to '{url}' failed: {reason}")]
    Http { url: String, reason: String },

    // ── Report resolution errors ──────────────────────────────────────────
    /// Zero or several interpretation requests matched the identity.
    #[error("number of interpretation requests {count}")]
    LookupCardinality { count: usize },

    /// The matched interpretation request has zero or several clinical reports.
    #[error("number of clinical reports {count}")]
    ReportCardinality { count: usize },

    /// The clinical report download returned something other than 200.
    #[error("response code {status}")]
    FetchStatus { url: String, status: u16 },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The renderer executable could not be started.
    #[error("Failed to start renderer '{binary}': {source}")]
    RendererSpawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer ran but exited unsuccessfully.
    #[error("Renderer exited with {status}: {stderr}")]
    RenderFailed { status: String, stderr: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not prepare the location of the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_cardinality_names_count() {
        let e = Sof2PdfError::LookupCardinality { count: 2 };
        assert_eq!(e.to_string(), "number of interpretation requests 2");
    }

    #[test]
    fn report_cardinality_names_count() {
        let e = Sof2PdfError::ReportCardinality { count: 0 };
        assert_eq!(e.to_string(), "number of clinical reports 0");
    }

    #[test]
    fn fetch_status_names_code() {
        let e = Sof2PdfError::FetchStatus {
            url: "http://x/report.html".into(),
            status: 404,
        };
        assert!(e.to_string().contains("404"), "got: {e}");
    }

    #[test]
    fn render_failed_display() {
        let e = Sof2PdfError::RenderFailed {
            status: "exit status: 1".into(),
            stderr: "Exit with code 1 due to network error".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("exit status: 1"));
        assert!(msg.contains("network error"));
    }
}

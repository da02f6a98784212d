//! # sof2pdf
//!
//! Download the "summary of findings" clinical report for an interpretation
//! request from the CIP-API and render it to PDF with `wkhtmltopdf`.
//!
//! The report HTML is written for on-screen viewing. Printed as is, its
//! coverage section stays collapsed, annex tables split across pages and the
//! header banner wraps, so the HTML passes through a small set of DOM
//! fix-ups before rendering.
//!
//! ## Pipeline Overview
//!
//! ```text
//! (ir_id, ir_version)
//!  │
//!  ├─ 1. Fetch   one request record → one clinical report → HTML
//!  ├─ 2. Fix up  expand coverage, keep annex tables whole, pin logo,
//!  │             no-wrap banner, drop shadow
//!  └─ 3. Render  wkhtmltopdf --quiet - <output.pdf>
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sof2pdf::{export, ExportConfig, RequestIdentity};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::builder()
//!         .api_url("https://cipapi.example.org/api/2")
//!         .token_url("https://login.example.org/tenant/oauth2/token")
//!         .client_id("client")
//!         .client_secret("secret")
//!         .build()?;
//!     let identity = RequestIdentity::new("12345", "1")?;
//!     let summary = export(&identity, "12345-1.pdf", &config).await?;
//!     eprintln!("wrote {}", summary.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `sof2pdf` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cipapi;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cipapi::{CipApiClient, ReportSession, RequestLookup};
pub use config::{ExportConfig, ExportConfigBuilder, DEFAULT_WKHTMLTOPDF};
pub use error::Sof2PdfError;
pub use export::{export, export_sync, export_with};
pub use model::{
    ExportSummary, HttpReply, ReportDocument, ReportReference, RequestIdentity, RequestRecord,
};
pub use pipeline::fetch::fetch_report;
pub use pipeline::fixup::fix_formatting;
pub use pipeline::render::{PdfRenderer, RenderOptions, WkhtmltopdfRenderer};

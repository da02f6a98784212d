//! Data types passed between pipeline stages.
//!
//! Everything here is transient: a run builds one [`RequestIdentity`], looks
//! up its [`RequestRecord`], downloads one [`ReportDocument`] and ends with a
//! PDF on disk described by [`ExportSummary`].

use crate::error::Sof2PdfError;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Identifies one version of an interpretation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    id: String,
    version: String,
}

impl RequestIdentity {
    /// Build an identity, rejecting blank id or version.
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Result<Self, Sof2PdfError> {
        let id = id.into();
        let version = version.into();
        if id.trim().is_empty() {
            return Err(Sof2PdfError::InvalidInput(
                "interpretation request id must not be empty".into(),
            ));
        }
        if version.trim().is_empty() {
            return Err(Sof2PdfError::InvalidInput(
                "interpretation request version must not be empty".into(),
            ));
        }
        Ok(Self { id, version })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.id, self.version)
    }
}

/// One interpretation request as returned by the lookup service.
///
/// Only `clinical_reports` drives the pipeline; the identifiers are kept for
/// log lines when the API includes them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestRecord {
    #[serde(default)]
    pub interpretation_request_id: Option<serde_json::Value>,
    #[serde(default)]
    pub version: Option<serde_json::Value>,
    #[serde(default)]
    pub clinical_reports: Vec<ReportReference>,
}

/// Pointer to a generated clinical report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportReference {
    pub url: String,
}

/// Status and body of an authenticated GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Raw report HTML as downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub source_url: String,
    pub html: String,
}

/// What a successful export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub source_url: String,
    /// Size of the HTML as fetched, in bytes.
    pub fetched_bytes: usize,
    /// Size of the HTML handed to the renderer, in bytes.
    pub rendered_html_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rejects_blank_fields() {
        assert!(matches!(
            RequestIdentity::new("", "1"),
            Err(Sof2PdfError::InvalidInput(_))
        ));
        assert!(matches!(
            RequestIdentity::new("R123", "  "),
            Err(Sof2PdfError::InvalidInput(_))
        ));
        let ok = RequestIdentity::new("R123", "1").unwrap();
        assert_eq!(ok.to_string(), "R123-1");
    }

    #[test]
    fn record_without_reports_decodes_as_empty() {
        let rec: RequestRecord =
            serde_json::from_str(r#"{"interpretation_request_id": 123, "status": "x"}"#).unwrap();
        assert!(rec.clinical_reports.is_empty());
    }

    #[test]
    fn record_decodes_report_urls() {
        let rec: RequestRecord = serde_json::from_str(
            r#"{"clinical_reports": [{"url": "http://x/report.html", "valid": true}]}"#,
        )
        .unwrap();
        assert_eq!(rec.clinical_reports.len(), 1);
        assert_eq!(rec.clinical_reports[0].url, "http://x/report.html");
    }
}

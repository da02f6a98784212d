//! Report resolution and download.
//!
//! An interpretation request must resolve to exactly one record carrying
//! exactly one clinical report. Anything else means the caller asked for the
//! wrong request (or the upstream data is inconsistent) and the run stops
//! before any report is downloaded.

use crate::cipapi::{ReportSession, RequestLookup};
use crate::error::Sof2PdfError;
use crate::model::{ReportDocument, RequestIdentity};
use tracing::{info, warn};

/// Resolve `identity` to its single clinical report and download its HTML.
///
/// # Errors
/// - [`Sof2PdfError::LookupCardinality`] when 0 or 2+ requests match
/// - [`Sof2PdfError::ReportCardinality`] when the request has 0 or 2+ reports
/// - [`Sof2PdfError::FetchStatus`] when the download is not HTTP 200
pub async fn fetch_report(
    lookup: &dyn RequestLookup,
    session: &dyn ReportSession,
    identity: &RequestIdentity,
) -> Result<ReportDocument, Sof2PdfError> {
    let records = lookup.list(identity).await?;
    let record = match records.as_slice() {
        [only] => only,
        _ => {
            warn!("{} matched {} interpretation requests", identity, records.len());
            return Err(Sof2PdfError::LookupCardinality {
                count: records.len(),
            });
        }
    };

    let reference = match record.clinical_reports.as_slice() {
        [only] => only,
        reports => {
            warn!("{} has {} clinical reports", identity, reports.len());
            return Err(Sof2PdfError::ReportCardinality {
                count: reports.len(),
            });
        }
    };

    session.authenticate().await?;
    info!("Downloading summary of findings from {}", reference.url);
    let reply = session.get(&reference.url).await?;
    if reply.status != 200 {
        return Err(Sof2PdfError::FetchStatus {
            url: reference.url.clone(),
            status: reply.status,
        });
    }

    info!("Downloaded {} bytes of report HTML", reply.body.len());
    Ok(ReportDocument {
        source_url: reference.url.clone(),
        html: reply.body,
    })
}

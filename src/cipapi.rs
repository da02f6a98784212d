//! CIP-API collaborators: request lookup and authenticated report download.
//!
//! The pipeline depends only on the [`RequestLookup`] and [`ReportSession`]
//! traits. [`CipApiClient`] implements both against the live API:
//!
//! * authentication is an OAuth2 client-credentials exchange whose bearer
//!   token is cached for the lifetime of the client;
//! * the interpretation-request listing is paginated, so `next` links are
//!   followed until exhausted;
//! * report downloads hand back the raw status and body, leaving the status
//!   check to the fetch stage.

use crate::config::ExportConfig;
use crate::error::Sof2PdfError;
use crate::model::{HttpReply, RequestIdentity, RequestRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Finds interpretation requests by id and version.
#[async_trait]
pub trait RequestLookup: Send + Sync {
    async fn list(&self, identity: &RequestIdentity) -> Result<Vec<RequestRecord>, Sof2PdfError>;
}

/// An HTTP session that can authenticate and then GET protected URLs.
#[async_trait]
pub trait ReportSession: Send + Sync {
    /// Obtain credentials. Calling it again is a no-op.
    async fn authenticate(&self) -> Result<(), Sof2PdfError>;

    /// GET `url`, returning whatever status the server answered with.
    async fn get(&self, url: &str) -> Result<HttpReply, Sof2PdfError>;
}

/// One page of `GET /interpretation-request`.
#[derive(Debug, Deserialize)]
pub(crate) struct RequestListPage {
    #[serde(default)]
    pub results: Vec<RequestRecord>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Live CIP-API client.
pub struct CipApiClient {
    http: reqwest::Client,
    api_url: String,
    token_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    resource: Option<String>,
    page_size: u32,
    token: OnceCell<String>,
}

impl CipApiClient {
    pub fn new(config: &ExportConfig) -> Result<Self, Sof2PdfError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| Sof2PdfError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            resource: config.effective_resource().map(str::to_string),
            page_size: config.page_size,
            token: OnceCell::new(),
        })
    }

    /// URL of the interpretation-request listing.
    pub fn list_url(&self) -> String {
        format!("{}/interpretation-request", self.api_url)
    }

    async fn bearer(&self) -> Result<&str, Sof2PdfError> {
        self.token
            .get_or_try_init(|| self.request_token())
            .await
            .map(String::as_str)
    }

    async fn request_token(&self) -> Result<String, Sof2PdfError> {
        let (token_url, client_id, client_secret) =
            match (&self.token_url, &self.client_id, &self.client_secret) {
                (Some(u), Some(i), Some(s)) => (u, i, s),
                _ => {
                    return Err(Sof2PdfError::AuthFailed {
                        detail: "token URL, client id and client secret must all be set".into(),
                    })
                }
            };
        let resource = self.resource.as_deref().unwrap_or(client_id.as_str());

        info!("Requesting CIP-API access token");
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("resource", resource),
        ];
        let response = self
            .http
            .post(token_url.as_str())
            .form(&form)
            .send()
            .await
            .map_err(|e| Sof2PdfError::AuthFailed {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Sof2PdfError::AuthFailed {
                detail: format!("token endpoint returned HTTP {}", status.as_u16()),
            });
        }
        let token: TokenResponse = response.json().await.map_err(|e| Sof2PdfError::AuthFailed {
            detail: format!("token response unreadable: {e}"),
        })?;
        Ok(token.access_token)
    }

    async fn authorised_get(&self, url: &str) -> Result<reqwest::Response, Sof2PdfError> {
        let token = self.bearer().await?;
        self.http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Sof2PdfError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl RequestLookup for CipApiClient {
    async fn list(&self, identity: &RequestIdentity) -> Result<Vec<RequestRecord>, Sof2PdfError> {
        let page_size = self.page_size.to_string();
        let mut url = reqwest::Url::parse_with_params(
            &self.list_url(),
            &[
                ("interpretation_request_id", identity.id()),
                ("version", identity.version()),
                ("page_size", page_size.as_str()),
            ],
        )
        .map_err(|e| Sof2PdfError::InvalidConfig(format!("bad CIP-API URL: {e}")))?
        .to_string();

        let mut records = Vec::new();
        let mut fetched = HashSet::new();
        loop {
            fetched.insert(url.clone());
            debug!("Listing interpretation requests: {}", url);
            let response = self.authorised_get(&url).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Sof2PdfError::LookupFailed {
                    url,
                    status: status.as_u16(),
                });
            }
            let body = response.text().await.map_err(|e| Sof2PdfError::Http {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            let page = parse_list_page(&url, &body)?;
            records.extend(page.results);
            match page.next {
                Some(next) if !next.is_empty() => {
                    if fetched.contains(&next) {
                        return Err(Sof2PdfError::InvalidResponse {
                            url,
                            detail: format!("pagination loops back to already fetched '{next}'"),
                        });
                    }
                    url = next;
                }
                _ => break,
            }
        }

        info!("Lookup for {} returned {} record(s)", identity, records.len());
        Ok(records)
    }
}

#[async_trait]
impl ReportSession for CipApiClient {
    async fn authenticate(&self) -> Result<(), Sof2PdfError> {
        self.bearer().await.map(|_| ())
    }

    async fn get(&self, url: &str) -> Result<HttpReply, Sof2PdfError> {
        let response = self.authorised_get(url).await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| Sof2PdfError::Http {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(HttpReply { status, body })
    }
}

pub(crate) fn parse_list_page(url: &str, body: &str) -> Result<RequestListPage, Sof2PdfError> {
    serde_json::from_str(body).map_err(|e| Sof2PdfError::InvalidResponse {
        url: url.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExportConfig {
        ExportConfig::builder()
            .api_url("https://cipapi.example.org/api/2/")
            .build()
            .unwrap()
    }

    #[test]
    fn test_list_url_strips_trailing_slash() {
        let client = CipApiClient::new(&config()).unwrap();
        assert_eq!(
            client.list_url(),
            "https://cipapi.example.org/api/2/interpretation-request"
        );
    }

    #[test]
    fn test_parse_list_page() {
        let body = r#"{
            "count": 1,
            "next": null,
            "results": [
                {"interpretation_request_id": "123", "version": 1,
                 "clinical_reports": [{"url": "https://cipapi/report/1", "clinical_report_version": 1}]}
            ]
        }"#;
        let page = parse_list_page("u", body).unwrap();
        assert!(page.next.is_none());
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].clinical_reports[0].url, "https://cipapi/report/1");
    }

    #[test]
    fn test_parse_list_page_with_next() {
        let body = r#"{"results": [], "next": "https://cipapi/ir?page=2"}"#;
        let page = parse_list_page("u", body).unwrap();
        assert_eq!(page.next.as_deref(), Some("https://cipapi/ir?page=2"));
    }

    #[test]
    fn test_parse_list_page_rejects_html() {
        let err = parse_list_page("https://cipapi/ir", "<html>login</html>").unwrap_err();
        assert!(matches!(err, Sof2PdfError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_without_credentials_fails() {
        let client = CipApiClient::new(&config()).unwrap();
        let err = client.authenticate().await.unwrap_err();
        assert!(matches!(err, Sof2PdfError::AuthFailed { .. }));
    }
}

//! Configuration for a report export.
//!
//! Every knob lives in [`ExportConfig`], built through its
//! [`ExportConfigBuilder`]. The binary fills the builder from CLI flags and
//! environment variables; library callers set only what they need and rely
//! on the defaults for the rest.

use crate::error::Sof2PdfError;
use crate::pipeline::render::RenderOptions;
use std::fmt;
use std::path::PathBuf;

/// Renderer location used when none is configured.
pub const DEFAULT_WKHTMLTOPDF: &str = "/usr/local/bin/wkhtmltopdf";

/// Configuration for exporting one summary of findings.
///
/// # Example
/// ```rust
/// use sof2pdf::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .api_url("https://cipapi.example.org/api/2")
///     .token_url("https://login.example.org/tenant/oauth2/token")
///     .client_id("my-client")
///     .client_secret("s3cret")
///     .build()
///     .unwrap();
/// assert_eq!(config.page_size, 100);
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Base URL of the CIP-API, e.g. `https://cipapi.example.org/api/2`.
    pub api_url: String,

    /// OAuth2 token endpoint used for client-credentials authentication.
    pub token_url: Option<String>,

    /// OAuth2 client id.
    pub client_id: Option<String>,

    /// OAuth2 client secret. Never printed by `Debug`.
    pub client_secret: Option<String>,

    /// OAuth2 resource the token is requested for. Defaults to `client_id`.
    pub resource: Option<String>,

    /// Page size requested from the interpretation-request listing. Default: 100.
    pub page_size: u32,

    /// Path to the `wkhtmltopdf` executable. Not checked until render time.
    pub wkhtmltopdf: PathBuf,

    /// Options passed to the renderer. Default: `quiet`.
    pub render_options: RenderOptions,

    /// Per-request HTTP timeout. Default: none, a stalled server blocks the run.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            token_url: None,
            client_id: None,
            client_secret: None,
            resource: None,
            page_size: 100,
            wkhtmltopdf: PathBuf::from(DEFAULT_WKHTMLTOPDF),
            render_options: RenderOptions::default(),
            request_timeout_secs: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("api_url", &self.api_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("resource", &self.resource)
            .field("page_size", &self.page_size)
            .field("wkhtmltopdf", &self.wkhtmltopdf)
            .field("render_options", &self.render_options)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// The resource to request a token for.
    pub fn effective_resource(&self) -> Option<&str> {
        self.resource.as_deref().or(self.client_id.as_deref())
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.config.token_url = Some(url.into());
        self
    }

    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = Some(id.into());
        self
    }

    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.client_secret = Some(secret.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.config.resource = Some(resource.into());
        self
    }

    pub fn page_size(mut self, n: u32) -> Self {
        self.config.page_size = n.max(1);
        self
    }

    pub fn wkhtmltopdf(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wkhtmltopdf = path.into();
        self
    }

    pub fn render_options(mut self, options: RenderOptions) -> Self {
        self.config.render_options = options;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ExportConfig, Sof2PdfError> {
        let api_url = self.config.api_url.trim();
        if api_url.is_empty() {
            return Err(Sof2PdfError::InvalidConfig("api_url is required".into()));
        }
        let parsed = reqwest::Url::parse(api_url).map_err(|e| {
            Sof2PdfError::InvalidConfig(format!("api_url '{api_url}' is not a valid URL: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Sof2PdfError::InvalidConfig(format!(
                "api_url '{api_url}' must use http or https"
            )));
        }
        if let Some(ref token_url) = self.config.token_url {
            reqwest::Url::parse(token_url).map_err(|e| {
                Sof2PdfError::InvalidConfig(format!(
                    "token_url '{token_url}' is not a valid URL: {e}"
                ))
            })?;
        }
        if self.config.request_timeout_secs == Some(0) {
            return Err(Sof2PdfError::InvalidConfig(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(self.config)
    }
}

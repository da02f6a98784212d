//! PDF rendering through an external `wkhtmltopdf` process.
//!
//! The HTML is streamed to the renderer's stdin and the PDF is written
//! straight to the requested path, replacing any existing file. Rendering is
//! behind the [`PdfRenderer`] trait so tests and callers with a different
//! engine can swap it out.
//!
//! ## Why stdin?
//!
//! Handing the document over a pipe avoids a temporary HTML file. The
//! renderer's stdout and stderr are captured while stdin is written so a
//! chatty renderer cannot fill its pipe and stall.

use crate::error::Sof2PdfError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Command-line options forwarded to the renderer, in insertion order.
///
/// Names are given without leading dashes (`"quiet"`, `"page-size"`); an
/// empty value produces a bare flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    entries: Vec<(String, String)>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::empty().with("quiet", "")
    }
}

impl RenderOptions {
    /// An option set with nothing in it.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set `name` to `value`, replacing an earlier value for the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Expand to command-line arguments.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (name, value) in &self.entries {
            if name.starts_with('-') {
                args.push(name.clone());
            } else {
                args.push(format!("--{name}"));
            }
            if !value.is_empty() {
                args.push(value.clone());
            }
        }
        args
    }
}

/// Turns HTML into a PDF file.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Render `html` to `output`, overwriting it if present.
    async fn render(
        &self,
        html: &str,
        output: &Path,
        options: &RenderOptions,
    ) -> Result<(), Sof2PdfError>;
}

/// [`PdfRenderer`] backed by the `wkhtmltopdf` executable.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    binary: PathBuf,
}

impl WkhtmltopdfRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Full argument list for one invocation: options, stdin marker, output.
    ///
    /// The output path is passed through as an `OsString` so non-UTF-8 paths
    /// reach the renderer byte for byte.
    pub fn command_args(options: &RenderOptions, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = options.to_args().into_iter().map(OsString::from).collect();
        args.push(OsString::from("-"));
        args.push(output.as_os_str().to_os_string());
        args
    }
}

#[async_trait]
impl PdfRenderer for WkhtmltopdfRenderer {
    async fn render(
        &self,
        html: &str,
        output: &Path,
        options: &RenderOptions,
    ) -> Result<(), Sof2PdfError> {
        let args = Self::command_args(options, output);
        debug!("Running {} {:?}", self.binary.display(), args);

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Sof2PdfError::RendererSpawn {
                binary: self.binary.clone(),
                source: e,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Sof2PdfError::Internal("renderer stdin was not captured".into()))?;
        let input = html.as_bytes().to_vec();
        let feed = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        };

        let (fed, finished) = tokio::join!(feed, child.wait_with_output());
        let out = finished.map_err(|e| Sof2PdfError::RenderFailed {
            status: "unknown".into(),
            stderr: e.to_string(),
        })?;

        if !out.status.success() {
            return Err(Sof2PdfError::RenderFailed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        // A renderer that exits cleanly without reading all of stdin has still
        // produced its PDF; only report the pipe error when the exit failed.
        if let Err(e) = fed {
            debug!("Renderer closed stdin early: {}", e);
        }

        // A clean exit must still leave a non-empty file at `output`.
        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => {}
            Ok(_) => {
                return Err(Sof2PdfError::RenderFailed {
                    status: out.status.to_string(),
                    stderr: format!("output '{}' is empty", output.display()),
                })
            }
            Err(e) => {
                return Err(Sof2PdfError::RenderFailed {
                    status: out.status.to_string(),
                    stderr: format!("output '{}' was not written: {e}", output.display()),
                })
            }
        }

        info!("Wrote PDF to {}", output.display());
        Ok(())
    }
}

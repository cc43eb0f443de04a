//! SVG-to-PNG conversion via the external `rsvg-convert` utility.
//!
//! librsvg has no usable in-process binding here, so conversion shells
//! out: the vector document is streamed to the child's stdin, PNG bytes
//! are read from stdout, and diagnostics are captured from stderr. A
//! non-zero exit status is the one checked error path in the pipeline;
//! a missing binary or a hung process is an operational failure instead.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::render::VectorDocument;

/// Default bound on one conversion attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// In-memory PNG buffer, ready for immediate consumption.
///
/// Held by the orchestrator until handed to the transport and dropped
/// right after the send; no on-disk artifact is ever created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage(Vec<u8>);

impl RasterImage {
    /// Wrap raw PNG bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Size of the image in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// View the PNG bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Conversion failure kinds.
///
/// `Process` is recoverable per sentence; the rest indicate the
/// converter itself is broken and abort the whole message.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The converter exited non-zero; carries its captured stderr
    #[error("converter exited with status {status}: {stderr}")]
    Process { status: i32, stderr: String },

    /// The converter binary could not be started
    #[error("failed to start converter '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O towards the running converter failed
    #[error("converter I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The conversion exceeded its time bound
    #[error("conversion timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl ConvertError {
    /// Whether the failure is tied to this document rather than to the
    /// converter installation
    pub fn is_per_sentence(&self) -> bool {
        matches!(self, ConvertError::Process { .. })
    }
}

/// Capability interface for vector-to-raster conversion.
///
/// The orchestrator depends only on this trait; implementations may
/// shell out, link a native library, or call a remote service.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert one vector document into a raster image. One attempt,
    /// no retry: failures are deterministic for a given document.
    async fn convert(&self, doc: &VectorDocument) -> Result<RasterImage, ConvertError>;

    /// Verify the converter is available
    async fn health_check(&self) -> anyhow::Result<()>;
}

/// Converter backed by the `rsvg-convert` command-line utility
pub struct RsvgConverter {
    /// Binary to invoke (default: "rsvg-convert")
    binary: String,

    /// Extra arguments before the format flag
    args: Vec<String>,

    /// Bound on one conversion attempt
    timeout: Duration,
}

impl Default for RsvgConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl RsvgConverter {
    /// Create a converter using `rsvg-convert` from PATH
    pub fn new() -> Self {
        Self::with_binary("rsvg-convert")
    }

    /// Create a converter with a custom binary path
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the default `-f png` argument list (used by tests to run
    /// shell stand-ins: `sh -c '...'`)
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Override the conversion timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args);
        if self.args.is_empty() {
            cmd.args(["-f", "png"]);
        }
        // Don't leave a hung converter behind if the timeout fires
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Converter for RsvgConverter {
    async fn convert(&self, doc: &VectorDocument) -> Result<RasterImage, ConvertError> {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ConvertError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(doc.as_str().as_bytes()).await?;
            // Drop stdin to signal EOF
        }

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ConvertError::Timeout {
                seconds: self.timeout.as_secs(),
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ConvertError::Process {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(RasterImage::new(output.stdout))
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        use anyhow::Context;

        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .with_context(|| format!("failed to run '{} --version'", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("converter health check failed: {}", stderr.trim());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binary() {
        let converter = RsvgConverter::new();
        assert_eq!(converter.binary, "rsvg-convert");
        assert_eq!(converter.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_custom_binary_path() {
        let converter = RsvgConverter::with_binary("/opt/bin/rsvg-convert");
        assert_eq!(converter.binary, "/opt/bin/rsvg-convert");
    }

    #[test]
    fn test_process_errors_are_per_sentence() {
        let err = ConvertError::Process {
            status: 1,
            stderr: "bad svg".to_string(),
        };
        assert!(err.is_per_sentence());
        assert!(err.to_string().contains("bad svg"));

        let err = ConvertError::Timeout { seconds: 30 };
        assert!(!err.is_per_sentence());
    }

    #[test]
    fn test_raster_image_buffer() {
        let image = RasterImage::new(vec![0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(image.len(), 4);
        assert!(!image.is_empty());
        assert_eq!(image.into_bytes(), vec![0x89, 0x50, 0x4e, 0x47]);
    }

    // Subprocess behavior is covered in tests/convert.rs with shell stubs.
}

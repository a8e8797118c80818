use chromiumoxide::error::CdpError;
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser error: {0}")]
    Browser(#[from] CdpError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Page failed to load after {attempts} consecutive attempts")]
    RetriesExhausted { attempts: u32 },
}

impl CaptureError {
    pub fn config(message: impl Into<String>) -> Self {
        CaptureError::Config(message.into())
    }

    pub fn launch(message: impl Into<String>) -> Self {
        CaptureError::Launch(message.into())
    }

    /// A short hint telling the user what to try next.
    pub fn remediation(&self) -> &'static str {
        match self {
            CaptureError::Io(_) => "Check that the output directory exists and is writable.",
            CaptureError::Browser(e) => {
                let lower = e.to_string().to_ascii_lowercase();
                if lower.contains("timeout") {
                    "Try increasing --nav-timeout or check that the page loads without blocking."
                } else {
                    "Re-run with --log-level debug for browser protocol details."
                }
            }
            CaptureError::InvalidUrl(_) => "Verify the URL (e.g., https://example.com).",
            CaptureError::Image(_) => {
                "Use a supported format (png, jpg, webp, pdf, gif, bmp, ppm, tiff)."
            }
            CaptureError::Serialization(_) => {
                "Re-run with --log-level debug for browser protocol details."
            }
            CaptureError::Config(_) => {
                "Check the positional arguments: <url> <delay> <width> <height> <verbose> <reload> <format> <background> <parent pid>."
            }
            CaptureError::Launch(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("could not auto detect") || lower.contains("executable") {
                    "Install Chrome or Chromium, or pass its path with --chrome <PATH>."
                } else {
                    "Check that Chrome/Chromium starts on this machine; pass --chrome <PATH> to pick a specific binary."
                }
            }
            CaptureError::RetriesExhausted { .. } => {
                "Check that the URL is reachable, or raise/omit --max-retries."
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;

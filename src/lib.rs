//! Site Capture (sitecap) Library
//!
//! Loads one web page in headless Chromium and keeps rewriting a single
//! screenshot file (`screenshot.<pid>.<format>`) on a fixed delay, either by
//! re-rendering the live page or by reloading it before each render.
//!
//! # Module Overview
//!
//! - [`capture`] - The capture loop state machine and the [`CapturePage`] seam
//! - [`browser`] - Chromium session, page and event relay
//! - [`config`] - Invocation parsing into [`CaptureConfig`]
//! - [`output`] - Output file naming and encoding
//! - [`viewport`] - Viewport dimensions
//!
//! # Example
//!
//! ```no_run
//! use sitecap_lib::{stdout_sink, BrowserOptions, BrowserSession, CaptureConfig, CaptureLoop, ChromePage};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> sitecap_lib::Result<()> {
//! let config = CaptureConfig::from_positional(&[
//!     "http://example.com", "5", "800", "600", "false", "true", "png", "white", "1234",
//! ])?;
//! let session = BrowserSession::launch(&BrowserOptions {
//!     viewport: config.viewport,
//!     ..BrowserOptions::default()
//! })
//! .await?;
//! let page = ChromePage::attach(
//!     session.new_page().await?,
//!     config.viewport,
//!     config.timeouts.navigation,
//!     config.verbose,
//!     stdout_sink(),
//! )
//! .await?;
//! CaptureLoop::new(config, page, stdout_sink())
//!     .run(CancellationToken::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod capture;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod viewport;

pub use browser::{BrowserOptions, BrowserSession, ChromePage, PageEvent};
pub use capture::{CaptureLoop, CapturePage, LoadStatus};
pub use config::{
    CaptureConfig, RetryPolicy, Timeouts, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_RETRY_DELAY,
    POSITIONAL_ARGS,
};
pub use error::{CaptureError, Result};
pub use output::{output_file_name, OutputFormat, RenderTarget};
pub use progress::{stdout_sink, MessageSink};
pub use viewport::Viewport;

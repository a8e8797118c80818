//! Headless browser process and its protocol connection.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{CaptureError, Result, Viewport};

/// Default timeout for individual DevTools protocol requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration options for the browser process.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Chrome/Chromium binary; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    /// Initial window size, kept equal to the capture viewport.
    pub viewport: Viewport,
    /// Whether to run in headless mode.
    pub headless: bool,
    /// Timeout for individual protocol requests.
    pub request_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            executable: None,
            viewport: Viewport::default(),
            headless: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BrowserOptions {
    fn to_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.viewport.width, self.viewport.height)
            .request_timeout(self.request_timeout)
            .arg("--hide-scrollbars")
            .arg("--mute-audio");
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(CaptureError::launch)
    }
}

/// A running browser plus the task pumping its protocol connection.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let config = options.to_config()?;
        info!(
            viewport = %options.viewport,
            headless = options.headless,
            "launching browser"
        );
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CaptureError::launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    // Protocol hiccups are not fatal; a dead connection ends the stream.
                    debug!("browser handler error: {}", err);
                }
            }
            warn!("browser connection closed");
        });

        Ok(Self { browser, handler })
    }

    pub async fn new_page(&self) -> Result<Page> {
        Ok(self.browser.new_page("about:blank").await?)
    }

    /// Closes the browser process and stops the connection task.
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(err) = self.browser.wait().await {
            debug!("waiting for browser exit failed: {}", err);
        }
        self.handler.abort();
        closed?;
        Ok(())
    }
}

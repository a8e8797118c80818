//! The page capture loop.
//!
//! One page moves through a small state machine:
//!
//! ```text
//! Loading --success--> render every `delay`, page left alone      (reload = false)
//! Loading --success--> render, wait `delay`, reload -> Loading     (reload = true)
//! Loading --failure--> wait retry delay, reopen url -> Loading
//! ```
//!
//! The loop never finishes on its own; it stops only when the shutdown token
//! is cancelled or a bounded retry policy runs out.

use chrono::Local;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::CaptureConfig;
use crate::output::RenderTarget;
use crate::progress::MessageSink;
use crate::{CaptureError, Result};

/// Outcome of opening or reloading the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Success,
    Failure(String),
}

/// The operations the capture loop needs from a browser page.
#[allow(async_fn_in_trait)]
pub trait CapturePage {
    /// Navigates to `url` and waits for the load to finish.
    async fn open(&mut self, url: &str) -> LoadStatus;

    /// Reloads the current document and waits for the load to finish.
    async fn reload(&mut self) -> LoadStatus;

    /// Fills the body background and writes the viewport to `target`.
    async fn render(&mut self, background: &str, target: &RenderTarget) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Opening,
    Reloading,
    RetryPending,
    ReloadPending,
    RenderLoop,
}

pub struct CaptureLoop<P> {
    config: CaptureConfig,
    target: RenderTarget,
    page: P,
    sink: MessageSink,
    failures: u32,
}

impl<P: CapturePage> CaptureLoop<P> {
    pub fn new(config: CaptureConfig, page: P, sink: MessageSink) -> Self {
        let target = config.render_target();
        Self {
            config,
            target,
            page,
            sink,
            failures: 0,
        }
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Runs until `shutdown` is cancelled. Returns an error only when the
    /// retry policy gives up on a page that keeps failing to load.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        let mut state = CaptureState::Opening;
        loop {
            state = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("capture loop stopped");
                    return Ok(());
                }
                next = self.step(state) => next?,
            };
        }
    }

    async fn step(&mut self, state: CaptureState) -> Result<CaptureState> {
        match state {
            CaptureState::Opening => {
                let status = self.page.open(&self.config.url).await;
                self.on_load_finished(status).await
            }
            CaptureState::Reloading => {
                let status = self.page.reload().await;
                self.on_load_finished(status).await
            }
            CaptureState::RetryPending => {
                sleep(self.config.retry.delay).await;
                self.emit("Reloading");
                Ok(CaptureState::Opening)
            }
            CaptureState::ReloadPending => {
                sleep(self.config.delay).await;
                Ok(CaptureState::Reloading)
            }
            CaptureState::RenderLoop => self.render_forever().await,
        }
    }

    async fn on_load_finished(&mut self, status: LoadStatus) -> Result<CaptureState> {
        match status {
            LoadStatus::Failure(reason) => {
                self.failures += 1;
                warn!(url = %self.config.url, failures = self.failures, "page load failed: {}", reason);
                if self.config.retry.exhausted(self.failures) {
                    return Err(CaptureError::RetriesExhausted {
                        attempts: self.failures,
                    });
                }
                self.emit(&format!(
                    "Attempting to reload in {} seconds",
                    self.config.retry.delay.as_secs()
                ));
                Ok(CaptureState::RetryPending)
            }
            LoadStatus::Success if self.config.reload => {
                self.failures = 0;
                self.render().await;
                Ok(CaptureState::ReloadPending)
            }
            LoadStatus::Success => {
                self.failures = 0;
                Ok(CaptureState::RenderLoop)
            }
        }
    }

    /// Renders every `delay` on the live page. The first render comes one
    /// full delay after the load finished.
    async fn render_forever(&mut self) -> Result<CaptureState> {
        let period = self.config.delay;
        // A delay past the clock's range never comes due.
        let Some(first) = Instant::now().checked_add(period) else {
            info!(delay = ?period, "render delay exceeds the clock range; idling");
            return std::future::pending().await;
        };
        let mut ticker = interval_at(first, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.render().await;
        }
    }

    async fn render(&mut self) {
        if self.config.verbose {
            self.emit(&format!(
                "Page Rendered {}",
                Local::now().format("%-I:%M:%S %p")
            ));
        }
        if let Err(err) = self
            .page
            .render(&self.config.background, &self.target)
            .await
        {
            warn!(path = %self.target.path.display(), "render failed: {}", err);
        }
    }

    fn emit(&self, line: &str) {
        (self.sink)(line);
    }
}

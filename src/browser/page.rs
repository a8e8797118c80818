//! The single browser page driven by the capture loop.

use std::time::{Duration, Instant};

use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, NavigateParams, PrintToPdfParams, ReloadParams,
    Viewport as ClipRect,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

use super::events::spawn_event_relay;
use crate::capture::{CapturePage, LoadStatus};
use crate::output::{OutputFormat, RenderTarget};
use crate::progress::MessageSink;
use crate::{Result, Viewport};

/// CSS pixels per inch, used to size PDF output to the viewport.
const CSS_PX_PER_INCH: f64 = 96.0;

/// Chromium commits failed navigations as an internal error document.
const ERROR_PAGE_PREFIX: &str = "chrome-error://";

const PROBE_SCRIPT: &str =
    "JSON.stringify({ href: window.location.href, readyState: document.readyState })";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageProbe {
    href: String,
    ready_state: String,
}

impl PageProbe {
    fn status(&self) -> LoadStatus {
        if self.href.starts_with(ERROR_PAGE_PREFIX) {
            LoadStatus::Failure("browser displayed its error page".to_string())
        } else {
            LoadStatus::Success
        }
    }
}

/// Script that assigns the body background, tolerating pages without a body.
fn background_script(background: &str) -> Result<String> {
    Ok(format!(
        "if (document.body) {{ document.body.bgColor = {}; }}",
        serde_json::to_string(background)?
    ))
}

/// A chromiumoxide page sized to the capture viewport, with its event relay.
pub struct ChromePage {
    page: Page,
    viewport: Viewport,
    navigation_timeout: Duration,
    relay: JoinHandle<()>,
}

impl ChromePage {
    pub async fn attach(
        page: Page,
        viewport: Viewport,
        navigation_timeout: Duration,
        verbose: bool,
        sink: MessageSink,
    ) -> Result<Self> {
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            1.0,
            false,
        ))
        .await?;
        let relay = spawn_event_relay(&page, verbose, sink).await?;
        Ok(Self {
            page,
            viewport,
            navigation_timeout,
            relay,
        })
    }

    async fn navigate(&self, url: &str) -> Result<LoadStatus> {
        let navigated = self.page.execute(NavigateParams::new(url)).await?;
        if let Some(error) = navigated.result.error_text.clone() {
            return Ok(LoadStatus::Failure(error));
        }
        self.settle().await
    }

    async fn refresh(&self) -> Result<LoadStatus> {
        self.page.execute(ReloadParams::default()).await?;
        self.settle().await
    }

    async fn settle(&self) -> Result<LoadStatus> {
        self.page.wait_for_navigation().await?;
        let raw: String = self.page.evaluate(PROBE_SCRIPT).await?.into_value()?;
        let probe: PageProbe = serde_json::from_str(&raw)?;
        debug!(href = %probe.href, ready_state = %probe.ready_state, "page settled");
        Ok(probe.status())
    }

    /// Bounds a load by the navigation timeout and folds errors into a failure.
    async fn timed_load(
        &self,
        what: &str,
        load: impl std::future::Future<Output = Result<LoadStatus>>,
    ) -> LoadStatus {
        let start = Instant::now();
        let status = match timeout(self.navigation_timeout, load).await {
            Ok(Ok(status)) => status,
            Ok(Err(err)) => LoadStatus::Failure(err.to_string()),
            Err(_) => LoadStatus::Failure(format!(
                "navigation timed out after {:?}",
                self.navigation_timeout
            )),
        };
        debug!(
            "{} finished in {:.1}s: {:?}",
            what,
            start.elapsed().as_secs_f32(),
            status
        );
        status
    }

    fn clip_rect(&self) -> ClipRect {
        ClipRect {
            x: 0.0,
            y: 0.0,
            width: f64::from(self.viewport.width),
            height: f64::from(self.viewport.height),
            scale: 1.0,
        }
    }

    async fn screenshot(&self, format: CaptureScreenshotFormat) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(format)
            .clip(self.clip_rect())
            .build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn print_pdf(&self) -> Result<Vec<u8>> {
        let params = PrintToPdfParams::builder()
            .print_background(true)
            .paper_width(f64::from(self.viewport.width) / CSS_PX_PER_INCH)
            .paper_height(f64::from(self.viewport.height) / CSS_PX_PER_INCH)
            .margin_top(0.0)
            .margin_bottom(0.0)
            .margin_left(0.0)
            .margin_right(0.0)
            .page_ranges("1")
            .build();
        Ok(self.page.pdf(params).await?)
    }
}

impl CapturePage for ChromePage {
    async fn open(&mut self, url: &str) -> LoadStatus {
        self.timed_load("open", self.navigate(url)).await
    }

    async fn reload(&mut self) -> LoadStatus {
        self.timed_load("reload", self.refresh()).await
    }

    async fn render(&mut self, background: &str, target: &RenderTarget) -> Result<()> {
        self.page.evaluate(background_script(background)?).await?;
        let bytes = match target.format {
            OutputFormat::Pdf => self.print_pdf().await?,
            OutputFormat::Jpeg => self.screenshot(CaptureScreenshotFormat::Jpeg).await?,
            OutputFormat::Webp => self.screenshot(CaptureScreenshotFormat::Webp).await?,
            other => other.encode_capture(self.screenshot(CaptureScreenshotFormat::Png).await?)?,
        };
        target.write(&bytes).await
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        self.relay.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_embedded_as_a_js_string() {
        assert_eq!(
            background_script("white").unwrap(),
            r#"if (document.body) { document.body.bgColor = "white"; }"#
        );
        assert_eq!(
            background_script(r#"red"; alert(1); ""#).unwrap(),
            r#"if (document.body) { document.body.bgColor = "red\"; alert(1); \""; }"#
        );
    }

    #[test]
    fn error_document_counts_as_failure() {
        let probe: PageProbe = serde_json::from_str(
            r#"{"href":"chrome-error://chromewebdata/","readyState":"complete"}"#,
        )
        .unwrap();
        assert!(matches!(probe.status(), LoadStatus::Failure(_)));
    }

    #[test]
    fn regular_document_counts_as_success() {
        let probe: PageProbe =
            serde_json::from_str(r#"{"href":"http://example.com/","readyState":"interactive"}"#)
                .unwrap();
        assert_eq!(probe.status(), LoadStatus::Success);
    }
}

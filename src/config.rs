use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::output::RenderTarget;
use crate::{CaptureError, Result, Viewport};

/// Number of positional arguments every invocation must supply.
pub const POSITIONAL_ARGS: usize = 9;

/// Delay before a failed page load is retried.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Default timeout for a single page open or reload.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable capture settings, parsed once at startup.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub url: String,
    /// Interval between renders (or between render and reload).
    pub delay: Duration,
    pub viewport: Viewport,
    pub verbose: bool,
    pub reload: bool,
    /// Output format exactly as given; becomes the file extension.
    pub format: String,
    /// CSS color assigned to the page body before every render.
    pub background: String,
    pub parent_id: String,
    pub output_dir: PathBuf,
    pub retry: RetryPolicy,
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// Consecutive failures tolerated before giving up; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts.is_some_and(|max| failures >= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub navigation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }
}

impl CaptureConfig {
    /// Builds a config from the positional invocation arguments, in order:
    /// url, delay, width, height, verbose, reload, format, background, parent id.
    ///
    /// Extra trailing arguments are ignored.
    pub fn from_positional<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.len() < POSITIONAL_ARGS {
            return Err(CaptureError::config(format!(
                "expected {} positional arguments, got {}",
                POSITIONAL_ARGS,
                args.len()
            )));
        }
        let arg = |i: usize| args[i].as_ref();

        let viewport = Viewport::from_dimensions(arg(2), arg(3))
            .map_err(|e| CaptureError::config(e.to_string()))?;

        Ok(Self {
            url: normalize_url(arg(0))?,
            delay: parse_delay(arg(1))?,
            viewport,
            verbose: parse_flag(arg(4)),
            reload: parse_flag(arg(5)),
            format: arg(6).to_string(),
            background: arg(7).to_string(),
            parent_id: arg(8).to_string(),
            output_dir: PathBuf::from("."),
            retry: RetryPolicy::default(),
            timeouts: Timeouts::default(),
        })
    }

    pub fn render_target(&self) -> RenderTarget {
        RenderTarget::new(&self.output_dir, &self.parent_id, &self.format)
    }
}

/// Only the literal `"true"` enables a flag.
pub fn parse_flag(value: &str) -> bool {
    value == "true"
}

/// Parses a delay in (possibly fractional) seconds.
pub fn parse_delay(value: &str) -> Result<Duration> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| CaptureError::config(format!("Invalid delay: {}", value)))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(CaptureError::config(format!(
            "Delay must be a positive number of seconds: {}",
            value
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| CaptureError::config(format!("Delay is too large: {}", value)))
}

/// Accepts bare hosts such as `example.com` by assuming `http://`.
pub fn normalize_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(url) => Ok(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Ok(Url::parse(&format!("http://{}", raw))?.to_string())
        }
        Err(e) => Err(e.into()),
    }
}

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sitecap_lib::{BrowserOptions, CaptureConfig, Result, RetryPolicy, Timeouts, Viewport};

pub const USAGE: &str = "usage: sitecap <url> <delay> <width> <height> <bool verbose> <bool reload> <picture format> <background color> <parent pid>";

#[derive(Parser, Debug)]
#[command(name = "sitecap")]
#[command(
    version,
    about = "Site Capture - Periodically screenshot a web page with headless Chromium",
    long_about = "Site Capture (sitecap)\n\nLoads <url> at <width>x<height> and rewrites screenshot.<parent pid>.<picture format> every <delay> seconds.\nWith <bool reload> set to \"true\" the page is reloaded before every render; otherwise the live page is re-rendered.\nA page that fails to load is reopened after the retry delay.",
    override_usage = "sitecap [OPTIONS] <url> <delay> <width> <height> <bool verbose> <bool reload> <picture format> <background color> <parent pid>"
)]
pub struct Cli {
    /// Positional capture arguments; checked for count before anything else runs.
    /// Values may start with `-` (a negative width is a bad value, not a flag),
    /// so options have to come before the first positional.
    #[arg(value_name = "ARGS", allow_hyphen_values = true, allow_negative_numbers = true)]
    pub positional: Vec<String>,

    #[arg(
        long,
        value_name = "N",
        help = "Give up after N consecutive failed page loads (retries forever if omitted)"
    )]
    pub max_retries: Option<u32>,

    #[arg(
        long,
        default_value = "10",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds to wait before reopening a page that failed to load"
    )]
    pub retry_delay: u64,

    #[arg(
        long,
        default_value = "30",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Navigation timeout (seconds) for each page open or reload"
    )]
    pub nav_timeout: u64,

    #[arg(
        long,
        value_name = "PATH",
        help = "Chrome/Chromium executable (auto-detected if omitted)"
    )]
    pub chrome: Option<PathBuf>,

    #[arg(long, help = "Show the browser window instead of running headless")]
    pub headful: bool,

    #[arg(
        long,
        value_name = "LEVEL",
        help = "Diagnostic log filter for stderr (trace, debug, info, warn, error); RUST_LOG is used if omitted"
    )]
    pub log_level: Option<String>,

    #[arg(
        long,
        default_value = ".",
        value_name = "PATH",
        help = "Directory the screenshot file is written into"
    )]
    pub output_dir: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}

impl Cli {
    pub fn has_all_positionals(&self) -> bool {
        self.positional.len() >= sitecap_lib::POSITIONAL_ARGS
    }

    pub fn capture_config(&self) -> Result<CaptureConfig> {
        let mut config = CaptureConfig::from_positional(self.positional.as_slice())?;
        config.output_dir = self.output_dir.clone();
        config.retry = RetryPolicy {
            delay: Duration::from_secs(self.retry_delay),
            max_attempts: self.max_retries,
        };
        config.timeouts = Timeouts {
            navigation: Duration::from_secs(self.nav_timeout),
        };
        Ok(config)
    }

    pub fn browser_options(&self, viewport: Viewport) -> BrowserOptions {
        BrowserOptions {
            executable: self.chrome.clone(),
            viewport,
            headless: !self.headful,
            ..BrowserOptions::default()
        }
    }
}

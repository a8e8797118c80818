mod cli;

use std::process::ExitCode;

use sitecap_lib::{
    stdout_sink, BrowserSession, CaptureConfig, CaptureLoop, ChromePage, Result,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status for invalid arguments and fatal capture errors.
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();

    if !args.has_all_positionals() {
        println!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    }

    init_tracing(args.log_level.as_deref());

    let config = match args.capture_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            println!("{}", cli::USAGE);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    match capture(&args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!("Hint: {}", err.remediation());
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn capture(args: &cli::Cli, config: CaptureConfig) -> Result<()> {
    if !config.render_target().format.is_known() {
        warn!(format = %config.format, "unrecognized output format; writing PNG data");
    }

    let session = BrowserSession::launch(&args.browser_options(config.viewport)).await?;
    let outcome = drive(&session, config).await;
    if let Err(err) = session.close().await {
        warn!("closing browser failed: {}", err);
    }
    outcome
}

async fn drive(session: &BrowserSession, config: CaptureConfig) -> Result<()> {
    let page = ChromePage::attach(
        session.new_page().await?,
        config.viewport,
        config.timeouts.navigation,
        config.verbose,
        stdout_sink(),
    )
    .await?;

    let shutdown = CancellationToken::new();
    let on_interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            on_interrupt.cancel();
        }
    });

    info!(url = %config.url, delay = ?config.delay, reload = config.reload, "starting capture");
    CaptureLoop::new(config, page, stdout_sink())
        .run(shutdown)
        .await
}

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use loadhtml_client::{BrowserFetcher, BrowserOptions};
use loadhtml_core::page::PageLoader;
use loadhtml_core::settle::SettleConfig;

#[derive(Parser, Debug)]
#[command(
    name = "loadhtml",
    version,
    about = "Load a page in a headless browser and print the rendered HTML"
)]
struct Cli {
    /// Target URL to load
    url: String,

    /// Navigation timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Upper bound in milliseconds on waiting for the page to stop
    /// mutating after load
    #[arg(long = "settle-ms", default_value_t = 2000)]
    settle_ms: u64,

    /// Override the User-Agent presented to the target server
    #[arg(long)]
    user_agent: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present (RUST_LOG, CHROME_BIN)
    let _ = dotenvy::dotenv();

    // Usage errors (missing URL, unexpected extra arguments) exit 2 here.
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // Setup tracing. stdout carries only the page markup, so all
    // diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("loadhtml=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut options = BrowserOptions {
        nav_timeout: Duration::from_secs(cli.timeout),
        settle: SettleConfig::new(Duration::from_millis(cli.settle_ms)),
        ..BrowserOptions::default()
    };
    if let Some(ua) = cli.user_agent {
        options.user_agent = ua;
    }

    let fetcher = BrowserFetcher::launch(options)
        .await
        .context("Failed to launch headless browser")?;

    let loader = PageLoader::new(fetcher.clone());
    let report = loader.load(&cli.url).await;

    // Rendered markup verbatim on success, the diagnostic line on failure.
    println!("{}", report.output);

    // Release the browser process before exiting, success or not.
    if let Err(err) = fetcher.close().await {
        tracing::warn!("Browser shutdown failed: {err}");
    }

    Ok(ExitCode::from(report.exit_code()))
}

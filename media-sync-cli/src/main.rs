//! media-sync: syncs photos and videos published through public Yandex.Disk,
//! Yandex 360 and Mail.ru Cloud links into WEEEK tasks, once per file.
//!
//! Configuration comes from the environment (a `.env` file is honoured);
//! links come from the command line, a file or stdin.

mod cli;
mod input;
mod report;
mod shutdown;

use anyhow::Context;
use clap::Parser;
use core_runtime::logging::{init_logging, LoggingConfig};
use core_service::{bootstrap_desktop, SyncConfig};

use cli::Cli;

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default().with_level(cli.log_level);
    if let Some(format) = cli.log_format {
        logging = logging.with_format(format);
    }
    if let Err(e) = init_logging(logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    // Read before signal handlers are installed so Ctrl+C still aborts input
    let urls = match input::collect_links(&cli.urls, cli.input.as_deref()) {
        Ok(urls) => urls,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let code = tokio::select! {
        result = run(&cli, &urls) => match result {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "Sync failed");
                eprintln!("Error: {:#}", e);
                1
            }
        },
        _ = shutdown::shutdown_requested() => {
            tracing::warn!("Interrupted, records created so far are kept");
            shutdown::INTERRUPTED_EXIT_CODE
        }
    };

    std::process::exit(code);
}

async fn run(cli: &Cli, urls: &[String]) -> anyhow::Result<()> {
    if urls.is_empty() {
        anyhow::bail!("No links given. Pass URLs as arguments, use --input, or pipe them on stdin.");
    }

    let config = SyncConfig::from_env().context("Invalid configuration")?;
    tracing::debug!(config = ?config, "Configuration loaded");

    let core = bootstrap_desktop(config)?;
    let report = core.run(urls, cli.dry_run).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render(&report));
    }

    Ok(())
}

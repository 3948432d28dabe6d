use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use postwatch::app::AppContext;
use postwatch::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.debug, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run {
            interval,
            retry_delay,
            page,
            no_initial_run,
        } => {
            let mut ctx = AppContext::load(cli.config.as_deref())?.with_page(page);
            if let Some(secs) = interval {
                ctx.config.daemon.poll_interval_secs = secs;
            }
            if let Some(secs) = retry_delay {
                ctx.config.daemon.retry_delay_secs = secs;
            }
            if no_initial_run {
                ctx.config.daemon.run_on_start = false;
            }
            commands::run_daemon(&ctx).await?;
        }
        Commands::Once { page } => {
            let ctx = AppContext::load(cli.config.as_deref())?.with_page(page);
            commands::run_once(&ctx).await?;
        }
        Commands::ParseTime { text } => {
            commands::parse_time(&text)?;
        }
    }

    Ok(())
}

fn init_tracing(debug: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(())
}

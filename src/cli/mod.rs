pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::daemon::DaemonConfig;

#[derive(Parser)]
#[command(name = "postwatch")]
#[command(about = "Watch a group feed and forward new posts", long_about = None)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file (default: ~/.config/postwatch/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in once, then poll the feed until interrupted
    Run {
        /// Time between cycles (e.g., "30s", "10m", "1h")
        #[arg(short, long, value_parser = DaemonConfig::parse_interval)]
        interval: Option<u64>,

        /// Time to wait after a failed cycle
        #[arg(long, value_parser = DaemonConfig::parse_interval)]
        retry_delay: Option<u64>,

        /// Page to watch, overriding config and PAGE_TO_SCRAPE
        #[arg(long)]
        page: Option<String>,

        /// Wait one interval before the first cycle
        #[arg(long)]
        no_initial_run: bool,
    },
    /// Run a single cycle and print what was delivered
    Once {
        /// Page to watch, overriding config and PAGE_TO_SCRAPE
        #[arg(long)]
        page: Option<String>,
    },
    /// Show the absolute time a relative phrase like "5m" resolves to
    ParseTime {
        text: String,
    },
}

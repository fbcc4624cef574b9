//! OpenTTD server helpers CLI
//!
//! Prepares a server's writable config directory, keeps its NewGRFs cached
//! and shares bans between servers.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use ottd_config::HelperSettings;

use cli::{Cli, Commands};
use commands::PreinitOptions;
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    let settings = HelperSettings::load_or_default(cli.settings.as_deref())?;

    match cli.command {
        Commands::Preinit {
            origin_config,
            destination,
            merge_bans,
            sync_newgrfs,
            break_stale_lock,
        } => {
            let options = PreinitOptions {
                origin_config,
                destination,
                merge_bans,
                sync_newgrfs,
                break_stale_lock,
            };
            commands::run_preinit(&settings, &options).await
        }
        Commands::SyncContent { config, content_dir } => {
            commands::run_sync_content(&settings, &config, &content_dir).await
        }
        Commands::MergeBans {
            config,
            ban_file,
            write_back,
        } => commands::run_merge_bans(&settings, &config, &ban_file, write_back),
        Commands::Sidecar {
            config,
            ban_file,
            interval,
            once,
        } => commands::run_sidecar(&settings, config, ban_file, interval, once).await,
    }
}

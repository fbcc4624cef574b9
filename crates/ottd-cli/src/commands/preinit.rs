//! Pre-start preparation of a server's writable config directory

use std::path::PathBuf;

use colored::Colorize;
use ottd_bans::BanListMerger;
use ottd_config::{HelperSettings, ServerConfig};
use ottd_fs::FileLock;

use super::content::{print_report, sync_into};
use crate::error::Result;

/// Name of the config file written into the destination directory.
pub const CONFIG_FILE_NAME: &str = "openttd.cfg";

#[derive(Debug, Clone)]
pub struct PreinitOptions {
    pub origin_config: PathBuf,
    pub destination: PathBuf,
    pub merge_bans: Option<PathBuf>,
    pub sync_newgrfs: bool,
    pub break_stale_lock: bool,
}

/// Run the preinit command
///
/// Nothing is written to the destination config unless every requested step
/// succeeds. Individual NewGRF failures do not count as step failures.
pub async fn run_preinit(settings: &HelperSettings, options: &PreinitOptions) -> Result<()> {
    let mut config = ServerConfig::load(&options.origin_config)?;

    if let Some(ban_file) = &options.merge_bans {
        tracing::info!(ban_file = %ban_file.display(), "Merging bans");
        if options.break_stale_lock {
            FileLock::break_stale(ban_file)?;
        }
        let merger = BanListMerger::new(ban_file).with_lock_options(settings.bans.lock_options());
        // Waiting on the lock blocks, so it stays off the runtime's workers.
        let (merged, bans) = tokio::task::spawn_blocking(move || {
            merger.merge_into_config(&mut config).map(|bans| (config, bans))
        })
        .await
        .map_err(ottd_bans::Error::from)??;
        config = merged;
        println!(
            "{} Merged {} bans from {}",
            "=>".blue().bold(),
            bans.len(),
            ban_file.display()
        );
    }

    if options.sync_newgrfs {
        tracing::info!("Synchronising NewGRFs");
        let content_dir = options.destination.join(&settings.content.download_dir);
        let report = sync_into(settings, &config, &content_dir).await?;
        print_report(&report);
    }

    let target = options.destination.join(CONFIG_FILE_NAME);
    config.save_to(&target)?;
    tracing::info!(path = %target.display(), "Work done, writable config saved");
    println!("{} Config saved to {}", "OK".green().bold(), target.display());
    Ok(())
}

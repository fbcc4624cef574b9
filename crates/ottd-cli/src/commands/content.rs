//! NewGRF synchronisation command
//!
//! Also used by `preinit --sync-newgrfs`.

use std::path::Path;

use colored::Colorize;
use ottd_config::{HelperSettings, ServerConfig};
use ottd_content::{ContentSource, ContentSynchronizer, ItemStatus, SyncReport};

use crate::error::Result;

/// Run the sync-content command
pub async fn run_sync_content(settings: &HelperSettings, config_path: &Path, content_dir: &Path) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    let report = sync_into(settings, &config, content_dir).await?;
    print_report(&report);
    Ok(())
}

/// Cache every NewGRF `config` needs under `content_dir`, creating it first
/// if necessary.
pub async fn sync_into(settings: &HelperSettings, config: &ServerConfig, content_dir: &Path) -> Result<SyncReport> {
    ensure_dir(content_dir)?;

    let source = ContentSource::from_settings(&settings.content)?;
    let synchronizer = ContentSynchronizer::for_cache_root(content_dir, source)?;
    Ok(synchronizer.synchronize(config).await?)
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        tracing::warn!(path = %path.display(), "Content download path does not exist, creating it");
        std::fs::create_dir_all(path).map_err(|e| ottd_fs::Error::io(path, e))?;
    }
    Ok(())
}

pub fn print_report(report: &SyncReport) {
    println!(
        "{} NewGRFs: {} downloaded, {} cached, {} failed",
        "=>".blue().bold(),
        report.downloaded(),
        report.cached(),
        report.failed()
    );

    for outcome in &report.outcomes {
        if let ItemStatus::Failed { reason } = &outcome.status {
            println!("   {} {}: {}", "!".red(), outcome.entry.cyan(), reason);
        }
    }
}

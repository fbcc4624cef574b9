//! Ban merge command

use std::path::Path;

use colored::Colorize;
use ottd_bans::BanListMerger;
use ottd_config::{HelperSettings, ServerConfig};

use crate::error::Result;

/// Run the merge-bans command
///
/// Merges `ban_file` into the config's `[bans]` section and saves the config
/// in place. With `write_back` the ban file receives the union too.
pub fn run_merge_bans(settings: &HelperSettings, config_path: &Path, ban_file: &Path, write_back: bool) -> Result<()> {
    let mut config = ServerConfig::load(config_path)?;
    let merger = BanListMerger::new(ban_file).with_lock_options(settings.bans.lock_options());

    let bans = if write_back {
        merger.reconcile(&mut config)?
    } else {
        merger.merge_into_config(&mut config)?
    };
    config.save_to(config_path)?;

    println!(
        "{} {} bans in {}",
        "OK".green().bold(),
        bans.len(),
        config_path.display()
    );
    Ok(())
}

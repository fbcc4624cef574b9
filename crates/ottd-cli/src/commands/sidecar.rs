//! Ban sidecar command

use std::path::PathBuf;

use colored::Colorize;
use ottd_bans::Sidecar;
use ottd_config::HelperSettings;

use crate::error::{CliError, Result};

/// Run the sidecar command
///
/// Command-line paths and interval override the helper settings. Without
/// `once` this runs until Ctrl-C.
pub async fn run_sidecar(
    settings: &HelperSettings,
    config: Option<PathBuf>,
    ban_file: Option<PathBuf>,
    interval: Option<u64>,
    once: bool,
) -> Result<()> {
    let mut sidecar_settings = settings.sidecar.clone();
    if let Some(config) = config {
        sidecar_settings.config_path = config;
    }
    if let Some(ban_file) = ban_file {
        sidecar_settings.ban_file = ban_file;
    }
    if let Some(secs) = interval {
        sidecar_settings.interval_secs = secs;
    }
    if sidecar_settings.interval_secs == 0 {
        return Err(CliError::user("Sidecar interval must be at least one second"));
    }

    let sidecar = Sidecar::from_settings(&sidecar_settings, &settings.bans);

    if once {
        let bans = tokio::task::spawn_blocking(move || sidecar.run_once())
            .await
            .map_err(ottd_bans::Error::from)??;
        println!(
            "{} {} bans in {}",
            "OK".green().bold(),
            bans.len(),
            sidecar_settings.ban_file.display()
        );
        return Ok(());
    }

    sidecar.run(shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C, running until killed: {}", e);
        std::future::pending::<()>().await;
    }
}

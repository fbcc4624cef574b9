//! Periodic export of a server's bans to the shared ban file
//!
//! Runs next to a game server: once at start, then on every tick, the
//! server's config is re-read and its `[bans]` section merged into the ban
//! file. A failed round is logged and the next tick tries again.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ottd_config::{BanSettings, SectionStore, ServerConfig, SidecarSettings};
use ottd_fs::LockOptions;
use tokio::time::MissedTickBehavior;

use crate::Result;
use crate::merger::BanListMerger;
use crate::set::BanSet;

/// Shortest interval between rounds. Shorter intervals, including zero, are
/// raised to this.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct Sidecar {
    config_path: PathBuf,
    merger: BanListMerger,
    interval: Duration,
}

impl Sidecar {
    pub fn new(config_path: impl Into<PathBuf>, ban_file: impl Into<PathBuf>, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            tracing::warn!(
                requested = ?interval,
                used = ?MIN_INTERVAL,
                "Sidecar interval too short, clamping"
            );
        }
        Self {
            config_path: config_path.into(),
            merger: BanListMerger::new(ban_file),
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn from_settings(sidecar: &SidecarSettings, bans: &BanSettings) -> Self {
        Self::new(&sidecar.config_path, &sidecar.ban_file, sidecar.interval())
            .with_lock_options(bans.lock_options())
    }

    pub fn with_lock_options(mut self, lock_options: LockOptions) -> Self {
        self.merger = self.merger.with_lock_options(lock_options);
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One round: reload the config and merge its bans into the ban file.
    pub fn run_once(&self) -> Result<BanSet> {
        let config = ServerConfig::load(&self.config_path)?;
        tracing::info!(
            server = config.server_name().as_deref().unwrap_or("<unnamed>"),
            "Reading the bans from the server config"
        );
        self.merger.merge_into_file(&config)
    }

    /// Run rounds until `shutdown` completes.
    ///
    /// The first round starts immediately. A round in progress is always
    /// finished before shutdown is observed, so the lock is never abandoned.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        tracing::info!(
            config = %self.config_path.display(),
            ban_file = %self.merger.ban_file().display(),
            interval_secs = self.interval.as_secs(),
            "Ban sidecar started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.round().await,
            }
        }

        tracing::info!("Ban sidecar stopped");
    }

    async fn round(&self) {
        let this = self.clone();
        match tokio::task::spawn_blocking(move || this.run_once()).await {
            Ok(Ok(bans)) => tracing::debug!(bans = bans.len(), "Sidecar round complete"),
            Ok(Err(e)) => tracing::error!("Sidecar round failed: {}", e),
            Err(e) => tracing::error!("Sidecar round aborted: {}", e),
        }
    }
}

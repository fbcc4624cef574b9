//! Lock-guarded merges between a server config and a shared ban file
//!
//! Every merge takes the ban file's lock, reads both sides, computes the
//! union and writes its target(s) before the lock is released. The lock is
//! released on every exit path, including errors.

use std::path::{Path, PathBuf};

use ottd_config::{BANS_SECTION, SectionStore};
use ottd_fs::{FileLock, LockOptions};

use crate::Result;
use crate::set::BanSet;

/// Merges ban lists in either direction under the ban file's lock.
#[derive(Debug, Clone)]
pub struct BanListMerger {
    ban_file: PathBuf,
    lock_options: LockOptions,
}

impl BanListMerger {
    pub fn new(ban_file: impl Into<PathBuf>) -> Self {
        Self {
            ban_file: ban_file.into(),
            lock_options: LockOptions::default(),
        }
    }

    pub fn with_lock_options(mut self, lock_options: LockOptions) -> Self {
        self.lock_options = lock_options;
        self
    }

    pub fn ban_file(&self) -> &Path {
        &self.ban_file
    }

    /// Merge the ban file into the config's `[bans]` section.
    ///
    /// Returns the merged set. The section is rewritten to exactly that set;
    /// saving the config is the caller's job.
    ///
    /// # Errors
    ///
    /// Fails if the lock cannot be taken, the ban file cannot be read, or
    /// the merged keys cannot be stored. The config is left untouched in all
    /// of these cases.
    pub fn merge_into_config(&self, config: &mut impl SectionStore) -> Result<BanSet> {
        self.locked(|| {
            tracing::info!(
                server = config.server_name().as_deref().unwrap_or("<unnamed>"),
                ban_file = %self.ban_file.display(),
                "Merging ban file into server config"
            );

            let external = BanSet::from_lines(&ottd_fs::io::read_text(&self.ban_file)?);
            let merged = config_bans(&*config).union(&external);
            config.replace_section(BANS_SECTION, &merged.to_keys())?;

            tracing::info!(bans = merged.len(), "Bans written to the server config");
            Ok(merged)
        })
    }

    /// Merge the config's `[bans]` section into the ban file.
    ///
    /// A missing ban file counts as empty and is created.
    pub fn merge_into_file(&self, config: &impl SectionStore) -> Result<BanSet> {
        self.locked(|| {
            let merged = config_bans(config).union(&self.read_ban_file_or_empty()?);
            self.write_ban_file(&merged)?;
            Ok(merged)
        })
    }

    /// Merge in both directions at once: afterwards the config section and
    /// the ban file both hold the union.
    pub fn reconcile(&self, config: &mut impl SectionStore) -> Result<BanSet> {
        self.locked(|| {
            let merged = config_bans(&*config).union(&self.read_ban_file_or_empty()?);
            config.replace_section(BANS_SECTION, &merged.to_keys())?;
            self.write_ban_file(&merged)?;
            Ok(merged)
        })
    }

    fn locked<T>(&self, critical: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = FileLock::acquire_with(&self.ban_file, self.lock_options)?;
        let result = critical();
        settle(result, lock.release())
    }

    fn read_ban_file_or_empty(&self) -> Result<BanSet> {
        match ottd_fs::io::read_text_if_exists(&self.ban_file)? {
            Some(text) => Ok(BanSet::from_lines(&text)),
            None => {
                tracing::debug!(path = %self.ban_file.display(), "No ban file yet");
                Ok(BanSet::new())
            }
        }
    }

    fn write_ban_file(&self, bans: &BanSet) -> Result<()> {
        ottd_fs::io::write_atomic(&self.ban_file, bans.to_file_contents().as_bytes())?;
        tracing::info!(
            bans = bans.len(),
            path = %self.ban_file.display(),
            "Bans written to the ban file"
        );
        Ok(())
    }
}

/// Combine the merge outcome with the lock release.
///
/// A merge error wins over a release error, which is only logged.
fn settle<T>(result: Result<T>, released: ottd_fs::Result<()>) -> Result<T> {
    match (result, released) {
        (Ok(value), released) => {
            released?;
            Ok(value)
        }
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release_error)) => {
            tracing::error!(
                error = %release_error,
                "Failed to release ban file lock after a failed merge"
            );
            Err(e)
        }
    }
}

fn config_bans(config: &impl SectionStore) -> BanSet {
    config.section_keys(BANS_SECTION).into_iter().collect()
}

/// Merge `ban_file` into `config` with default lock options.
pub fn merge_ban_list_into_config(config: &mut impl SectionStore, ban_file: &Path) -> Result<BanSet> {
    BanListMerger::new(ban_file).merge_into_config(config)
}

/// Merge `config`'s bans into `ban_file` with default lock options.
pub fn merge_config_bans_into_file(config: &impl SectionStore, ban_file: &Path) -> Result<BanSet> {
    BanListMerger::new(ban_file).merge_into_file(config)
}

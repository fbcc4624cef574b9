//! Advisory lock files guarding a shared target file
//!
//! The lock for `bans.txt` is the zero-byte marker `bans.txt.lock`. A process
//! holds the lock for as long as its marker exists; every cooperating process
//! polls until the marker is gone and then creates its own. Creation uses
//! `create_new`, so two pollers that observe the marker vanish at the same
//! moment cannot both win.
//!
//! The holder also keeps an OS advisory lock (`fs2`) on its marker. That lock
//! dies with the process, which lets a waiter configured with
//! [`LockOptions::reclaim_stale`] tell a crashed holder apart from a live one.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use backoff::backoff::Constant;
use fs2::FileExt;

use crate::{Error, Result, io};

/// Suffix appended to the guarded file's name to form the marker path.
pub const LOCK_SUFFIX: &str = ".lock";

/// Interval between checks while another process holds the lock.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Tuning for lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    /// How long to sleep between attempts while the marker exists.
    pub poll_interval: Duration,
    /// Give up after this long. `None` waits indefinitely.
    ///
    /// The deadline is checked once per poll, so the effective wait rounds
    /// up to the next multiple of `poll_interval`.
    pub timeout: Option<Duration>,
    /// Remove markers whose holder no longer has them locked at the OS level.
    ///
    /// Only safe when every participant is an `ottd-fs` lock holder: a marker
    /// written by a tool that does not take the OS lock looks abandoned.
    pub reclaim_stale: bool,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            reclaim_stale: false,
        }
    }
}

impl LockOptions {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_reclaim_stale(mut self, reclaim_stale: bool) -> Self {
        self.reclaim_stale = reclaim_stale;
        self
    }
}

/// Marker path guarding `target`: the target's full path with `.lock` appended.
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

/// A held lock on a target file.
///
/// The marker is removed when the guard is dropped, on every exit path.
/// Use [`FileLock::release`] to observe a failure to remove it.
#[derive(Debug)]
pub struct FileLock {
    marker: PathBuf,
    handle: Option<File>,
}

enum Attempt {
    Held,
    Abort(Error),
}

impl FileLock {
    /// Acquire the lock for `target` with default options.
    ///
    /// Blocks, polling every two seconds, for as long as another process
    /// holds the lock.
    pub fn acquire(target: &Path) -> Result<Self> {
        Self::acquire_with(target, LockOptions::default())
    }

    /// Acquire the lock for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] if `options.timeout` elapses, or an I/O
    /// error if the marker cannot be created for a reason other than already
    /// existing. Contention alone is never an error.
    pub fn acquire_with(target: &Path, options: LockOptions) -> Result<Self> {
        let marker = lock_path_for(target);
        let started = Instant::now();

        let attempt = || -> std::result::Result<File, backoff::Error<Attempt>> {
            if let Some(handle) = try_create(&marker).map_err(abort)? {
                return Ok(handle);
            }

            if options.reclaim_stale
                && reclaim_abandoned(&marker).map_err(abort)?
                && let Some(handle) = try_create(&marker).map_err(abort)?
            {
                return Ok(handle);
            }

            if let Some(limit) = options.timeout
                && started.elapsed() >= limit
            {
                return Err(abort(Error::LockTimeout {
                    path: marker.clone(),
                    waited: started.elapsed(),
                }));
            }

            Err(backoff::Error::transient(Attempt::Held))
        };

        let mut waits = 0u32;
        let notify = |_: Attempt, wait: Duration| {
            waits += 1;
            if waits == 1 {
                tracing::warn!(
                    lock = %marker.display(),
                    "Locked by another process, waiting for the lock to be released"
                );
            } else {
                tracing::debug!(lock = %marker.display(), ?wait, attempt = waits, "Still waiting for lock");
            }
        };

        let handle = backoff::retry_notify(Constant::new(options.poll_interval), attempt, notify)
            .map_err(|e| match e {
                backoff::Error::Permanent(Attempt::Abort(err)) => err,
                _ => Error::LockFailed {
                    path: marker.clone(),
                },
            })?;

        tracing::debug!(lock = %marker.display(), "Lock acquired");
        Ok(Self {
            marker,
            handle: Some(handle),
        })
    }

    /// Remove a leftover marker for `target` without waiting.
    ///
    /// Intended for start-up, when the caller knows no cooperating process
    /// can be mid-write. Returns whether a marker was removed.
    pub fn break_stale(target: &Path) -> Result<bool> {
        let marker = lock_path_for(target);
        let removed = io::remove_if_exists(&marker)?;
        if removed {
            tracing::warn!(lock = %marker.display(), "Removed leftover lock");
        }
        Ok(removed)
    }

    /// Whether a marker currently exists for `target`.
    pub fn is_locked(target: &Path) -> bool {
        lock_path_for(target).exists()
    }

    /// Path of the marker held by this guard.
    pub fn marker_path(&self) -> &Path {
        &self.marker
    }

    /// Release the lock, surfacing a failure to remove the marker.
    pub fn release(mut self) -> Result<()> {
        self.remove_marker()
    }

    fn remove_marker(&mut self) -> Result<()> {
        // Unlinking before dropping the OS lock keeps a reclaiming waiter
        // from deleting a marker that a third process has just created.
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let removed = io::remove_if_exists(&self.marker);
        drop(handle);
        removed?;
        tracing::debug!(lock = %self.marker.display(), "Lock released");
        Ok(())
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.remove_marker() {
            tracing::error!("Failed to release lock {}: {}", self.marker.display(), e);
        }
    }
}

fn abort(err: Error) -> backoff::Error<Attempt> {
    backoff::Error::permanent(Attempt::Abort(err))
}

/// Create the marker if nobody holds it. `Ok(None)` means it already exists.
fn try_create(marker: &Path) -> Result<Option<File>> {
    match OpenOptions::new().write(true).create_new(true).open(marker) {
        Ok(handle) => {
            if let Err(e) = handle.try_lock_exclusive() {
                tracing::debug!(lock = %marker.display(), "OS lock unavailable on marker: {}", e);
            }
            Ok(Some(handle))
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(Error::io(marker, e)),
    }
}

/// Remove `marker` if no live process holds its OS lock.
fn reclaim_abandoned(marker: &Path) -> Result<bool> {
    match OpenOptions::new().read(true).write(true).open(marker) {
        Ok(handle) => reclaim_if_unlocked(marker, handle),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(marker, e)),
    }
}

fn reclaim_if_unlocked(marker: &Path, handle: File) -> Result<bool> {
    if handle.try_lock_exclusive().is_err() {
        return Ok(false);
    }

    // The marker may have been released and recreated by a live holder
    // between our open and our lock. Only the file we locked may be removed.
    if !names_same_file(marker, &handle)? {
        tracing::debug!(lock = %marker.display(), "Marker replaced while reclaiming, leaving it");
        return Ok(false);
    }

    tracing::warn!(lock = %marker.display(), "Reclaiming lock abandoned by a dead process");
    io::remove_if_exists(marker)?;
    drop(handle);
    Ok(true)
}

/// Whether `marker` still names the file behind `handle`.
#[cfg(unix)]
fn names_same_file(marker: &Path, handle: &File) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = handle.metadata().map_err(|e| Error::io(marker, e))?;
    match std::fs::metadata(marker) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(marker, e)),
    }
}

/// Open files cannot be unlinked here, so an open marker is never replaced.
#[cfg(not(unix))]
fn names_same_file(marker: &Path, _handle: &File) -> Result<bool> {
    Ok(marker.exists())
}

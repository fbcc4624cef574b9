//! Settings for the helpers themselves
//!
//! Loaded from an optional TOML file. Every field has a default, so an empty
//! file (or no file at all) reproduces the stock behaviour:
//!
//! ```toml
//! [content]
//! cdn_url = "https://bananas.cdn.openttd.org"
//! user_agent = "BaNaNaSync/1.0"
//! download_dir = "content_download/newgrf"
//!
//! [bans]
//! poll_interval_secs = 2
//!
//! [sidecar]
//! interval_secs = 60
//! config_path = "openttd.cfg"
//! ban_file = "bans.txt"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use ottd_fs::LockOptions;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default origin of the content CDN.
pub const DEFAULT_CDN_URL: &str = "https://bananas.cdn.openttd.org";

/// `User-Agent` sent with every content download.
pub const DEFAULT_USER_AGENT: &str = "BaNaNaSync/1.0";

/// Content cache location, relative to the server's config directory.
pub const DEFAULT_DOWNLOAD_DIR: &str = "content_download/newgrf";

/// All helper settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperSettings {
    pub content: ContentSettings,
    pub bans: BanSettings,
    pub sidecar: SidecarSettings,
}

/// Where and how NewGRFs are downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    pub cdn_url: String,
    pub user_agent: String,
    /// Per-request timeout. Unset means requests may take as long as they need.
    pub request_timeout_secs: Option<u64>,
    pub download_dir: PathBuf,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            cdn_url: DEFAULT_CDN_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
        }
    }
}

impl ContentSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// How ban list merges wait on the shared lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BanSettings {
    pub poll_interval_secs: u64,
    /// Unset means wait for the lock indefinitely.
    pub lock_timeout_secs: Option<u64>,
    pub reclaim_stale_locks: bool,
}

impl Default for BanSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            lock_timeout_secs: None,
            reclaim_stale_locks: false,
        }
    }
}

impl BanSettings {
    /// Lock options matching these settings.
    pub fn lock_options(&self) -> LockOptions {
        LockOptions {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: self.lock_timeout_secs.map(Duration::from_secs),
            reclaim_stale: self.reclaim_stale_locks,
        }
    }
}

/// Schedule and file locations for the ban sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidecarSettings {
    pub interval_secs: u64,
    pub config_path: PathBuf,
    pub ban_file: PathBuf,
}

impl Default for SidecarSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            config_path: PathBuf::from("openttd.cfg"),
            ban_file: PathBuf::from("bans.txt"),
        }
    }
}

impl SidecarSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl HelperSettings {
    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not match the
    /// settings schema.
    pub fn load(path: &Path) -> Result<Self> {
        let content = ottd_fs::io::read_text(path)?;
        toml::from_str(&content).map_err(|e| Error::SettingsParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load settings from `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading helper settings");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }
}

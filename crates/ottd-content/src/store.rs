//! Filesystem-backed NewGRF cache
//!
//! Each cached item is `<root>/<cache_key>.tar`. Existence of that file is
//! the only signal that an item is present; nothing checks age or contents.
//! Writes go to a hidden sibling first and are renamed into place once
//! complete, so an interrupted download never looks like a cached item.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::{Error, Result};

/// Extension of cached archives.
pub const ENTRY_EXTENSION: &str = "tar";

/// A directory of cached NewGRF archives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path of the archive for `cache_key`.
    pub fn entry_path(&self, cache_key: &str) -> PathBuf {
        self.root.join(format!("{cache_key}.{ENTRY_EXTENSION}"))
    }

    /// Whether `cache_key` is already cached.
    pub fn contains(&self, cache_key: &str) -> bool {
        self.entry_path(cache_key).is_file()
    }

    /// Store `content` as the archive for `cache_key`.
    pub fn write(&self, cache_key: &str, content: &[u8]) -> Result<()> {
        ottd_fs::io::write_atomic(&self.entry_path(cache_key), content)?;
        Ok(())
    }

    /// Stream `reader` into the archive for `cache_key`.
    ///
    /// Returns the number of bytes written. On failure the partial file is
    /// removed and the item stays absent.
    pub async fn write_stream<R>(&self, cache_key: &str, reader: R) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let dest = self.entry_path(cache_key);
        let staging = ottd_fs::io::temp_sibling(&dest, "part");

        let result = stream_to(&staging, cache_key, reader).await;
        let written = match result {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = ottd_fs::io::remove_if_exists(&staging) {
                    tracing::warn!("Failed to remove partial download: {}", cleanup);
                }
                return Err(e);
            }
        };

        tokio::fs::rename(&staging, &dest)
            .await
            .map_err(|e| ottd_fs::Error::io(&dest, e))?;
        Ok(written)
    }
}

async fn stream_to<R>(staging: &Path, cache_key: &str, mut reader: R) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut out = tokio::fs::File::create(staging)
        .await
        .map_err(|e| ottd_fs::Error::io(staging, e))?;

    let transfer = |source| Error::Transfer {
        cache_key: cache_key.to_string(),
        source,
    };

    let written = tokio::io::copy(&mut reader, &mut out).await.map_err(transfer)?;
    out.flush().await.map_err(transfer)?;
    out.sync_all().await.map_err(transfer)?;
    Ok(written)
}

//! Fan-out synchronisation of every required NewGRF
//!
//! One task is spawned per `[newgrf]` entry and the call returns once all of
//! them have finished. Tasks share nothing but the fetcher and the cache
//! directory, and each writes a different cache key.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use ottd_config::{NEWGRF_SECTION, SectionStore};

use crate::fetcher::{ContentSource, Fetcher};
use crate::item::RequiredContentItem;
use crate::store::ContentStore;
use crate::{Error, Result};

/// What happened to one `[newgrf]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// Already in the cache, nothing downloaded.
    Cached,
    /// Downloaded and stored.
    Downloaded { bytes: u64 },
    /// Could not be synchronised this time. The item stays absent.
    Failed { reason: String },
}

/// Outcome for one configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    /// The raw `[newgrf]` key.
    pub entry: String,
    /// Cache key, if the entry could be parsed.
    pub cache_key: Option<String>,
    pub status: ItemStatus,
}

/// Report from a synchronisation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Per-entry outcomes. Entries that could not be parsed come first.
    pub outcomes: Vec<ItemOutcome>,
}

impl SyncReport {
    pub fn cached(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Cached))
    }

    pub fn downloaded(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Downloaded { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed { .. }))
    }

    /// True if every entry is now cached.
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    /// Outcome for a given cache key.
    pub fn get(&self, cache_key: &str) -> Option<&ItemOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.cache_key.as_deref() == Some(cache_key))
    }

    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Keeps a [`ContentStore`] in line with a server's `[newgrf]` section.
#[derive(Debug, Clone)]
pub struct ContentSynchronizer {
    fetcher: Arc<Fetcher>,
    store: ContentStore,
}

impl ContentSynchronizer {
    pub fn new(fetcher: Fetcher, store: ContentStore) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store,
        }
    }

    /// Synchroniser for the cache at `cache_root`, downloading from `source`.
    pub fn for_cache_root(cache_root: impl Into<PathBuf>, source: ContentSource) -> Result<Self> {
        Ok(Self::new(Fetcher::new(source)?, ContentStore::new(cache_root)))
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Make sure every NewGRF required by `config` is cached.
    ///
    /// Individual failures are logged and recorded in the report; they never
    /// stop the other items or turn into an error here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheRootMissing`] if the cache directory does not
    /// exist. Creating it is the caller's job.
    pub async fn synchronize(&self, config: &impl SectionStore) -> Result<SyncReport> {
        tracing::info!(
            server = config.server_name().as_deref().unwrap_or("<unnamed>"),
            "Reading the NewGRFs from the server config"
        );

        if !self.store.root().is_dir() {
            return Err(Error::CacheRootMissing {
                path: self.store.root().to_path_buf(),
            });
        }

        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        let mut outcomes = Vec::new();

        for entry in config.section_keys(NEWGRF_SECTION) {
            let item = match entry.parse::<RequiredContentItem>() {
                Ok(item) => item,
                Err(e) => {
                    tracing::error!("Skipping NewGRF entry: {}", e);
                    outcomes.push(ItemOutcome {
                        entry,
                        cache_key: None,
                        status: ItemStatus::Failed {
                            reason: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            if !seen.insert(item.cache_key().to_string()) {
                tracing::debug!(cache_key = item.cache_key(), "Duplicate NewGRF entry ignored");
                continue;
            }

            let fetcher = Arc::clone(&self.fetcher);
            let store = self.store.clone();
            let task_item = item.clone();
            let handle = tokio::spawn(async move { sync_item(&fetcher, &store, &task_item).await });
            pending.push((entry, item, handle));
        }

        for (entry, item, handle) in pending {
            let status = handle.await.unwrap_or_else(|e| {
                tracing::error!(cache_key = item.cache_key(), "NewGRF task aborted: {}", e);
                ItemStatus::Failed {
                    reason: e.to_string(),
                }
            });
            outcomes.push(ItemOutcome {
                entry,
                cache_key: Some(item.cache_key().to_string()),
                status,
            });
        }

        let report = SyncReport { outcomes };
        tracing::info!(
            downloaded = report.downloaded(),
            cached = report.cached(),
            failed = report.failed(),
            "NewGRFs synchronised"
        );
        Ok(report)
    }
}

async fn sync_item(fetcher: &Fetcher, store: &ContentStore, item: &RequiredContentItem) -> ItemStatus {
    let cache_key = item.cache_key();
    tracing::debug!(cache_key, "Processing NewGRF");

    if store.contains(cache_key) {
        tracing::debug!(cache_key, "NewGRF available, nothing to download");
        return ItemStatus::Cached;
    }

    tracing::info!(cache_key, "NewGRF is not available, downloading");
    match fetcher.fetch(item, store).await {
        Ok(bytes) => {
            tracing::info!(cache_key, bytes, "Successfully downloaded NewGRF");
            ItemStatus::Downloaded { bytes }
        }
        Err(e) => {
            tracing::error!(cache_key, "Problem downloading NewGRF from BaNaNaS: {}", e);
            ItemStatus::Failed {
                reason: e.to_string(),
            }
        }
    }
}

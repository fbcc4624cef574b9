//! NewGRF content synchronisation
//!
//! Makes sure every NewGRF listed in a server's `[newgrf]` section is present
//! in the local content cache, downloading missing ones from BaNaNaS.
//!
//! ```text
//!   [newgrf] section ──> ContentSynchronizer ──> Fetcher (one task per item)
//!                                                    │
//!                                   gzip stream ──> ContentStore (<name>.tar)
//! ```
//!
//! Items are synchronised independently: a failed download is logged and
//! recorded in the [`SyncReport`], and the remaining items carry on. A cached
//! item is never downloaded again, so re-running is the retry mechanism.

pub mod error;
pub mod fetcher;
pub mod item;
pub mod store;
pub mod synchronizer;

pub use error::{Error, Result};
pub use fetcher::{ContentSource, Fetcher};
pub use item::RequiredContentItem;
pub use store::ContentStore;
pub use synchronizer::{ContentSynchronizer, ItemOutcome, ItemStatus, SyncReport};

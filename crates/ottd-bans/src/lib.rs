//! Ban list reconciliation
//!
//! A server's `[bans]` section and a ban file shared between servers are
//! merged into their deduplicated union. Every merge runs under the ban
//! file's [`ottd_fs::FileLock`], so a server reading bans at start-up and a
//! sidecar writing them never interleave.
//!
//! - [`BanListMerger::merge_into_config`]: file → config (server start-up)
//! - [`BanListMerger::merge_into_file`]: config → file (periodic sidecar)
//! - [`BanListMerger::reconcile`]: both directions in one critical section

pub mod error;
pub mod merger;
pub mod set;
pub mod sidecar;

pub use error::{Error, Result};
pub use merger::{BanListMerger, merge_ban_list_into_config, merge_config_bans_into_file};
pub use set::BanSet;
pub use sidecar::Sidecar;

//! Command implementations for ottd-cli

pub mod bans;
pub mod content;
pub mod preinit;
pub mod sidecar;

pub use bans::run_merge_bans;
pub use content::run_sync_content;
pub use preinit::{PreinitOptions, run_preinit};
pub use sidecar::run_sidecar;

//! Configuration for the OpenTTD server helpers
//!
//! Two kinds of configuration live here:
//!
//! - **Server configuration**: the game server's `openttd.cfg`, seen through
//!   the [`SectionStore`] abstraction. The helpers only ever enumerate the key
//!   names of a section, replace a section wholesale, or read a scalar.
//! - **Helper settings**: the helpers' own TOML settings ([`HelperSettings`]),
//!   covering the content CDN, lock polling and the sidecar schedule.

pub mod error;
pub mod settings;
pub mod store;

pub use error::{Error, Result};
pub use settings::{BanSettings, ContentSettings, HelperSettings, SidecarSettings};
pub use store::{
    BANS_SECTION, NETWORK_SECTION, NEWGRF_SECTION, SERVER_NAME_KEY, SectionStore, ServerConfig,
};

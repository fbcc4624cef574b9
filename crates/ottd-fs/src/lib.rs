//! Filesystem primitives for the OpenTTD server helpers
//!
//! Provides the advisory lock files that serialise access to shared ban
//! lists, and the atomic write helpers used wherever a half-written file
//! would be mistaken for a complete one.

pub mod error;
pub mod io;
pub mod lock;

pub use error::{Error, Result};
pub use lock::{FileLock, LockOptions, lock_path_for};

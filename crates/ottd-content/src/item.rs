//! Required NewGRF entries as listed in the server configuration

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// One NewGRF the server needs, parsed from a `[newgrf]` key of the form
/// `id|hash|name[/version]`.
///
/// `id` and `content_hash` only address the download; `display_name` (the
/// name with any `/version` suffix dropped) is the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequiredContentItem {
    id: String,
    content_hash: String,
    display_name: String,
}

impl RequiredContentItem {
    pub fn new(
        id: impl Into<String>,
        content_hash: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Self> {
        let item = Self {
            id: id.into(),
            content_hash: content_hash.into(),
            display_name: display_name.into(),
        };
        item.validate()?;
        Ok(item)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Name of the cache entry, without the `.tar` extension.
    pub fn cache_key(&self) -> &str {
        &self.display_name
    }

    /// Path of the archive on the CDN, relative to its origin.
    ///
    /// The id and hash are case-insensitive and always sent lower-cased.
    pub fn remote_path(&self) -> String {
        format!(
            "newgrf/{}/{}/{}.tar.gz",
            self.id.to_lowercase(),
            self.content_hash.to_lowercase(),
            self.display_name
        )
    }

    fn validate(&self) -> Result<()> {
        let reason = if self.id.is_empty() {
            "empty id"
        } else if self.content_hash.is_empty() {
            "empty content hash"
        } else if self.display_name.is_empty() {
            "empty name"
        } else if matches!(self.display_name.as_str(), "." | "..")
            || self.display_name.contains(['/', '\\'])
        {
            "name is not a plain file name"
        } else {
            return Ok(());
        };

        Err(Error::MalformedEntry {
            entry: self.to_string(),
            reason: reason.to_string(),
        })
    }
}

impl FromStr for RequiredContentItem {
    type Err = Error;

    fn from_str(entry: &str) -> Result<Self> {
        let fields: Vec<&str> = entry.split('|').collect();
        let [id, hash, name_info] = fields.as_slice() else {
            return Err(Error::MalformedEntry {
                entry: entry.to_string(),
                reason: format!("expected 3 '|'-separated fields, found {}", fields.len()),
            });
        };

        let display_name = name_info.split('/').next().unwrap_or_default();

        Self::new(*id, *hash, display_name).map_err(|e| match e {
            Error::MalformedEntry { reason, .. } => Error::MalformedEntry {
                entry: entry.to_string(),
                reason,
            },
            other => other,
        })
    }
}

impl fmt::Display for RequiredContentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.id, self.content_hash, self.display_name)
    }
}

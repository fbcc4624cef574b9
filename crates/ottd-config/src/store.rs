//! Sectioned key-value access to the server configuration

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{EscapePolicy, Ini, WriteOption};

use crate::{Error, Result};

/// Section whose key names list the required NewGRFs as `id|hash|name[/version]`.
pub const NEWGRF_SECTION: &str = "newgrf";

/// Section whose key names are banned clients. Values are unused.
pub const BANS_SECTION: &str = "bans";

/// Section holding the server's network identity.
pub const NETWORK_SECTION: &str = "network";

/// Key under [`NETWORK_SECTION`] naming the server.
pub const SERVER_NAME_KEY: &str = "server_name";

/// The subset of a sectioned configuration the helpers rely on.
pub trait SectionStore {
    /// Key names of `section` in file order. A missing section has none.
    fn section_keys(&self, section: &str) -> Vec<String>;

    /// Value stored under `section.key`.
    fn value(&self, section: &str, key: &str) -> Option<String>;

    /// Drop `section` and recreate it with one valueless key per entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if an entry cannot be represented as a
    /// key. The section is left untouched in that case.
    fn replace_section(&mut self, section: &str, keys: &[String]) -> Result<()>;

    /// The server's display name, for log messages only.
    fn server_name(&self) -> Option<String> {
        self.value(NETWORK_SECTION, SERVER_NAME_KEY)
    }
}

/// An `openttd.cfg` held in memory.
///
/// Changes are only written out by [`ServerConfig::save_to`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    ini: Ini,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self { ini: Ini::new() }
    }

    /// Load the configuration from an INI file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid INI.
    pub fn load(path: &Path) -> Result<Self> {
        let content = ottd_fs::io::read_text(path)?;
        Self::parse_at(&content, path.to_path_buf())
    }

    fn parse_at(content: &str, path: PathBuf) -> Result<Self> {
        let ini = Ini::load_from_str(content).map_err(|e| Error::ConfigParse {
            path,
            message: e.to_string(),
        })?;
        Ok(Self { ini })
    }

    /// Render the configuration as INI text.
    ///
    /// Separators and comment markers inside keys and values are
    /// backslash-escaped, so IPv6 addresses and bracketed client names are
    /// read back unchanged.
    pub fn to_ini_string(&self) -> Result<String> {
        let options = WriteOption {
            escape_policy: EscapePolicy::Reserved,
            ..WriteOption::default()
        };
        let mut buffer = Vec::new();
        self.ini
            .write_to_opt(&mut buffer, options)
            .map_err(Error::Serialize)?;
        let rendered = String::from_utf8_lossy(&buffer);
        Ok(rendered.split_inclusive('\n').map(escape_leading_bracket).collect())
    }

    /// Write the configuration to `path` atomically.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = self.to_ini_string()?;
        ottd_fs::io::write_atomic(path, content.as_bytes())?;
        tracing::debug!(path = %path.display(), "Saved server config");
        Ok(())
    }
}

impl FromStr for ServerConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_at(s, PathBuf::from("<memory>"))
    }
}

impl SectionStore for ServerConfig {
    fn section_keys(&self, section: &str) -> Vec<String> {
        self.ini
            .section(Some(section))
            .map(|props| props.iter().map(|(key, _)| key.to_string()).collect())
            .unwrap_or_default()
    }

    fn value(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get_from(Some(section), key).map(str::to_string)
    }

    fn replace_section(&mut self, section: &str, keys: &[String]) -> Result<()> {
        if let Some(bad) = keys.iter().find(|key| !is_storable_key(key)) {
            return Err(Error::InvalidKey {
                section: section.to_string(),
                key: bad.clone(),
            });
        }

        self.ini.delete(Some(section));
        for key in keys {
            self.ini.with_section(Some(section)).set(key.as_str(), "");
        }
        Ok(())
    }
}

/// A key survives a write/read cycle if it is non-blank and single-line.
fn is_storable_key(key: &str) -> bool {
    !key.trim().is_empty() && !key.contains(['\n', '\r'])
}

/// A key line starting with `[` would be read back as a section header.
///
/// Key lines are told apart from headers by their unescaped `=`.
fn escape_leading_bracket(line: &str) -> String {
    if line.starts_with('[') && has_unescaped_separator(line) {
        format!("\\{line}")
    } else {
        line.to_string()
    }
}

fn has_unescaped_separator(line: &str) -> bool {
    let mut escaped = false;
    for c in line.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' => return true,
            _ => {}
        }
    }
    false
}

//! [`TestServer`] builder for helper test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary server config directory with helper methods for test setup
/// and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use ottd_test_utils::TestServer;
///
/// let server = TestServer::new()
///     .with_newgrfs(&["123|ABCDEF|examplegrf/1.0"])
///     .with_bans(&["1.2.3.4"]);
/// server.write_ban_file("5.6.7.8\n");
/// assert!(server.config_path().exists());
/// ```
pub struct TestServer {
    temp_dir: TempDir,
    server_name: String,
    newgrfs: Vec<String>,
    bans: Vec<String>,
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new()
    }
}

impl TestServer {
    /// Create an empty server directory with an `openttd.cfg`.
    pub fn new() -> Self {
        let server = Self {
            temp_dir: TempDir::new().unwrap(),
            server_name: "Test Server".to_string(),
            newgrfs: Vec::new(),
            bans: Vec::new(),
        };
        server.write_config();
        server
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("openttd.cfg")
    }

    pub fn ban_file(&self) -> PathBuf {
        self.root().join("bans.txt")
    }

    /// Content cache directory, created on first use.
    pub fn cache_root(&self) -> PathBuf {
        let path = self.root().join("content_download").join("newgrf");
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn with_server_name(mut self, name: &str) -> Self {
        self.server_name = name.to_string();
        self.write_config();
        self
    }

    pub fn with_newgrfs(mut self, entries: &[&str]) -> Self {
        self.newgrfs = entries.iter().map(|e| e.to_string()).collect();
        self.write_config();
        self
    }

    pub fn with_bans(mut self, entries: &[&str]) -> Self {
        self.bans = entries.iter().map(|e| e.to_string()).collect();
        self.write_config();
        self
    }

    /// Write the external ban file verbatim.
    pub fn write_ban_file(&self, content: &str) {
        fs::write(self.ban_file(), content).unwrap();
    }

    /// Read the external ban file back as a sorted list of non-empty lines.
    pub fn ban_file_entries(&self) -> Vec<String> {
        let content = fs::read_to_string(self.ban_file()).unwrap();
        let mut entries: Vec<String> = content
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        entries.sort();
        entries
    }

    /// Assert that a file exists relative to the server root.
    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    fn write_config(&self) {
        let mut content = format!("[network]\nserver_name = {}\n\n[newgrf]\n", self.server_name);
        for entry in &self.newgrfs {
            content.push_str(&format!("{entry} = \n"));
        }
        content.push_str("\n[bans]\n");
        for entry in &self.bans {
            content.push_str(&format!("{entry} = \n"));
        }
        fs::write(self.config_path(), content).unwrap();
    }
}

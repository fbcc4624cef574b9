//! Deduplicated ban entries

use std::collections::BTreeSet;
use std::collections::btree_set;

/// A set of ban entries (IP addresses or player names).
///
/// Entries are opaque strings compared exactly. Iteration order is
/// lexicographic, which is also the order the ban file is written in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanSet {
    entries: BTreeSet<String>,
}

impl BanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the contents of a ban file, one entry per line.
    ///
    /// Surrounding whitespace (including a `\r` from CRLF files) is stripped
    /// and blank lines are skipped.
    pub fn from_lines(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        self.entries.insert(entry.into())
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.entries.iter()
    }

    /// Entries present in either set.
    pub fn union(&self, other: &BanSet) -> BanSet {
        Self {
            entries: self.entries.union(&other.entries).cloned().collect(),
        }
    }

    /// Entries as config keys, in iteration order.
    pub fn to_keys(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Ban file contents: one entry per line, each newline-terminated.
    pub fn to_file_contents(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }
}

impl FromIterator<String> for BanSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<String> for BanSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<'a> IntoIterator for &'a BanSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

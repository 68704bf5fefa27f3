use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage key for a board, derived from its configured name.
///
/// Lowercased, with every run of characters outside `[a-z0-9_]` collapsed
/// into a single underscore. Names the entity file, the UI state entry, and
/// appears in log fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardKey(String);

impl BoardKey {
    pub fn from_name(name: &str) -> Self {
        let mut key = String::with_capacity(name.len());
        let mut in_run = false;
        for c in name.trim().to_lowercase().chars() {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                key.push(c);
                in_run = false;
            } else if !in_run {
                key.push('_');
                in_run = true;
            }
        }
        BoardKey(key)
    }

    /// Wrap a key that is already in storage form (e.g. a file stem)
    pub fn from_stem(stem: &str) -> Self {
        BoardKey(stem.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two collapsible sections of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    InProgress,
    Completed,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::InProgress => "In Progress",
            Section::Completed => "Completed",
        }
    }
}

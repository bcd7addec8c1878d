//! Generation-pass memo.
//!
//! A memo maps the namespaced name of every type emitted by a generation run to
//! the header that declares it. A later run loads it to skip re-emitting known
//! types and to point include statements at the existing headers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Namespaced type name to header path, persisted as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationPassMemo {
    entries: BTreeMap<String, String>,
}

/// Accepted on-disk shapes. Older passes wrapped the map in a single key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MemoFile {
    Legacy {
        #[serde(rename = "InEngineTypeToIncludePaths")]
        in_engine_type_to_include_paths: BTreeMap<String, String>,
    },
    Flat(BTreeMap<String, String>),
}

impl GenerationPassMemo {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse memo JSON in either the flat or the legacy wrapped shape.
    pub fn from_json(content: &str) -> Result<Self, String> {
        let file: MemoFile = serde_json::from_str(content)
            .map_err(|e| format!("Failed to parse generation memo: {e}"))?;
        let entries = match file {
            MemoFile::Legacy {
                in_engine_type_to_include_paths,
            } => in_engine_type_to_include_paths,
            MemoFile::Flat(entries) => entries,
        };
        Ok(Self { entries })
    }

    /// Load a memo from disk. A missing file is an empty memo.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No generation memo found, starting empty.");
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read generation memo {}: {e}", path.display()))?;
        let memo = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), entries = memo.len(), "Loaded generation memo.");
        Ok(memo)
    }

    /// Pretty-printed flat JSON object.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize generation memo: {e}"))
    }

    /// Write the memo to disk, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
        fs::write(path, self.to_json()?)
            .map_err(|e| format!("Failed to write generation memo {}: {e}", path.display()))
    }

    /// Header path recorded for a namespaced type name.
    pub fn header_path(&self, namespaced: &str) -> Option<&str> {
        self.entries.get(namespaced).map(String::as_str)
    }

    /// Whether a type is already known.
    pub fn contains(&self, namespaced: &str) -> bool {
        self.entries.contains_key(namespaced)
    }

    /// Record a header path. Existing entries are kept; returns `false` if the name was already known.
    pub fn insert(&mut self, namespaced: impl Into<String>, header_path: impl Into<String>) -> bool {
        let namespaced = namespaced.into();
        if self.entries.contains_key(&namespaced) {
            return false;
        }
        self.entries.insert(namespaced, header_path.into());
        true
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the memo is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_and_legacy_shapes() {
        let flat = GenerationPassMemo::from_json(
            r#"{ "OptionalInt32": "BeamableCore/Public/AutoGen/Optionals/OptionalInt32.h" }"#,
        )
        .unwrap();
        let legacy = GenerationPassMemo::from_json(
            r#"{ "InEngineTypeToIncludePaths": { "OptionalInt32": "BeamableCore/Public/AutoGen/Optionals/OptionalInt32.h" } }"#,
        )
        .unwrap();

        assert_eq!(flat, legacy);
        assert_eq!(
            flat.header_path("OptionalInt32"),
            Some("BeamableCore/Public/AutoGen/Optionals/OptionalInt32.h")
        );
    }

    #[test]
    fn test_insert_never_replaces() {
        let mut memo = GenerationPassMemo::new();
        assert!(memo.insert("EStatus", "a.h"));
        assert!(!memo.insert("EStatus", "b.h"));
        assert_eq!(memo.header_path("EStatus"), Some("a.h"));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_round_trip_keeps_untouched_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("memo.json");

        let mut memo = GenerationPassMemo::new();
        memo.insert("OptionalBool", "Core/OptionalBool.h");
        memo.insert("ArrayOfString", "Core/ArrayOfString.h");
        memo.save(&path).unwrap();

        let mut reloaded = GenerationPassMemo::load(&path).unwrap();
        reloaded.insert("MapOfInt32", "Core/MapOfInt32.h");
        reloaded.save(&path).unwrap();

        let last = GenerationPassMemo::load(&path).unwrap();
        let names: Vec<&str> = last.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["ArrayOfString", "MapOfInt32", "OptionalBool"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let memo = GenerationPassMemo::load(&dir.path().join("absent.json")).unwrap();
        assert!(memo.is_empty());
    }

    #[test]
    fn test_malformed_memo_is_reported() {
        let err = GenerationPassMemo::from_json("[1, 2]").unwrap_err();
        assert!(err.contains("Failed to parse generation memo"), "{err}");
    }
}

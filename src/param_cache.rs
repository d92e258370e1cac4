//! Collects `name: description` observations out of a [`BinaryIndex`] into a
//! per-blob cache, then merges per-blob caches into a single master cache.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::binary_index::BinaryIndex;

const MAX_IDENTIFIER_LEN: usize = 50;

static NAME_DESC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^\s:]+):(.*)$").unwrap());

/// A `name → description` dictionary built from a single blob's string
/// index. Duplicate names keep the **longer** description.
#[derive(Debug, Default, Clone)]
pub struct ParamCache {
    entries: HashMap<String, String>,
}

impl ParamCache {
    pub fn from_binary_index(index: &BinaryIndex) -> Self {
        let mut entries: HashMap<String, String> = HashMap::new();
        for e in &index.entries {
            if let Some((name, desc)) = parse_name_desc(&e.text) {
                match entries.get(&name) {
                    Some(existing) if existing.len() >= desc.len() => {}
                    _ => {
                        entries.insert(name, desc);
                    }
                }
            }
        }
        ParamCache { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a single candidate string into `(identifier, description)` per the
/// `^([^\s:]+):(.*)$` pattern, with the identifier capped at
/// [`MAX_IDENTIFIER_LEN`] characters.
fn parse_name_desc(text: &str) -> Option<(String, String)> {
    let caps = NAME_DESC.captures(text)?;
    let name = caps.get(1).unwrap().as_str();
    if name.chars().count() > MAX_IDENTIFIER_LEN {
        return None;
    }
    let desc = caps.get(2).unwrap().as_str().trim();
    Some((name.to_string(), desc.to_string()))
}

/// Merge per-blob caches into a single master cache, first-seen-wins: once
/// a name is recorded, later blobs observing the same name are ignored.
pub fn merge_first_seen_wins<'a>(caches: impl IntoIterator<Item = &'a ParamCache>) -> ParamCache {
    let mut merged: HashMap<String, String> = HashMap::new();
    for cache in caches {
        for (name, desc) in &cache.entries {
            merged.entry(name.clone()).or_insert_with(|| desc.clone());
        }
    }
    ParamCache { entries: merged }
}

//! Scans a binary blob once into an ordered sequence of plausible text
//! strings, indexed both by scan order (for locality lookups) and by exact
//! text (for name lookups).

use std::collections::HashMap;

const MIN_STRING_LEN: usize = 1;
const MAX_STRING_LEN: usize = 500;
const MIN_PRINTABLE_RATIO: f64 = 0.8;

/// A candidate string recovered from a binary blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringIndexEntry {
    pub text: String,
    pub byte_offset: usize,
    pub ordinal: usize,
}

/// The string index for a single blob: an ordered sequence plus a
/// name→occurrences map. Built with a single linear scan; every lookup
/// thereafter is constant-time.
#[derive(Debug, Default)]
pub struct BinaryIndex {
    pub entries: Vec<StringIndexEntry>,
    by_text: HashMap<String, Vec<usize>>,
}

impl BinaryIndex {
    /// Scan `bytes` once, splitting on null bytes, decoding each run as
    /// UTF-8, and keeping only runs that look like text.
    pub fn build(bytes: &[u8]) -> Self {
        let mut entries = Vec::new();
        let mut by_text: HashMap<String, Vec<usize>> = HashMap::new();

        let mut offset = 0usize;
        for run in bytes.split(|&b| b == 0) {
            if !run.is_empty() && (MIN_STRING_LEN..MAX_STRING_LEN).contains(&run.len()) {
                if let Ok(text) = std::str::from_utf8(run) {
                    if looks_like_text(text) {
                        let ordinal = entries.len();
                        by_text.entry(text.to_string()).or_default().push(ordinal);
                        entries.push(StringIndexEntry {
                            text: text.to_string(),
                            byte_offset: offset,
                            ordinal,
                        });
                    }
                }
            }
            offset += run.len() + 1; // +1 for the null delimiter consumed by split
        }

        BinaryIndex { entries, by_text }
    }

    /// All entries with exactly this text, in scan order. Empty if the text
    /// never occurred.
    pub fn lookup(&self, text: &str) -> &[usize] {
        self.by_text.get(text).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn entry(&self, ordinal: usize) -> &StringIndexEntry {
        &self.entries[ordinal]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn looks_like_text(s: &str) -> bool {
    let total = s.chars().count();
    if total == 0 {
        return false;
    }
    let printable = s
        .chars()
        .filter(|&c| {
            let code = c as u32;
            (32..127).contains(&code) || c == '\t' || c == '\n' || c == '\r' || code >= 160
        })
        .count();
    (printable as f64) / (total as f64) >= MIN_PRINTABLE_RATIO
}

//! Cross-references the parsed definition tree against a binary string
//! index and a parameter cache to repair method descriptions, parameter
//! names, parameter descriptions, and spurious comma-split parameters.

use std::collections::HashSet;

use crate::binary_index::BinaryIndex;
use crate::param_cache::{merge_first_seen_wins, ParamCache};
use crate::types::{placeholder_digits, Definition, Parameter, Property, PropertyKind};

const MAX_LOCAL_WINDOW_DISTANCE: usize = 500;
const MARKER_PREFIX: &str = "$$$";

/// Where a [`ParamMatch`] was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    /// Found in the method's own local window, `position` entries back
    /// from the method name.
    Local(usize),
    ClassCache,
    GlobalCache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMatch {
    pub name: String,
    pub desc: String,
    pub source: MatchSource,
}

#[derive(Debug, Clone, Default)]
pub struct BinaryMethodInfo {
    pub matches: Vec<ParamMatch>,
    pub method_desc: Option<String>,
}

/// An opaque, named byte blob — a native library file.
pub struct Blob<'a> {
    pub name: &'a str,
    pub bytes: &'a [u8],
}

/// Run the recovery engine over every method in `definitions`, in place.
/// A no-op if `blobs` is empty.
pub fn apply(definitions: &mut [Definition], blobs: &[Blob]) {
    if blobs.is_empty() {
        return;
    }

    let indices: Vec<BinaryIndex> = blobs.iter().map(|b| BinaryIndex::build(b.bytes)).collect();
    let per_blob_caches: Vec<ParamCache> = indices.iter().map(ParamCache::from_binary_index).collect();
    let master = merge_first_seen_wins(per_blob_caches.iter());

    for def in definitions.iter_mut() {
        for prop in def.properties.iter_mut() {
            if prop.kind != PropertyKind::Method {
                continue;
            }
            recover_method(prop, &indices, &master);
        }
    }
}

fn recover_method(prop: &mut Property, indices: &[BinaryIndex], master: &ParamCache) {
    for index in indices {
        let occurrences = index.lookup(&prop.name);
        let Some(&ordinal) = occurrences.first() else {
            continue;
        };
        let info = stage1_extract(prop, index, ordinal, master);
        stage2_apply(prop, info);
        return;
    }
}

/// The ordered sequence of string index entries immediately preceding the
/// method name, bounded by count (`len(params) + 2`) and byte distance
/// (500 bytes), with `$$$`-prefixed internal markers discarded. Index 0 is
/// the entry immediately to the left of the method name in the binary.
fn local_window<'a>(index: &'a BinaryIndex, method_ordinal: usize, param_count: usize) -> Vec<&'a str> {
    let max_count = param_count + 2;
    let method_entry = index.entry(method_ordinal);

    let mut raw = Vec::with_capacity(max_count);
    let mut i = method_ordinal;
    while raw.len() < max_count && i > 0 {
        i -= 1;
        let candidate = index.entry(i);
        if method_entry.byte_offset.saturating_sub(candidate.byte_offset) > MAX_LOCAL_WINDOW_DISTANCE {
            break;
        }
        raw.push(candidate.text.as_str());
    }
    raw.retain(|t| !t.starts_with(MARKER_PREFIX));
    raw
}

fn stage1_extract(prop: &Property, index: &BinaryIndex, method_ordinal: usize, master: &ParamCache) -> BinaryMethodInfo {
    let window = local_window(index, method_ordinal, prop.params.len());

    let mut matches = Vec::new();
    let mut highest_pattern_index = None;
    for (i, text) in window.iter().enumerate() {
        if let Some((name, desc)) = split_name_desc(text) {
            matches.push(ParamMatch { name, desc, source: MatchSource::Local(i) });
            highest_pattern_index = Some(i);
        }
    }

    let method_desc = highest_pattern_index
        .and_then(|i| window.get(i + 1))
        .and_then(|text| is_method_description_candidate(text).then(|| text.to_string()));

    enrich_from_cache(prop, &mut matches, master);

    BinaryMethodInfo { matches, method_desc }
}

fn is_method_description_candidate(text: &str) -> bool {
    text.chars().count() > 15 && text.contains(' ') && !text.ends_with(" class")
}

/// `^([^\s:]+):(.*)$` with the identifier at most 50 characters — the same
/// shape the parameter cache itself keys on, but evaluated locally so stage
/// 1 doesn't need the blob's full cache.
fn split_name_desc(text: &str) -> Option<(String, String)> {
    let colon = text.find(':')?;
    let (name, rest) = text.split_at(colon);
    if name.is_empty() || name.chars().count() > 50 || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name.to_string(), rest[1..].trim().to_string()))
}

fn is_real_identifier(name: &str) -> bool {
    !name.is_empty()
        && placeholder_digits(name).is_none()
        && !name.contains(char::is_whitespace)
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

fn enrich_from_cache(prop: &Property, matches: &mut Vec<ParamMatch>, master: &ParamCache) {
    // Phase 1: class cache.
    let matched: HashSet<&str> = matches.iter().map(|m| m.name.as_str()).collect();
    let mut newly_matched = Vec::new();
    for p in &prop.params {
        if matched.contains(p.name.as_str()) || !is_real_identifier(&p.name) {
            continue;
        }
        if let Some(desc) = master.get(&p.name) {
            newly_matched.push(ParamMatch {
                name: p.name.clone(),
                desc: desc.to_string(),
                source: MatchSource::ClassCache,
            });
        }
    }
    matches.extend(newly_matched);

    // Phase 2: global cache. Identical lookup, kept as a distinct pass (and
    // a distinct `MatchSource` variant) so a future implementation that
    // restricts the class cache to a locality window doesn't have to touch
    // this call site.
    let matched: HashSet<&str> = matches.iter().map(|m| m.name.as_str()).collect();
    let mut newly_matched = Vec::new();
    for p in &prop.params {
        if matched.contains(p.name.as_str()) || !is_real_identifier(&p.name) {
            continue;
        }
        if let Some(desc) = master.get(&p.name) {
            newly_matched.push(ParamMatch {
                name: p.name.clone(),
                desc: desc.to_string(),
                source: MatchSource::GlobalCache,
            });
        }
    }
    matches.extend(newly_matched);
}

fn stage2_apply(prop: &mut Property, info: BinaryMethodInfo) {
    remove_comma_split_artifacts(prop, &info.matches);
    apply_name_and_description_repairs(prop, &info.matches);

    if prop.desc.is_empty() {
        if let Some(method_desc) = info.method_desc {
            prop.desc = vec![method_desc];
        }
    }
}

fn remove_comma_split_artifacts(prop: &mut Property, matches: &[ParamMatch]) {
    let local_match_count = matches
        .iter()
        .filter(|m| matches!(m.source, MatchSource::Local(_)))
        .count();
    let total_commas: usize = matches.iter().map(|m| m.desc.matches(',').count()).sum();

    if total_commas == 0 || prop.params.len() <= local_match_count {
        return;
    }

    let matched_names: HashSet<&str> = matches.iter().map(|m| m.name.as_str()).collect();
    let mut candidates: Vec<(u8, usize)> = Vec::new();
    for (idx, p) in prop.params.iter().enumerate() {
        if matched_names.contains(p.name.as_str()) {
            continue;
        }
        if let Some(priority) = removal_priority(p) {
            candidates.push((priority, idx));
        }
    }
    candidates.sort_by_key(|&(priority, idx)| (priority, idx));

    let remove_count = total_commas.min(candidates.len());
    let mut to_remove: Vec<usize> = candidates.into_iter().take(remove_count).map(|(_, idx)| idx).collect();
    to_remove.sort_unstable();
    for idx in to_remove.into_iter().rev() {
        prop.params.remove(idx);
    }
}

fn removal_priority(p: &Parameter) -> Option<u8> {
    let token_count = p.name.split_whitespace().count();
    if (p.name.contains(' ') && token_count >= 3)
        || p.name.ends_with(['.', '!', '?', ','])
        || p.flags.was_space_name
    {
        return Some(1);
    }
    if p.flags.was_digit_name {
        return Some(2);
    }
    if p.is_placeholder_name() {
        return Some(3);
    }
    None
}

fn apply_name_and_description_repairs(prop: &mut Property, matches: &[ParamMatch]) {
    let mut adopted: HashSet<usize> = HashSet::new();

    for m in matches {
        let by_name = prop
            .params
            .iter()
            .enumerate()
            .position(|(idx, p)| p.name == m.name && !adopted.contains(&idx));

        let target = by_name.or_else(|| match m.source {
            MatchSource::Local(i) if prop.needs_full_binary_recovery && i < prop.params.len() => {
                if !adopted.contains(&i) && prop.params[i].is_placeholder_name() {
                    Some(i)
                } else {
                    None
                }
            }
            _ => None,
        });

        let Some(idx) = target else { continue };
        if by_name.is_none() {
            prop.params[idx].name = m.name.clone();
        }
        adopted.insert(idx);

        let param = &mut prop.params[idx];
        if param.desc.is_empty() || prop.needs_full_binary_recovery {
            param.desc = vec![m.desc.clone()];
        }
        if m.desc.to_lowercase().contains("optional") {
            param.optional = true;
        }
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;

//! Deterministic ordering applied just before rendering: definitions sorted
//! by name, each definition's own members sorted by kind-bucket then name.

use crate::types::{Definition, PropertyKind};

/// Sort `definitions` by name, and each definition's `properties` by
/// `(kind bucket, name)` — methods sort after non-methods within a
/// definition, both alphabetically among themselves.
pub fn sort_all(definitions: &mut [Definition]) {
    definitions.sort_by(|a, b| a.name.cmp(&b.name));
    for def in definitions.iter_mut() {
        def.properties.sort_by(|a, b| {
            kind_bucket(a).cmp(&kind_bucket(b)).then_with(|| a.name.cmp(&b.name))
        });
    }
}

fn kind_bucket(prop: &crate::types::Property) -> u8 {
    match prop.kind {
        PropertyKind::EnumMember => 0,
        PropertyKind::Property => 0,
        PropertyKind::Indexer => 0,
        PropertyKind::Method => 1,
    }
}

use super::*;
use crate::types::{Definition, DefinitionKind, Property, PropertyKind, TypeRef};

fn blob_bytes(strings: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for s in strings {
        out.extend_from_slice(s.as_bytes());
        out.push(0);
    }
    out
}

fn method(name: &str, params: Vec<Parameter>) -> Property {
    let needs_full_binary_recovery = params.iter().any(|p| p.flags.malformed);
    let has_params_to_enrich = !params.is_empty();
    Property {
        kind: PropertyKind::Method,
        is_static: false,
        readonly: false,
        name: name.to_string(),
        desc: Vec::new(),
        params,
        types: vec![TypeRef::new("void")],
        needs_full_binary_recovery,
        has_params_to_enrich,
    }
}

fn def_with(prop: Property) -> Definition {
    let mut d = Definition::new(DefinitionKind::Class, "Document");
    d.properties.push(prop);
    d
}

#[test]
fn local_window_stops_at_byte_distance_cutoff() {
    let far = "a".repeat(10);
    let bytes = blob_bytes(&[&far, "methodName"]);
    let index = BinaryIndex::build(&bytes);
    let far_offset_gap = index.entries[1].byte_offset - index.entries[0].byte_offset;
    assert!(far_offset_gap < 500); // sanity check on the fixture itself

    let window = local_window(&index, 1, 0);
    assert_eq!(window, vec![far.as_str()]);
}

#[test]
fn local_window_discards_dollar_markers() {
    let bytes = blob_bytes(&["$$$internal", "real value", "methodName"]);
    let index = BinaryIndex::build(&bytes);
    let window = local_window(&index, 2, 1);
    assert_eq!(window, vec!["real value"]);
}

#[test]
fn scenario_unmatched_method_left_alone() {
    let mut prop = method("neverSeen", vec![Parameter::new("value")]);
    let bytes = blob_bytes(&["unrelated text here"]);
    let indices = vec![BinaryIndex::build(&bytes)];
    let caches: Vec<ParamCache> = indices.iter().map(ParamCache::from_binary_index).collect();
    let master = merge_first_seen_wins(caches.iter());
    recover_method(&mut prop, &indices, &master);
    assert_eq!(prop.params[0].name, "value");
    assert!(prop.params[0].desc.is_empty());
}

#[test]
fn scenario_digit_prefixed_removed_and_real_param_recovered() {
    let mut garbage = Parameter::new("uArg1");
    garbage.flags.was_digit_name = true;
    let real = Parameter::new("StretchToFillBeforeCrop");
    let mut prop = method("stretch", vec![garbage, real]);

    let bytes = blob_bytes(&[
        "StretchToFillBeforeCrop: Stretches to fill, regardless of size.",
        "stretch",
    ]);
    let indices = vec![BinaryIndex::build(&bytes)];
    let caches: Vec<ParamCache> = indices.iter().map(ParamCache::from_binary_index).collect();
    let master = merge_first_seen_wins(caches.iter());
    recover_method(&mut prop, &indices, &master);

    assert_eq!(prop.params.len(), 1);
    assert_eq!(prop.params[0].name, "StretchToFillBeforeCrop");
    assert_eq!(prop.params[0].desc, vec!["Stretches to fill, regardless of size."]);
}

#[test]
fn scenario_cross_blob_cache_hit() {
    let mut prop = method("someMethod", vec![Parameter::new("interpolationType")]);

    let blob_a = blob_bytes(&["someMethod"]);
    let blob_b = blob_bytes(&["interpolationType: The interpolation method to use."]);
    let indices = vec![BinaryIndex::build(&blob_a), BinaryIndex::build(&blob_b)];
    let caches: Vec<ParamCache> = indices.iter().map(ParamCache::from_binary_index).collect();
    let master = merge_first_seen_wins(caches.iter());

    recover_method(&mut prop, &indices, &master);

    assert_eq!(
        prop.params[0].desc,
        vec!["The interpolation method to use."]
    );
}

#[test]
fn method_description_recovered_from_local_window() {
    let mut prop = method("create", vec![Parameter::new("options")]);
    let bytes = blob_bytes(&[
        "Creates and returns a new instance",
        "options: additional options",
        "create",
    ]);
    let indices = vec![BinaryIndex::build(&bytes)];
    let caches: Vec<ParamCache> = indices.iter().map(ParamCache::from_binary_index).collect();
    let master = merge_first_seen_wins(caches.iter());

    recover_method(&mut prop, &indices, &master);

    assert_eq!(prop.desc, vec!["Creates and returns a new instance"]);
    assert_eq!(prop.params[0].desc, vec!["additional options"]);
}

#[test]
fn apply_is_idempotent() {
    let garbage = {
        let mut p = Parameter::new("uArg1");
        p.flags.was_digit_name = true;
        p
    };
    let real = Parameter::new("StretchToFillBeforeCrop");
    let prop = method("stretch", vec![garbage, real]);
    let mut defs = vec![def_with(prop)];

    let bytes = blob_bytes(&[
        "StretchToFillBeforeCrop: Stretches to fill, regardless of size.",
        "stretch",
    ]);
    let blob_bytes_owned = bytes;
    let blobs = vec![Blob { name: "lib.dll", bytes: &blob_bytes_owned }];

    apply(&mut defs, &blobs);
    let once = defs.clone();
    apply(&mut defs, &blobs);
    assert_eq!(defs, once);
}

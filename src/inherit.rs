//! Inherited-property elimination: after recovery, no class may list a
//! member name that also appears on any of its transitive ancestors.

use std::collections::{HashMap, HashSet};

use crate::types::Definition;

/// Prune every definition's property list against its `extends` chain, in
/// place. A referenced parent that isn't among `definitions` is silently
/// ignored (it's an external type). A cycle in the `extends` graph
/// terminates that definition's walk rather than looping.
pub fn prune(definitions: &mut [Definition]) {
    let name_to_idx: HashMap<&str, usize> = definitions
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name.as_str(), i))
        .collect();

    let ancestor_names: Vec<HashSet<String>> = (0..definitions.len())
        .map(|i| ancestor_property_names(i, definitions, &name_to_idx))
        .collect();

    for (def, ancestors) in definitions.iter_mut().zip(ancestor_names) {
        def.properties.retain(|p| !ancestors.contains(&p.name));
    }
}

fn ancestor_property_names(
    start: usize,
    definitions: &[Definition],
    name_to_idx: &HashMap<&str, usize>,
) -> HashSet<String> {
    let mut result = HashSet::new();
    let mut visited = HashSet::new();
    visited.insert(start);

    let mut current = definitions[start].extends.clone();
    while let Some(parent_name) = current {
        let Some(&parent_idx) = name_to_idx.get(parent_name.as_str()) else {
            break;
        };
        if !visited.insert(parent_idx) {
            break;
        }
        let parent = &definitions[parent_idx];
        result.extend(parent.properties.iter().map(|p| p.name.clone()));
        current = parent.extends.clone();
    }
    result
}

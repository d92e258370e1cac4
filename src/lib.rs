//! # estk-dts — ExtendScript API XML → TypeScript declaration recovery
//!
//! Converts Adobe ExtendScript API definitions — distributed as XML whose
//! text content has been corrupted by a lossy generator — into a
//! syntactically valid `.d.ts` file, cross-referencing the accompanying
//! native library binaries to repair parameter names, parameter
//! descriptions, and method descriptions that the XML alone gets wrong.
//!
//! ## Library usage
//!
//! This crate is primarily a CLI tool, but the pipeline stages are exposed
//! as a library for integration testing and for embedding in other tools
//! that already have XML and blob bytes in memory.

pub mod binary_index;
pub mod emit;
pub mod error;
pub mod inherit;
pub mod param_cache;
pub mod recovery;
pub mod sort;
pub mod type_normalizer;
pub mod types;
pub mod xml_parser;

pub use error::ConversionError;
pub use recovery::Blob;
pub use types::Definition;

/// Run the complete pipeline: parse `xml_text`, cross-reference `blobs`
/// (skipped entirely if empty), prune inherited properties, sort, and
/// render the result as a complete `.d.ts` file.
pub fn convert(xml_text: &str, blobs: &[Blob]) -> Result<String, ConversionError> {
    let mut definitions = xml_parser::parse(xml_text)?;
    recovery::apply(&mut definitions, blobs);
    inherit::prune(&mut definitions);
    strip_parse_flags(&mut definitions);
    sort::sort_all(&mut definitions);
    Ok(emit::emit(&definitions))
}

/// Parse `xml_text` into a definition tree without running recovery,
/// pruning, sorting, or rendering. Exposed for tools that want to inspect
/// or further process the raw parse.
pub fn parse(xml_text: &str) -> Result<Vec<Definition>, ConversionError> {
    xml_parser::parse(xml_text)
}

fn strip_parse_flags(definitions: &mut [Definition]) {
    for def in definitions.iter_mut() {
        for prop in def.properties.iter_mut() {
            for param in prop.params.iter_mut() {
                param.strip_parse_flags();
            }
        }
    }
}


// ─── Property-based tests (proptest) ─────────────────────────────────

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::recovery::Blob;
    use crate::type_normalizer::normalize;
    use proptest::prelude::*;

    proptest! {
        /// Normalizing an already-normalized type name is a no-op.
        #[test]
        fn type_normalizer_is_idempotent(raw in "[a-zA-Z ():|,]{0,40}", is_array in any::<bool>()) {
            let once = normalize(&raw, is_array);
            let twice = normalize(&once.name, once.is_array);
            prop_assert_eq!(once.name, twice.name);
            prop_assert_eq!(once.is_array, twice.is_array);
        }
    }

    proptest! {
        /// Running recovery twice on already-repaired definitions is a no-op.
        #[test]
        fn recovery_is_idempotent(method_name in "[a-zA-Z]{3,12}", param_name in "[a-zA-Z]{3,12}") {
            use crate::types::{Definition, DefinitionKind, Parameter, Property, PropertyKind};

            let mut param = Parameter::new(param_name.clone());
            param.types.push(crate::types::TypeRef::any());
            let mut method = Property::new(PropertyKind::Method, method_name.clone());
            method.types.push(crate::types::TypeRef::new("void"));
            method.params.push(param);
            let mut def = Definition::new(DefinitionKind::Class, "Doc");
            def.properties.push(method);
            let mut defs = vec![def];

            let blob_text = format!("{method_name}\0{param_name}: a description\0");
            let blob_bytes: Vec<u8> = blob_text.into_bytes();
            let blobs = vec![Blob { name: "lib", bytes: &blob_bytes }];

            crate::recovery::apply(&mut defs, &blobs);
            let once = defs.clone();
            crate::recovery::apply(&mut defs, &blobs);
            prop_assert_eq!(defs, once);
        }
    }

    proptest! {
        /// Passing an empty blob list never changes output across runs, and
        /// never errors when the XML alone is well-formed.
        #[test]
        fn empty_blobs_is_monotonic(name in "[a-zA-Z]{3,12}") {
            let xml = format!(
                r#"<package><classdef name="{name}" dynamic="dynamic"><elements></elements></classdef></package>"#
            );
            let with_empty = convert(&xml, &[]).unwrap();
            let again = convert(&xml, &[]).unwrap();
            prop_assert_eq!(with_empty, again);
        }
    }
}

//! Renders a sorted, pruned definition tree as TypeScript declaration text.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::types::{Definition, DefinitionKind, Parameter, Property, PropertyKind, TypeRef};

const KEYWORDS: &[&str] = &["for", "with", "in", "default", "return", "export", "function"];

/// Render `definitions` as a complete `.d.ts` file. Dotted definition names
/// (`X.Y.Z`) are grouped into a `declare namespace X { ... }` block
/// containing `Y.Z`; undotted names are emitted at the top level.
pub fn emit(definitions: &[Definition]) -> String {
    let mut top_level = Vec::new();
    let mut namespaces: BTreeMap<&str, Vec<&Definition>> = BTreeMap::new();

    for def in definitions {
        match split_namespace(&def.name) {
            Some((ns, _rest)) => namespaces.entry(ns).or_default().push(def),
            None => top_level.push(def),
        }
    }

    let mut out = String::new();
    for def in &top_level {
        emit_definition(&mut out, def, "");
    }
    for (ns, defs) in &namespaces {
        let _ = writeln!(out, "declare namespace {ns} {{");
        for def in defs {
            emit_definition(&mut out, def, "    ");
        }
        out.push_str("}\n");
    }
    out
}

/// Split `"X.Y.Z"` into `("X", "Y.Z")`. Names without a dot return `None`.
fn split_namespace(name: &str) -> Option<(&str, &str)> {
    name.split_once('.')
}

fn local_name(name: &str) -> &str {
    split_namespace(name).map_or(name, |(_, rest)| rest)
}

fn emit_definition(out: &mut String, def: &Definition, indent: &str) {
    emit_jsdoc(out, &def.desc, indent);

    let name = local_name(&def.name);
    match def.kind {
        DefinitionKind::Enum => {
            let _ = writeln!(out, "{indent}declare enum {name} {{");
            for member in &def.properties {
                emit_jsdoc(out, &member.desc, &format!("{indent}    "));
                match member.types.first().and_then(|t| t.value.as_deref()) {
                    Some(value) => {
                        let _ = writeln!(out, "{indent}    {} = {},", member.name, value);
                    }
                    None => {
                        let _ = writeln!(out, "{indent}    {},", member.name);
                    }
                }
            }
            out.push_str(indent);
            out.push_str("}\n");
        }
        DefinitionKind::Class | DefinitionKind::Interface => {
            let keyword = if def.kind == DefinitionKind::Class { "class" } else { "interface" };
            let extends = def
                .extends
                .as_deref()
                .map(|parent| format!(" extends {}", local_name(parent)))
                .unwrap_or_default();
            let _ = writeln!(out, "{indent}declare {keyword} {name}{extends} {{");
            for member in &def.properties {
                emit_member(out, member, &format!("{indent}    "));
            }
            out.push_str(indent);
            out.push_str("}\n");
        }
    }
}

fn emit_member(out: &mut String, prop: &Property, indent: &str) {
    emit_jsdoc(out, &prop.desc, indent);
    let modifiers = member_modifiers(prop);
    let type_str = render_types(&prop.types);

    match prop.kind {
        PropertyKind::Property => {
            let readonly = if prop.readonly { "readonly " } else { "" };
            let _ = writeln!(out, "{indent}{modifiers}{readonly}{}: {type_str};", prop.name);
        }
        PropertyKind::EnumMember => {
            let _ = writeln!(out, "{indent}{}: {type_str};", prop.name);
        }
        PropertyKind::Method if prop.name == "constructor" => {
            let params = render_params(&prop.params);
            let _ = writeln!(out, "{indent}constructor({params});");
        }
        PropertyKind::Method => {
            let params = render_params(&prop.params);
            let _ = writeln!(out, "{indent}{modifiers}{}({params}): {type_str};", prop.name);
        }
        PropertyKind::Indexer => {
            let param = prop.params.first();
            let param_name = param.map(escape_keyword).unwrap_or_else(|| "index".to_string());
            let param_type = param
                .map(|p| render_types(&p.types))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "number".to_string());
            let _ = writeln!(out, "{indent}[{param_name}: {param_type}]: {type_str};");
        }
    }
}

fn member_modifiers(prop: &Property) -> &'static str {
    if prop.is_static {
        "static "
    } else {
        ""
    }
}

fn render_params(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| {
            let name = escape_keyword(p);
            let optional = if p.optional { "?" } else { "" };
            format!("{name}{optional}: {}", render_types(&p.types))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_keyword(p: &Parameter) -> String {
    if KEYWORDS.contains(&p.name.as_str()) {
        format!("{}_", p.name)
    } else {
        p.name.clone()
    }
}

fn render_types(types: &[TypeRef]) -> String {
    if types.is_empty() {
        return "any".to_string();
    }
    types
        .iter()
        .map(render_type)
        .collect::<Vec<_>>()
        .join(" | ")
}

fn render_type(t: &TypeRef) -> String {
    if t.is_array {
        format!("{}[]", t.name)
    } else {
        t.name.clone()
    }
}

fn emit_jsdoc(out: &mut String, desc: &[String], indent: &str) {
    if desc.is_empty() {
        return;
    }
    let _ = writeln!(out, "{indent}/**");
    for line in desc {
        let _ = writeln!(out, "{indent} * {line}");
    }
    let _ = writeln!(out, "{indent} */");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRef;

    fn simple_class(name: &str) -> Definition {
        Definition::new(DefinitionKind::Class, name)
    }

    #[test]
    fn dotted_name_is_split_into_namespace() {
        let def = simple_class("Scripting.Document");
        let out = emit(&[def]);
        assert!(out.contains("declare namespace Scripting {"));
        assert!(out.contains("declare class Document"));
    }

    #[test]
    fn jsdoc_only_emitted_when_description_present() {
        let mut with_desc = simple_class("WithDesc");
        with_desc.desc = vec!["A class.".to_string()];
        let mut without_desc = simple_class("WithoutDesc");
        without_desc.desc = Vec::new();

        let out = emit(&[with_desc, without_desc]);
        assert!(out.contains("/**\n * A class.\n */\ndeclare class WithDesc"));
        assert!(!out.contains("/**\n */\ndeclare class WithoutDesc"));
    }

    #[test]
    fn keyword_clashing_parameter_name_gets_escaped() {
        let mut def = simple_class("Doc");
        let mut method = Property::new(PropertyKind::Method, "run");
        method.types = vec![TypeRef::new("void")];
        method.params = vec![Parameter::new("for")];
        def.properties.push(method);

        let out = emit(&[def]);
        assert!(out.contains("run(for_: any): void;"));
    }

    #[test]
    fn indexer_renders_as_index_signature() {
        let mut def = simple_class("Collection");
        let mut indexer = Property::new(PropertyKind::Indexer, "__indexer");
        indexer.params = vec![Parameter::new("index")];
        indexer.types = vec![TypeRef::new("Item")];
        def.properties.push(indexer);

        let out = emit(&[def]);
        assert!(out.contains("[index: any]: Item;"));
    }

    #[test]
    fn constructor_omits_return_type_annotation() {
        let mut def = simple_class("Doc");
        let mut ctor = Property::new(PropertyKind::Method, "constructor");
        ctor.types = vec![TypeRef::new("void")];
        ctor.params = vec![Parameter::new("path")];
        ctor.params[0].types = vec![TypeRef::new("string")];
        def.properties.push(ctor);

        let out = emit(&[def]);
        assert!(out.contains("constructor(path: string);"));
        assert!(!out.contains("constructor(path: string): void;"));
    }

    #[test]
    fn extends_clause_uses_local_name() {
        let mut def = simple_class("Child");
        def.extends = Some("Parent".to_string());
        let out = emit(&[def]);
        assert!(out.contains("declare class Child extends Parent {"));
    }
}

//! Walks the ExtendScript API XML via direct-child navigation only, builds
//! the [`Definition`] tree, normalizes every type it encounters, and flags
//! every site of observed corruption for the recovery engine to consume.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Node;

use crate::error::ConversionError;
use crate::type_normalizer::normalize;
use crate::types::{
    placeholder_digits, Definition, DefinitionKind, ParseFlags, Parameter, Property, PropertyKind,
    TypeRef,
};

const MEASUREMENT_UNIT_LITERAL: &str = "Measurement Unit (Number or String)=any";
const INDEX_PARAM_NAME: &str = ".index";
const OPTIONAL_TOKEN: &str = "(Optional)";

static COLON_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*):(\S+)$").unwrap());
static CAN_ACCEPT_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)Can(?: also)? (?:accept|return):(.*)$").unwrap());
static ARRAYS_OF_ARRAYS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Arrays? of Arrays?").unwrap());
static NON_IDENTIFIER_CHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\]\[0-9a-zA-Z_$.]").unwrap());

/// Parse a complete ExtendScript API XML document into its top-level
/// definitions. `package → classdef` is the only recognized root path.
pub fn parse(xml_text: &str) -> Result<Vec<Definition>, ConversionError> {
    let doc = roxmltree::Document::parse(xml_text)?;
    let root = doc.root_element();
    let package = if root.has_tag_name("package") {
        root
    } else {
        direct_child(root, "package").unwrap_or(root)
    };

    direct_children(package, "classdef")
        .map(parse_classdef)
        .collect()
}

fn parse_classdef(node: Node) -> Result<Definition, ConversionError> {
    let name = node.attribute("name").unwrap_or("").to_string();

    if node.attribute("enumeration").is_some() {
        return Ok(parse_enum(node, name));
    }

    if node.attribute("dynamic").is_some() {
        let elements_groups: Vec<Node> = direct_children(node, "elements").collect();
        let has_constructor = elements_groups
            .iter()
            .any(|g| direct_child(*g, "constructor").is_some());
        let kind = if has_constructor {
            DefinitionKind::Class
        } else {
            DefinitionKind::Interface
        };

        let mut def = Definition::new(kind, name);
        def.desc = extract_desc(node);
        def.extends = direct_child(node, "superclass")
            .and_then(|n| n.text())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        for group in &elements_groups {
            let is_static = group.attribute("type") == Some("class");
            for child in group.children().filter(|n| n.is_element()) {
                let property = parse_member(child, is_static)?;
                def.properties.push(property);
            }
        }

        return Ok(def);
    }

    Err(ConversionError::UnknownDefinitionKind { name })
}

fn parse_enum(node: Node, name: String) -> Definition {
    let mut def = Definition::new(DefinitionKind::Enum, name);
    def.desc = extract_desc(node);

    for group in direct_children(node, "elements") {
        for member in direct_children(group, "property") {
            let member_name = sanitize_member_name(member.attribute("name").unwrap_or(""));
            let mut prop = Property::new(PropertyKind::EnumMember, member_name);
            prop.desc = extract_desc(member);
            prop.types = direct_child(member, "datatype")
                .map(|dt| vec![parse_enum_value(dt)])
                .unwrap_or_else(|| vec![TypeRef::new("number")]);
            def.properties.push(prop);
        }
    }

    def
}

fn parse_enum_value(datatype: Node) -> TypeRef {
    let type_name = direct_child(datatype, "type")
        .and_then(|n| n.text())
        .map(|t| normalize(t, false).name)
        .unwrap_or_else(|| "number".to_string());
    let value = direct_child(datatype, "value")
        .and_then(|n| n.text())
        .map(|s| s.trim().to_string());
    TypeRef {
        name: type_name,
        is_array: false,
        value,
    }
}

fn parse_member(node: Node, is_static: bool) -> Result<Property, ConversionError> {
    let tag = node.tag_name().name();

    if tag == "constructor" {
        let mut prop = parse_method_like(node, "constructor".to_string())?;
        prop.kind = PropertyKind::Method;
        prop.is_static = false;
        return Ok(prop);
    }

    let params_node = direct_child(node, "parameters");
    let is_indexer = params_node
        .map(|p| direct_children(p, "parameter").any(|pn| pn.attribute("name") == Some(INDEX_PARAM_NAME)))
        .unwrap_or(false);

    match tag {
        "property" if is_indexer => {
            let mut prop = parse_method_like(node, "__indexer".to_string())?;
            prop.kind = PropertyKind::Indexer;
            prop.is_static = is_static;
            Ok(prop)
        }
        "property" => {
            let name = sanitize_member_name(node.attribute("name").unwrap_or(""));
            let mut prop = Property::new(PropertyKind::Property, name);
            prop.is_static = is_static;
            prop.readonly = node.attribute("rwaccess") == Some("readonly");
            prop.desc = extract_desc(node);
            prop.types = direct_child(node, "datatype")
                .map(|dt| vec![parse_datatype(dt).0])
                .unwrap_or_else(|| vec![TypeRef::any()]);
            apply_can_accept_return(&mut prop.desc, &mut prop.types);
            Ok(prop)
        }
        "method" => {
            let name = sanitize_member_name(node.attribute("name").unwrap_or(""));
            let mut prop = parse_method_like(node, name)?;
            prop.is_static = is_static;
            Ok(prop)
        }
        other => Err(ConversionError::UnknownMemberKind {
            definition: node
                .parent()
                .and_then(|p| p.parent())
                .and_then(|p| p.attribute("name"))
                .unwrap_or("")
                .to_string(),
            tag: other.to_string(),
        }),
    }
}

fn parse_method_like(node: Node, name: String) -> Result<Property, ConversionError> {
    let mut prop = Property::new(PropertyKind::Method, name);
    prop.desc = extract_desc(node);
    prop.types = direct_child(node, "datatype")
        .map(|dt| vec![parse_datatype(dt).0])
        .unwrap_or_else(|| vec![TypeRef::new("void")]);
    prop.params = parse_parameters(direct_child(node, "parameters"));

    apply_can_accept_return(&mut prop.desc, &mut prop.types);
    rescue_method_description(&mut prop);

    prop.needs_full_binary_recovery = prop.params.iter().any(|p| p.flags.malformed);
    prop.has_params_to_enrich = !prop.params.is_empty();
    Ok(prop)
}

/// If the last parameter holds the only description in the parameter list,
/// and it came from genuine XML text, the upstream generator dumped the
/// *method* description onto it. Slice off the XML-derived prefix.
fn rescue_method_description(prop: &mut Property) {
    if !prop.desc.is_empty() {
        return;
    }
    let Some((last, rest)) = prop.params.split_last_mut() else {
        return;
    };
    if last.desc.is_empty() || !last.flags.desc_from_xml {
        return;
    }
    if rest.iter().any(|p| !p.desc.is_empty()) {
        return;
    }
    let take = last.flags.xml_desc_count.min(last.desc.len());
    prop.desc = last.desc.drain(0..take).collect();
}

fn parse_parameters(params_node: Option<Node>) -> Vec<Parameter> {
    let Some(params_node) = params_node else {
        return Vec::new();
    };
    let nodes: Vec<Node> = direct_children(params_node, "parameter").collect();

    let mut used_k: HashSet<u32> = HashSet::new();
    for n in &nodes {
        if let Some(k) = n.attribute("name").and_then(placeholder_digits) {
            used_k.insert(k);
        }
    }
    let mut next_k = {
        let mut k = 1u32;
        move |used: &mut HashSet<u32>| {
            while used.contains(&k) {
                k += 1;
            }
            used.insert(k);
            let assigned = k;
            k += 1;
            assigned
        }
    };

    let mut optional_from_here = false;
    let mut params = Vec::with_capacity(nodes.len());

    for n in nodes {
        let raw_name = n.attribute("name").unwrap_or("");

        let xml_lines = extract_desc(n);
        let desc_from_xml = !xml_lines.is_empty();
        let mut desc = xml_lines;
        let mut was_space_name = false;
        let mut was_digit_name = false;

        let name = if raw_name == INDEX_PARAM_NAME {
            "index".to_string()
        } else if raw_name.starts_with(|c: char| c.is_ascii_digit()) {
            was_digit_name = true;
            format!("uArg{}", next_k(&mut used_k))
        } else if raw_name.contains(' ') {
            was_space_name = true;
            desc.insert(0, raw_name.trim().to_string());
            format!("uArg{}", next_k(&mut used_k))
        } else if raw_name.is_empty() {
            format!("uArg{}", next_k(&mut used_k))
        } else {
            raw_name.to_string()
        };

        let xml_desc_count = desc.len();

        let datatype = direct_child(n, "datatype");
        let (type_ref, malformed, salvaged_desc) = match datatype {
            Some(dt) => parse_datatype(dt),
            None => (TypeRef::any(), false, None),
        };
        if let Some(salvaged) = salvaged_desc {
            desc.push(salvaged);
        }

        let xml_optional = n.attribute("optional") == Some("true") || n.attribute("optional") == Some("1");
        let mut desc_says_optional = false;
        for line in desc.iter_mut() {
            if line.to_lowercase().contains("optional") {
                desc_says_optional = true;
            }
            if line.contains(OPTIONAL_TOKEN) {
                *line = line.replace(OPTIONAL_TOKEN, "").trim().to_string();
            }
        }
        desc.retain(|l| !l.is_empty());

        let mut types = vec![type_ref];
        apply_can_accept_return(&mut desc, &mut types);

        let mut param = Parameter {
            name,
            desc,
            optional: optional_from_here || xml_optional || desc_says_optional,
            types,
            flags: ParseFlags {
                malformed,
                desc_from_xml,
                was_space_name,
                was_digit_name,
                xml_desc_count,
            },
        };
        optional_from_here = param.optional;

        if param.name.contains("...") {
            param.name = "...rest".to_string();
            if let Some(first) = param.types.first_mut() {
                first.is_array = true;
            } else {
                param.types.push(TypeRef::array("any"));
            }
        }

        params.push(param);
    }

    params
}

/// Parse a `<datatype>` node into `(type, malformed, salvaged_description)`
/// per the central corruption-detection rule in §4.1.
fn parse_datatype(node: Node) -> (TypeRef, bool, Option<String>) {
    let has_array = direct_child(node, "array").is_some();
    let Some(raw) = direct_child(node, "type").and_then(|n| n.text()) else {
        return (TypeRef::any(), false, None);
    };
    let raw = raw.trim();

    if raw == MEASUREMENT_UNIT_LITERAL {
        let name = if has_array {
            "(number | string)".to_string()
        } else {
            "number | string".to_string()
        };
        return (TypeRef { name, is_array: false, value: None }, false, None);
    }

    if let Some(caps) = COLON_SPLIT.captures(raw) {
        let desc = caps
            .get(1)
            .unwrap()
            .as_str()
            .trim()
            .trim_end_matches('.')
            .to_string();
        let type_name = caps.get(2).unwrap().as_str();
        return (normalize(type_name, has_array), true, Some(desc));
    }

    if raw.contains(' ') {
        return (TypeRef { name: "any".to_string(), is_array: has_array, value: None }, false, Some(raw.to_string()));
    }

    (normalize(raw, has_array), false, None)
}

/// If the first description line reads `"...Can accept: X, Y or Z"`, split
/// the tail into union members and fold them into `types`.
fn apply_can_accept_return(desc: &mut Vec<String>, types: &mut Vec<TypeRef>) {
    let Some(first) = desc.first() else { return };
    let Some(caps) = CAN_ACCEPT_RETURN.captures(first) else {
        return;
    };
    let tail = caps.get(2).unwrap().as_str();
    if tail.to_lowercase().contains("containing") || ARRAYS_OF_ARRAYS.is_match(tail) {
        return;
    }

    let prefix = caps.get(1).unwrap().as_str().to_string();
    let mut added = Vec::new();
    for piece in split_on_commas_and_or(tail) {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        added.push(normalize(piece, false));
    }
    for t in added {
        if !types.iter().any(|existing| existing.name == t.name && existing.is_array == t.is_array) {
            types.push(t);
        }
    }
    let total = types.len();
    types.retain(|t| t.name != "any" || total == 1);

    desc[0] = prefix;
}

fn split_on_commas_and_or(s: &str) -> Vec<&str> {
    s.split(',').flat_map(|part| part.split(" or ")).collect()
}

/// Replace every character outside `[]0-9a-zA-Z_$.` with `_`.
fn sanitize_member_name(name: &str) -> String {
    NON_IDENTIFIER_CHAR.replace_all(name, "_").to_string()
}

fn extract_desc(node: Node) -> Vec<String> {
    let shortdesc = direct_child(node, "shortdesc").and_then(|n| n.text());
    let description = direct_child(node, "description").and_then(|n| n.text());

    let combined = match (shortdesc, description) {
        (Some(a), Some(b)) => format!("{a}\n{b}"),
        (Some(a), None) => a.to_string(),
        (None, Some(b)) => b.to_string(),
        (None, None) => return Vec::new(),
    };

    combined
        .split('\n')
        .map(|line| collapse_double_spaces(line).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn collapse_double_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for c in s.chars() {
        if c == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(c);
    }
    out
}

fn direct_child<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.is_element() && n.has_tag_name(tag))
}

fn direct_children<'a, 'i>(node: Node<'a, 'i>, tag: &'a str) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name(tag))
}

#[cfg(test)]
#[path = "xml_parser_tests.rs"]
mod tests;

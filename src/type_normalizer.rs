//! Fixed rewrite table mapping the XML's free-text type vocabulary onto
//! TypeScript types. Applied recursively; see [`normalize`]'s doc comment
//! for the idempotence guarantee every rule must uphold.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::TypeRef;

static UNIT_OR_REAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Unit|Real)(\s*\([\d.]+ - [\d.]+( points)?\))?$").unwrap()
});
static ARRAY_OF_2_REALS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Arrays? of 2 Reals$").unwrap());
static ARRAY_OF_3_REALS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Arrays? of 3 Reals$").unwrap());
static ARRAY_OF_6_REALS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Arrays? of 6 Reals$").unwrap());
static ARRAY_OF_2_UNITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Arrays? of 2 Units$").unwrap());
static ARRAY_OF_2_STRINGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Arrays? of 2 Strings$").unwrap());
static SHORT_OR_LONG_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Short|Long) Integers?$").unwrap());
static ARRAY_OF_GENERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Array of (.+?)s?$").unwrap());

/// Normalize a raw type-name string into a [`TypeRef`].
///
/// `is_array` reflects whether the XML's `<array/>` sibling was present;
/// most rules simply honor it on the returned `TypeRef`, but a handful of
/// tuple-literal rules recognize their own plurality in the input text and
/// override it (e.g. `"Array of 4 Units (0 - 8640 points)"` always yields a
/// 4-tuple, never a `[number, number, number, number][]`).
///
/// `normalize(normalize(name, arr).name, normalize(name, arr).is_array) ==
/// normalize(name, arr)` must hold for every input — every branch below
/// either returns a name already stable under another pass (a primitive, a
/// tuple literal, a passthrough) or explicitly recurses until one is
/// reached.
pub fn normalize(raw: &str, is_array: bool) -> TypeRef {
    let mut name = raw.trim();
    name = name.strip_suffix('.').unwrap_or(name).trim_end();

    let stripped = strip_enumerator_suffix(name);
    let name = stripped.trim();

    match name {
        "varies=any" | "Any" => return TypeRef { name: "any".into(), is_array, value: None },
        "Undefined" => return TypeRef { name: "undefined".into(), is_array, value: None },
        "Object" => return TypeRef { name: "object".into(), is_array, value: None },
        "String" => return TypeRef { name: "string".into(), is_array, value: None },
        "Boolean" | "bool" => return TypeRef { name: "boolean".into(), is_array, value: None },
        "Number" | "int" | "Int32" | "uint" => {
            return TypeRef { name: "number".into(), is_array, value: None };
        }
        "Array of 4 Units (0 - 8640 points)" => {
            return TypeRef { name: "[number, number, number, number]".into(), is_array: false, value: None };
        }
        "Array of Reals" => return TypeRef { name: "number".into(), is_array: true, value: None },
        "Swatche" => return TypeRef { name: "Swatch".into(), is_array, value: None },
        "JavaScript Function" => return TypeRef { name: "Function".into(), is_array, value: None },
        _ => {}
    }

    if UNIT_OR_REAL.is_match(name) {
        return TypeRef { name: "number".into(), is_array, value: None };
    }
    if ARRAY_OF_2_REALS.is_match(name) {
        return TypeRef { name: "[number, number]".into(), is_array: false, value: None };
    }
    if ARRAY_OF_3_REALS.is_match(name) {
        return TypeRef { name: "[number, number, number]".into(), is_array: false, value: None };
    }
    if ARRAY_OF_6_REALS.is_match(name) {
        return TypeRef {
            name: "[number, number, number, number, number, number]".into(),
            is_array: false,
            value: None,
        };
    }
    if ARRAY_OF_2_UNITS.is_match(name) {
        return TypeRef {
            name: "[number | string, number | string]".into(),
            is_array: false,
            value: None,
        };
    }
    if ARRAY_OF_2_STRINGS.is_match(name) {
        return TypeRef { name: "[string, string]".into(), is_array: false, value: None };
    }
    if SHORT_OR_LONG_INTEGER.is_match(name) {
        return TypeRef { name: "number".into(), is_array, value: None };
    }
    if let Some(caps) = ARRAY_OF_GENERIC.captures(name) {
        let inner = caps.get(1).unwrap().as_str();
        let mut recursed = normalize(inner, true);
        recursed.is_array = true;
        return recursed;
    }

    TypeRef { name: name.to_string(), is_array, value: None }
}

fn strip_enumerator_suffix(name: &str) -> &str {
    name.strip_suffix("enumerators")
        .or_else(|| name.strip_suffix("enumerator"))
        .unwrap_or(name)
}

//! The in-memory definition tree shared by every pipeline stage.
//!
//! Parsed out of XML by [`crate::xml_parser`], repaired in place by
//! [`crate::recovery`], pruned by [`crate::inherit`], ordered by
//! [`crate::sort`], and rendered by [`crate::emit`].

/// A normalized type reference: one of a small set of primitives, an
/// arbitrary user type name, or a literal tuple form already formatted as a
/// TypeScript tuple (e.g. `"[number, number, number]"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub is_array: bool,
    /// Set only for enum members, whose `<value>` carries a literal.
    pub value: Option<String>,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            is_array: false,
            value: None,
        }
    }

    pub fn array(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            is_array: true,
            value: None,
        }
    }

    pub fn any() -> Self {
        TypeRef::new("any")
    }
}

/// Bookkeeping produced by the XML parser and consumed by the recovery
/// engine. Never read by [`crate::sort`] or [`crate::emit`] — reset to
/// defaults once recovery has run so it carries no semantic weight by the
/// time a definition is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseFlags {
    /// The XML `<type>` text carried a colon: a description leaked across
    /// the type boundary.
    pub malformed: bool,
    /// The description came from a genuine XML description node, not a
    /// salvaged malformed name.
    pub desc_from_xml: bool,
    /// This parameter was synthesized because the XML `name` attribute
    /// contained spaces.
    pub was_space_name: bool,
    /// This parameter was synthesized because the XML `name` attribute
    /// started with a digit (comma-split garbage). Not part of the
    /// distilled data model but required to rank it at removal priority 2
    /// in the recovery engine's comma-split cleanup — by the time that
    /// stage runs, the digit itself is long gone from `name`.
    pub was_digit_name: bool,
    /// Count of description lines that came from XML before type-derived
    /// lines (from "Can accept/return:") were appended.
    pub xml_desc_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub desc: Vec<String>,
    pub optional: bool,
    pub types: Vec<TypeRef>,
    pub flags: ParseFlags,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            desc: Vec::new(),
            optional: false,
            types: Vec::new(),
            flags: ParseFlags::default(),
        }
    }

    /// True iff the name is an unfilled synthesized placeholder
    /// (`argN` or `uArgN`), still awaiting binary recovery.
    pub fn is_placeholder_name(&self) -> bool {
        is_placeholder_name(&self.name)
    }

    /// Strip transient corruption-tracking state. Called once recovery has
    /// run and before the definition is handed to sort/emit.
    pub fn strip_parse_flags(&mut self) {
        self.flags = ParseFlags::default();
    }
}

/// `argN` or `uArgN` — a synthesized placeholder, per the GLOSSARY.
pub fn is_placeholder_name(name: &str) -> bool {
    placeholder_digits(name).is_some()
}

/// If `name` matches `^(u?)Arg(\d+)$` (case-insensitive on the `arg` token
/// as emitted by this generator: `arg` or `uArg`), returns the numeric
/// suffix. Used both to detect placeholders and to find the next unused
/// `uArgN` when synthesizing new ones.
pub fn placeholder_digits(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("uArg").or_else(|| name.strip_prefix("arg"))?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Property,
    Method,
    Indexer,
    EnumMember,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub kind: PropertyKind,
    pub is_static: bool,
    pub readonly: bool,
    pub name: String,
    pub desc: Vec<String>,
    pub params: Vec<Parameter>,
    pub types: Vec<TypeRef>,
    /// Derived: true iff any parameter had `flags.malformed` set. Consumed
    /// by the recovery engine, reset afterward.
    pub needs_full_binary_recovery: bool,
    /// True iff the method has any parameters at all.
    pub has_params_to_enrich: bool,
}

impl Property {
    pub fn new(kind: PropertyKind, name: impl Into<String>) -> Self {
        Property {
            kind,
            is_static: false,
            readonly: false,
            name: name.into(),
            desc: Vec::new(),
            params: Vec::new(),
            types: Vec::new(),
            needs_full_binary_recovery: false,
            has_params_to_enrich: false,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, PropertyKind::Method | PropertyKind::Indexer)
            || self.name == "constructor"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    pub desc: Vec<String>,
    pub extends: Option<String>,
    pub properties: Vec<Property>,
}

impl Definition {
    pub fn new(kind: DefinitionKind, name: impl Into<String>) -> Self {
        Definition {
            kind,
            name: name.into(),
            desc: Vec::new(),
            extends: None,
            properties: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_digits_matches_uarg_and_arg() {
        assert_eq!(placeholder_digits("uArg3"), Some(3));
        assert_eq!(placeholder_digits("arg12"), Some(12));
        assert_eq!(placeholder_digits("uArg"), None);
        assert_eq!(placeholder_digits("argument"), None);
        assert_eq!(placeholder_digits("value"), None);
    }

    #[test]
    fn is_placeholder_name_rejects_real_identifiers() {
        let p = Parameter::new("interpolationType");
        assert!(!p.is_placeholder_name());
        let p = Parameter::new("uArg1");
        assert!(p.is_placeholder_name());
    }

    #[test]
    fn strip_parse_flags_resets_to_default() {
        let mut p = Parameter::new("matchSource");
        p.flags.malformed = true;
        p.flags.xml_desc_count = 2;
        p.strip_parse_flags();
        assert_eq!(p.flags, ParseFlags::default());
    }
}

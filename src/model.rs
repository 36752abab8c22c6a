//! In-memory representation of the public C API extracted from Doxygen XML.
//!
//! The model is deliberately dumb: plain data carried from the extraction
//! phase to the emitters. Anything language specific (identifier casing,
//! type mapping, comment layout) lives in [`crate::emit`].

use std::collections::HashMap;

/// One piece of documentation text inside a [`DocBlock`].
#[derive(Debug, Clone, PartialEq)]
pub enum DocItem {
    /// Plain prose.
    Text(String),
    /// Cross reference to another API symbol, kept as the raw C name until
    /// an emitter resolves it through the [`RefTable`].
    Ref(String),
    /// Inline code span. Resolved like [`DocItem::Ref`] when the text names
    /// a known symbol.
    Code(String),
    Bold(String),
    Emphasis(String),
    /// "See also" marker. Emitters decide how to spell it.
    See,
    /// Bulleted list. Each entry is its own block.
    List(Vec<DocBlock>),
}

/// A run of [`DocItem`]s rendered as one paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocBlock {
    pub items: Vec<DocItem>,
}

/// Documentation attached to a declaration: brief description first,
/// then one block per detailed paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocComment {
    pub blocks: Vec<DocBlock>,
}

impl DocComment {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// One constant of a C enum.
#[derive(Debug, Clone)]
pub struct EnumValue {
    /// Full C name, e.g. `ROC_INTERFACE_AUDIO_SOURCE`.
    pub name: String,
    /// Explicit initializer, if the declaration carries one.
    pub value: Option<i64>,
    pub doc: DocComment,
}

/// A C enum declaration.
#[derive(Debug, Clone)]
pub struct EnumDef {
    /// Full C name, e.g. `roc_interface`.
    pub name: String,
    /// Constants in declaration order. Names are unique within the enum.
    pub values: Vec<EnumValue>,
    pub doc: DocComment,
}

impl EnumDef {
    /// Pairs every constant with its effective integer value, applying the
    /// C numbering rule: an omitted initializer means previous value plus
    /// one, starting from zero.
    pub fn numbered_values(&self) -> Vec<(&EnumValue, i64)> {
        let mut next = 0i64;
        let mut out = Vec::with_capacity(self.values.len());
        for v in &self.values {
            let n = v.value.unwrap_or(next);
            next = n.saturating_add(1);
            out.push((v, n));
        }
        out
    }
}

/// One field of a C config struct.
#[derive(Debug, Clone)]
pub struct StructField {
    /// C field name, e.g. `max_packet_size`.
    pub name: String,
    /// C type as spelled in the header, e.g. `unsigned int` or
    /// `roc_clock_source`.
    pub c_type: String,
    /// Default value literal from the header, e.g. `2048`.
    pub default: Option<String>,
    pub doc: DocComment,
}

/// A C struct declaration.
#[derive(Debug, Clone)]
pub struct StructDef {
    /// Full C name, e.g. `roc_context_config`.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<StructField>,
    pub doc: DocComment,
}

/// A function belonging to a handle class, e.g. `roc_sender_connect`.
#[derive(Debug, Clone)]
pub struct ClassMethod {
    pub name: String,
}

/// An opaque handle type and its functions, e.g. `roc_sender`.
///
/// Classes are not emitted themselves. They exist so documentation
/// references to them and their methods resolve to the right spelling.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub methods: Vec<ClassMethod>,
}

/// What a documentation cross reference points at.
#[derive(Debug, Clone, PartialEq)]
pub enum DocRef {
    Enum {
        name: String,
    },
    EnumValue {
        name: String,
        /// Enum the constant belongs to.
        enum_name: String,
        /// Constant name with the enum prefix stripped,
        /// e.g. `AUDIO_SOURCE`.
        value_name: String,
    },
    Struct {
        name: String,
    },
    StructField {
        name: String,
    },
    Class {
        name: String,
    },
    ClassMethod {
        name: String,
        class_name: String,
        method_name: String,
    },
    /// A `roc_*` identifier that matches no extracted declaration but looks
    /// like a public typedef, e.g. `roc_slot`.
    Typedef {
        name: String,
    },
}

/// Resolved documentation references, keyed by the raw text of the
/// reference as it appears in the XML.
#[derive(Debug, Clone, Default)]
pub struct RefTable {
    enum_prefixes: Vec<(String, String)>,
    refs: HashMap<String, DocRef>,
}

impl RefTable {
    pub fn new(enum_prefixes: Vec<(String, String)>, refs: HashMap<String, DocRef>) -> Self {
        Self {
            enum_prefixes,
            refs,
        }
    }

    /// Constant-name prefix of an extracted enum, e.g.
    /// `roc_interface` => `ROC_INTERFACE_`.
    pub fn enum_prefix(&self, enum_name: &str) -> Option<&str> {
        self.enum_prefixes
            .iter()
            .find(|(name, _)| name == enum_name)
            .map(|(_, prefix)| prefix.as_str())
    }

    /// Looks up a reference by its raw text.
    pub fn resolve(&self, text: &str) -> Option<&DocRef> {
        self.refs.get(text)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Git revision of the toolkit checkout the XML was generated from.
#[derive(Debug, Clone)]
pub struct GitInfo {
    /// Output of `git describe --tags`, e.g. `v0.4.0`.
    pub tag: String,
    /// Abbreviated commit hash, e.g. `abc1234`.
    pub commit: String,
}

/// Everything extracted from one Doxygen XML directory.
#[derive(Debug, Clone, Default)]
pub struct ApiRoot {
    /// Enums in the order they appear in the main header.
    pub enums: Vec<EnumDef>,
    /// Config structs in extraction order.
    pub structs: Vec<StructDef>,
    /// Handle classes, used only for reference resolution.
    pub classes: Vec<ClassDef>,
    pub refs: RefTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(name: &str, value: Option<i64>) -> EnumValue {
        EnumValue {
            name: name.to_string(),
            value,
            doc: DocComment::default(),
        }
    }

    #[test]
    fn explicit_values_pass_through() {
        let en = EnumDef {
            name: "roc_interface".to_string(),
            values: vec![value("A", Some(1)), value("B", Some(11))],
            doc: DocComment::default(),
        };
        let numbered: Vec<i64> = en.numbered_values().iter().map(|(_, n)| *n).collect();
        assert_eq!(numbered, vec![1, 11]);
    }

    #[test]
    fn implicit_values_follow_c_rule() {
        let en = EnumDef {
            name: "roc_clock_source".to_string(),
            values: vec![
                value("DEFAULT", Some(-1)),
                value("EXTERNAL", None),
                value("INTERNAL", None),
            ],
            doc: DocComment::default(),
        };
        let numbered: Vec<i64> = en.numbered_values().iter().map(|(_, n)| *n).collect();
        assert_eq!(numbered, vec![-1, 0, 1]);
    }

    #[test]
    fn all_implicit_starts_at_zero() {
        let en = EnumDef {
            name: "roc_mode".to_string(),
            values: vec![value("A", None), value("B", None)],
            doc: DocComment::default(),
        };
        let numbered: Vec<i64> = en.numbered_values().iter().map(|(_, n)| *n).collect();
        assert_eq!(numbered, vec![0, 1]);
    }

    #[test]
    fn ref_table_prefix_lookup() {
        let table = RefTable::new(
            vec![
                ("roc_interface".to_string(), "ROC_INTERFACE_".to_string()),
                ("roc_protocol".to_string(), "ROC_PROTO_".to_string()),
            ],
            HashMap::new(),
        );
        assert_eq!(table.enum_prefix("roc_protocol"), Some("ROC_PROTO_"));
        assert_eq!(table.enum_prefix("roc_unknown"), None);
    }
}

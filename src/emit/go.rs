//! Go rendering for the roc-go bindings repository.
//!
//! Everything lands in the flat `roc` package. Enums become an `int` type
//! with a `const` block and a stringer directive, config structs become
//! plain Go structs.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::model::{ApiRoot, DocBlock, DocComment, DocItem, DocRef, EnumDef, StructDef, StructField};
use crate::names;

use super::{Banner, DOC_WIDTH, Emitter, GeneratedFile, join_parts, wrap};

/// Backend for the Go bindings.
#[derive(Debug, Default)]
pub struct GoEmitter;

impl Emitter for GoEmitter {
    fn language(&self) -> &'static str {
        "go"
    }

    fn render(&self, api: &ApiRoot, banner: &Banner) -> Vec<GeneratedFile> {
        let renderer = GoRenderer { api };
        let mut files = Vec::new();
        for en in &api.enums {
            files.push(renderer.enum_file(en, banner));
        }
        for st in &api.structs {
            files.push(renderer.struct_file(st, banner));
        }
        files
    }
}

struct GoRenderer<'a> {
    api: &'a ApiRoot,
}

impl GoRenderer<'_> {
    fn enum_file(&self, en: &EnumDef, banner: &Banner) -> GeneratedFile {
        let go_name = names::strip_prefix(&en.name, "roc_");
        let type_name = names::pascal_case(go_name);

        let mut out = banner.render();
        out.push_str("package roc\n\n");
        out.push_str(&self.type_comment(&type_name, &en.doc));

        let roc_prefix = match self.api.refs.enum_prefix(&en.name) {
            Some(p) => p.to_string(),
            None => names::enum_value_prefix(&en.name),
        };
        let go_prefix = names::pascal_case(names::strip_suffix(
            names::strip_prefix(&roc_prefix.to_lowercase(), "roc_"),
            "_",
        ));
        out.push_str("//\n");
        out.push_str(&format!(
            "//go:generate stringer -type {type_name} -trimprefix {go_prefix} -output {go_name}_string.go\n"
        ));
        out.push_str(&format!("type {type_name} int\n\n"));
        out.push_str("const (\n");

        for (i, (value, number)) in en.numbered_values().into_iter().enumerate() {
            let value_name =
                names::pascal_case(names::strip_prefix(&value.name.to_lowercase(), "roc_"));
            if i != 0 {
                out.push('\n');
            }
            out.push_str(&self.comment(&value.doc, "\t"));
            out.push_str(&format!("\t{value_name} {type_name} = {number}\n"));
        }

        out.push_str(")\n");

        let path = go_path(go_name);
        debug!(path = %path.display(), "rendered enum");
        GeneratedFile {
            path,
            contents: out,
        }
    }

    fn struct_file(&self, st: &StructDef, banner: &Banner) -> GeneratedFile {
        let go_name = names::strip_prefix(&st.name, "roc_");
        let type_name = names::pascal_case(go_name);

        let field_types: Vec<String> = st.fields.iter().map(field_type).collect();
        let mut imports = BTreeSet::new();
        for ty in &field_types {
            if ty.starts_with("time.") {
                imports.insert("time");
            }
        }

        let mut out = banner.render();
        out.push_str("package roc\n\n");
        if !imports.is_empty() {
            out.push_str("import (\n");
            for imp in &imports {
                out.push_str(&format!("\t\"{imp}\"\n"));
            }
            out.push_str(")\n\n");
        }
        out.push_str(&self.type_comment(&type_name, &st.doc));
        out.push_str(&format!("type {type_name} struct {{\n"));

        for (i, (field, field_ty)) in st.fields.iter().zip(&field_types).enumerate() {
            if i != 0 {
                out.push('\n');
            }
            let comment = self.comment(&field.doc, "\t");
            out.push_str(&comment);
            if let Some(lit) = &field.default {
                if !comment.is_empty() {
                    out.push_str("\t//\n");
                }
                out.push_str(&format!("\t// Default: {lit}.\n"));
            }
            out.push_str(&format!("\t{} {field_ty}\n", field_name(field)));
        }

        out.push_str("}\n");

        let path = go_path(go_name);
        debug!(path = %path.display(), "rendered struct");
        GeneratedFile {
            path,
            contents: out,
        }
    }

    fn type_comment(&self, go_name: &str, doc: &DocComment) -> String {
        match comment_override(go_name) {
            Some(text) => text.to_string(),
            None => self.comment(doc, ""),
        }
    }

    fn comment(&self, doc: &DocComment, indent: &str) -> String {
        let indent_line = format!("{indent}// ");
        let mut out = String::new();
        for (i, block) in doc.blocks.iter().enumerate() {
            if i != 0 {
                out.push_str(indent_line.trim_end());
                out.push('\n');
            }
            let text = self.block_to_string(block);
            for line in text.split('\n') {
                // list entries get a hanging indent for their continuations
                let subsequent = if line.starts_with(" - ") {
                    format!("{indent_line}   ")
                } else {
                    indent_line.clone()
                };
                let line = line.replace("( ", "(").replace(" )", ")");
                for wrapped in wrap(&line, DOC_WIDTH, &indent_line, &subsequent) {
                    out.push_str(&wrapped);
                    out.push('\n');
                }
            }
        }
        out
    }

    fn block_to_string(&self, block: &DocBlock) -> String {
        let mut parts = Vec::new();
        for item in &block.items {
            match item {
                DocItem::Text(text) | DocItem::Bold(text) | DocItem::Emphasis(text) => {
                    parts.push(text.clone())
                }
                DocItem::Ref(text) | DocItem::Code(text) => parts.push(self.ref_to_string(text)),
                DocItem::See => parts.push("See".to_string()),
                DocItem::List(blocks) => {
                    let mut ul = String::from("\n");
                    for li in blocks {
                        ul.push_str(&format!(" - {}\n", self.block_to_string(li)));
                    }
                    ul.push('\n');
                    parts.push(ul);
                }
            }
        }
        join_parts(&parts)
    }

    /// Known symbols are spelled the way they appear in the Go bindings,
    /// unresolved texts pass through unchanged.
    fn ref_to_string(&self, target: &str) -> String {
        match self.api.refs.resolve(target) {
            Some(
                DocRef::Enum { name }
                | DocRef::Struct { name }
                | DocRef::Class { name }
                | DocRef::Typedef { name },
            ) => names::pascal_case(names::strip_prefix(name, "roc_")),
            Some(DocRef::EnumValue { name, .. }) => {
                names::pascal_case(names::strip_prefix(name, "ROC_"))
            }
            Some(DocRef::StructField { name }) => names::pascal_case(name),
            Some(DocRef::ClassMethod {
                class_name,
                method_name,
                ..
            }) => {
                let class_name = names::pascal_case(names::strip_prefix(class_name, "roc_"));
                if method_name == "open" {
                    format!("Open{class_name}()")
                } else {
                    format!("{class_name}.{}()", names::pascal_case(method_name))
                }
            }
            None => target.to_string(),
        }
    }
}

fn field_type(field: &StructField) -> String {
    if field.c_type.starts_with("roc") {
        return names::pascal_case(names::strip_prefix(&field.c_type, "roc_"));
    }
    if let Some(ty) = type_override(&field_name(field)) {
        return ty.to_string();
    }
    match primitive_type(&field.c_type) {
        Some(ty) => ty.to_string(),
        None => field.c_type.clone(),
    }
}

fn field_name(field: &StructField) -> String {
    names::pascal_case(names::strip_prefix(&field.name.to_lowercase(), "roc_"))
}

fn go_path(go_name: &str) -> PathBuf {
    PathBuf::from("roc").join(format!("{go_name}.go"))
}

fn primitive_type(c_type: &str) -> Option<&'static str> {
    match c_type {
        "unsigned int" => Some("uint32"),
        "int" => Some("int32"),
        "unsigned long" => Some("uint32"),
        "long" => Some("int32"),
        "unsigned long long" => Some("uint64"),
        "long long" => Some("int64"),
        "char" => Some("string"),
        _ => None,
    }
}

/// Field types that deviate from the plain C mapping.
fn type_override(field_name: &str) -> Option<&'static str> {
    match field_name {
        "PacketLength" | "TargetLatency" | "LatencyTolerance" | "NoPlaybackTimeout"
        | "ChoppyPlaybackTimeout" => Some("time.Duration"),
        "PacketInterleaving" | "ReuseAddress" => Some("bool"),
        _ => None,
    }
}

/// Struct comments maintained by hand. The generated text would talk
/// about default values that do not apply to zero-initialized Go structs.
fn comment_override(go_name: &str) -> Option<&'static str> {
    match go_name {
        "ContextConfig" => Some(
            "// Context configuration.
// You can zero-initialize this struct to get a default config.
// See also Context.
",
        ),
        "SenderConfig" => Some(
            "// Sender configuration.
// You can zero-initialize this struct to get a default config.
// See also Sender.
",
        ),
        "ReceiverConfig" => Some(
            "// Receiver configuration.
// You can zero-initialize this struct to get a default config.
// See also Receiver.
",
        ),
        _ => None,
    }
}

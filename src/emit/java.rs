//! Java rendering for the roc-java bindings repository.
//!
//! Enums become Java enums carrying an `int` value, config structs become
//! lombok builder classes whose `builder()` is routed through a hand
//! written validator. Doc comments turn into javadoc with `{@link}` and
//! `{@code}` tags.

use std::path::PathBuf;

use tracing::debug;

use crate::model::{ApiRoot, DocBlock, DocComment, DocItem, DocRef, EnumDef, StructDef, StructField};
use crate::names;

use super::{Banner, DOC_WIDTH, Emitter, GeneratedFile, join_parts, wrap};

const JAVA_PACKAGE: &str = "org.rocstreaming.roctoolkit";

/// Backend for the Java bindings.
#[derive(Debug, Default)]
pub struct JavaEmitter;

impl Emitter for JavaEmitter {
    fn language(&self) -> &'static str {
        "java"
    }

    fn render(&self, api: &ApiRoot, banner: &Banner) -> Vec<GeneratedFile> {
        let renderer = JavaRenderer { api };
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

struct JavaRenderer<'a> {
    api: &'a ApiRoot,
}

impl JavaRenderer<'_> {
    fn enum_file(&self, en: &EnumDef, banner: &Banner) -> GeneratedFile {
        let name = type_name(&en.name);

        let mut out = banner.render();
        out.push_str(&format!("package {JAVA_PACKAGE};\n\n"));
        out.push_str(&self.type_comment(&name, &en.doc));
        out.push_str(&format!("public enum {name} {{\n"));

        for (value, number) in en.numbered_values() {
            out.push('\n');
            out.push_str(&self.javadoc(&value.doc, 4));
            out.push_str(&format!(
                "    {}({number}),\n",
                self.enum_value_name(&en.name, &value.name)
            ));
        }

        out.push_str("    ;\n\n");
        out.push_str("    final int value;\n\n");
        out.push_str(&format!("    {name}(int value) {{\n"));
        out.push_str("        this.value = value;\n");
        out.push_str("    }\n");
        out.push_str("}\n");

        let path = java_path(&name);
        debug!(path = %path.display(), "rendered enum");
        GeneratedFile {
            path,
            contents: out,
        }
    }

    fn struct_file(&self, st: &StructDef, banner: &Banner) -> GeneratedFile {
        let name = type_name(&st.name);

        let mut out = banner.render();
        out.push_str(&format!("package {JAVA_PACKAGE};\n\n"));
        out.push_str("import java.time.Duration;\n");
        out.push_str("import lombok.*;\n\n");
        out.push_str(&self.type_comment(&name, &st.doc));
        out.push_str("@Getter\n");
        out.push_str("@Builder(builderClassName = \"Builder\", toBuilder = true)\n");
        out.push_str("@ToString\n");
        out.push_str("@EqualsAndHashCode\n");
        out.push_str(&format!("public class {name} {{\n"));

        for field in &st.fields {
            out.push('\n');
            out.push_str(&self.javadoc(&field.doc, 4));
            let ty = field_type(field);
            let field_name = names::camel_case(&field.name);
            match field_default(field) {
                Some(lit) => {
                    out.push_str("    @Builder.Default\n");
                    out.push_str(&format!("    private {ty} {field_name} = {lit};\n"));
                }
                None => out.push_str(&format!("    private {ty} {field_name};\n")),
            }
        }

        out.push('\n');
        out.push_str(&format!("    public static {name}.Builder builder() {{\n"));
        out.push_str(&format!("        return new {name}Validator();\n"));
        out.push_str("    }\n");
        out.push_str("}\n");

        let path = java_path(&name);
        debug!(path = %path.display(), "rendered struct");
        GeneratedFile {
            path,
            contents: out,
        }
    }

    fn type_comment(&self, java_name: &str, doc: &DocComment) -> String {
        match comment_override(java_name) {
            Some(text) => text.to_string(),
            None => self.javadoc(doc, 0),
        }
    }

    fn javadoc(&self, doc: &DocComment, indent_size: usize) -> String {
        let indent = " ".repeat(indent_size);
        let indent_line = format!("{indent} * ");

        let mut out = format!("{indent}/**\n");
        for (i, block) in doc.blocks.iter().enumerate() {
            if i != 0 {
                out.push_str(&format!("{indent} * <p>\n"));
            }
            let text = mask_inline_tags(&self.block_to_string(block));
            for line in text.split('\n') {
                for wrapped in wrap(line, DOC_WIDTH, &indent_line, &indent_line) {
                    out.push_str(&unmask_inline_tags(&wrapped));
                    out.push('\n');
                }
            }
        }
        out.push_str(&format!("{indent} */\n"));
        out
    }

    fn block_to_string(&self, block: &DocBlock) -> String {
        let mut parts = Vec::new();
        for item in &block.items {
            match item {
                DocItem::Text(text) => parts.push(text.clone()),
                DocItem::Bold(text) => parts.push(format!("<b>{text}</b>")),
                DocItem::Emphasis(text) => parts.push(format!("<em>{text}</em>")),
                DocItem::Ref(text) | DocItem::Code(text) => parts.push(self.ref_to_string(text)),
                DocItem::See => parts.push("@see".to_string()),
                DocItem::List(blocks) => {
                    let mut ul = String::from("<ul>\n");
                    for li in blocks {
                        ul.push_str(&format!("<li>{}</li>\n", self.block_to_string(li)));
                    }
                    ul.push_str("</ul>\n");
                    parts.push(ul);
                }
            }
        }
        join_parts(&parts)
    }

    /// Known symbols become `{@link}` tags, struct fields and unresolved
    /// texts become `{@code}` spans.
    fn ref_to_string(&self, target: &str) -> String {
        let mut link = None;
        let mut code = target.to_string();

        match self.api.refs.resolve(target) {
            Some(
                DocRef::Enum { name }
                | DocRef::Struct { name }
                | DocRef::Class { name }
                | DocRef::Typedef { name },
            ) => link = Some(type_name(name)),
            Some(DocRef::EnumValue {
                enum_name,
                value_name,
                ..
            }) => {
                link = Some(format!(
                    "{}#{}",
                    type_name(enum_name),
                    self.enum_value_name(enum_name, value_name)
                ));
            }
            Some(DocRef::StructField { name }) => code = names::camel_case(name),
            Some(DocRef::ClassMethod {
                class_name,
                method_name,
                ..
            }) => {
                let class_name = type_name(class_name);
                link = Some(if method_name == "open" {
                    format!("{class_name}()")
                } else {
                    format!("{class_name}#{}()", names::camel_case(method_name))
                });
            }
            None => {}
        }

        match link {
            Some(link) => format!("{{@link {link}}}"),
            None => format!("{{@code {code}}}"),
        }
    }

    fn enum_value_name(&self, enum_name: &str, value_name: &str) -> String {
        let prefix = match self.api.refs.enum_prefix(enum_name) {
            Some(p) => p.to_string(),
            None => names::enum_value_prefix(enum_name),
        };
        names::strip_prefix(value_name, &prefix).to_string()
    }
}

fn type_name(roc_name: &str) -> String {
    match name_override(roc_name) {
        Some(name) => name.to_string(),
        None => names::pascal_case(names::strip_prefix(roc_name, "roc_")),
    }
}

fn field_type(field: &StructField) -> String {
    let field_name = names::camel_case(&field.name);
    if let Some(ty) = type_override(&field_name) {
        return ty.to_string();
    }
    if field.c_type.starts_with("roc_") {
        return type_name(&field.c_type);
    }
    match primitive_type(&field.c_type) {
        Some(ty) => ty.to_string(),
        None => field.c_type.clone(),
    }
}

/// Default literal for the field, if it can be spelled in Java as is.
/// Fields with an overridden type and fields of API types keep their
/// defaults in documentation only.
fn field_default(field: &StructField) -> Option<&str> {
    let field_name = names::camel_case(&field.name);
    if type_override(&field_name).is_some() || field.c_type.starts_with("roc_") {
        return None;
    }
    field.default.as_deref()
}

fn java_path(java_name: &str) -> PathBuf {
    let mut path = PathBuf::from("src/main/java");
    for part in JAVA_PACKAGE.split('.') {
        path.push(part);
    }
    path.push(format!("{java_name}.java"));
    path
}

fn primitive_type(c_type: &str) -> Option<&'static str> {
    match c_type {
        "unsigned int" | "int" => Some("int"),
        "unsigned long" | "long" | "unsigned long long" | "long long" => Some("long"),
        "char" => Some("String"),
        _ => None,
    }
}

/// Field types that deviate from the plain C mapping.
fn type_override(field_name: &str) -> Option<&'static str> {
    match field_name {
        "packetLength" | "targetLatency" | "latencyTolerance" | "noPlaybackTimeout"
        | "choppyPlaybackTimeout" => Some("Duration"),
        "reuseAddress" => Some("boolean"),
        _ => None,
    }
}

/// Types whose Java name keeps the `Roc` prefix to match the surrounding
/// hand written classes.
fn name_override(roc_name: &str) -> Option<&'static str> {
    match roc_name {
        "roc_context" => Some("RocContext"),
        "roc_sender" => Some("RocSender"),
        "roc_receiver" => Some("RocReceiver"),
        "roc_context_config" => Some("RocContextConfig"),
        "roc_sender_config" => Some("RocSenderConfig"),
        "roc_receiver_config" => Some("RocReceiverConfig"),
        _ => None,
    }
}

/// Class comments maintained by hand because the generated text would
/// reference symbols that only exist on the Java side.
fn comment_override(java_name: &str) -> Option<&'static str> {
    match java_name {
        "RocContextConfig" => Some(
            "/**
 * Context configuration.
 * <p>
 * RocContextConfig object can be instantiated with {@link RocContextConfig#builder()}.
 *
 * @see RocContext
 */
",
        ),
        "RocSenderConfig" => Some(
            "/**
 * Sender configuration.
 * <p>
 * RocSenderConfig object can be instantiated with {@link RocSenderConfig#builder()}.
 *
 * @see RocSender
 */
",
        ),
        "RocReceiverConfig" => Some(
            "/**
 * Receiver configuration.
 * <p>
 * RocReceiverConfig object can be instantiated with {@link RocReceiverConfig#builder()}.
 *
 * @see RocReceiver
 */
",
        ),
        "InterfaceConfig" => Some(
            "/**
 * Interface configuration.
 * <p>
 * Sender and receiver can have multiple slots ( {@link Slot} ), and each slot
 * can be bound or connected to multiple interfaces ( {@link Interface} ).
 * <p>
 * Each such interface has its own configuration, defined by this class.
 * <p>
 * See {@link RocSender.Configure()}, {@link RocReceiver.Configure()}.
 */
",
        ),
        _ => None,
    }
}

/// Replaces the whitespace inside an inline javadoc tag with an
/// underscore, so word wrapping treats the whole tag as one word.
fn mask_inline_tags(text: &str) -> String {
    rewrite_inline_tags(text, TagSep::Whitespace, '_')
}

fn unmask_inline_tags(text: &str) -> String {
    rewrite_inline_tags(text, TagSep::Underscore, ' ')
}

#[derive(Clone, Copy)]
enum TagSep {
    Whitespace,
    Underscore,
}

fn rewrite_inline_tags(text: &str, sep: TagSep, replacement: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{@") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match split_inline_tag(tail, sep) {
            Some((tag, body, after)) => {
                out.push_str(tag);
                out.push(replacement);
                out.push_str(body);
                out.push('}');
                rest = after;
            }
            None => {
                out.push_str("{@");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Splits text starting with `{@` into the tag word, the tag body and the
/// remainder after the closing brace. The body is the next word up to its
/// last closing brace, so trailing punctuation stays outside the tag.
fn split_inline_tag(text: &str, sep: TagSep) -> Option<(&str, &str, &str)> {
    let after = &text[2..];
    let tag_len = after
        .find(|c: char| !c.is_ascii_lowercase())
        .unwrap_or(after.len());
    if tag_len == 0 {
        return None;
    }
    let rest = &after[tag_len..];
    let sep_len = match sep {
        TagSep::Whitespace => rest.len() - rest.trim_start().len(),
        TagSep::Underscore => usize::from(rest.starts_with('_')),
    };
    if sep_len == 0 {
        return None;
    }
    let rest = &rest[sep_len..];
    let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let body_end = rest[..word_end].rfind('}')?;
    if body_end == 0 {
        return None;
    }
    Some((&text[..2 + tag_len], &rest[..body_end], &rest[body_end + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnumValue, RefTable};
    use std::collections::HashMap;

    fn sample_refs() -> RefTable {
        let mut refs = HashMap::new();
        refs.insert(
            "roc_interface".to_string(),
            DocRef::Enum {
                name: "roc_interface".to_string(),
            },
        );
        refs.insert(
            "ROC_INTERFACE_AUDIO_SOURCE".to_string(),
            DocRef::EnumValue {
                name: "ROC_INTERFACE_AUDIO_SOURCE".to_string(),
                enum_name: "roc_interface".to_string(),
                value_name: "AUDIO_SOURCE".to_string(),
            },
        );
        refs.insert(
            "roc_context_config".to_string(),
            DocRef::Struct {
                name: "roc_context_config".to_string(),
            },
        );
        refs.insert(
            "packet_length".to_string(),
            DocRef::StructField {
                name: "packet_length".to_string(),
            },
        );
        refs.insert(
            "roc_sender".to_string(),
            DocRef::Class {
                name: "roc_sender".to_string(),
            },
        );
        refs.insert(
            "roc_sender_connect()".to_string(),
            DocRef::ClassMethod {
                name: "roc_sender_connect".to_string(),
                class_name: "roc_sender".to_string(),
                method_name: "connect".to_string(),
            },
        );
        refs.insert(
            "roc_sender_open()".to_string(),
            DocRef::ClassMethod {
                name: "roc_sender_open".to_string(),
                class_name: "roc_sender".to_string(),
                method_name: "open".to_string(),
            },
        );
        refs.insert(
            "roc_slot".to_string(),
            DocRef::Typedef {
                name: "roc_slot".to_string(),
            },
        );
        RefTable::new(
            vec![("roc_interface".to_string(), "ROC_INTERFACE_".to_string())],
            refs,
        )
    }

    fn sample_api() -> ApiRoot {
        ApiRoot {
            refs: sample_refs(),
            ..ApiRoot::default()
        }
    }

    fn field(name: &str, c_type: &str, default: Option<&str>) -> StructField {
        StructField {
            name: name.to_string(),
            c_type: c_type.to_string(),
            default: default.map(str::to_string),
            doc: DocComment::default(),
        }
    }

    #[test]
    fn refs_render_as_links_or_code() {
        let api = sample_api();
        let r = JavaRenderer { api: &api };
        assert_eq!(r.ref_to_string("roc_interface"), "{@link Interface}");
        assert_eq!(
            r.ref_to_string("ROC_INTERFACE_AUDIO_SOURCE"),
            "{@link Interface#AUDIO_SOURCE}"
        );
        assert_eq!(
            r.ref_to_string("roc_context_config"),
            "{@link RocContextConfig}"
        );
        assert_eq!(r.ref_to_string("packet_length"), "{@code packetLength}");
        assert_eq!(r.ref_to_string("roc_sender"), "{@link RocSender}");
        assert_eq!(
            r.ref_to_string("roc_sender_connect()"),
            "{@link RocSender#connect()}"
        );
        assert_eq!(r.ref_to_string("roc_sender_open()"), "{@link RocSender()}");
        assert_eq!(r.ref_to_string("roc_slot"), "{@link Slot}");
        assert_eq!(r.ref_to_string("ROC_UNKNOWN"), "{@code ROC_UNKNOWN}");
    }

    #[test]
    fn javadoc_layout() {
        let api = sample_api();
        let r = JavaRenderer { api: &api };
        let doc = DocComment {
            blocks: vec![
                DocBlock {
                    items: vec![DocItem::Text("Interface for audio source packets.".to_string())],
                },
                DocBlock {
                    items: vec![DocItem::See, DocItem::Ref("roc_interface".to_string())],
                },
            ],
        };
        assert_eq!(
            r.javadoc(&doc, 4),
            "    /**\n\
             \x20    * Interface for audio source packets.\n\
             \x20    * <p>\n\
             \x20    * @see {@link Interface}\n\
             \x20    */\n"
        );
    }

    #[test]
    fn javadoc_wrap_never_splits_inline_tags() {
        let api = sample_api();
        let r = JavaRenderer { api: &api };
        let doc = DocComment {
            blocks: vec![DocBlock {
                items: vec![
                    DocItem::Text("word ".repeat(14).trim().to_string()),
                    DocItem::Ref("ROC_INTERFACE_AUDIO_SOURCE".to_string()),
                ],
            }],
        };
        let text = r.javadoc(&doc, 0);
        assert!(text.contains("{@link Interface#AUDIO_SOURCE}"), "{text}");
        for line in text.lines() {
            assert!(!line.contains("{@link_"), "left masked: {line}");
            assert!(line.len() <= 80, "line too long: {line}");
        }
    }

    #[test]
    fn mask_and_unmask_inline_tags() {
        let masked = mask_inline_tags("see {@link Interface#AUDIO_SOURCE}, {@code roc_slot}.");
        assert_eq!(
            masked,
            "see {@link_Interface#AUDIO_SOURCE}, {@code_roc_slot}."
        );
        assert_eq!(
            unmask_inline_tags(&masked),
            "see {@link Interface#AUDIO_SOURCE}, {@code roc_slot}."
        );
    }

    #[test]
    fn mask_leaves_plain_braces_alone() {
        assert_eq!(mask_inline_tags("builder() {@ nothing"), "builder() {@ nothing");
        assert_eq!(mask_inline_tags("no tags here"), "no tags here");
    }

    #[test]
    fn field_types_follow_override_then_c_type() {
        assert_eq!(
            field_type(&field("packet_length", "unsigned long long", None)),
            "Duration"
        );
        assert_eq!(
            field_type(&field("clock_source", "roc_clock_source", None)),
            "ClockSource"
        );
        assert_eq!(
            field_type(&field("max_packet_size", "unsigned int", None)),
            "int"
        );
        assert_eq!(field_type(&field("multicast_group", "char", None)), "String");
        assert_eq!(field_type(&field("rate", "float", None)), "float");
    }

    #[test]
    fn defaults_skip_overridden_and_api_typed_fields() {
        assert_eq!(
            field_default(&field("max_packet_size", "unsigned int", Some("2048"))),
            Some("2048")
        );
        assert_eq!(
            field_default(&field("packet_length", "unsigned long long", Some("0"))),
            None
        );
        assert_eq!(
            field_default(&field("clock_source", "roc_clock_source", Some("0"))),
            None
        );
        assert_eq!(field_default(&field("rate", "unsigned int", None)), None);
    }

    #[test]
    fn enum_values_use_plain_numbering_when_implicit() {
        let api = sample_api();
        let r = JavaRenderer { api: &api };
        let en = EnumDef {
            name: "roc_interface".to_string(),
            values: vec![
                EnumValue {
                    name: "ROC_INTERFACE_CONSOLIDATED".to_string(),
                    value: Some(1),
                    doc: DocComment::default(),
                },
                EnumValue {
                    name: "ROC_INTERFACE_AUDIO_SOURCE".to_string(),
                    value: None,
                    doc: DocComment::default(),
                },
            ],
            doc: DocComment::default(),
        };
        let banner = Banner::new(&crate::model::GitInfo {
            tag: "v0.4.0".to_string(),
            commit: "abc1234".to_string(),
        });
        let file = r.enum_file(&en, &banner);
        assert!(file.contents.contains("    CONSOLIDATED(1),\n"), "{}", file.contents);
        assert!(file.contents.contains("    AUDIO_SOURCE(2),\n"), "{}", file.contents);
    }

    #[test]
    fn paths_follow_package_layout() {
        assert_eq!(
            java_path("RocContextConfig"),
            PathBuf::from("src/main/java/org/rocstreaming/roctoolkit/RocContextConfig.java")
        );
    }
}

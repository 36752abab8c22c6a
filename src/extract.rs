//! Extraction of API declarations from Doxygen XML.
//!
//! Doxygen writes one XML file per documented compound. The public API we
//! care about is spread over a fixed set of files: all enums live in the
//! main header's file, each config struct and each handle class has a file
//! of its own.
//!
//! File level problems (missing file, malformed XML) abort extraction.
//! Problems local to one declaration are logged and the declaration is
//! skipped, so one bad symbol does not block the rest of the API.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use roxmltree::{Document, Node};
use tracing::{debug, info, warn};

use crate::model::{
    ApiRoot, ClassDef, ClassMethod, DocBlock, DocComment, DocItem, DocRef, EnumDef, EnumValue,
    GitInfo, RefTable, StructDef, StructField,
};
use crate::names;

/// All public enums are declared in the config header.
const ENUM_FILE: &str = "config_8h.xml";

/// Config structs, one Doxygen file each.
const STRUCT_FILES: [&str; 5] = [
    "structroc__context__config.xml",
    "structroc__receiver__config.xml",
    "structroc__sender__config.xml",
    "structroc__interface__config.xml",
    "structroc__media__encoding.xml",
];

/// Headers declaring the opaque handle types and their functions.
const CLASS_FILES: [&str; 4] = [
    "context_8h.xml",
    "receiver_8h.xml",
    "sender_8h.xml",
    "endpoint_8h.xml",
];

/// Reads every known Doxygen file under `doxygen_dir` and assembles the
/// full API model, including the resolved documentation references.
pub fn parse_doxygen(doxygen_dir: &Path) -> Result<ApiRoot> {
    if !doxygen_dir.is_dir() {
        bail!("doxygen directory not found: {}", doxygen_dir.display());
    }

    let enums = parse_enums(doxygen_dir)?;
    let structs = parse_structs(doxygen_dir)?;
    let classes = parse_classes(doxygen_dir)?;
    let refs = build_ref_table(&enums, &structs, &classes);

    info!(
        enums = enums.len(),
        structs = structs.len(),
        classes = classes.len(),
        refs = refs.len(),
        "doxygen extraction complete"
    );
    Ok(ApiRoot {
        enums,
        structs,
        classes,
        refs,
    })
}

/// Queries the toolkit checkout for the revision the XML was built from.
pub fn read_git_info(toolkit_dir: &Path) -> Result<GitInfo> {
    let tag = git_output(toolkit_dir, &["describe", "--tags"])?;
    let commit = git_output(toolkit_dir, &["rev-parse", "--short", "HEAD"])?;
    debug!(tag = %tag, commit = %commit, "detected toolkit git revision");
    Ok(GitInfo { tag, commit })
}

fn git_output(dir: &Path, args: &[&str]) -> Result<String> {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("running git {} in {}", args.join(" "), dir.display()))?;
    if !out.status.success() {
        bail!(
            "git {} failed in {}: {}",
            args.join(" "),
            dir.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

// ---------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------

fn parse_enums(doxygen_dir: &Path) -> Result<Vec<EnumDef>> {
    let text = load_file(doxygen_dir, ENUM_FILE)?;
    let doc = Document::parse(&text).with_context(|| format!("malformed XML in {ENUM_FILE}"))?;

    let mut enums = Vec::new();
    for section in doc
        .descendants()
        .filter(|n| is_kind(*n, "sectiondef", "enum"))
    {
        for member in section
            .children()
            .filter(|n| is_kind(*n, "memberdef", "enum"))
        {
            let Some(name) = child_text(member, "name") else {
                warn!(file = ENUM_FILE, "enum has no name, skipping");
                continue;
            };

            let mut values = Vec::new();
            let mut seen = HashSet::new();
            for value in member.children().filter(|n| n.has_tag_name("enumvalue")) {
                let Some(value_name) = child_text(value, "name") else {
                    warn!(name = %name, "enum value has no name, skipping");
                    continue;
                };
                if !seen.insert(value_name.to_string()) {
                    warn!(name = %name, value = %value_name, "duplicate enum value, skipping");
                    continue;
                }
                values.push(EnumValue {
                    name: value_name.to_string(),
                    value: parse_enum_initializer(value, name, value_name),
                    doc: parse_doc_comment(value),
                });
            }

            debug!(name = %name, values = values.len(), "extracted enum");
            enums.push(EnumDef {
                name: name.to_string(),
                values,
                doc: parse_doc_comment(member),
            });
        }
    }
    Ok(enums)
}

fn parse_enum_initializer(value: Node, enum_name: &str, value_name: &str) -> Option<i64> {
    let text = child_text(value, "initializer")?;
    let lit = text.strip_prefix('=').unwrap_or(text).trim();
    match parse_int_literal(lit) {
        Some(n) => Some(n),
        None => {
            warn!(
                name = %enum_name,
                value = %value_name,
                literal = %lit,
                "unparseable enum initializer, falling back to implicit numbering"
            );
            None
        }
    }
}

fn parse_int_literal(text: &str) -> Option<i64> {
    let text = text.trim();
    let (neg, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if neg { -value } else { value })
}

// ---------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------

fn parse_structs(doxygen_dir: &Path) -> Result<Vec<StructDef>> {
    let mut structs = Vec::new();
    for file in STRUCT_FILES {
        let text = load_file(doxygen_dir, file)?;
        let doc = Document::parse(&text).with_context(|| format!("malformed XML in {file}"))?;

        let Some(compound) = doc.descendants().find(|n| n.has_tag_name("compounddef")) else {
            warn!(file, "no compound definition, skipping");
            continue;
        };
        let Some(name) = child_text(compound, "compoundname") else {
            warn!(file, "compound has no name, skipping");
            continue;
        };

        let mut fields = Vec::new();
        for member in compound
            .children()
            .filter(|n| n.has_tag_name("sectiondef"))
            .flat_map(|s| s.children())
            .filter(|n| is_kind(*n, "memberdef", "variable"))
        {
            let Some(field_name) = child_text(member, "name") else {
                warn!(name = %name, "struct field has no name, skipping");
                continue;
            };
            let Some(c_type) = parse_field_type(member) else {
                warn!(name = %name, field = %field_name, "struct field has no type, skipping");
                continue;
            };
            fields.push(StructField {
                name: field_name.to_string(),
                c_type,
                default: parse_field_default(member),
                doc: parse_doc_comment(member),
            });
        }

        debug!(name = %name, fields = fields.len(), "extracted struct");
        structs.push(StructDef {
            name: name.to_string(),
            fields,
            doc: parse_doc_comment(compound),
        });
    }
    Ok(structs)
}

/// Field type as spelled in the header. Types of the API itself come
/// wrapped in a `ref` element, builtin C types are plain text.
fn parse_field_type(member: Node) -> Option<String> {
    let ty = child_elem(member, "type")?;
    let text = match ty.children().find(|n| n.has_tag_name("ref")) {
        Some(r) => r.text(),
        None => ty.text(),
    };
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn parse_field_default(member: Node) -> Option<String> {
    let text = child_text(member, "initializer")?;
    let lit = text.strip_prefix('=').unwrap_or(text).trim();
    (!lit.is_empty()).then(|| lit.to_string())
}

// ---------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------

fn parse_classes(doxygen_dir: &Path) -> Result<Vec<ClassDef>> {
    let mut classes = Vec::new();
    for file in CLASS_FILES {
        let text = load_file(doxygen_dir, file)?;
        let doc = Document::parse(&text).with_context(|| format!("malformed XML in {file}"))?;

        let Some(compound) = doc.descendants().find(|n| n.has_tag_name("compounddef")) else {
            warn!(file, "no compound definition, skipping");
            continue;
        };
        // The handle type is the first typedef in the header.
        let Some(name) = compound
            .children()
            .filter(|n| n.has_tag_name("sectiondef"))
            .flat_map(|s| s.children())
            .find(|n| is_kind(*n, "memberdef", "typedef"))
            .and_then(|m| child_text(m, "name"))
        else {
            warn!(file, "no typedef declaration, skipping");
            continue;
        };

        let mut methods = Vec::new();
        for member in compound
            .descendants()
            .filter(|n| is_kind(*n, "memberdef", "function"))
        {
            let Some(method_name) = child_text(member, "name") else {
                warn!(name = %name, "function has no name, skipping");
                continue;
            };
            methods.push(ClassMethod {
                name: method_name.to_string(),
            });
        }

        debug!(name = %name, methods = methods.len(), "extracted class");
        classes.push(ClassDef {
            name: name.to_string(),
            methods,
        });
    }
    Ok(classes)
}

// ---------------------------------------------------------------------
// Doc comments
// ---------------------------------------------------------------------

fn parse_doc_comment(node: Node) -> DocComment {
    let mut blocks = Vec::new();
    if let Some(brief) = child_elem(node, "briefdescription")
        && let Some(para) = child_elem(brief, "para")
    {
        blocks.push(parse_doc_block(para));
    }
    if let Some(detailed) = child_elem(node, "detaileddescription") {
        for para in detailed.children().filter(|n| n.has_tag_name("para")) {
            blocks.push(parse_doc_block(para));
        }
    }
    DocComment { blocks }
}

fn parse_doc_block(para: Node) -> DocBlock {
    let mut block = DocBlock::default();
    parse_doc_elem(para, &mut block.items);
    block
}

fn parse_doc_elem(elem: Node, items: &mut Vec<DocItem>) {
    let own_text = elem.text().map(str::trim).filter(|t| !t.is_empty());

    let mut parse_children = true;
    match elem.tag_name().name() {
        "para" => {
            if let Some(t) = own_text {
                items.push(DocItem::Text(t.to_string()));
            }
        }
        "ref" => {
            if let Some(t) = own_text {
                items.push(DocItem::Ref(t.to_string()));
            }
        }
        "computeroutput" => {
            if let Some(t) = own_text {
                items.push(DocItem::Code(t.to_string()));
            }
        }
        "bold" => {
            if let Some(t) = own_text {
                items.push(DocItem::Bold(t.to_string()));
            }
        }
        "emphasis" => {
            if let Some(t) = own_text {
                items.push(DocItem::Emphasis(t.to_string()));
            }
        }
        "simplesect" => {
            if elem.attribute("kind") == Some("see") {
                items.push(DocItem::See);
            } else {
                warn!(kind = ?elem.attribute("kind"), "unknown simplesect kind");
            }
        }
        "itemizedlist" => {
            let mut entries = Vec::new();
            for li in elem.children().filter(|n| n.has_tag_name("listitem")) {
                let mut block = DocBlock::default();
                for child in li.children().filter(|n| n.is_element()) {
                    parse_doc_elem(child, &mut block.items);
                }
                entries.push(block);
            }
            items.push(DocItem::List(entries));
            parse_children = false;
        }
        other => {
            warn!(tag = other, "unknown doc element");
        }
    }

    if parse_children {
        let mut children = elem.children().peekable();
        // The element's own text is the first child node.
        if children.peek().is_some_and(|n| n.is_text()) {
            children.next();
        }
        for child in children {
            if child.is_element() {
                parse_doc_elem(child, items);
            } else if child.is_text()
                && let Some(tail) = child.text().map(str::trim).filter(|t| !t.is_empty())
            {
                items.push(DocItem::Text(tail.to_string()));
            }
        }
    }
}

// ---------------------------------------------------------------------
// Reference resolution
// ---------------------------------------------------------------------

/// Classifies every reference text that occurs in a doc comment. The first
/// classification of a given text wins; later occurrences reuse it.
fn build_ref_table(enums: &[EnumDef], structs: &[StructDef], classes: &[ClassDef]) -> RefTable {
    let enum_prefixes: Vec<(String, String)> = enums
        .iter()
        .map(|en| (en.name.clone(), names::enum_value_prefix(&en.name)))
        .collect();
    let field_names: HashSet<&str> = structs
        .iter()
        .flat_map(|st| st.fields.iter())
        .map(|f| f.name.as_str())
        .collect();

    let mut refs: HashMap<String, DocRef> = HashMap::new();
    let mut visit = |text: &str| {
        if !refs.contains_key(text)
            && let Some(r) = classify_ref(text, enums, structs, classes, &enum_prefixes, &field_names)
        {
            refs.insert(text.to_string(), r);
        }
    };
    for en in enums {
        visit_comment(&en.doc, &mut visit);
        for v in &en.values {
            visit_comment(&v.doc, &mut visit);
        }
    }
    for st in structs {
        visit_comment(&st.doc, &mut visit);
        for f in &st.fields {
            visit_comment(&f.doc, &mut visit);
        }
    }

    debug!(refs = refs.len(), "resolved doc references");
    RefTable::new(enum_prefixes, refs)
}

fn visit_comment(doc: &DocComment, visit: &mut impl FnMut(&str)) {
    for block in &doc.blocks {
        visit_items(&block.items, visit);
    }
}

fn visit_items(items: &[DocItem], visit: &mut impl FnMut(&str)) {
    for item in items {
        match item {
            DocItem::Ref(text) | DocItem::Code(text) => visit(text),
            DocItem::List(blocks) => {
                for block in blocks {
                    visit_items(&block.items, visit);
                }
            }
            _ => {}
        }
    }
}

fn classify_ref(
    text: &str,
    enums: &[EnumDef],
    structs: &[StructDef],
    classes: &[ClassDef],
    enum_prefixes: &[(String, String)],
    field_names: &HashSet<&str>,
) -> Option<DocRef> {
    if enums.iter().any(|en| en.name == text) {
        return Some(DocRef::Enum {
            name: text.to_string(),
        });
    }
    if structs.iter().any(|st| st.name == text) {
        return Some(DocRef::Struct {
            name: text.to_string(),
        });
    }
    if classes.iter().any(|cl| cl.name == text) {
        return Some(DocRef::Class {
            name: text.to_string(),
        });
    }
    for (enum_name, prefix) in enum_prefixes {
        if let Some(value_name) = text.strip_prefix(prefix.as_str()) {
            return Some(DocRef::EnumValue {
                name: text.to_string(),
                enum_name: enum_name.clone(),
                value_name: value_name.to_string(),
            });
        }
    }
    if field_names.contains(text) {
        return Some(DocRef::StructField {
            name: text.to_string(),
        });
    }
    if let Some((class_name, method_name)) = split_method_ref(text)
        && classes.iter().any(|cl| cl.name == class_name)
    {
        let name = text.strip_suffix("()").unwrap_or(text);
        return Some(DocRef::ClassMethod {
            name: name.to_string(),
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
        });
    }
    if is_roc_identifier(text) {
        return Some(DocRef::Typedef {
            name: text.to_string(),
        });
    }
    None
}

/// Splits a function reference like `roc_sender_connect()` into the handle
/// class (`roc_sender`) and the method (`connect`).
fn split_method_ref(text: &str) -> Option<(&str, &str)> {
    let name = text.strip_suffix("()").unwrap_or(text);
    let rest = name.strip_prefix("roc_")?;
    let (class_part, method_part) = rest.split_once('_')?;
    if class_part.is_empty() || !class_part.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    if method_part.is_empty()
        || !method_part
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b == b'_')
    {
        return None;
    }
    Some((&name[..4 + class_part.len()], method_part))
}

fn is_roc_identifier(text: &str) -> bool {
    match text.strip_prefix("roc_") {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_lowercase() || b == b'_'),
        None => false,
    }
}

// ---------------------------------------------------------------------
// XML helpers
// ---------------------------------------------------------------------

fn load_file(doxygen_dir: &Path, file: &str) -> Result<String> {
    let path = doxygen_dir.join(file);
    fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
}

fn is_kind(node: Node, tag: &str, kind: &str) -> bool {
    node.has_tag_name(tag) && node.attribute("kind") == Some(kind)
}

fn child_elem<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child_elem(node, tag)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_para(xml: &str) -> DocBlock {
        let doc = Document::parse(xml).unwrap();
        parse_doc_block(doc.root_element())
    }

    #[test]
    fn int_literals() {
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("-1"), Some(-1));
        assert_eq!(parse_int_literal("0x20"), Some(32));
        assert_eq!(parse_int_literal("0X2a"), Some(42));
        assert_eq!(parse_int_literal("(1 << 4)"), None);
        assert_eq!(parse_int_literal(""), None);
    }

    #[test]
    fn doc_text_around_refs() {
        let block = parse_para(
            "<para>Send packets to <ref kindref=\"member\">roc_sender</ref> peers.</para>",
        );
        assert_eq!(
            block.items,
            vec![
                DocItem::Text("Send packets to".to_string()),
                DocItem::Ref("roc_sender".to_string()),
                DocItem::Text("peers.".to_string()),
            ]
        );
    }

    #[test]
    fn doc_see_section() {
        let block = parse_para(
            "<para><simplesect kind=\"see\"><para><ref kindref=\"compound\">roc_context</ref></para></simplesect></para>",
        );
        assert_eq!(
            block.items,
            vec![DocItem::See, DocItem::Ref("roc_context".to_string())]
        );
    }

    #[test]
    fn doc_list_items_keep_their_own_blocks() {
        let block = parse_para(
            "<para><itemizedlist>\
             <listitem><para>first entry</para></listitem>\
             <listitem><para>second entry</para></listitem>\
             </itemizedlist></para>",
        );
        assert_eq!(
            block.items,
            vec![DocItem::List(vec![
                DocBlock {
                    items: vec![DocItem::Text("first entry".to_string())],
                },
                DocBlock {
                    items: vec![DocItem::Text("second entry".to_string())],
                },
            ])]
        );
    }

    #[test]
    fn doc_inline_markup() {
        let block = parse_para(
            "<para><bold>default</bold> mode, see <computeroutput>ROC_INTERFACE_AUDIO_SOURCE</computeroutput></para>",
        );
        assert_eq!(
            block.items,
            vec![
                DocItem::Bold("default".to_string()),
                DocItem::Text("mode, see".to_string()),
                DocItem::Code("ROC_INTERFACE_AUDIO_SOURCE".to_string()),
            ]
        );
    }

    #[test]
    fn method_refs() {
        assert_eq!(
            split_method_ref("roc_sender_connect()"),
            Some(("roc_sender", "connect"))
        );
        assert_eq!(
            split_method_ref("roc_context_register_encoding"),
            Some(("roc_context", "register_encoding"))
        );
        assert_eq!(split_method_ref("roc_slot"), None);
        assert_eq!(split_method_ref("not_roc_thing"), None);
        assert_eq!(split_method_ref("roc_Sender_connect"), None);
    }

    #[test]
    fn roc_identifiers() {
        assert!(is_roc_identifier("roc_slot"));
        assert!(is_roc_identifier("roc_sender_config"));
        assert!(!is_roc_identifier("roc_"));
        assert!(!is_roc_identifier("ROC_INTERFACE_AUDIO_SOURCE"));
        assert!(!is_roc_identifier("interface"));
    }
}

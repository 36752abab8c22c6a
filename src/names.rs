//! Identifier casing and affix helpers shared by the emitters.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// Converts a C identifier to PascalCase, e.g.
/// `roc_fec_encoding` => `RocFecEncoding`, `RS8M_REPAIR` => `Rs8mRepair`.
pub fn pascal_case(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Converts a C identifier to camelCase, e.g.
/// `max_packet_size` => `maxPacketSize`.
pub fn camel_case(name: &str) -> String {
    name.to_lower_camel_case()
}

/// Removes `prefix` from the front of `name`, or returns `name` unchanged
/// when it is not there.
pub fn strip_prefix<'a>(name: &'a str, prefix: &str) -> &'a str {
    name.strip_prefix(prefix).unwrap_or(name)
}

/// Removes `suffix` from the end of `name`, or returns `name` unchanged
/// when it is not there.
pub fn strip_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    name.strip_suffix(suffix).unwrap_or(name)
}

/// Prefix shared by the constants of an enum.
///
/// Usually the upper-cased enum name plus an underscore, but a few enums
/// abbreviate it in the headers.
pub fn enum_value_prefix(enum_name: &str) -> String {
    match enum_name {
        "roc_protocol" => "ROC_PROTO_".to_string(),
        _ => format!("{}_", enum_name.to_uppercase()),
    }
}

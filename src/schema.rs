//! Core-schema (`tag:yaml.org,2002:`) scalar resolution (spec §4.9.1).
//!
//! The teacher has no equivalent (libyaml hands scalar text to the caller
//! untyped); grounded instead in `yaml-pyyaml`'s `resolver.rs`, which
//! performs this same implicit/explicit scalar-to-value resolution against
//! the same core schema, including its base64-with-whitespace-stripped,
//! fall-back-to-string treatment of `!!binary`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

const CORE_PREFIX: &str = "tag:yaml.org,2002:";

/// A typed scalar value, as resolved from its text and (if present) tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
}

fn core_tag(suffix: &str) -> String {
    format!("{CORE_PREFIX}{suffix}")
}

/// Implicit resolution for an untagged plain scalar (spec §4.9.1 table).
pub fn resolve_implicit(text: &str) -> Value {
    match text {
        "" | "null" | "Null" | "NULL" | "~" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        ".nan" | ".NaN" | ".NAN" => return Value::Float(f64::NAN),
        ".inf" | "+.inf" | "+inf" | "inf" => return Value::Float(f64::INFINITY),
        "-.inf" | "-inf" => return Value::Float(f64::NEG_INFINITY),
        _ => {}
    }
    if let Some(i) = parse_int(text) {
        return Value::Int(i);
    }
    if let Some(f) = parse_float(text) {
        return Value::Float(f);
    }
    Value::Str(text.to_string())
}

/// Explicit resolution once a fully-expanded tag is known (spec §4.9.1
/// "Explicit-tag resolution"). Known core-schema tags force conversion or
/// fall back to a string; any other tag (including a non-core tag) passes
/// the text through as a string — the tag itself is still surfaced as a
/// separate `Tag` event by the emitter.
pub fn resolve_explicit(tag: &str, text: &str) -> Value {
    if tag == core_tag("null") {
        return Value::Null;
    }
    if tag == core_tag("bool") {
        return match text {
            "true" | "True" | "TRUE" => Value::Bool(true),
            "false" | "False" | "FALSE" => Value::Bool(false),
            _ => Value::Str(text.to_string()),
        };
    }
    if tag == core_tag("int") {
        return parse_int(text)
            .map(Value::Int)
            .unwrap_or_else(|| Value::Str(text.to_string()));
    }
    if tag == core_tag("float") {
        return parse_float(text)
            .map(Value::Float)
            .unwrap_or_else(|| Value::Str(text.to_string()));
    }
    if tag == core_tag("str") {
        return Value::Str(text.to_string());
    }
    if tag == core_tag("binary") {
        let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        return match BASE64.decode(&cleaned) {
            Ok(bytes) => Value::Bytes(bytes),
            Err(_) => Value::Str(text.to_string()),
        };
    }
    Value::Str(text.to_string())
}

fn parse_int(text: &str) -> Option<i64> {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(r) => (-1i64, r),
        None => (1i64, text.strip_prefix('+').unwrap_or(text)),
    };
    if rest.is_empty() {
        return None;
    }
    if let Some(hex) = rest.strip_prefix("0x") {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return i64::from_str_radix(hex, 16).ok().map(|v| v * sign);
    }
    if let Some(oct) = rest.strip_prefix("0o") {
        if oct.is_empty() || !oct.chars().all(|c| ('0'..='7').contains(&c)) {
            return None;
        }
        return i64::from_str_radix(oct, 8).ok().map(|v| v * sign);
    }
    if let Some(bin) = rest.strip_prefix("0b") {
        if bin.is_empty() || !bin.chars().all(|c| c == '0' || c == '1') {
            return None;
        }
        return i64::from_str_radix(bin, 2).ok().map(|v| v * sign);
    }
    if !rest.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return None;
    }
    let cleaned: String = rest.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() || cleaned.chars().any(|c| !c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<i64>().ok().map(|v| v * sign)
}

fn parse_float(text: &str) -> Option<f64> {
    let lower = text.to_ascii_lowercase();
    if !lower.contains('.') && !lower.contains('e') {
        return None;
    }
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || "+-.eE_".contains(c))
    {
        return None;
    }
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn implicit_null_forms() {
        for s in ["", "null", "Null", "NULL", "~"] {
            assert_eq!(resolve_implicit(s), Value::Null);
        }
    }

    #[test]
    fn implicit_bool_forms() {
        assert_eq!(resolve_implicit("true"), Value::Bool(true));
        assert_eq!(resolve_implicit("False"), Value::Bool(false));
    }

    #[test]
    fn implicit_decimal_integer_with_underscores() {
        assert_eq!(resolve_implicit("1_000"), Value::Int(1000));
        assert_eq!(resolve_implicit("-42"), Value::Int(-42));
    }

    #[test]
    fn implicit_radix_integers() {
        assert_eq!(resolve_implicit("0x1F"), Value::Int(31));
        assert_eq!(resolve_implicit("0o17"), Value::Int(15));
        assert_eq!(resolve_implicit("0b101"), Value::Int(5));
    }

    #[test]
    fn implicit_float_forms() {
        assert_eq!(resolve_implicit("3.14"), Value::Float(3.14));
        assert_eq!(resolve_implicit("1e10"), Value::Float(1e10));
    }

    #[test]
    fn implicit_special_floats() {
        assert!(matches!(resolve_implicit(".nan"), Value::Float(f) if f.is_nan()));
        assert_eq!(resolve_implicit(".inf"), Value::Float(f64::INFINITY));
        assert_eq!(resolve_implicit("-.inf"), Value::Float(f64::NEG_INFINITY));
    }

    #[test]
    fn implicit_fallback_to_string() {
        assert_eq!(resolve_implicit("hello world"), Value::Str("hello world".to_string()));
        assert_eq!(resolve_implicit("0x1G"), Value::Str("0x1G".to_string()));
    }

    #[test]
    fn explicit_binary_decodes_base64() {
        let encoded = BASE64.encode(b"hi");
        assert_eq!(resolve_explicit(&core_tag("binary"), &encoded), Value::Bytes(b"hi".to_vec()));
    }

    #[test]
    fn explicit_binary_falls_back_to_string_on_bad_input() {
        assert_eq!(
            resolve_explicit(&core_tag("binary"), "not base64!!"),
            Value::Str("not base64!!".to_string())
        );
    }

    #[test]
    fn explicit_unknown_tag_passes_through_as_string() {
        assert_eq!(
            resolve_explicit("tag:example.com,2024:widget", "42"),
            Value::Str("42".to_string())
        );
    }

    #[test]
    fn explicit_int_forces_conversion_or_falls_back() {
        assert_eq!(resolve_explicit(&core_tag("int"), "7"), Value::Int(7));
        assert_eq!(
            resolve_explicit(&core_tag("int"), "not a number"),
            Value::Str("not a number".to_string())
        );
    }
}

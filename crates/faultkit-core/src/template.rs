//! `{{param}}` template rendering for spec fields.
//!
//! Rendering is best-effort cosmetic text: a placeholder naming a missing or
//! non-string spec field renders as the empty string rather than failing.

use crate::spec::Spec;
use serde_json::Value;

/// Render a candidate spec value against the spec it belongs to.
///
/// Non-string values pass through unchanged (spec fields may be booleans,
/// numbers, etc.). In strings, every `{{identifier}}` token is replaced by
/// the named field's value when that value is a string, otherwise by `""`.
pub fn render(candidate: &Value, spec: &Spec) -> Value {
    match candidate {
        Value::String(tmpl) => Value::String(render_str(tmpl, spec)),
        other => other.clone(),
    }
}

fn render_str(tmpl: &str, spec: &Spec) -> String {
    let mut out = String::with_capacity(tmpl.len());
    let mut rest = tmpl;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) if is_identifier(&after[..end]) => {
                if let Some(Value::String(s)) = spec.get(&after[..end]) {
                    out.push_str(s);
                }
                rest = &after[end + 2..];
            }
            // Not a well-formed placeholder: keep the braces literally and
            // keep scanning after them.
            _ => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

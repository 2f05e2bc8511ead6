//! The per-type spec — an insertion-ordered field map.
//!
//! Every fault type carries its own merged copy of a spec: field name →
//! JSON value. String values may contain `{{field}}` template placeholders
//! resolved at instance construction (see [`crate::template`]).

use indexmap::IndexMap;
use serde_json::Value;

/// Ordered field map attached to every fault type. Never shared between
/// types — extension always produces an independent copy.
pub type Spec = IndexMap<String, Value>;

/// Field holding the type label.
pub const FIELD_NAME: &str = "name";
/// Field holding the message template.
pub const FIELD_MESSAGE: &str = "message";
/// Flag controlling whether `stack` appears in transport output.
pub const FIELD_SERIALIZE_STACK: &str = "serialize_stack";
/// Flag deferring the `constructed` event to the next tick.
pub const FIELD_ASYNC_CONSTRUCT: &str = "async_construct";

/// The root type's frozen default spec.
pub fn base_spec() -> Spec {
    let mut spec = Spec::new();
    spec.insert(FIELD_NAME.to_string(), Value::String("Fault".to_string()));
    spec.insert(
        FIELD_MESSAGE.to_string(),
        Value::String("{{name}} aggregated error".to_string()),
    );
    spec.insert(FIELD_SERIALIZE_STACK.to_string(), Value::Bool(false));
    spec
}

/// Loose truthiness for flag fields, so `"yes"`, `1` or `true` all enable a
/// flag while `false`, `0`, `""` and `null` do not.
pub(crate) fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_spec_has_required_fields() {
        let spec = base_spec();
        assert_eq!(spec[FIELD_NAME], json!("Fault"));
        assert_eq!(spec[FIELD_MESSAGE], json!("{{name}} aggregated error"));
        assert_eq!(spec[FIELD_SERIALIZE_STACK], json!(false));
    }

    #[test]
    fn base_spec_preserves_insertion_order() {
        let spec = base_spec();
        let keys: Vec<&str> = spec.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec![FIELD_NAME, FIELD_MESSAGE, FIELD_SERIALIZE_STACK]);
    }

    #[test]
    fn truthiness() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("yes")));
        assert!(truthy(&json!([])));
    }
}

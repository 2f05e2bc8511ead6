//! Auxiliary values and the safe transport serializer.
//!
//! `transport` reduces any [`AuxValue`] tree to a plain `serde_json::Value`
//! suitable for logging or cross-process transport: nested fault instances
//! become plain objects, `stack` fields are dropped unless requested, and
//! functions never appear (handlers live outside the data model entirely).
//!
//! There is deliberately no cycle guard: pushing a value that references its
//! own instance makes `transport` recurse without bound. Callers own the
//! acyclicity of what they push.

use crate::instance::Fault;
use indexmap::IndexMap;
use serde_json::Value;

/// A value accumulated on a fault instance.
///
/// Plain JSON data is carried as-is; sequences and maps may nest further
/// fault instances anywhere in the tree. The enum is exhaustive over every
/// category the serializer supports, so serialization is total.
#[derive(Debug, Clone)]
pub enum AuxValue {
    /// Plain JSON data (scalar, array or object) with no nested faults.
    Data(Value),
    /// Ordered sequence; elements may nest faults.
    Seq(Vec<AuxValue>),
    /// Ordered key/value map; entries may nest faults.
    Map(IndexMap<String, AuxValue>),
    /// A nested fault instance (error-like object).
    Error(Fault),
}

impl AuxValue {
    /// Returns the inner JSON value if this is plain data.
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            AuxValue::Data(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the inner fault if this is a nested error.
    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            AuxValue::Error(f) => Some(f),
            _ => None,
        }
    }

    /// Returns `true` if this is a textual value (candidate for the
    /// constructor `message` slot).
    pub(crate) fn is_text(&self) -> bool {
        matches!(self, AuxValue::Data(Value::String(_)))
    }
}

impl PartialEq for AuxValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AuxValue::Data(a), AuxValue::Data(b)) => a == b,
            (AuxValue::Seq(a), AuxValue::Seq(b)) => a == b,
            (AuxValue::Map(a), AuxValue::Map(b)) => a == b,
            (AuxValue::Error(a), AuxValue::Error(b)) => a.same_instance(b),
            _ => false,
        }
    }
}

impl From<Value> for AuxValue {
    fn from(v: Value) -> Self {
        AuxValue::Data(v)
    }
}

impl From<&str> for AuxValue {
    fn from(s: &str) -> Self {
        AuxValue::Data(Value::String(s.to_string()))
    }
}

impl From<String> for AuxValue {
    fn from(s: String) -> Self {
        AuxValue::Data(Value::String(s))
    }
}

impl From<bool> for AuxValue {
    fn from(b: bool) -> Self {
        AuxValue::Data(Value::Bool(b))
    }
}

impl From<i64> for AuxValue {
    fn from(n: i64) -> Self {
        AuxValue::Data(Value::from(n))
    }
}

impl From<u64> for AuxValue {
    fn from(n: u64) -> Self {
        AuxValue::Data(Value::from(n))
    }
}

impl From<f64> for AuxValue {
    fn from(n: f64) -> Self {
        AuxValue::Data(Value::from(n))
    }
}

impl From<Fault> for AuxValue {
    fn from(f: Fault) -> Self {
        AuxValue::Error(f)
    }
}

impl From<Vec<AuxValue>> for AuxValue {
    fn from(items: Vec<AuxValue>) -> Self {
        AuxValue::Seq(items)
    }
}

impl From<IndexMap<String, AuxValue>> for AuxValue {
    fn from(entries: IndexMap<String, AuxValue>) -> Self {
        AuxValue::Map(entries)
    }
}

/// Recursively reduce a value to its JSON-safe transport form.
///
/// `serialize_stack` propagates unchanged into nested faults, so the outer
/// instance's flag governs the whole tree (a nested fault's own flag is not
/// consulted).
pub fn transport(v: &AuxValue, serialize_stack: bool) -> Value {
    match v {
        AuxValue::Data(v) => v.clone(),
        AuxValue::Seq(items) => {
            Value::Array(items.iter().map(|x| transport(x, serialize_stack)).collect())
        }
        AuxValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, x)| (k.clone(), transport(x, serialize_stack)))
                .collect(),
        ),
        AuxValue::Error(fault) => fault.transport_with(serialize_stack),
    }
}

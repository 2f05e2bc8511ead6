//! Fault instances and the construction/accumulation protocol.

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::trace;

use crate::args;
use crate::error::ConfigError;
use crate::events::{Hook, PushHook};
use crate::hierarchy::FaultType;
use crate::spec::{self, FIELD_ASYNC_CONSTRUCT, FIELD_MESSAGE, FIELD_SERIALIZE_STACK};
use crate::template;
use crate::transport::{self, AuxValue};

struct InstanceInner {
    ty: FaultType,
    /// Spec fields materialized (template-rendered) at construction,
    /// including the final `message`. Immutable afterwards.
    fields: IndexMap<String, Value>,
    message: String,
    stack: String,
    serialize_stack: bool,
    async_construct: bool,
    /// Append-only after construction; exclusively owned by this instance.
    values: RwLock<Vec<AuxValue>>,
    /// `push` handlers registered post-construction via [`Fault::on`], run
    /// after the type's own handlers in registration order.
    added_push: RwLock<Vec<PushHook>>,
}

/// A constructed fault. Cheap to clone; clones share the same instance.
///
/// Implements [`std::error::Error`], [`fmt::Display`] (the message) and
/// [`serde::Serialize`] (the transport form), so a fault drops into generic
/// error plumbing and JSON encoders unchanged.
#[derive(Clone)]
pub struct Fault {
    inner: Arc<InstanceInner>,
}

/// The construction protocol shared by `new`-style and bare invocation in
/// the public API ([`FaultType::build`]).
pub(crate) fn construct<I>(ty: &FaultType, raw_args: I) -> Fault
where
    I: IntoIterator<Item = AuxValue>,
{
    let parsed = args::parse(raw_args);

    // Materialize every spec field, rendering templates against the type's
    // own spec so placeholders resolve to declared defaults.
    let spec = ty.spec();
    let mut fields = IndexMap::with_capacity(spec.len());
    for (name, value) in spec {
        fields.insert(name.clone(), template::render(value, spec));
    }
    if let Some(message) = parsed.message {
        fields.insert(FIELD_MESSAGE.to_string(), Value::String(message));
    }

    let message = fields
        .get(FIELD_MESSAGE)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let serialize_stack = fields.get(FIELD_SERIALIZE_STACK).map(spec::truthy).unwrap_or(false);
    let async_construct = fields.get(FIELD_ASYNC_CONSTRUCT).map(spec::truthy).unwrap_or(false);

    let fault = Fault {
        inner: Arc::new(InstanceInner {
            ty: ty.clone(),
            fields,
            message,
            stack: Backtrace::capture().to_string(),
            serialize_stack,
            async_construct,
            values: RwLock::new(parsed.values.clone()),
            added_push: RwLock::new(Vec::new()),
        }),
    };
    trace!(
        name = fault.name(),
        values = parsed.values.len(),
        async_construct,
        "constructed fault instance"
    );

    if !async_construct {
        for handler in &ty.events().constructed {
            handler(&fault);
        }
    }

    // Deferred phase: emit `constructed` here instead when opted in, then
    // replay the construction-time values (snapshot, exactly once) so
    // handlers attached synchronously after construction never miss them.
    let deferred = fault.clone();
    let initial = parsed.values;
    ty.scheduler().defer(Box::new(move || {
        if deferred.inner.async_construct {
            for handler in &deferred.inner.ty.events().constructed {
                handler(&deferred);
            }
        }
        for value in &initial {
            deferred.emit_push(value);
        }
    }));

    fault
}

impl Fault {
    /// Append a value and synchronously emit a `push` event to every
    /// registered handler, in registration order, before returning.
    pub fn push(&self, value: impl Into<AuxValue>) -> &Self {
        let value = value.into();
        self.inner.values.write().unwrap().push(value.clone());
        self.emit_push(&value);
        self
    }

    /// Register an additional handler on this instance. Only [`Hook::Push`]
    /// may be subscribed post-construction; [`Hook::Constructed`] is
    /// declared at extension time and is rejected here.
    pub fn on(
        &self,
        hook: Hook,
        f: impl Fn(&Fault, &AuxValue) + Send + Sync + 'static,
    ) -> Result<&Self, ConfigError> {
        match hook {
            Hook::Constructed => Err(ConfigError::ReservedEvent),
            Hook::Push => {
                self.inner.added_push.write().unwrap().push(Arc::new(f));
                Ok(self)
            }
        }
    }

    fn emit_push(&self, value: &AuxValue) {
        for handler in &self.inner.ty.events().push {
            handler(self, value);
        }
        // Snapshot outside the lock so a handler may register further
        // handlers or push again without deadlocking.
        let added: Vec<PushHook> = self.inner.added_push.read().unwrap().clone();
        for handler in &added {
            handler(self, value);
        }
    }

    /// The instance message (caller override or rendered spec default).
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// The accumulated values, in push order.
    pub fn values(&self) -> Vec<AuxValue> {
        self.inner.values.read().unwrap().clone()
    }

    /// Returns `true` iff at least one value has accumulated.
    pub fn has_values(&self) -> bool {
        !self.inner.values.read().unwrap().is_empty()
    }

    /// A materialized spec field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.inner.fields.get(name)
    }

    /// The type label.
    pub fn name(&self) -> &str {
        self.inner.ty.name()
    }

    /// The backtrace captured at construction. Included in transport output
    /// only when the `serialize_stack` spec field is truthy.
    pub fn stack(&self) -> &str {
        &self.inner.stack
    }

    /// The type this instance was built from.
    pub fn fault_type(&self) -> &FaultType {
        &self.inner.ty
    }

    /// Returns `true` if this instance was built from `ty` or any type
    /// extended from it.
    pub fn is_a(&self, ty: &FaultType) -> bool {
        self.inner.ty.descends_from(ty)
    }

    /// Identity comparison: two handles naming the same instance.
    pub fn same_instance(&self, other: &Fault) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The JSON-safe transport form: every materialized field plus the
    /// recursively reduced `values`, with `stack` present only when the
    /// instance's `serialize_stack` flag is set.
    pub fn transport(&self) -> Value {
        self.transport_with(self.inner.serialize_stack)
    }

    pub(crate) fn transport_with(&self, serialize_stack: bool) -> Value {
        let mut out = serde_json::Map::new();
        // Seed the type label, as for any error-like value; the spec's own
        // `name` field overwrites it with the same rendered value.
        out.insert("name".to_string(), Value::String(self.name().to_string()));
        for (name, value) in &self.inner.fields {
            out.insert(name.clone(), value.clone());
        }
        let values = self.inner.values.read().unwrap();
        out.insert(
            "values".to_string(),
            Value::Array(values.iter().map(|v| transport::transport(v, serialize_stack)).collect()),
        );
        if serialize_stack {
            out.insert("stack".to_string(), Value::String(self.inner.stack.clone()));
        }
        Value::Object(out)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.message)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("name", &self.name())
            .field("message", &self.inner.message)
            .field("values", &self.inner.values.read().unwrap().len())
            .finish()
    }
}

impl std::error::Error for Fault {}

/// Transport form for generic JSON encoders (the `toJSON` alias).
impl Serialize for Fault {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.transport().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::Props;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn default_message_renders_template() {
        let ty = FaultType::base()
            .extend(Props::new().field("name", "X").field("message", "{{name}} failed"))
            .unwrap();
        let fault = ty.build([]);
        assert_eq!(fault.message(), "X failed");
        assert!(!fault.has_values());
    }

    #[test]
    fn message_override_and_values_order() {
        let ty = FaultType::base();
        let fault = ty.build(["custom".into(), 1_i64.into(), json!({"a": 1}).into()]);
        assert_eq!(fault.message(), "custom");
        assert_eq!(fault.values(), vec![AuxValue::from(1_i64), AuxValue::from(json!({"a": 1}))]);
    }

    #[test]
    fn push_is_synchronous_and_ordered() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ty = {
            let seen = seen.clone();
            FaultType::base()
                .extend(Props::new().on_push(move |_, v| {
                    seen.lock().unwrap().push(format!("type:{v:?}"));
                }))
                .unwrap()
        };
        let fault = ty.build([]);
        {
            let seen = seen.clone();
            fault
                .on(Hook::Push, move |_, v| {
                    seen.lock().unwrap().push(format!("inst:{v:?}"));
                })
                .unwrap();
        }
        fault.push(7_i64);
        let log = seen.lock().unwrap().clone();
        assert_eq!(log.len(), 2);
        assert!(log[0].starts_with("type:"));
        assert!(log[1].starts_with("inst:"));
        assert!(fault.has_values());
    }

    #[test]
    fn on_rejects_constructed() {
        let fault = FaultType::base().build([]);
        let err = fault.on(Hook::Constructed, |_, _| {}).unwrap_err();
        assert_eq!(err, ConfigError::ReservedEvent);
    }

    #[test]
    fn transport_excludes_stack_by_default() {
        let fault = FaultType::base().build(["boom".into(), 3_i64.into()]);
        let out = fault.transport();
        assert_eq!(out["name"], json!("Fault"));
        assert_eq!(out["message"], json!("boom"));
        assert_eq!(out["values"], json!([3]));
        assert!(out.get("stack").is_none());
    }

    #[test]
    fn transport_includes_stack_when_flagged() {
        let ty = FaultType::base()
            .extend(Props::new().field("serialize_stack", true))
            .unwrap();
        let out = ty.build([]).transport();
        assert!(out["stack"].is_string());
    }

    #[test]
    fn transport_reduces_nested_faults() {
        let ty = FaultType::base();
        let inner = ty.build(["inner".into()]);
        let outer = ty.build(["outer".into(), inner.into()]);
        let out = outer.transport();
        assert_eq!(out["values"][0]["name"], json!("Fault"));
        assert_eq!(out["values"][0]["message"], json!("inner"));
        assert!(out["values"][0].get("stack").is_none());
    }

    #[test]
    fn serialize_is_transport_alias() {
        let fault = FaultType::base().build(["boom".into()]);
        assert_eq!(serde_json::to_value(&fault).unwrap(), fault.transport());
    }

    #[test]
    fn instance_of_every_ancestor() {
        let base = FaultType::base();
        let mid = base.extend(Props::new().field("name", "Mid")).unwrap();
        let leaf = mid.extend(Props::new().field("name", "Leaf")).unwrap();
        let fault = leaf.build([]);
        assert!(fault.is_a(&leaf));
        assert!(fault.is_a(&mid));
        assert!(fault.is_a(&base));

        let sibling = base.extend(Props::new()).unwrap();
        assert!(!fault.is_a(&sibling));
    }

    #[test]
    fn display_and_error_trait() {
        let fault = FaultType::base().build(["broken".into()]);
        assert_eq!(fault.to_string(), "broken");
        let dynamic: &dyn std::error::Error = &fault;
        assert_eq!(dynamic.to_string(), "broken");
    }
}

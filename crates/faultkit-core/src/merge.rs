//! The spec/event merge engine — computes a child type's spec and handler
//! lists from its parent and the declared extension properties.

use crate::events::{ConstructedHook, EventMap, PushHook};
use crate::instance::Fault;
use crate::spec::Spec;
use crate::transport::AuxValue;
use serde_json::Value;
use tracing::trace;

/// Per-event declaration carried by [`Props`]: optionally clear the
/// inherited handler list, then append in declaration order.
struct HookDecl<F> {
    clear: bool,
    append: Vec<F>,
}

impl<F> Default for HookDecl<F> {
    fn default() -> Self {
        Self { clear: false, append: Vec::new() }
    }
}

/// Declared properties of an extension: spec field overrides plus lifecycle
/// hook declarations, validated by construction against the fixed event set.
///
/// ```
/// use faultkit_core::Props;
///
/// let props = Props::new()
///     .field("name", "HttpFault")
///     .field("message", "{{name}}: upstream returned {{status}}")
///     .field("status", "503")
///     .on_push(|fault, _value| {
///         let _ = fault; // react to accumulated values
///     });
/// ```
#[derive(Default)]
pub struct Props {
    fields: Vec<(String, Value)>,
    constructed: HookDecl<ConstructedHook>,
    push: HookDecl<PushHook>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override or introduce a spec field. Later declarations of the same
    /// field win.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Append a `constructed` handler after every inherited one.
    pub fn on_constructed(mut self, f: impl Fn(&Fault) + Send + Sync + 'static) -> Self {
        self.constructed.append.push(std::sync::Arc::new(f));
        self
    }

    /// Append a `push` handler after every inherited one.
    pub fn on_push(mut self, f: impl Fn(&Fault, &AuxValue) + Send + Sync + 'static) -> Self {
        self.push.append.push(std::sync::Arc::new(f));
        self
    }

    /// Reset the inherited `constructed` handler list. Handlers appended by
    /// this same extension (and by later ones) still apply.
    pub fn clear_constructed(mut self) -> Self {
        self.constructed.clear = true;
        self
    }

    /// Reset the inherited `push` handler list. Handlers appended by this
    /// same extension (and by later ones) still apply.
    pub fn clear_push(mut self) -> Self {
        self.push.clear = true;
        self
    }
}

impl std::fmt::Debug for Props {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Props")
            .field("fields", &self.fields)
            .field("constructed_cleared", &self.constructed.clear)
            .field("constructed_appended", &self.constructed.append.len())
            .field("push_cleared", &self.push.clear)
            .field("push_appended", &self.push.append.len())
            .finish()
    }
}

/// Produce the child's `{spec, events}` pair, fully decoupled from the
/// parent's maps: the spec is an independent copy and each handler list is
/// an independent `Vec` (the handlers themselves stay shared `Arc`s).
pub(crate) fn merge(parent_spec: &Spec, parent_events: &EventMap, props: Props) -> (Spec, EventMap) {
    let mut spec = parent_spec.clone();
    let mut events = parent_events.clone();

    for (name, value) in props.fields {
        spec.insert(name, value);
    }

    if props.constructed.clear {
        events.constructed.clear();
    }
    events.constructed.extend(props.constructed.append);

    if props.push.clear {
        events.push.clear();
    }
    events.push.extend(props.push.append);

    trace!(
        fields = spec.len(),
        constructed = events.constructed.len(),
        push = events.push.len(),
        "merged extension properties"
    );
    (spec, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::base_spec;
    use serde_json::json;

    #[test]
    fn field_override_replaces_parent_value() {
        let parent = base_spec();
        let (spec, _) = merge(&parent, &EventMap::default(), Props::new().field("name", "Child"));
        assert_eq!(spec["name"], json!("Child"));
        // Unmentioned fields retain the parent's value.
        assert_eq!(spec["message"], parent["message"]);
        // Parent's map is untouched.
        assert_eq!(parent["name"], json!("Fault"));
    }

    #[test]
    fn new_fields_are_introduced() {
        let (spec, _) = merge(
            &base_spec(),
            &EventMap::default(),
            Props::new().field("status", "503").field("fatal", true),
        );
        assert_eq!(spec["status"], json!("503"));
        assert_eq!(spec["fatal"], json!(true));
    }

    #[test]
    fn handlers_append_after_inherited() {
        let (_, parent_events) =
            merge(&base_spec(), &EventMap::default(), Props::new().on_push(|_, _| {}));
        let (_, child_events) = merge(&base_spec(), &parent_events, Props::new().on_push(|_, _| {}));
        assert_eq!(child_events.push.len(), 2);
        // Parent list unaffected.
        assert_eq!(parent_events.push.len(), 1);
    }

    #[test]
    fn clear_resets_inherited_then_appends() {
        let (_, parent_events) = merge(
            &base_spec(),
            &EventMap::default(),
            Props::new().on_push(|_, _| {}).on_constructed(|_| {}),
        );
        let (_, child_events) = merge(
            &base_spec(),
            &parent_events,
            Props::new().clear_push().on_push(|_, _| {}),
        );
        assert_eq!(child_events.push.len(), 1);
        assert_eq!(child_events.constructed.len(), 1);
    }

    #[test]
    fn clear_alone_leaves_event_empty() {
        let (_, parent_events) =
            merge(&base_spec(), &EventMap::default(), Props::new().on_constructed(|_| {}));
        let (_, child_events) = merge(&base_spec(), &parent_events, Props::new().clear_constructed());
        assert!(child_events.constructed.is_empty());
    }
}

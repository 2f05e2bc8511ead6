//! Fault types and the depth-limited extension chain.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::events::EventMap;
use crate::instance::{self, Fault};
use crate::merge::{self, Props};
use crate::scheduler::Scheduler;
use crate::spec::{self, Spec, FIELD_NAME};
use crate::transport::AuxValue;

/// Maximum number of extensions below the root (10 types total).
pub const MAX_DEPTH: usize = 9;

struct TypeInner {
    spec: Spec,
    events: EventMap,
    parent: Option<FaultType>,
    scheduler: Scheduler,
}

/// A constructible fault type in a single-rooted extension chain.
///
/// Each type owns its fully merged spec and handler lists, computed once at
/// extension time — building an instance never walks the ancestor chain.
/// Handles are cheap to clone and share the same underlying type.
///
/// ```
/// use faultkit_core::{FaultType, Props};
///
/// let base = FaultType::base();
/// let http = base
///     .extend(Props::new().field("name", "HttpFault").field("status", "503"))
///     .unwrap();
///
/// let fault = http.build(["upstream timed out".into()]);
/// assert_eq!(fault.message(), "upstream timed out");
/// assert!(fault.is_a(&base));
/// ```
#[derive(Clone)]
pub struct FaultType {
    inner: Arc<TypeInner>,
}

impl FaultType {
    /// The root type, with the frozen default spec
    /// `{name: "Fault", message: "{{name}} aggregated error",
    /// serialize_stack: false}`, no handlers, and a fresh deferred-task
    /// scheduler shared by every type extended from it.
    pub fn base() -> Self {
        Self::base_with_scheduler(Scheduler::new())
    }

    /// The root type bound to a caller-supplied scheduler.
    pub fn base_with_scheduler(scheduler: Scheduler) -> Self {
        Self {
            inner: Arc::new(TypeInner {
                spec: spec::base_spec(),
                events: EventMap::default(),
                parent: None,
                scheduler,
            }),
        }
    }

    /// Derive a new type by merging `props` over this type's spec and
    /// handler lists.
    ///
    /// Fails with [`ConfigError::InheritanceLimit`] once the chain already
    /// holds [`MAX_DEPTH`] extensions.
    pub fn extend(&self, props: Props) -> Result<Self, ConfigError> {
        if self.depth() >= MAX_DEPTH {
            return Err(ConfigError::InheritanceLimit { limit: MAX_DEPTH });
        }
        let (spec, events) = merge::merge(&self.inner.spec, &self.inner.events, props);
        let child = Self {
            inner: Arc::new(TypeInner {
                spec,
                events,
                parent: Some(self.clone()),
                scheduler: self.inner.scheduler.clone(),
            }),
        };
        debug!(name = child.name(), depth = child.depth(), "extended fault type");
        Ok(child)
    }

    /// Build an instance of this type. The first textual argument becomes
    /// the message override; every other argument lands in `values`.
    pub fn build<I>(&self, args: I) -> Fault
    where
        I: IntoIterator<Item = AuxValue>,
    {
        instance::construct(self, args)
    }

    /// Number of ancestors (0 for the root).
    pub fn depth(&self) -> usize {
        let mut n = 0;
        let mut parent = self.inner.parent.as_ref();
        while let Some(ty) = parent {
            n += 1;
            parent = ty.inner.parent.as_ref();
        }
        n
    }

    /// This type's merged spec.
    pub fn spec(&self) -> &Spec {
        &self.inner.spec
    }

    /// This type's merged handler lists.
    pub fn events(&self) -> &EventMap {
        &self.inner.events
    }

    /// The parent type, or `None` for the root.
    pub fn parent(&self) -> Option<&FaultType> {
        self.inner.parent.as_ref()
    }

    /// The deferred-task queue shared by this type's whole hierarchy. Drain
    /// it with [`Scheduler::run_tick`] to run pending deferred phases.
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// The type label from the spec's `name` field.
    pub fn name(&self) -> &str {
        match self.inner.spec.get(FIELD_NAME) {
            Some(Value::String(s)) => s,
            _ => "Fault",
        }
    }

    /// Identity comparison: two handles naming the same minted type.
    pub fn same_type(&self, other: &FaultType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns `true` if `ancestor` is this type or any type above it.
    pub fn descends_from(&self, ancestor: &FaultType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty.same_type(ancestor) {
                return true;
            }
            current = ty.inner.parent.as_ref();
        }
        false
    }
}

impl std::fmt::Debug for FaultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultType")
            .field("name", &self.name())
            .field("depth", &self.depth())
            .field("events", &self.inner.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_has_depth_zero_and_no_parent() {
        let base = FaultType::base();
        assert_eq!(base.depth(), 0);
        assert!(base.parent().is_none());
        assert_eq!(base.name(), "Fault");
    }

    #[test]
    fn extension_chain_tracks_depth_and_parents() {
        let base = FaultType::base();
        let child = base.extend(Props::new().field("name", "Child")).unwrap();
        let grandchild = child.extend(Props::new()).unwrap();

        assert_eq!(child.depth(), 1);
        assert_eq!(grandchild.depth(), 2);
        assert!(grandchild.parent().unwrap().same_type(&child));
        // Unoverridden fields inherit down the chain.
        assert_eq!(grandchild.spec()["name"], json!("Child"));
        assert!(grandchild.descends_from(&base));
        assert!(!base.descends_from(&child));
    }

    #[test]
    fn tenth_extension_fails() {
        let mut ty = FaultType::base();
        for i in 0..MAX_DEPTH {
            ty = ty.extend(Props::new().field("level", i as i64)).unwrap();
        }
        assert_eq!(ty.depth(), MAX_DEPTH);
        let err = ty.extend(Props::new()).unwrap_err();
        assert_eq!(err, ConfigError::InheritanceLimit { limit: MAX_DEPTH });
    }

    #[test]
    fn scheduler_is_shared_down_the_chain() {
        let base = FaultType::base();
        let child = base.extend(Props::new()).unwrap();
        child.build(["boom".into()]);
        // The child's deferred phase is queued on the root's scheduler.
        assert_eq!(base.scheduler().pending(), 1);
        base.scheduler().run_tick();
    }
}

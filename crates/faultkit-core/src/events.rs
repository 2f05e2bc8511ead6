//! Lifecycle events and the per-type handler lists.

use crate::instance::Fault;
use crate::transport::AuxValue;
use std::sync::Arc;

/// The fixed set of lifecycle events a fault emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Emitted once when an instance finishes construction — synchronously
    /// by default, on the deferred tick when the spec sets `async_construct`.
    /// Subscribable only at extension time.
    Constructed,
    /// Emitted each time a value is appended to the instance's `values`,
    /// including the deferred replay of construction-time values.
    Push,
}

/// Handler for [`Hook::Constructed`]. Receives the freshly built instance.
pub type ConstructedHook = Arc<dyn Fn(&Fault) + Send + Sync>;

/// Handler for [`Hook::Push`]. Receives the instance and the pushed value.
pub type PushHook = Arc<dyn Fn(&Fault, &AuxValue) + Send + Sync>;

/// Ordered handler lists a fault type registers on each of its instances.
///
/// Owned per type, never shared with the parent: extension copies the
/// parent's lists (handlers themselves are shared `Arc`s) and appends.
/// Immutable once attached to a type.
#[derive(Clone, Default)]
pub struct EventMap {
    pub(crate) constructed: Vec<ConstructedHook>,
    pub(crate) push: Vec<PushHook>,
}

impl EventMap {
    /// Number of handlers registered for an event.
    pub fn len(&self, hook: Hook) -> usize {
        match hook {
            Hook::Constructed => self.constructed.len(),
            Hook::Push => self.push.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constructed.is_empty() && self.push.is_empty()
    }
}

impl std::fmt::Debug for EventMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventMap")
            .field("constructed", &self.constructed.len())
            .field("push", &self.push.len())
            .finish()
    }
}

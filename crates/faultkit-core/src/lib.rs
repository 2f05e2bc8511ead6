//! faultkit-core — extensible, templated error-type hierarchies.
//!
//! A fault type carries a declarative spec (`name`, a `{{param}}`-templated
//! `message`, arbitrary extra fields) and ordered lifecycle-hook lists for
//! the `constructed` and `push` events. Extending a type merges overrides
//! and appended hooks into an independent copy, up to 9 extensions deep.
//! Instances accumulate an append-only value stream and serialize to a
//! plain, JSON-safe transport form.
//!
//! # Quick start
//!
//! ```
//! use faultkit_core::{FaultType, Props};
//!
//! let base = FaultType::base();
//! let http = base
//!     .extend(
//!         Props::new()
//!             .field("name", "HttpFault")
//!             .field("message", "{{name}}: request failed")
//!             .on_push(|fault, _value| {
//!                 // runs for every accumulated value, replayed ones included
//!                 assert_eq!(fault.name(), "HttpFault");
//!             }),
//!     )
//!     .unwrap();
//!
//! let fault = http.build(["socket reset".into(), 503_i64.into()]);
//! assert_eq!(fault.message(), "socket reset");
//!
//! // Deferred phase: replays construction-time values as `push` events.
//! base.scheduler().run_tick();
//!
//! let json = fault.transport();
//! assert_eq!(json["name"], "HttpFault");
//! assert_eq!(json["values"], serde_json::json!([503]));
//! ```

pub mod args;
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod instance;
pub mod merge;
pub mod scheduler;
pub mod spec;
pub mod template;
pub mod transport;

pub use error::ConfigError;
pub use events::{EventMap, Hook};
pub use hierarchy::{FaultType, MAX_DEPTH};
pub use instance::Fault;
pub use merge::Props;
pub use scheduler::Scheduler;
pub use spec::Spec;
pub use transport::{transport, AuxValue};

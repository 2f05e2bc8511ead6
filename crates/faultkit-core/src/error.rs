//! Configuration errors surfaced synchronously to the caller.

use thiserror::Error;

/// Fatal-by-design misconfiguration of a fault type or instance.
///
/// These are never caught internally — they propagate to whoever calls the
/// extension or subscription operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Extension chains may hold at most [`crate::hierarchy::MAX_DEPTH`]
    /// extensions below the root.
    #[error("inheritance limit reached: at most {limit} extensions below the root")]
    InheritanceLimit { limit: usize },

    /// `constructed` handlers may only be declared at extension time, never
    /// on an already-built instance.
    #[error("`constructed` cannot be subscribed on an instance; declare it at extension time")]
    ReservedEvent,
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the quotevault workspace.
///
/// Structural problems (invalid arguments, empty sources, missing adapters)
/// are raised synchronously at the call boundary; everything else is carried
/// per work item inside a batch report and never aborts a run.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VaultError {
    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with fetched or stored data (malformed rows, unparseable dates).
    #[error("data issue: {0}")]
    Data(String),

    /// Filesystem or network I/O failure, flattened to a message so the error
    /// stays cloneable and serializable across the report boundary.
    #[error("i/o failure: {0}")]
    Io(String),

    /// A source adapter rejected a request or failed to parse a payload.
    #[error("{adapter} failed: {msg}")]
    Adapter {
        /// Adapter name that failed.
        adapter: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A resource, symbol, or adapter could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "adapter for 'stooq'".
        what: String,
    },

    /// A delta file handed to the merger had no rows. This signals an
    /// upstream fetch failure and is never treated as a no-op.
    #[error("empty source file: {path}")]
    EmptySource {
        /// Path of the offending file.
        path: String,
    },

    /// A work item exceeded the per-collection wait bound.
    #[error("work item timed out: {item}")]
    ItemTimeout {
        /// Identity of the timed-out item.
        item: String,
    },

    /// A work item was cancelled before producing a result.
    #[error("work item cancelled: {item}")]
    Cancelled {
        /// Identity of the cancelled item.
        item: String,
    },
}

impl VaultError {
    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: build a `Data` error.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Helper: build an `Adapter` error with the adapter name and message.
    pub fn adapter(adapter: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Adapter {
            adapter: adapter.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build an `EmptySource` error for a path-like value.
    pub fn empty_source(path: impl Into<String>) -> Self {
        Self::EmptySource { path: path.into() }
    }

    /// Helper: build an `ItemTimeout` error.
    pub fn item_timeout(item: impl Into<String>) -> Self {
        Self::ItemTimeout { item: item.into() }
    }

    /// Helper: build a `Cancelled` error.
    pub fn cancelled(item: impl Into<String>) -> Self {
        Self::Cancelled { item: item.into() }
    }

    /// True if this error terminated a single work item rather than the
    /// operation that submitted it.
    #[must_use]
    pub const fn is_item_scoped(&self) -> bool {
        matches!(
            self,
            Self::ItemTimeout { .. } | Self::Cancelled { .. } | Self::Adapter { .. }
        )
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<chrono::ParseError> for VaultError {
    fn from(err: chrono::ParseError) -> Self {
        Self::Data(err.to_string())
    }
}

//! quotevault-core
//!
//! Core types and capability traits shared across the quotevault workspace.
//!
//! - `interval`: the `[start, end)` sampling-window value type and cadence.
//! - `row`: the canonical OHLCV row format and its dedup key.
//! - `naming`: file-name conventions for history and delta files.
//! - `adapter`: the `SourceAdapter` capability trait, the `Transport` seam,
//!   and the adapter registry.
//! - `types`: work items, pool categories, and batch reports.
//!
//! Async runtime (Tokio)
//! ---------------------
//! The workspace assumes the Tokio ecosystem as the async runtime. The
//! `Transport` trait is `async` and the orchestration crate drives it from
//! Tokio tasks, so anything executing fetches must run under a Tokio 1.x
//! runtime. The types in this crate are runtime-agnostic values.
#![warn(missing_docs)]

/// The `SourceAdapter` capability trait, transport seam, and registry.
pub mod adapter;
/// Unified error type.
pub mod error;
/// Sampling windows and cadences.
pub mod interval;
/// File-name conventions for history and delta files.
pub mod naming;
/// Canonical OHLCV rows.
pub mod row;
/// Work items, pool categories, and batch reports.
pub mod types;

pub use adapter::{AdapterRegistry, FetchRequest, SourceAdapter, Transport};
pub use error::VaultError;
pub use interval::{Frequency, Interval};
pub use naming::{DEFAULT_EXTENSION, DeltaFileName, HistoryFileName};
pub use row::{CanonicalRow, DATE_FORMAT, RowKey, row_key};
pub use types::{BatchReport, PoolCategory, WorkItem};

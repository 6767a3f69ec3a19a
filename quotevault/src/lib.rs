//! quotevault
//!
//! Concurrent batch engine for maintaining an on-disk archive of per-symbol
//! end-of-day price history.
//!
//! The [`Vault`] façade fans per-symbol fetch/convert work out across
//! bounded worker pools and fans completions back in with per-item timeout
//! and failure isolation; the [`planner::UpdatePlanner`] decides how far
//! forward each existing file must be extended; the [`merger`] folds
//! range-named delta files into their history files under a strict
//! newest-first, deduplicated ordering.
//!
//! Provider specifics live behind the [`quotevault_core::SourceAdapter`]
//! capability trait; the engine never interprets provider formats itself.
//! Everything here runs on a Tokio 1.x runtime.

/// The `Vault` façade and its builder.
pub mod core;
/// Bulk download builder.
pub mod download;
/// The HTTP transport and the per-item fetch/convert unit.
pub mod fetch;
/// Delta-into-target merging, single and directory-wide.
pub mod merger;
/// Fan-out/fan-in batch execution.
pub mod orchestrator;
/// Continuation planning for existing history files.
pub mod planner;
/// Fixed-size worker pools.
pub mod pools;
/// Incremental update runs.
pub mod update;
/// Directory enumeration for history and delta files.
pub mod walker;

pub use crate::core::{Vault, VaultBuilder};
pub use download::DownloadBuilder;
pub use fetch::HttpTransport;
pub use merger::{MergeItem, MergeOutcome, merge_files, merge_lines};
pub use orchestrator::{DEFAULT_ITEM_WAIT, Orchestrator};
pub use planner::{Plan, UpdatePlanner};
pub use pools::WorkerPools;
pub use update::{Candidate, UpdateOutcome};

pub use quotevault_core::{
    AdapterRegistry, BatchReport, CanonicalRow, DeltaFileName, FetchRequest, Frequency,
    HistoryFileName, Interval, PoolCategory, SourceAdapter, Transport, VaultError, WorkItem,
};

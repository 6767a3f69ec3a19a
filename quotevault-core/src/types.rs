use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::VaultError;
use crate::interval::Interval;

/// One unit of fetch/convert work: a symbol, an optional exchange, the
/// interval to fetch, and the directory the output file lands in.
///
/// Work items are created per batch run and consumed exactly once by the
/// orchestrator; they have no lifecycle beyond that run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Instrument symbol.
    pub symbol: String,
    /// Exchange identifier, when known.
    pub exchange: Option<String>,
    /// Sampling window to fetch.
    pub interval: Interval,
    /// Destination directory for the output file.
    pub dest_dir: PathBuf,
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exchange {
            Some(ex) => write!(f, "{}:{}", ex, self.symbol),
            None => write!(f, "{}", self.symbol),
        }
    }
}

/// Worker-pool category a batch runs under.
///
/// Pools are fixed-size, created once, and sized as hardware parallelism
/// times the category multiplier. The heavy pool deliberately oversubscribes
/// the cores because per-symbol fetches are network-latency dominated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolCategory {
    /// Low-CPU I/O such as directory merges.
    Lightweight,
    /// Symbol-list downloads and similar medium fan-out work.
    Moderate,
    /// Per-symbol fetch/convert/update batches.
    Heavy,
}

impl PoolCategory {
    /// Pool size multiplier applied to hardware parallelism.
    #[must_use]
    pub const fn multiplier(self) -> usize {
        match self {
            Self::Lightweight => 1,
            Self::Moderate => 5,
            Self::Heavy => 25,
        }
    }
}

/// Outcome of one batch run: per-item successes and per-item failures with
/// their causes.
///
/// The orchestrator guarantees that every submitted item appears in exactly
/// one of the two lists, so `results.len() + failures.len()` always equals
/// the number of submitted items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport<I, T> {
    /// Items that completed, in completion order, with their produced values.
    pub results: Vec<(I, T)>,
    /// Items that failed, timed out, or were cancelled, with causes.
    pub failures: Vec<(I, VaultError)>,
}

impl<I, T> Default for BatchReport<I, T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<I, T> BatchReport<I, T> {
    /// Total number of items accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Number of items that completed.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.len()
    }

    /// Number of items that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when no item failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

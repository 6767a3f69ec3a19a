use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use quotevault_core::{
    AdapterRegistry, BatchReport, DeltaFileName, PoolCategory, SourceAdapter, Transport,
    VaultError, WorkItem,
};

use crate::core::Vault;
use crate::fetch::fetch_and_write;
use crate::planner::{Plan, UpdatePlanner};
use crate::walker;

/// One existing history file considered by an update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate(pub PathBuf);

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Per-file outcome of an update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The continuation start is not before the run's reference date;
    /// nothing to fetch.
    AlreadyCurrent,
    /// The file could not be planned (empty or malformed head) and was
    /// skipped with a warning.
    Skipped,
    /// A delta file with newly fetched rows was written at this path.
    Updated(PathBuf),
}

impl Vault {
    /// Extend every history file under `root` with newly available rows.
    ///
    /// Walks the tree for history-named files, plans a continuation interval
    /// per file, and fetches each missing span under the heavy pool, writing
    /// one range-named delta file next to its target. Planning shares one
    /// [`UpdatePlanner`] across all workers, so files with a common last
    /// date or exchange reuse cached derivations.
    ///
    /// Already-current and unplannable files are skipped (the latter with a
    /// warning), not failed; fetch errors are recorded per item. The
    /// provider adapter is derived from the `<root>/<provider>/...` layout,
    /// falling back to the sole registered adapter.
    ///
    /// # Errors
    /// Returns an error if `root` is not a directory.
    pub async fn update_tree(
        &self,
        root: impl AsRef<Path>,
    ) -> Result<BatchReport<Candidate, UpdateOutcome>, VaultError> {
        let root = root.as_ref().to_path_buf();
        let files = walker::history_files(&root)?;
        let items: Vec<Candidate> = files.into_iter().map(Candidate).collect();
        let planner = Arc::new(UpdatePlanner::new(self.run_reference_date()));
        info!(root = %root.display(), files = items.len(), "update run");

        let adapters = self.adapters.clone();
        let transport = self.transport.clone();
        let report = self
            .orchestrator()
            .execute(items, PoolCategory::Heavy, move |candidate| {
                update_one(
                    planner.clone(),
                    adapters.clone(),
                    transport.clone(),
                    root.clone(),
                    candidate,
                )
            })
            .await;
        Ok(report)
    }
}

async fn update_one(
    planner: Arc<UpdatePlanner>,
    adapters: AdapterRegistry,
    transport: Arc<dyn Transport>,
    root: PathBuf,
    candidate: Candidate,
) -> Result<UpdateOutcome, VaultError> {
    let item = match planner.plan(&candidate.0).await {
        Ok(Plan::Work(item)) => item,
        Ok(Plan::AlreadyCurrent) => return Ok(UpdateOutcome::AlreadyCurrent),
        Err(cause) => {
            warn!(file = %candidate, %cause, "skipping unplannable file");
            return Ok(UpdateOutcome::Skipped);
        }
    };
    let adapter = adapter_for(&adapters, &root, &candidate.0)?;
    let file_name = delta_name(&planner, &item)?;
    let path = fetch_and_write(
        adapter,
        transport,
        item,
        planner.reference_date(),
        file_name,
    )
    .await?;
    Ok(UpdateOutcome::Updated(path))
}

/// Provider adapter for a file, from the first path component under `root`.
fn adapter_for(
    adapters: &AdapterRegistry,
    root: &Path,
    file: &Path,
) -> Result<Arc<dyn SourceAdapter>, VaultError> {
    let provider = file
        .strip_prefix(root)
        .ok()
        .and_then(|rel| rel.components().next())
        .and_then(|c| c.as_os_str().to_str());
    if let Some(name) = provider
        && let Some(adapter) = adapters.get(name)
    {
        return Ok(adapter);
    }
    adapters.sole().ok_or_else(|| {
        VaultError::not_found(format!("adapter for '{}'", provider.unwrap_or("<root>")))
    })
}

/// Delta file name covering the item's continuation span, rendered through
/// the planner's per-run date cache.
fn delta_name(planner: &UpdatePlanner, item: &WorkItem) -> Result<String, VaultError> {
    let start = item.interval.start().ok_or_else(|| {
        VaultError::invalid_arg("continuation interval must have a start")
    })?;
    let end = item.interval.effective_end(planner.reference_date());
    let name = DeltaFileName::new(&item.symbol, start, end, item.interval.frequency());
    Ok(name.file_name_using(|d| planner.formatted(d)))
}

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use quotevault_core::{BatchReport, PoolCategory, RowKey, VaultError, row_key};

use crate::core::Vault;
use crate::walker;

/// Merge delta rows into target rows under the archive's ordering rules.
///
/// Rows are keyed by `(symbol, date)`; delta rows are inserted first, so on
/// an overlapping key the delta's version wins. The output is strictly
/// descending by date with no duplicate keys, which makes the operation
/// idempotent.
///
/// # Errors
/// Returns a `Data` error for a line that does not start with a symbol and
/// an eight-digit date; nothing is silently dropped.
pub fn merge_lines<'a>(
    delta_lines: impl IntoIterator<Item = &'a str>,
    target_lines: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<String>, VaultError> {
    let mut rows: HashMap<RowKey, &str> = HashMap::new();
    for line in delta_lines.into_iter().chain(target_lines) {
        let key =
            row_key(line).ok_or_else(|| VaultError::data(format!("malformed row: '{line}'")))?;
        rows.entry(key).or_insert(line);
    }
    let mut keyed: Vec<(RowKey, &str)> = rows.into_iter().collect();
    // Fixed-width zero-padded dates, so reversed lexicographic order is
    // reversed chronological order.
    keyed.sort_unstable_by(|(a, _), (b, _)| b.cmp(a));
    Ok(keyed.into_iter().map(|(_, line)| line.to_string()).collect())
}

fn lines_of(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect()
}

/// Fold a delta file into a target history file, rewriting the target
/// wholesale.
///
/// A missing target is treated as empty. An empty delta signals an upstream
/// fetch failure: the call fails with `EmptySource` and the target is left
/// unmodified.
///
/// # Errors
/// Returns `EmptySource` for an empty delta, `Data` for malformed rows, and
/// `Io` for filesystem failures.
pub async fn merge_files(delta: &Path, target: &Path) -> Result<(), VaultError> {
    let delta_text = tokio::fs::read_to_string(delta).await?;
    let delta_lines = lines_of(&delta_text);
    if delta_lines.is_empty() {
        return Err(VaultError::empty_source(delta.display().to_string()));
    }
    let target_text = match tokio::fs::read_to_string(target).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    let merged = merge_lines(delta_lines, lines_of(&target_text))?;
    let mut body = merged.join("\n");
    body.push('\n');
    tokio::fs::write(target, body).await?;
    debug!(delta = %delta.display(), target = %target.display(), rows = merged.len(), "merged");
    Ok(())
}

/// One reconciliation unit of a directory merge: every delta file destined
/// for a single history file.
///
/// Grouping all of a target's deltas into one item keeps each target owned
/// by exactly one worker; two workers never race a rename-vs-merge decision
/// on the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeItem {
    /// History file the deltas fold into.
    pub target: PathBuf,
    /// Delta files to consume, ascending by covered range.
    pub deltas: Vec<PathBuf>,
}

impl fmt::Display for MergeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.deltas.as_slice() {
            [one] => write!(f, "{} -> {}", one.display(), self.target.display()),
            many => write!(f, "{} deltas -> {}", many.len(), self.target.display()),
        }
    }
}

/// What a directory merge did with one target's delta files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Deltas folded into an existing target and deleted.
    pub merged: usize,
    /// Deltas renamed into place because the target was absent.
    pub renamed: usize,
}

pub(crate) async fn merge_one(item: MergeItem) -> Result<MergeOutcome, VaultError> {
    let mut outcome = MergeOutcome::default();
    for delta in &item.deltas {
        if tokio::fs::try_exists(&item.target).await? {
            merge_files(delta, &item.target).await?;
            tokio::fs::remove_file(delta).await?;
            outcome.merged += 1;
        } else {
            tokio::fs::rename(delta, &item.target).await?;
            outcome.renamed += 1;
        }
    }
    Ok(outcome)
}

impl Vault {
    /// Reconcile every delta file under `root` into its history file.
    ///
    /// Delta files are recognized by the embedded date range in their names
    /// and grouped by target: all deltas for one history file become a
    /// single work item and fold sequentially, oldest range first. When the
    /// target exists a delta is merged and deleted; when it does not, the
    /// delta is simply renamed — no merge necessary, no duplication risk.
    /// Runs under the lightweight pool: the work is I/O-bound with
    /// negligible CPU cost, but must not block the calling task.
    ///
    /// # Errors
    /// Returns an error if `root` is not a directory; per-target failures
    /// are recorded in the report.
    pub async fn merge_tree(
        &self,
        root: impl AsRef<Path>,
    ) -> Result<BatchReport<MergeItem, MergeOutcome>, VaultError> {
        let root = root.as_ref();
        let deltas = walker::delta_files(root)?;
        // Walk order is sorted by path, so each target's delta list is
        // ascending by start date and later ranges win overlaps.
        let mut by_target: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        for (path, name) in deltas {
            let dir = path
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            by_target
                .entry(dir.join(name.target().file_name()))
                .or_default()
                .push(path);
        }
        let items: Vec<MergeItem> = by_target
            .into_iter()
            .map(|(target, deltas)| MergeItem { target, deltas })
            .collect();
        info!(root = %root.display(), targets = items.len(), "directory merge");
        Ok(self
            .orchestrator()
            .execute(items, PoolCategory::Lightweight, merge_one)
            .await)
    }

    /// Fold a single delta file into a target history file.
    ///
    /// # Errors
    /// See [`merge_files`].
    pub async fn merge_files(
        &self,
        delta: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> Result<(), VaultError> {
        merge_files(delta.as_ref(), target.as_ref()).await
    }
}

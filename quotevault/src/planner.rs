use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use quotevault_core::{DATE_FORMAT, Frequency, HistoryFileName, Interval, VaultError, WorkItem};

/// Outcome of planning one existing history file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// The file needs extending; fetch this item.
    Work(WorkItem),
    /// Nothing newer can exist yet; skip the file. Not an error.
    AlreadyCurrent,
}

/// Plans the continuation interval that brings an existing history file
/// current.
///
/// One planner instance is scoped to one run: it captures the reference
/// "now" once and owns the run's caches. A single run plans many files that
/// share a last-known date and an exchange directory, so derived intervals,
/// rendered dates, and exchange lookups are cached per run. The caches are
/// read and written concurrently by planning workers; a race may duplicate a
/// computation, never corrupt a value.
pub struct UpdatePlanner {
    now: NaiveDate,
    continuations: DashMap<(NaiveDate, Frequency), Interval>,
    rendered_dates: DashMap<NaiveDate, String>,
    exchanges: DashMap<PathBuf, Option<String>>,
}

impl UpdatePlanner {
    /// Planner for a run whose fixed reference instant is `now`.
    #[must_use]
    pub fn new(now: NaiveDate) -> Self {
        Self {
            now,
            continuations: DashMap::new(),
            rendered_dates: DashMap::new(),
            exchanges: DashMap::new(),
        }
    }

    /// The run's fixed reference date.
    #[must_use]
    pub const fn reference_date(&self) -> NaiveDate {
        self.now
    }

    /// Compute how far forward `path` must be extended.
    ///
    /// Only the first line is read: files are stored newest-first, so it
    /// carries the symbol and the last known date. The cadence comes from
    /// the file-name suffix (absent means daily) and the exchange from the
    /// parent directory name.
    ///
    /// # Errors
    /// Returns an error for a file with no readable first line, a malformed
    /// head, or an unparseable date. Callers treat these as skip-with-warning,
    /// not batch failures.
    pub async fn plan(&self, path: &Path) -> Result<Plan, VaultError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                VaultError::invalid_arg(format!("not a file path: {}", path.display()))
            })?;
        let spec = HistoryFileName::parse(name).ok_or_else(|| {
            VaultError::invalid_arg(format!("not a history file name: {name}"))
        })?;

        let first = first_line(path).await?;
        let (symbol, last_date) = head_fields(&first, path)?;

        let Some(interval) = self.continuation(last_date, spec.frequency)? else {
            debug!(file = %path.display(), last = %last_date, "already current");
            return Ok(Plan::AlreadyCurrent);
        };

        let exchange = self.exchange_for(path);
        let dest_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Plan::Work(WorkItem {
            symbol,
            exchange,
            interval,
            dest_dir,
        }))
    }

    /// Continuation interval for a file whose newest row is `last`, or
    /// `None` when the file is already current.
    fn continuation(
        &self,
        last: NaiveDate,
        frequency: Frequency,
    ) -> Result<Option<Interval>, VaultError> {
        if let Some(cached) = self.continuations.get(&(last, frequency)) {
            return Ok(Some(*cached));
        }
        let start = frequency.next_after(last);
        if start >= self.now {
            return Ok(None);
        }
        let interval = Interval::bounded(start, self.now, frequency)?;
        self.continuations.insert((last, frequency), interval);
        Ok(Some(interval))
    }

    /// Cached `YYYYMMDD` rendering of a date.
    #[must_use]
    pub fn formatted(&self, date: NaiveDate) -> String {
        if let Some(cached) = self.rendered_dates.get(&date) {
            return cached.clone();
        }
        let rendered = date.format(DATE_FORMAT).to_string();
        self.rendered_dates.insert(date, rendered.clone());
        rendered
    }

    /// Cached exchange name derived from the file's parent directory.
    fn exchange_for(&self, path: &Path) -> Option<String> {
        let parent = path.parent()?.to_path_buf();
        if let Some(cached) = self.exchanges.get(&parent) {
            return cached.clone();
        }
        let exchange = parent
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        self.exchanges.insert(parent, exchange.clone());
        exchange
    }
}

async fn first_line(path: &Path) -> Result<String, VaultError> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    match lines.next_line().await? {
        Some(line) if !line.trim().is_empty() => Ok(line),
        _ => Err(VaultError::empty_source(path.display().to_string())),
    }
}

fn head_fields(line: &str, path: &Path) -> Result<(String, NaiveDate), VaultError> {
    let mut fields = line.splitn(3, ',');
    let symbol = fields.next().unwrap_or("").trim();
    let date_field = fields.next().map(str::trim).unwrap_or("");
    if symbol.is_empty() || date_field.is_empty() {
        return Err(VaultError::data(format!(
            "malformed first line in {}: '{line}'",
            path.display()
        )));
    }
    let last_date = NaiveDate::parse_from_str(date_field, DATE_FORMAT).map_err(|_| {
        VaultError::data(format!(
            "unparseable date '{date_field}' in {}",
            path.display()
        ))
    })?;
    Ok((symbol.to_string(), last_date))
}

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use quotevault_core::{BatchReport, PoolCategory, VaultError};

use crate::pools::WorkerPools;

/// Default per-collection wait bound before an outstanding item is charged
/// with a timeout.
pub const DEFAULT_ITEM_WAIT: Duration = Duration::from_secs(120);

/// Fans a batch of work items out across a bounded worker pool and fans
/// completions back in as they finish.
///
/// `execute` is a synchronous façade over asynchronous fan-out: the caller's
/// task blocks until every submitted item has exactly one recorded outcome.
pub struct Orchestrator {
    pools: Arc<WorkerPools>,
    item_wait: Duration,
}

impl Orchestrator {
    /// Orchestrator over the given pools with a per-collection wait bound.
    #[must_use]
    pub const fn new(pools: Arc<WorkerPools>, item_wait: Duration) -> Self {
        Self { pools, item_wait }
    }

    /// Run `action` once per item under the pool selected by `category`.
    ///
    /// Behavior and trade-offs:
    /// - Every item is spawned as an independent task; a pool permit bounds
    ///   how many run concurrently, so fast items are never blocked behind
    ///   slow ones and collection order is completion order.
    /// - Each collection attempt waits at most the configured bound. When it
    ///   expires with nothing finishing, the oldest still-outstanding item is
    ///   recorded as a timeout failure and its task is aborted. Abortion is
    ///   advisory: in-flight I/O may run to completion, and a late result for
    ///   an already-recorded item is dropped.
    /// - Worker panics and cancellations become per-item failures, never a
    ///   batch abort.
    /// - Invariant: `results.len() + failures.len() == items.len()`; no
    ///   item's outcome is left unreported.
    pub async fn execute<I, T, F, Fut>(
        &self,
        items: Vec<I>,
        category: PoolCategory,
        action: F,
    ) -> BatchReport<I, T>
    where
        I: Clone + Display + Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T, VaultError>> + Send + 'static,
    {
        let total = items.len();
        let mut report = BatchReport::default();
        if total == 0 {
            return report;
        }

        let mut set: JoinSet<(usize, Result<T, VaultError>)> = JoinSet::new();
        let mut aborts = Vec::with_capacity(total);
        let mut index_of_task = HashMap::with_capacity(total);
        for (idx, item) in items.iter().enumerate() {
            let semaphore = self.pools.semaphore(category);
            let fut = action(item.clone());
            let handle = set.spawn(async move {
                // The pool semaphore is never closed; a permit caps how many
                // items of this category run at once.
                let _permit = semaphore.acquire_owned().await.ok();
                (idx, fut.await)
            });
            index_of_task.insert(handle.id(), idx);
            aborts.push(handle);
        }

        let mut recorded = vec![false; total];
        let mut accounted = 0usize;
        while accounted < total {
            match tokio::time::timeout(self.item_wait, set.join_next()).await {
                Ok(Some(Ok((idx, outcome)))) => {
                    if recorded[idx] {
                        continue;
                    }
                    recorded[idx] = true;
                    accounted += 1;
                    match outcome {
                        Ok(value) => {
                            debug!(item = %items[idx], "work item complete");
                            report.results.push((items[idx].clone(), value));
                        }
                        Err(cause) => {
                            warn!(item = %items[idx], %cause, "work item failed");
                            report.failures.push((items[idx].clone(), cause));
                        }
                    }
                }
                Ok(Some(Err(join_err))) => {
                    let Some(&idx) = index_of_task.get(&join_err.id()) else {
                        continue;
                    };
                    if recorded[idx] {
                        continue;
                    }
                    recorded[idx] = true;
                    accounted += 1;
                    let cause = if join_err.is_cancelled() {
                        VaultError::cancelled(items[idx].to_string())
                    } else {
                        VaultError::data(format!("worker panicked: {join_err}"))
                    };
                    warn!(item = %items[idx], %cause, "work item did not complete");
                    report.failures.push((items[idx].clone(), cause));
                }
                Ok(None) => {
                    // Set drained with items unaccounted; close them out so
                    // every submission still gets exactly one outcome.
                    for idx in 0..total {
                        if !recorded[idx] {
                            recorded[idx] = true;
                            accounted += 1;
                            report
                                .failures
                                .push((items[idx].clone(), VaultError::cancelled(items[idx].to_string())));
                        }
                    }
                }
                Err(_elapsed) => {
                    // Nothing finished within the wait bound: charge the
                    // oldest outstanding item and interrupt its task.
                    if let Some(idx) = recorded.iter().position(|done| !done) {
                        aborts[idx].abort();
                        recorded[idx] = true;
                        accounted += 1;
                        warn!(item = %items[idx], "work item exceeded the wait bound");
                        report
                            .failures
                            .push((items[idx].clone(), VaultError::item_timeout(items[idx].to_string())));
                    }
                }
            }
        }

        info!(
            total,
            passed = report.passed(),
            failed = report.failed(),
            "batch complete"
        );
        for (item, cause) in &report.failures {
            info!(item = %item, %cause, "batch failure");
        }
        report
    }
}

use std::sync::Arc;

use tokio::sync::Semaphore;

use quotevault_core::PoolCategory;

/// Fixed-size worker pools shared by every batch run of one `Vault`.
///
/// Each category is a semaphore sized `hardware parallelism × multiplier`;
/// a permit bounds how many work items of that category run at once. The
/// pools are created once and live as long as the vault.
pub struct WorkerPools {
    parallelism: usize,
    lightweight: Arc<Semaphore>,
    moderate: Arc<Semaphore>,
    heavy: Arc<Semaphore>,
}

impl WorkerPools {
    /// Pools sized from the detected hardware parallelism.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parallelism(num_cpus::get())
    }

    /// Pools sized from an explicit hardware parallelism (clamped to >= 1).
    #[must_use]
    pub fn with_parallelism(hardware: usize) -> Self {
        let parallelism = hardware.max(1);
        let sized = |category: PoolCategory| {
            Arc::new(Semaphore::new(parallelism * category.multiplier()))
        };
        Self {
            parallelism,
            lightweight: sized(PoolCategory::Lightweight),
            moderate: sized(PoolCategory::Moderate),
            heavy: sized(PoolCategory::Heavy),
        }
    }

    /// Total permits of a category's pool.
    #[must_use]
    pub const fn permits(&self, category: PoolCategory) -> usize {
        self.parallelism * category.multiplier()
    }

    pub(crate) fn semaphore(&self, category: PoolCategory) -> Arc<Semaphore> {
        match category {
            PoolCategory::Lightweight => self.lightweight.clone(),
            PoolCategory::Moderate => self.moderate.clone(),
            PoolCategory::Heavy => self.heavy.clone(),
        }
    }
}

impl Default for WorkerPools {
    fn default() -> Self {
        Self::new()
    }
}

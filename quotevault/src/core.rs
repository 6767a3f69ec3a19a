use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};

use quotevault_core::{AdapterRegistry, SourceAdapter, Transport, VaultError};

use crate::fetch::HttpTransport;
use crate::orchestrator::{DEFAULT_ITEM_WAIT, Orchestrator};
use crate::pools::WorkerPools;

/// Entry point owning the adapter registry, the worker pools, and the
/// transport, and exposing the archive operations (download, update, merge).
pub struct Vault {
    pub(crate) adapters: AdapterRegistry,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) pools: Arc<WorkerPools>,
    pub(crate) item_wait: Duration,
    pub(crate) reference_date: Option<NaiveDate>,
}

/// Builder for constructing a [`Vault`] with custom configuration.
pub struct VaultBuilder {
    adapters: AdapterRegistry,
    transport: Option<Arc<dyn Transport>>,
    pools: Option<Arc<WorkerPools>>,
    item_wait: Duration,
    reference_date: Option<NaiveDate>,
}

impl Default for VaultBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultBuilder {
    /// Create a builder with sensible defaults: HTTP transport, pools sized
    /// from the detected hardware, a two-minute item wait, and "now"
    /// captured at the start of each run.
    #[must_use]
    pub fn new() -> Self {
        Self {
            adapters: AdapterRegistry::new(),
            transport: None,
            pools: None,
            item_wait: DEFAULT_ITEM_WAIT,
            reference_date: None,
        }
    }

    /// Register a source adapter under its own provider name.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.register(adapter);
        self
    }

    /// Replace the transport. Tests use this to substitute a canned one.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share pre-built worker pools, e.g. across several vaults.
    #[must_use]
    pub fn pools(mut self, pools: Arc<WorkerPools>) -> Self {
        self.pools = Some(pools);
        self
    }

    /// Set the per-collection wait bound after which an outstanding work
    /// item is charged with a timeout and interrupted.
    #[must_use]
    pub const fn item_wait(mut self, wait: Duration) -> Self {
        self.item_wait = wait;
        self
    }

    /// Pin the reference "now" used by update planning and open-ended
    /// intervals. Defaults to the current UTC date, captured once per run.
    #[must_use]
    pub const fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Build the vault.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no adapter has been registered.
    pub fn build(self) -> Result<Vault, VaultError> {
        if self.adapters.is_empty() {
            return Err(VaultError::invalid_arg(
                "no adapters registered; add at least one via with_adapter(...)",
            ));
        }
        Ok(Vault {
            adapters: self.adapters,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HttpTransport::new())),
            pools: self.pools.unwrap_or_else(|| Arc::new(WorkerPools::new())),
            item_wait: self.item_wait,
            reference_date: self.reference_date,
        })
    }
}

impl Vault {
    /// Start building a new vault.
    #[must_use]
    pub fn builder() -> VaultBuilder {
        VaultBuilder::new()
    }

    pub(crate) fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.pools.clone(), self.item_wait)
    }

    /// The run's fixed reference date: the pinned date if one was set,
    /// otherwise today's UTC date.
    pub(crate) fn run_reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Resolve an adapter by explicit name, or the sole registered one.
    pub(crate) fn adapter_named(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<dyn SourceAdapter>, VaultError> {
        match name {
            Some(n) => self
                .adapters
                .get(n)
                .ok_or_else(|| VaultError::not_found(format!("adapter for '{n}'"))),
            None => self.adapters.sole().ok_or_else(|| {
                VaultError::invalid_arg(
                    "multiple adapters registered; select one with provider(...)",
                )
            }),
        }
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::VaultError;
use crate::interval::Interval;

/// Request descriptor built by a [`SourceAdapter`] and executed by a
/// [`Transport`]. The core never interprets provider URLs itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Fully rendered provider URL.
    pub url: String,
}

impl FetchRequest {
    /// Wrap a rendered URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Capability interface implemented by each of the provider-specific
/// adapters.
///
/// Providers differ only in how they render a request and how they turn the
/// raw payload into canonical rows, so the whole family is expressed as one
/// small trait held in an [`AdapterRegistry`] rather than an inheritance
/// hierarchy. Adapters are pure: the network call between `build_request`
/// and `parse` goes through a [`Transport`].
pub trait SourceAdapter: Send + Sync {
    /// Stable adapter name; doubles as the provider directory name under the
    /// archive root.
    fn name(&self) -> &'static str;

    /// Render the provider request for one symbol over `interval`.
    ///
    /// `now` is the run's fixed reference date, for resolving an absent end
    /// bound. A `since inception` interval (absent start) is rendered with
    /// [`SourceAdapter::earliest_supported`] as the effective start.
    ///
    /// # Errors
    /// Returns an error if the adapter cannot serve the symbol or interval.
    fn build_request(
        &self,
        symbol: &str,
        exchange: Option<&str>,
        interval: &Interval,
        now: NaiveDate,
    ) -> Result<FetchRequest, VaultError>;

    /// Turn a raw provider payload into canonical lines, newest first.
    ///
    /// # Errors
    /// Returns an error if the payload is malformed for this provider.
    fn parse(&self, raw: &str) -> Result<Vec<String>, VaultError>;

    /// Earliest date this provider can serve; substituted for an absent
    /// start bound.
    fn earliest_supported(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid")
    }
}

/// Transport seam between adapters and the network.
///
/// The default implementation in the `quotevault` crate is reqwest-backed;
/// tests substitute a canned transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request and return the raw response body.
    ///
    /// # Errors
    /// Returns an error on connection failure or a non-success status.
    async fn fetch(&self, request: &FetchRequest) -> Result<String, VaultError>;
}

/// Lookup registry mapping provider names to adapter instances.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    by_name: HashMap<&'static str, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own name. Re-registering a name
    /// replaces the previous instance.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.by_name.insert(adapter.name(), adapter);
    }

    /// Look up an adapter by provider name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.by_name.get(name).cloned()
    }

    /// The registered adapter, if exactly one is present.
    #[must_use]
    pub fn sole(&self) -> Option<Arc<dyn SourceAdapter>> {
        if self.by_name.len() == 1 {
            self.by_name.values().next().cloned()
        } else {
            None
        }
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when no adapter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Registered provider names, in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.keys().copied()
    }
}

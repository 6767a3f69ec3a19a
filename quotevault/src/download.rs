use std::path::PathBuf;

use tracing::info;

use quotevault_core::{
    BatchReport, Frequency, HistoryFileName, Interval, PoolCategory, VaultError, WorkItem,
};

use crate::core::Vault;
use crate::fetch::fetch_and_write;

/// Builder to orchestrate bulk history downloads for multiple symbols.
pub struct DownloadBuilder<'a> {
    vault: &'a Vault,
    provider: Option<String>,
    symbols: Vec<(String, Option<String>)>,
    interval: Interval,
    dest: PathBuf,
}

impl<'a> DownloadBuilder<'a> {
    pub(crate) fn new(vault: &'a Vault) -> Self {
        Self {
            vault,
            provider: None,
            symbols: Vec::new(),
            interval: Interval::since_inception(Frequency::Daily),
            dest: PathBuf::from("."),
        }
    }

    /// Select the provider adapter by name. Optional when exactly one
    /// adapter is registered.
    #[must_use]
    pub fn provider(mut self, name: &str) -> Self {
        self.provider = Some(name.to_string());
        self
    }

    /// Append one symbol with an optional exchange.
    ///
    /// # Errors
    /// Returns an error if the `(exchange, symbol)` pair is already listed.
    pub fn add_symbol(mut self, symbol: &str, exchange: Option<&str>) -> Result<Self, VaultError> {
        if self
            .symbols
            .iter()
            .any(|(s, e)| s == symbol && e.as_deref() == exchange)
        {
            return Err(VaultError::invalid_arg(format!(
                "duplicate symbol '{symbol}' in download list"
            )));
        }
        self.symbols
            .push((symbol.to_string(), exchange.map(str::to_string)));
        Ok(self)
    }

    /// Append many symbols listed on one exchange.
    ///
    /// # Errors
    /// Returns an error on the first duplicate `(exchange, symbol)` pair.
    pub fn symbols(mut self, exchange: Option<&str>, symbols: &[&str]) -> Result<Self, VaultError> {
        for symbol in symbols {
            self = self.add_symbol(symbol, exchange)?;
        }
        Ok(self)
    }

    /// Select the sampling window. Defaults to daily since inception.
    #[must_use]
    pub const fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Set the archive root. Files land under
    /// `<dest>/<provider>[/<exchange>]/<SYMBOL>[_<freq>].csv`.
    #[must_use]
    pub fn dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = dest.into();
        self
    }

    /// Execute the download across the heavy pool and aggregate results.
    ///
    /// Behavior and trade-offs:
    /// - Per-symbol fetches run concurrently under the heavy pool; partial
    ///   failures populate the report's failure list without aborting the
    ///   batch.
    /// - Every item gets exactly one recorded outcome; the report's written
    ///   paths are in completion order, not submission order.
    ///
    /// # Errors
    /// Returns an error only for structural problems: no symbols listed, or
    /// the selected adapter is not registered.
    pub async fn run(self) -> Result<BatchReport<WorkItem, PathBuf>, VaultError> {
        if self.symbols.is_empty() {
            return Err(VaultError::invalid_arg(
                "no symbols specified for download",
            ));
        }
        let adapter = self.vault.adapter_named(self.provider.as_deref())?;
        let now = self.vault.run_reference_date();
        let provider_dir = self.dest.join(adapter.name());

        let items: Vec<WorkItem> = self
            .symbols
            .iter()
            .map(|(symbol, exchange)| {
                let dest_dir = match exchange {
                    Some(e) => provider_dir.join(e),
                    None => provider_dir.clone(),
                };
                WorkItem {
                    symbol: symbol.clone(),
                    exchange: exchange.clone(),
                    interval: self.interval,
                    dest_dir,
                }
            })
            .collect();
        info!(provider = adapter.name(), symbols = items.len(), "download run");

        let transport = self.vault.transport.clone();
        let report = self
            .vault
            .orchestrator()
            .execute(items, PoolCategory::Heavy, move |item| {
                let file_name =
                    HistoryFileName::new(&item.symbol, item.interval.frequency()).file_name();
                fetch_and_write(adapter.clone(), transport.clone(), item, now, file_name)
            })
            .await;
        Ok(report)
    }
}

impl Vault {
    /// Begin building a bulk download request.
    #[must_use]
    pub fn download(&'_ self) -> DownloadBuilder<'_> {
        DownloadBuilder::new(self)
    }
}

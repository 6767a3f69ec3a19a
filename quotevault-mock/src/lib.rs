//! Mock source adapter and canned transport for CI-safe tests.
//!
//! [`MockAdapter`] renders `mock://` request URLs and parses plain canonical
//! text; [`MockTransport`] serves canned bodies keyed by symbol, with
//! failure and latency injection for orchestrator tests. Fixture helpers
//! produce deterministic descending row sets.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use quotevault_core::{
    CanonicalRow, DATE_FORMAT, FetchRequest, Interval, SourceAdapter, Transport, VaultError,
};

/// Mock adapter. Deterministic and offline: requests are `mock://` URLs and
/// payloads are already-canonical text.
///
/// The magic symbol `BADREQ` forces a request-construction failure.
pub struct MockAdapter;

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAdapter {
    /// New mock adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SourceAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn build_request(
        &self,
        symbol: &str,
        exchange: Option<&str>,
        interval: &Interval,
        now: NaiveDate,
    ) -> Result<FetchRequest, VaultError> {
        if symbol == "BADREQ" {
            return Err(VaultError::invalid_arg("forced request failure"));
        }
        let start = interval.start().unwrap_or_else(|| self.earliest_supported());
        let end = interval.effective_end(now);
        Ok(FetchRequest::new(format!(
            "mock://{symbol}?start={}&end={}&freq={}&exchange={}",
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT),
            interval.frequency(),
            exchange.unwrap_or("-"),
        )))
    }

    fn parse(&self, raw: &str) -> Result<Vec<String>, VaultError> {
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.parse::<CanonicalRow>().map(|row| row.to_string()))
            .collect()
    }
}

/// Canned transport keyed by the symbol embedded in `mock://` URLs.
#[derive(Default)]
pub struct MockTransport {
    bodies: Mutex<HashMap<String, String>>,
    failures: Mutex<HashMap<String, VaultError>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl MockTransport {
    /// Empty transport; every fetch fails with `NotFound` until bodies are
    /// added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `symbol`.
    #[must_use]
    pub fn with_body(self, symbol: &str, body: impl Into<String>) -> Self {
        self.bodies
            .lock()
            .expect("mock transport lock")
            .insert(symbol.to_string(), body.into());
        self
    }

    /// Fail fetches for `symbol` with `error`.
    #[must_use]
    pub fn with_failure(self, symbol: &str, error: VaultError) -> Self {
        self.failures
            .lock()
            .expect("mock transport lock")
            .insert(symbol.to_string(), error);
        self
    }

    /// Delay fetches for `symbol`, for timeout tests.
    #[must_use]
    pub fn with_delay(self, symbol: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .expect("mock transport lock")
            .insert(symbol.to_string(), delay);
        self
    }

    fn symbol_of(url: &str) -> Option<&str> {
        url.strip_prefix("mock://")?.split('?').next()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, VaultError> {
        let Some(symbol) = Self::symbol_of(&request.url) else {
            return Err(VaultError::invalid_arg(format!(
                "not a mock url: {}",
                request.url
            )));
        };
        let delay = self
            .delays
            .lock()
            .expect("mock transport lock")
            .get(symbol)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self
            .failures
            .lock()
            .expect("mock transport lock")
            .get(symbol)
        {
            return Err(error.clone());
        }
        self.bodies
            .lock()
            .expect("mock transport lock")
            .get(symbol)
            .cloned()
            .ok_or_else(|| VaultError::not_found(format!("canned body for {symbol}")))
    }
}

/// Deterministic rows for `symbol`: `count` consecutive days ending at
/// `last`, newest first.
#[must_use]
pub fn fixture_rows(symbol: &str, last: NaiveDate, count: u32) -> Vec<CanonicalRow> {
    (0..count)
        .map(|i| {
            let date = last - Days::new(u64::from(i));
            let base = Decimal::from(100 + i64::from(i));
            CanonicalRow {
                symbol: symbol.to_string(),
                date,
                open: base,
                high: base + Decimal::ONE,
                low: base - Decimal::ONE,
                close: base,
                volume: Some(1_000_000 + u64::from(i)),
            }
        })
        .collect()
}

/// [`fixture_rows`] rendered as a canonical text body.
#[must_use]
pub fn fixture_body(symbol: &str, last: NaiveDate, count: u32) -> String {
    let mut body = fixture_rows(symbol, last, count)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    body.push('\n');
    body
}

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use quotevault_core::{FetchRequest, SourceAdapter, Transport, VaultError, WorkItem};

/// Default transport executing adapter requests over HTTP.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Transport backed by a fresh reqwest client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, VaultError> {
        let response = self
            .client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| VaultError::Io(e.to_string()))?
            .error_for_status()
            .map_err(|e| VaultError::Io(e.to_string()))?;
        response.text().await.map_err(|e| VaultError::Io(e.to_string()))
    }
}

/// Attribute an adapter-originated error to the adapter, leaving
/// already-tagged and item-lifecycle errors untouched.
fn tag_err(adapter: &str, e: VaultError) -> VaultError {
    match e {
        e @ (VaultError::Adapter { .. }
        | VaultError::NotFound { .. }
        | VaultError::ItemTimeout { .. }
        | VaultError::Cancelled { .. }) => e,
        other => VaultError::adapter(adapter, other.to_string()),
    }
}

/// One fetch/convert unit: build the provider request, pull the raw payload
/// over the transport, parse it into canonical lines, and write them to
/// `file_name` under the item's destination directory.
///
/// The destination directory is created on demand; creation is idempotent
/// and safe under concurrent races from sibling workers.
pub(crate) async fn fetch_and_write(
    adapter: Arc<dyn SourceAdapter>,
    transport: Arc<dyn Transport>,
    item: WorkItem,
    now: NaiveDate,
    file_name: String,
) -> Result<PathBuf, VaultError> {
    let request = adapter
        .build_request(&item.symbol, item.exchange.as_deref(), &item.interval, now)
        .map_err(|e| tag_err(adapter.name(), e))?;
    debug!(item = %item, url = %request.url, "fetching");
    let raw = transport.fetch(&request).await?;
    let lines = adapter
        .parse(&raw)
        .map_err(|e| tag_err(adapter.name(), e))?;
    if lines.is_empty() {
        return Err(VaultError::not_found(format!("rows for {}", item.symbol)));
    }

    tokio::fs::create_dir_all(&item.dest_dir).await?;
    let path = item.dest_dir.join(file_name);
    let mut body = lines.join("\n");
    body.push('\n');
    tokio::fs::write(&path, body).await?;
    debug!(item = %item, path = %path.display(), rows = lines.len(), "wrote");
    Ok(path)
}

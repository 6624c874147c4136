/// Food data provider trait and types
///
/// This module defines the contract shared by the external food catalog
/// clients. A provider answers a free-text query with a list of hits
/// describing foods and their per-100 g nutrient profiles.
///
/// # Provider Contract
///
/// All providers must:
/// 1. Implement the `FoodDataProvider` trait (async)
/// 2. Return hits with nutrients normalized to 100 g of product
/// 3. Fill `source_ref` with a stable upstream identifier (FDC id, barcode)
/// 4. Map transport and upstream failures into `ConnectorError`
///
/// # Example
///
/// ```no_run
/// use untangle_connectors::provider::{ConnectorResult, FoodDataProvider, FoodHit};
/// use async_trait::async_trait;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl FoodDataProvider for MyProvider {
///     fn name(&self) -> &str {
///         "my_provider"
///     }
///
///     async fn search(&self, query: &str, limit: usize) -> ConnectorResult<Vec<FoodHit>> {
///         let _ = (query, limit);
///         Ok(Vec::new())
///     }
/// }
/// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use untangle_shared::models::food_item::FoodSource;
use untangle_shared::nutrition::{FodmapLevel, NovaClass, NutrientProfile};

/// Default timeout applied to every outbound request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connector error types
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The provider has no credentials configured
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// HTTP transport failure (DNS, TLS, timeout, connection)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream error ({status}): {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream answered 2xx but the body did not have the expected shape
    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

/// Connector result type alias
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// One food found in an external catalog
///
/// Nutrients are always per 100 g of product, whatever the upstream's
/// native serving. Saving a hit into the local catalog keeps that basis
/// (serving_size 100 g).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodHit {
    pub name: String,
    pub brand: Option<String>,
    /// Per 100 g of product
    pub nutrients: NutrientProfile,
    pub nova_class: Option<NovaClass>,
    pub fodmap: Option<FodmapLevel>,
    /// Which catalog this came from
    pub source: FoodSource,
    /// Stable upstream identifier (FDC id or barcode)
    pub source_ref: String,
}

impl FoodHit {
    /// Deduplication key: a hit is the same food when it comes from the
    /// same catalog under the same upstream identifier.
    pub fn dedup_key(&self) -> (FoodSource, &str) {
        (self.source, self.source_ref.as_str())
    }
}

/// Builds the HTTP client shared by the connectors
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn default_http_client() -> ConnectorResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Truncates an upstream body for error messages and logs
pub(crate) fn body_snippet(body: &str) -> String {
    const MAX: usize = 300;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

/// Consumes a non-success response into an `UpstreamStatus` error
pub(crate) async fn upstream_error(response: reqwest::Response) -> ConnectorError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ConnectorError::UpstreamStatus {
        status,
        body: body_snippet(&body),
    }
}

/// External food catalog client
///
/// Implementations issue one-shot requests with the shared client's
/// timeout; there is no retry layer.
#[async_trait]
pub trait FoodDataProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Searches the catalog by free-text query
    ///
    /// Returns at most `limit` hits. An empty result is not an error.
    async fn search(&self, query: &str, limit: usize) -> ConnectorResult<Vec<FoodHit>>;
}

/// Queries every provider concurrently and merges the results
///
/// A failing provider is logged and skipped so a missing API key or a
/// flaky upstream never empties the whole search. Duplicate hits
/// (same source + source_ref) are dropped, first occurrence wins.
pub async fn search_all(
    providers: &[Arc<dyn FoodDataProvider>],
    query: &str,
    limit: usize,
) -> Vec<FoodHit> {
    let searches = providers.iter().map(|provider| {
        let provider = Arc::clone(provider);
        async move {
            match provider.search(query, limit).await {
                Ok(hits) => hits,
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "food search provider failed, skipping"
                    );
                    Vec::new()
                }
            }
        }
    });

    let mut seen: HashSet<(FoodSource, String)> = HashSet::new();
    let mut merged = Vec::new();
    for hits in futures::future::join_all(searches).await {
        for hit in hits {
            if seen.insert((hit.source, hit.source_ref.clone())) {
                merged.push(hit);
            }
        }
    }
    merged
}

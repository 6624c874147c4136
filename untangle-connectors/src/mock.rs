/// Mock food data provider for tests
///
/// Answers searches from a canned hit list with a case-insensitive name
/// match, or fails every call when built with [`MockProvider::failing`].
/// Useful for exercising the search merge and the API handlers without
/// touching the network.

use crate::provider::{ConnectorError, ConnectorResult, FoodDataProvider, FoodHit};
use async_trait::async_trait;

/// Mock provider implementation
pub struct MockProvider {
    hits: Vec<FoodHit>,
    fail: bool,
}

impl MockProvider {
    /// Creates a provider that answers from the given hits
    pub fn new(hits: Vec<FoodHit>) -> Self {
        MockProvider { hits, fail: false }
    }

    /// Creates a provider whose every search fails
    pub fn failing() -> Self {
        MockProvider {
            hits: Vec::new(),
            fail: true,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl FoodDataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str, limit: usize) -> ConnectorResult<Vec<FoodHit>> {
        if self.fail {
            return Err(ConnectorError::UpstreamStatus {
                status: 500,
                body: "mock failure".to_string(),
            });
        }

        let needle = query.to_lowercase();
        Ok(self
            .hits
            .iter()
            .filter(|hit| hit.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}

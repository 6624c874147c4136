//! # Untangle Connectors
//!
//! Outbound HTTP clients for the external services Untangle talks to:
//!
//! - `usda`: USDA FoodData Central food search
//! - `openfoodfacts`: Open Food Facts barcode lookup and text search
//! - `openai`: chat completions for the assistant
//! - `provider`: the `FoodDataProvider` trait, hit type, and merged search
//! - `mock`: canned provider for tests
//!
//! All clients share one `reqwest` client with a 10 s timeout and issue
//! plain one-shot requests; there is no retry or backoff layer.
//!
//! ## Example
//!
//! ```no_run
//! use untangle_connectors::{default_http_client, FoodDataProvider, OffClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = default_http_client()?;
//! let off = OffClient::new(http);
//!
//! let hits = off.search("rolled oats", 5).await?;
//! for hit in hits {
//!     println!("{} ({})", hit.name, hit.source_ref);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod openai;
pub mod openfoodfacts;
pub mod provider;
pub mod usda;

pub use mock::MockProvider;
pub use openai::{ChatMessage, OpenAiClient};
pub use openfoodfacts::OffClient;
pub use provider::{
    default_http_client, search_all, ConnectorError, ConnectorResult, FoodDataProvider, FoodHit,
};
pub use usda::UsdaClient;

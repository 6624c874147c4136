/// Open Food Facts client
///
/// Two read paths into the openfoodfacts.org database:
///
/// - product by barcode:
///   `GET {base}/api/v2/product/{barcode}?fields=code,product_name,brands,nutriments,nova_group`
/// - text search (the v2 API has no free-text search):
///   `GET {base}/cgi/search.pl?search_terms=...&search_simple=1&action=process&json=1&page_size=...`
///
/// `nutriments` values are per 100 g. Sodium arrives in grams and is
/// converted to mg here. `nova_group` (1-4) maps straight onto the NOVA
/// class. Unknown barcodes answer HTTP 404 with `{"status": 0}`.

use crate::provider::{upstream_error, ConnectorResult, FoodDataProvider, FoodHit};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use untangle_shared::models::food_item::FoodSource;
use untangle_shared::nutrition::{NovaClass, NutrientProfile};

/// Public Open Food Facts base
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

const PRODUCT_FIELDS: &str = "code,product_name,brands,nutriments,nova_group";

/// Open Food Facts client
pub struct OffClient {
    client: reqwest::Client,
    base_url: String,
}

impl OffClient {
    /// Creates a client against the public database
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        OffClient {
            client,
            base_url: base_url.into(),
        }
    }

    /// Looks up one product by barcode
    ///
    /// Returns `Ok(None)` when the barcode is unknown or the entry is too
    /// bare to use (no name).
    pub async fn product_by_barcode(&self, barcode: &str) -> ConnectorResult<Option<FoodHit>> {
        let response = self
            .client
            .get(format!("{}/api/v2/product/{}", self.base_url, barcode))
            .query(&[("fields", PRODUCT_FIELDS)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let parsed: ProductResponse = response.json().await?;
        if parsed.status != 1 {
            return Ok(None);
        }
        Ok(parsed.product.and_then(hit_from_product))
    }
}

#[async_trait]
impl FoodDataProvider for OffClient {
    fn name(&self) -> &str {
        "openfoodfacts"
    }

    async fn search(&self, query: &str, limit: usize) -> ConnectorResult<Vec<FoodHit>> {
        let response = self
            .client
            .get(format!("{}/cgi/search.pl", self.base_url))
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", &limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed
            .products
            .into_iter()
            .filter_map(hit_from_product)
            .take(limit)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i32,
    #[serde(default)]
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
struct Product {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
    /// Comma-separated list; the first entry is the consumer brand
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    nutriments: Nutriments,
    #[serde(default, deserialize_with = "lenient_f64")]
    nova_group: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Nutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_f64")]
    energy_kcal_100g: Option<f64>,
    #[serde(rename = "proteins_100g", default, deserialize_with = "lenient_f64")]
    proteins_100g: Option<f64>,
    #[serde(rename = "carbohydrates_100g", default, deserialize_with = "lenient_f64")]
    carbohydrates_100g: Option<f64>,
    #[serde(rename = "fat_100g", default, deserialize_with = "lenient_f64")]
    fat_100g: Option<f64>,
    #[serde(rename = "saturated-fat_100g", default, deserialize_with = "lenient_f64")]
    saturated_fat_100g: Option<f64>,
    #[serde(rename = "fiber_100g", default, deserialize_with = "lenient_f64")]
    fiber_100g: Option<f64>,
    #[serde(rename = "sugars_100g", default, deserialize_with = "lenient_f64")]
    sugars_100g: Option<f64>,
    /// Grams, not mg
    #[serde(rename = "sodium_100g", default, deserialize_with = "lenient_f64")]
    sodium_100g: Option<f64>,
}

/// Open Food Facts serializes some numeric fields as strings depending on
/// the product's edit history. Accept both.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn hit_from_product(product: Product) -> Option<FoodHit> {
    let name = product
        .product_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())?
        .to_string();
    let code = product
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())?
        .to_string();

    let brand = product
        .brands
        .as_deref()
        .and_then(|b| b.split(',').next())
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string);

    let n = &product.nutriments;
    let nutrients = NutrientProfile {
        energy_kcal: n.energy_kcal_100g.unwrap_or(0.0),
        protein_g: n.proteins_100g.unwrap_or(0.0),
        carbs_g: n.carbohydrates_100g.unwrap_or(0.0),
        fat_g: n.fat_100g.unwrap_or(0.0),
        saturated_fat_g: n.saturated_fat_100g.unwrap_or(0.0),
        fiber_g: n.fiber_100g.unwrap_or(0.0),
        sugar_g: n.sugars_100g.unwrap_or(0.0),
        sodium_mg: n.sodium_100g.unwrap_or(0.0) * 1000.0,
    };

    let nova_class = product
        .nova_group
        .filter(|g| g.fract() == 0.0 && (1.0..=4.0).contains(g))
        .and_then(|g| NovaClass::from_u8(g as u8));

    Some(FoodHit {
        name,
        brand,
        nutrients,
        nova_class,
        fodmap: None,
        source: FoodSource::Openfoodfacts,
        source_ref: code,
    })
}

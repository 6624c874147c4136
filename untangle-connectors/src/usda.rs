/// USDA FoodData Central client
///
/// Searches the FoodData Central catalog:
/// `GET {base}/v1/foods/search?query=...&pageSize=...&api_key=...`
///
/// Search results carry a `foodNutrients` array keyed by the legacy
/// nutrient number, with values per 100 g of product:
///
/// ```text
/// 208  energy (kcal)     204  total fat (g)     269  sugars (g)
/// 203  protein (g)       606  saturated fat (g) 307  sodium (mg)
/// 205  carbohydrate (g)  291  fiber (g)
/// ```
///
/// Hits carry the FDC id as source ref. FoodData Central has no NOVA or
/// FODMAP data, so those fields stay empty.

use crate::provider::{
    upstream_error, ConnectorError, ConnectorResult, FoodDataProvider, FoodHit,
};
use async_trait::async_trait;
use serde::Deserialize;
use untangle_shared::models::food_item::FoodSource;
use untangle_shared::nutrition::NutrientProfile;

/// Public FoodData Central API base
pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc";

const NUTRIENT_ENERGY_KCAL: &str = "208";
const NUTRIENT_PROTEIN: &str = "203";
const NUTRIENT_CARBS: &str = "205";
const NUTRIENT_FAT: &str = "204";
const NUTRIENT_SAT_FAT: &str = "606";
const NUTRIENT_FIBER: &str = "291";
const NUTRIENT_SUGAR: &str = "269";
const NUTRIENT_SODIUM: &str = "307";

/// FoodData Central search client
pub struct UsdaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl UsdaClient {
    /// Creates a client against the public API
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL
    pub fn with_base_url(
        client: reqwest::Client,
        api_key: String,
        base_url: impl Into<String>,
    ) -> Self {
        UsdaClient {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    fdc_id: i64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    brand_name: Option<String>,
    #[serde(default)]
    brand_owner: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodNutrient {
    /// Legacy nutrient number; arrives as a string ("208")
    #[serde(default)]
    nutrient_number: Option<String>,
    #[serde(default)]
    value: Option<f64>,
}

fn profile_from_nutrients(nutrients: &[FoodNutrient]) -> NutrientProfile {
    let mut profile = NutrientProfile::default();
    for nutrient in nutrients {
        let Some(number) = nutrient.nutrient_number.as_deref() else {
            continue;
        };
        let Some(value) = nutrient.value else {
            continue;
        };
        match number {
            NUTRIENT_ENERGY_KCAL => profile.energy_kcal = value,
            NUTRIENT_PROTEIN => profile.protein_g = value,
            NUTRIENT_CARBS => profile.carbs_g = value,
            NUTRIENT_FAT => profile.fat_g = value,
            NUTRIENT_SAT_FAT => profile.saturated_fat_g = value,
            NUTRIENT_FIBER => profile.fiber_g = value,
            NUTRIENT_SUGAR => profile.sugar_g = value,
            NUTRIENT_SODIUM => profile.sodium_mg = value,
            _ => {}
        }
    }
    profile
}

fn hit_from_food(food: SearchFood) -> Option<FoodHit> {
    let name = food.description.trim();
    if name.is_empty() {
        return None;
    }

    let brand = food
        .brand_name
        .or(food.brand_owner)
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty());

    Some(FoodHit {
        name: name.to_string(),
        brand,
        nutrients: profile_from_nutrients(&food.food_nutrients),
        nova_class: None,
        fodmap: None,
        source: FoodSource::Usda,
        source_ref: food.fdc_id.to_string(),
    })
}

#[async_trait]
impl FoodDataProvider for UsdaClient {
    fn name(&self) -> &str {
        "usda"
    }

    async fn search(&self, query: &str, limit: usize) -> ConnectorResult<Vec<FoodHit>> {
        if self.api_key.is_empty() {
            return Err(ConnectorError::NotConfigured(
                "USDA_API_KEY is not set".to_string(),
            ));
        }

        let response = self
            .client
            .get(format!("{}/v1/foods/search", self.base_url))
            .query(&[
                ("query", query),
                ("pageSize", &limit.to_string()),
                ("api_key", &self.api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed
            .foods
            .into_iter()
            .filter_map(hit_from_food)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed capture of a real search response
    const SEARCH_FIXTURE: &str = r#"{
        "totalHits": 2,
        "foods": [
            {
                "fdcId": 2259793,
                "description": "Greek Yogurt, Plain, Nonfat",
                "dataType": "Branded",
                "brandName": "FAGE",
                "brandOwner": "FAGE USA Dairy Industry",
                "foodNutrients": [
                    {"nutrientId": 1008, "nutrientName": "Energy", "nutrientNumber": "208", "unitName": "KCAL", "value": 59.0},
                    {"nutrientId": 1003, "nutrientName": "Protein", "nutrientNumber": "203", "unitName": "G", "value": 10.3},
                    {"nutrientId": 1005, "nutrientName": "Carbohydrate, by difference", "nutrientNumber": "205", "unitName": "G", "value": 3.6},
                    {"nutrientId": 1004, "nutrientName": "Total lipid (fat)", "nutrientNumber": "204", "unitName": "G", "value": 0.4},
                    {"nutrientId": 1258, "nutrientName": "Fatty acids, total saturated", "nutrientNumber": "606", "unitName": "G", "value": 0.1},
                    {"nutrientId": 1079, "nutrientName": "Fiber, total dietary", "nutrientNumber": "291", "unitName": "G", "value": 0.0},
                    {"nutrientId": 2000, "nutrientName": "Sugars, total", "nutrientNumber": "269", "unitName": "G", "value": 3.2},
                    {"nutrientId": 1093, "nutrientName": "Sodium, Na", "nutrientNumber": "307", "unitName": "MG", "value": 36.0},
                    {"nutrientId": 1087, "nutrientName": "Calcium, Ca", "nutrientNumber": "301", "unitName": "MG", "value": 110.0}
                ]
            },
            {
                "fdcId": 171284,
                "description": "",
                "foodNutrients": []
            }
        ]
    }"#;

    #[test]
    fn test_fixture_mapping() {
        let parsed: SearchResponse = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        let hits: Vec<FoodHit> = parsed.foods.into_iter().filter_map(hit_from_food).collect();

        // The nameless entry is dropped
        assert_eq!(hits.len(), 1);

        let hit = &hits[0];
        assert_eq!(hit.name, "Greek Yogurt, Plain, Nonfat");
        assert_eq!(hit.brand.as_deref(), Some("FAGE"));
        assert_eq!(hit.source, FoodSource::Usda);
        assert_eq!(hit.source_ref, "2259793");
        assert_eq!(hit.nova_class, None);

        assert_eq!(hit.nutrients.energy_kcal, 59.0);
        assert_eq!(hit.nutrients.protein_g, 10.3);
        assert_eq!(hit.nutrients.carbs_g, 3.6);
        assert_eq!(hit.nutrients.fat_g, 0.4);
        assert_eq!(hit.nutrients.saturated_fat_g, 0.1);
        assert_eq!(hit.nutrients.fiber_g, 0.0);
        assert_eq!(hit.nutrients.sugar_g, 3.2);
        assert_eq!(hit.nutrients.sodium_mg, 36.0);
    }

    #[test]
    fn test_unknown_nutrient_numbers_are_ignored() {
        let nutrients = vec![
            FoodNutrient {
                nutrient_number: Some("301".to_string()),
                value: Some(110.0),
            },
            FoodNutrient {
                nutrient_number: None,
                value: Some(5.0),
            },
            FoodNutrient {
                nutrient_number: Some("203".to_string()),
                value: None,
            },
        ];

        let profile = profile_from_nutrients(&nutrients);
        assert_eq!(profile, NutrientProfile::default());
    }

    #[test]
    fn test_brand_owner_fallback() {
        let food = SearchFood {
            fdc_id: 1,
            description: "Oat Bar".to_string(),
            brand_name: None,
            brand_owner: Some("  General Oats  ".to_string()),
            food_nutrients: Vec::new(),
        };

        let hit = hit_from_food(food).unwrap();
        assert_eq!(hit.brand.as_deref(), Some("General Oats"));
    }

    #[tokio::test]
    async fn test_search_without_key_is_not_configured() {
        let client = UsdaClient::new(reqwest::Client::new(), String::new());
        let result = client.search("yogurt", 5).await;
        assert!(matches!(result, Err(ConnectorError::NotConfigured(_))));
    }
}

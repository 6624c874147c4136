/// Badge inference
///
/// Badges are coarse labels attached to a logged meal, inferred from the
/// aggregated totals and the item classifications by a fixed cutoff table.
/// The cutoffs follow the UK FSA per-meal traffic-light bands where one
/// exists (sugar, sodium, saturated fat) and common label conventions for
/// the rest (protein, fiber).
///
/// Badges are emitted in declaration order, each at most once. Opposed
/// pairs (low/high sugar, low/high sodium, whole-foods/ultra-processed,
/// low/high FODMAP) are mutually exclusive by construction.

use serde::{Deserialize, Serialize};

use super::profile::{FodmapLevel, MealItem, NovaClass, NutrientTotals};
use super::scoring::{meal_fodmap, meal_nova};

/// The meal-level cutoff table
///
/// Every threshold used by badge inference and by the meal score lives
/// here; the scoring rules reference these rather than repeating numbers.
pub mod cutoffs {
    /// High-protein badge and full score credit
    pub const PROTEIN_HIGH_G: f64 = 20.0;
    /// Partial score credit for protein
    pub const PROTEIN_MODERATE_G: f64 = 10.0;
    /// Protein floor for the balanced badge
    pub const PROTEIN_BALANCED_G: f64 = 15.0;

    /// High-fiber badge and full score credit
    pub const FIBER_HIGH_G: f64 = 6.0;
    /// Partial score credit for fiber
    pub const FIBER_MODERATE_G: f64 = 3.0;
    /// Fiber floor for the balanced badge
    pub const FIBER_BALANCED_G: f64 = 5.0;

    /// Low-sugar badge ceiling
    pub const SUGAR_LOW_G: f64 = 5.0;
    /// Partial score penalty for sugar
    pub const SUGAR_MODERATE_G: f64 = 11.0;
    /// High-sugar badge and full score penalty (FSA red band per meal)
    pub const SUGAR_HIGH_G: f64 = 22.5;

    /// Low-sodium badge ceiling
    pub const SODIUM_LOW_MG: f64 = 120.0;
    /// Partial score penalty for sodium
    pub const SODIUM_MODERATE_MG: f64 = 400.0;
    /// High-sodium badge and full score penalty
    pub const SODIUM_HIGH_MG: f64 = 600.0;

    /// Partial score penalty for saturated fat
    pub const SAT_FAT_MODERATE_G: f64 = 3.0;
    /// High-saturated-fat badge and full score penalty
    pub const SAT_FAT_HIGH_G: f64 = 6.0;
}

/// A coarse label inferred for a meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    HighProtein,
    HighFiber,
    LowSugar,
    HighSugar,
    LowSodium,
    HighSodium,
    HighSatFat,
    WholeFoods,
    UltraProcessed,
    LowFodmap,
    HighFodmap,
    Balanced,
}

impl Badge {
    /// Stable string form, matching the serialized representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::HighProtein => "high_protein",
            Badge::HighFiber => "high_fiber",
            Badge::LowSugar => "low_sugar",
            Badge::HighSugar => "high_sugar",
            Badge::LowSodium => "low_sodium",
            Badge::HighSodium => "high_sodium",
            Badge::HighSatFat => "high_sat_fat",
            Badge::WholeFoods => "whole_foods",
            Badge::UltraProcessed => "ultra_processed",
            Badge::LowFodmap => "low_fodmap",
            Badge::HighFodmap => "high_fodmap",
            Badge::Balanced => "balanced",
        }
    }
}

/// Infers the badge set for a meal
///
/// Rules, applied in order (see the cutoff table for the numbers):
///
/// - `HighProtein`: protein >= 20 g
/// - `HighFiber`: fiber >= 6 g
/// - `LowSugar` / `HighSugar`: sugar <= 5 g / >= 22.5 g
/// - `LowSodium` / `HighSodium`: sodium <= 120 mg / >= 600 mg
/// - `HighSatFat`: saturated fat >= 6 g
/// - `WholeFoods`: at least one item classified and every classified item
///   is NOVA 1-2
/// - `UltraProcessed`: the dominant NOVA class is 4
/// - `LowFodmap` / `HighFodmap`: every classified item low / dominant level
///   high
/// - `Balanced`: protein >= 15 g, fiber >= 5 g, sugar < 22.5 g, and the meal
///   is not ultra-processed
pub fn infer_badges(totals: &NutrientTotals, items: &[MealItem]) -> Vec<Badge> {
    let mut badges = Vec::new();

    if totals.protein_g >= cutoffs::PROTEIN_HIGH_G {
        badges.push(Badge::HighProtein);
    }
    if totals.fiber_g >= cutoffs::FIBER_HIGH_G {
        badges.push(Badge::HighFiber);
    }

    if totals.sugar_g <= cutoffs::SUGAR_LOW_G {
        badges.push(Badge::LowSugar);
    } else if totals.sugar_g >= cutoffs::SUGAR_HIGH_G {
        badges.push(Badge::HighSugar);
    }

    if totals.sodium_mg <= cutoffs::SODIUM_LOW_MG {
        badges.push(Badge::LowSodium);
    } else if totals.sodium_mg >= cutoffs::SODIUM_HIGH_MG {
        badges.push(Badge::HighSodium);
    }

    if totals.saturated_fat_g >= cutoffs::SAT_FAT_HIGH_G {
        badges.push(Badge::HighSatFat);
    }

    let nova = meal_nova(items);
    let classified_nova: Vec<NovaClass> = items.iter().filter_map(|i| i.nova_class).collect();
    if !items.is_empty()
        && !classified_nova.is_empty()
        && classified_nova
            .iter()
            .all(|c| *c <= NovaClass::ProcessedIngredient)
    {
        badges.push(Badge::WholeFoods);
    } else if nova == Some(NovaClass::UltraProcessed) {
        badges.push(Badge::UltraProcessed);
    }

    let fodmap = meal_fodmap(items);
    let classified_fodmap: Vec<FodmapLevel> = items.iter().filter_map(|i| i.fodmap).collect();
    if !items.is_empty()
        && !classified_fodmap.is_empty()
        && classified_fodmap.iter().all(|f| *f == FodmapLevel::Low)
    {
        badges.push(Badge::LowFodmap);
    } else if fodmap == Some(FodmapLevel::High) {
        badges.push(Badge::HighFodmap);
    }

    if totals.protein_g >= cutoffs::PROTEIN_BALANCED_G
        && totals.fiber_g >= cutoffs::FIBER_BALANCED_G
        && totals.sugar_g < cutoffs::SUGAR_HIGH_G
        && nova != Some(NovaClass::UltraProcessed)
    {
        badges.push(Badge::Balanced);
    }

    badges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::profile::NutrientProfile;

    fn item(nova: Option<NovaClass>, fodmap: Option<FodmapLevel>) -> MealItem {
        MealItem {
            food_item_id: None,
            name: "test".to_string(),
            quantity: 1.0,
            nutrients: NutrientProfile::default(),
            nova_class: nova,
            fodmap,
        }
    }

    #[test]
    fn test_empty_meal_gets_low_badges_only() {
        let totals = NutrientTotals::default();
        let badges = infer_badges(&totals, &[]);
        assert_eq!(badges, vec![Badge::LowSugar, Badge::LowSodium]);
    }

    #[test]
    fn test_protein_and_fiber_cutoffs() {
        let mut totals = NutrientTotals {
            protein_g: 19.9,
            fiber_g: 5.9,
            sugar_g: 10.0,
            sodium_mg: 300.0,
            ..Default::default()
        };
        assert!(!infer_badges(&totals, &[]).contains(&Badge::HighProtein));
        assert!(!infer_badges(&totals, &[]).contains(&Badge::HighFiber));

        totals.protein_g = 20.0;
        totals.fiber_g = 6.0;
        let badges = infer_badges(&totals, &[]);
        assert!(badges.contains(&Badge::HighProtein));
        assert!(badges.contains(&Badge::HighFiber));
    }

    #[test]
    fn test_sugar_bands_are_exclusive() {
        let low = NutrientTotals {
            sugar_g: 5.0,
            sodium_mg: 300.0,
            ..Default::default()
        };
        let mid = NutrientTotals {
            sugar_g: 12.0,
            sodium_mg: 300.0,
            ..Default::default()
        };
        let high = NutrientTotals {
            sugar_g: 22.5,
            sodium_mg: 300.0,
            ..Default::default()
        };

        assert!(infer_badges(&low, &[]).contains(&Badge::LowSugar));

        let mid_badges = infer_badges(&mid, &[]);
        assert!(!mid_badges.contains(&Badge::LowSugar));
        assert!(!mid_badges.contains(&Badge::HighSugar));

        let high_badges = infer_badges(&high, &[]);
        assert!(high_badges.contains(&Badge::HighSugar));
        assert!(!high_badges.contains(&Badge::LowSugar));
    }

    #[test]
    fn test_sodium_bands() {
        let low = NutrientTotals {
            sodium_mg: 120.0,
            sugar_g: 10.0,
            ..Default::default()
        };
        let high = NutrientTotals {
            sodium_mg: 600.0,
            sugar_g: 10.0,
            ..Default::default()
        };
        assert!(infer_badges(&low, &[]).contains(&Badge::LowSodium));
        assert!(infer_badges(&high, &[]).contains(&Badge::HighSodium));
    }

    #[test]
    fn test_sat_fat_cutoff() {
        let under = NutrientTotals {
            saturated_fat_g: 5.9,
            sugar_g: 10.0,
            sodium_mg: 300.0,
            ..Default::default()
        };
        let over = NutrientTotals {
            saturated_fat_g: 6.0,
            sugar_g: 10.0,
            sodium_mg: 300.0,
            ..Default::default()
        };
        assert!(!infer_badges(&under, &[]).contains(&Badge::HighSatFat));
        assert!(infer_badges(&over, &[]).contains(&Badge::HighSatFat));
    }

    #[test]
    fn test_whole_foods_requires_all_classified_items_minimally_processed() {
        let totals = NutrientTotals {
            sugar_g: 10.0,
            sodium_mg: 300.0,
            ..Default::default()
        };

        let whole = [
            item(Some(NovaClass::Unprocessed), None),
            item(Some(NovaClass::ProcessedIngredient), None),
        ];
        assert!(infer_badges(&totals, &whole).contains(&Badge::WholeFoods));

        let mixed = [
            item(Some(NovaClass::Unprocessed), None),
            item(Some(NovaClass::Processed), None),
        ];
        let badges = infer_badges(&totals, &mixed);
        assert!(!badges.contains(&Badge::WholeFoods));
        assert!(!badges.contains(&Badge::UltraProcessed));

        // Unclassified-only meals earn neither processing badge.
        let unknown = [item(None, None)];
        let badges = infer_badges(&totals, &unknown);
        assert!(!badges.contains(&Badge::WholeFoods));
        assert!(!badges.contains(&Badge::UltraProcessed));
    }

    #[test]
    fn test_ultra_processed_dominates() {
        let totals = NutrientTotals {
            sugar_g: 10.0,
            sodium_mg: 300.0,
            ..Default::default()
        };
        let items = [
            item(Some(NovaClass::Unprocessed), None),
            item(Some(NovaClass::UltraProcessed), None),
        ];
        let badges = infer_badges(&totals, &items);
        assert!(badges.contains(&Badge::UltraProcessed));
        assert!(!badges.contains(&Badge::WholeFoods));
    }

    #[test]
    fn test_fodmap_badges() {
        let totals = NutrientTotals {
            sugar_g: 10.0,
            sodium_mg: 300.0,
            ..Default::default()
        };

        let low = [
            item(None, Some(FodmapLevel::Low)),
            item(None, Some(FodmapLevel::Low)),
        ];
        assert!(infer_badges(&totals, &low).contains(&Badge::LowFodmap));

        let high = [
            item(None, Some(FodmapLevel::Low)),
            item(None, Some(FodmapLevel::High)),
        ];
        let badges = infer_badges(&totals, &high);
        assert!(badges.contains(&Badge::HighFodmap));
        assert!(!badges.contains(&Badge::LowFodmap));

        let moderate = [item(None, Some(FodmapLevel::Moderate))];
        let badges = infer_badges(&totals, &moderate);
        assert!(!badges.contains(&Badge::LowFodmap));
        assert!(!badges.contains(&Badge::HighFodmap));
    }

    #[test]
    fn test_balanced_badge() {
        let totals = NutrientTotals {
            protein_g: 15.0,
            fiber_g: 5.0,
            sugar_g: 10.0,
            sodium_mg: 300.0,
            ..Default::default()
        };
        assert!(infer_badges(&totals, &[]).contains(&Badge::Balanced));

        // Ultra-processed meals are never balanced.
        let items = [item(Some(NovaClass::UltraProcessed), None)];
        assert!(!infer_badges(&totals, &items).contains(&Badge::Balanced));

        // Neither are sugar bombs.
        let sweet = NutrientTotals {
            sugar_g: 22.5,
            ..totals
        };
        assert!(!infer_badges(&sweet, &[]).contains(&Badge::Balanced));
    }

    #[test]
    fn test_badge_serialization() {
        assert_eq!(
            serde_json::to_string(&Badge::HighProtein).unwrap(),
            r#""high_protein""#
        );
        assert_eq!(Badge::UltraProcessed.as_str(), "ultra_processed");
    }
}

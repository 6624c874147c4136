/// Meal scoring
///
/// Pure functions over meal item snapshots: nutrient aggregation, dominant
/// NOVA/FODMAP classification, the 0-10 mindful meal score, and the three
/// projected effect axes. Everything here is deterministic and
/// database-free so the rules can be unit tested exhaustively and reused
/// by the API layer without touching storage.
///
/// All thresholds come from the cutoff table in the badges module so the
/// score and the badges can never disagree about where a band starts.

use serde::Serialize;

use super::badges::{cutoffs, infer_badges, Badge};
use super::profile::{FodmapLevel, MealEffects, MealItem, NovaClass, NutrientTotals};

/// Rounds to one decimal place, half away from zero
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Clamps a raw score into the 0-10 band and rounds to one decimal
fn finish(value: f64) -> f64 {
    round1(value.clamp(0.0, 10.0))
}

/// Sums the nutrient panels of all items, each scaled by its quantity
///
/// An empty slice yields all-zero totals. Quantities are free multipliers
/// of whatever the snapshot panel describes (servings, 100 g units), so no
/// unit conversion happens here.
pub fn aggregate_nutrients(items: &[MealItem]) -> NutrientTotals {
    let mut totals = NutrientTotals::default();
    for item in items {
        totals.accumulate(&item.nutrients.scaled(item.quantity));
    }
    totals
}

/// Dominant NOVA class of a meal: the worst class among classified items
///
/// Returns `None` when no item carries a classification. A single
/// ultra-processed component makes the whole meal ultra-processed.
pub fn meal_nova(items: &[MealItem]) -> Option<NovaClass> {
    items.iter().filter_map(|i| i.nova_class).max()
}

/// Dominant FODMAP level of a meal: the highest level among classified items
pub fn meal_fodmap(items: &[MealItem]) -> Option<FodmapLevel> {
    items.iter().filter_map(|i| i.fodmap).max()
}

/// Computes the 0-10 mindful meal score
///
/// Starts from a neutral 5.0 and applies fixed adjustments against the
/// cutoff table:
///
/// - protein: >= 20 g +1.5, else >= 10 g +0.75
/// - fiber: >= 6 g +1.5, else >= 3 g +0.75
/// - sugar: >= 22.5 g -2.0, else >= 11 g -1.0
/// - sodium: >= 600 mg -1.5, else >= 400 mg -0.75
/// - saturated fat: >= 6 g -1.0, else >= 3 g -0.5
/// - dominant NOVA: 1 +1.5, 2 +0.5, 3 -0.5, 4 -2.0 (unclassified: none)
///
/// The result is clamped to [0, 10] and rounded to one decimal. A meal
/// with no items scores exactly 5.0.
pub fn mindful_meal_score(totals: &NutrientTotals, items: &[MealItem]) -> f64 {
    let mut score = 5.0;

    if totals.protein_g >= cutoffs::PROTEIN_HIGH_G {
        score += 1.5;
    } else if totals.protein_g >= cutoffs::PROTEIN_MODERATE_G {
        score += 0.75;
    }

    if totals.fiber_g >= cutoffs::FIBER_HIGH_G {
        score += 1.5;
    } else if totals.fiber_g >= cutoffs::FIBER_MODERATE_G {
        score += 0.75;
    }

    if totals.sugar_g >= cutoffs::SUGAR_HIGH_G {
        score -= 2.0;
    } else if totals.sugar_g >= cutoffs::SUGAR_MODERATE_G {
        score -= 1.0;
    }

    if totals.sodium_mg >= cutoffs::SODIUM_HIGH_MG {
        score -= 1.5;
    } else if totals.sodium_mg >= cutoffs::SODIUM_MODERATE_MG {
        score -= 0.75;
    }

    if totals.saturated_fat_g >= cutoffs::SAT_FAT_HIGH_G {
        score -= 1.0;
    } else if totals.saturated_fat_g >= cutoffs::SAT_FAT_MODERATE_G {
        score -= 0.5;
    }

    match meal_nova(items) {
        Some(NovaClass::Unprocessed) => score += 1.5,
        Some(NovaClass::ProcessedIngredient) => score += 0.5,
        Some(NovaClass::Processed) => score -= 0.5,
        Some(NovaClass::UltraProcessed) => score -= 2.0,
        None => {}
    }

    finish(score)
}

/// Projects a meal onto three 0-10 effect axes
///
/// - strength: protein-driven (linear credit up to 30 g), with a bonus for
///   a 400-800 kcal energy window and a penalty for ultra-processed meals
/// - immunity: fiber-driven (linear credit up to 8 g), rewarding whole
///   foods and penalizing sugar
/// - inflammation: a load axis where higher is worse, driven by sugar,
///   saturated fat, sodium, and processing, offset by fiber
///
/// Each axis is clamped to [0, 10] and rounded to one decimal.
pub fn compute_meal_effects(totals: &NutrientTotals, items: &[MealItem]) -> MealEffects {
    let nova = meal_nova(items);

    let mut strength = 2.0;
    strength += (totals.protein_g / 30.0 * 6.0).min(6.0);
    if (400.0..=800.0).contains(&totals.energy_kcal) {
        strength += 1.0;
    }
    if nova == Some(NovaClass::UltraProcessed) {
        strength -= 1.0;
    }

    let mut immunity = 3.0;
    immunity += (totals.fiber_g / 8.0 * 4.0).min(4.0);
    match nova {
        Some(NovaClass::Unprocessed) => immunity += 2.0,
        Some(NovaClass::ProcessedIngredient) => immunity += 1.0,
        _ => {}
    }
    if totals.sugar_g >= cutoffs::SUGAR_HIGH_G {
        immunity -= 2.0;
    } else if totals.sugar_g >= cutoffs::SUGAR_MODERATE_G {
        immunity -= 1.0;
    }

    let mut inflammation = 2.0;
    if totals.sugar_g >= cutoffs::SUGAR_HIGH_G {
        inflammation += 3.0;
    } else if totals.sugar_g >= cutoffs::SUGAR_MODERATE_G {
        inflammation += 1.5;
    }
    if totals.saturated_fat_g >= cutoffs::SAT_FAT_HIGH_G {
        inflammation += 2.0;
    } else if totals.saturated_fat_g >= cutoffs::SAT_FAT_MODERATE_G {
        inflammation += 1.0;
    }
    if totals.sodium_mg >= cutoffs::SODIUM_HIGH_MG {
        inflammation += 1.5;
    }
    match nova {
        Some(NovaClass::UltraProcessed) => inflammation += 2.0,
        Some(NovaClass::Processed) => inflammation += 1.0,
        _ => {}
    }
    if totals.fiber_g >= cutoffs::FIBER_HIGH_G {
        inflammation -= 1.5;
    } else if totals.fiber_g >= cutoffs::FIBER_MODERATE_G {
        inflammation -= 0.5;
    }

    MealEffects {
        strength: finish(strength),
        immunity: finish(immunity),
        inflammation: finish(inflammation),
    }
}

/// Everything derived from a meal's item snapshots in one pass
#[derive(Debug, Clone, Serialize)]
pub struct MealAnalysis {
    pub totals: NutrientTotals,
    pub nova_class: Option<NovaClass>,
    pub fodmap: Option<FodmapLevel>,
    pub badges: Vec<Badge>,
    pub score: f64,
    pub effects: MealEffects,
}

/// Runs the full analysis pipeline over a meal's items
pub fn analyze_meal(items: &[MealItem]) -> MealAnalysis {
    let totals = aggregate_nutrients(items);
    let nova_class = meal_nova(items);
    let fodmap = meal_fodmap(items);
    let badges = infer_badges(&totals, items);
    let score = mindful_meal_score(&totals, items);
    let effects = compute_meal_effects(&totals, items);

    MealAnalysis {
        totals,
        nova_class,
        fodmap,
        badges,
        score,
        effects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::profile::NutrientProfile;

    fn item(nutrients: NutrientProfile, quantity: f64, nova: Option<NovaClass>) -> MealItem {
        MealItem {
            food_item_id: None,
            name: "test".to_string(),
            quantity,
            nutrients,
            nova_class: nova,
            fodmap: None,
        }
    }

    fn chicken_salad() -> Vec<MealItem> {
        vec![item(
            NutrientProfile {
                energy_kcal: 520.0,
                protein_g: 35.0,
                carbs_g: 18.0,
                fat_g: 22.0,
                saturated_fat_g: 2.5,
                fiber_g: 7.0,
                sugar_g: 4.0,
                sodium_mg: 300.0,
            },
            1.0,
            Some(NovaClass::Unprocessed),
        )]
    }

    fn soda_and_chips() -> Vec<MealItem> {
        vec![item(
            NutrientProfile {
                energy_kcal: 540.0,
                protein_g: 4.0,
                carbs_g: 75.0,
                fat_g: 22.0,
                saturated_fat_g: 7.0,
                fiber_g: 1.5,
                sugar_g: 45.0,
                sodium_mg: 700.0,
            },
            1.0,
            Some(NovaClass::UltraProcessed),
        )]
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        let totals = aggregate_nutrients(&[]);
        assert_eq!(totals, NutrientTotals::default());
    }

    #[test]
    fn test_aggregate_scales_by_quantity() {
        let items = vec![
            item(
                NutrientProfile {
                    energy_kcal: 100.0,
                    protein_g: 10.0,
                    carbs_g: 20.0,
                    fat_g: 5.0,
                    saturated_fat_g: 2.0,
                    fiber_g: 3.0,
                    sugar_g: 8.0,
                    sodium_mg: 150.0,
                },
                2.0,
                None,
            ),
            item(
                NutrientProfile {
                    energy_kcal: 400.0,
                    protein_g: 4.0,
                    carbs_g: 60.0,
                    fat_g: 12.0,
                    saturated_fat_g: 6.0,
                    fiber_g: 2.0,
                    sugar_g: 30.0,
                    sodium_mg: 800.0,
                },
                0.5,
                None,
            ),
        ];

        let totals = aggregate_nutrients(&items);
        assert_eq!(totals.energy_kcal, 400.0);
        assert_eq!(totals.protein_g, 22.0);
        assert_eq!(totals.carbs_g, 70.0);
        assert_eq!(totals.fat_g, 16.0);
        assert_eq!(totals.saturated_fat_g, 7.0);
        assert_eq!(totals.fiber_g, 7.0);
        assert_eq!(totals.sugar_g, 31.0);
        assert_eq!(totals.sodium_mg, 700.0);
    }

    #[test]
    fn test_meal_nova_takes_worst_class() {
        let items = vec![
            item(NutrientProfile::default(), 1.0, Some(NovaClass::Unprocessed)),
            item(NutrientProfile::default(), 1.0, Some(NovaClass::Processed)),
            item(NutrientProfile::default(), 1.0, None),
        ];
        assert_eq!(meal_nova(&items), Some(NovaClass::Processed));

        let unclassified = vec![item(NutrientProfile::default(), 1.0, None)];
        assert_eq!(meal_nova(&unclassified), None);
        assert_eq!(meal_nova(&[]), None);
    }

    #[test]
    fn test_meal_fodmap_takes_highest_level() {
        let mut items = vec![
            item(NutrientProfile::default(), 1.0, None),
            item(NutrientProfile::default(), 1.0, None),
        ];
        items[0].fodmap = Some(FodmapLevel::Low);
        items[1].fodmap = Some(FodmapLevel::Moderate);
        assert_eq!(meal_fodmap(&items), Some(FodmapLevel::Moderate));
        assert_eq!(meal_fodmap(&[]), None);
    }

    #[test]
    fn test_empty_meal_scores_neutral() {
        let totals = aggregate_nutrients(&[]);
        assert_eq!(mindful_meal_score(&totals, &[]), 5.0);

        let effects = compute_meal_effects(&totals, &[]);
        assert_eq!(effects.strength, 2.0);
        assert_eq!(effects.immunity, 3.0);
        assert_eq!(effects.inflammation, 2.0);
    }

    #[test]
    fn test_chicken_salad_scores_high() {
        let items = chicken_salad();
        let totals = aggregate_nutrients(&items);

        // 5.0 + 1.5 protein + 1.5 fiber + 1.5 NOVA 1
        assert_eq!(mindful_meal_score(&totals, &items), 9.5);

        let effects = compute_meal_effects(&totals, &items);
        assert_eq!(effects.strength, 9.0);
        assert_eq!(effects.immunity, 8.5);
        assert_eq!(effects.inflammation, 0.5);
    }

    #[test]
    fn test_soda_and_chips_bottom_out() {
        let items = soda_and_chips();
        let totals = aggregate_nutrients(&items);

        // Raw score is -1.5 before clamping.
        assert_eq!(mindful_meal_score(&totals, &items), 0.0);

        let effects = compute_meal_effects(&totals, &items);
        assert_eq!(effects.strength, 2.8);
        assert_eq!(effects.immunity, 1.8);
        // Raw inflammation is 10.5 before clamping.
        assert_eq!(effects.inflammation, 10.0);
    }

    #[test]
    fn test_moderate_bands_apply_partial_adjustments() {
        let totals = NutrientTotals {
            protein_g: 10.0,
            fiber_g: 3.0,
            sugar_g: 11.0,
            sodium_mg: 400.0,
            saturated_fat_g: 3.0,
            ..Default::default()
        };
        // 5.0 + 0.75 + 0.75 - 1.0 - 0.75 - 0.5
        assert_eq!(mindful_meal_score(&totals, &[]), 4.3);
    }

    #[test]
    fn test_protein_credit_saturates() {
        let lean = NutrientTotals {
            protein_g: 30.0,
            ..Default::default()
        };
        let massive = NutrientTotals {
            protein_g: 90.0,
            ..Default::default()
        };
        let a = compute_meal_effects(&lean, &[]);
        let b = compute_meal_effects(&massive, &[]);
        assert_eq!(a.strength, b.strength);
        assert_eq!(a.strength, 8.0);
    }

    #[test]
    fn test_analyze_meal_is_consistent() {
        let items = chicken_salad();
        let analysis = analyze_meal(&items);

        assert_eq!(analysis.totals, aggregate_nutrients(&items));
        assert_eq!(analysis.nova_class, Some(NovaClass::Unprocessed));
        assert_eq!(analysis.score, 9.5);
        assert_eq!(analysis.effects.strength, 9.0);
        assert!(analysis.badges.contains(&Badge::HighProtein));
        assert!(analysis.badges.contains(&Badge::Balanced));
        assert!(analysis.badges.contains(&Badge::WholeFoods));
    }

    #[test]
    fn test_score_rounds_to_one_decimal() {
        assert_eq!(round1(1.75), 1.8);
        assert_eq!(round1(9.99), 10.0);
        assert_eq!(finish(12.3), 10.0);
        assert_eq!(finish(-0.5), 0.0);
    }
}

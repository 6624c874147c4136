/// Nutrition core
///
/// The pure, stateless meal-analysis rules: nutrient aggregation over meal
/// items, badge inference from a fixed cutoff table, the 0-10 mindful meal
/// score, and the strength/immunity/inflammation effect axes. Everything in
/// this module is deterministic arithmetic with no IO, so it is exercised
/// entirely by unit tests.
///
/// # Modules
///
/// - `profile`: Nutrient value types, NOVA class, FODMAP level, meal items
/// - `scoring`: Aggregation, meal score, and effect axes
/// - `badges`: Badge rules and the cutoff table

pub mod badges;
pub mod profile;
pub mod scoring;

pub use badges::{infer_badges, Badge};
pub use profile::{
    FodmapLevel, MealEffects, MealItem, NovaClass, NutrientProfile, NutrientTotals,
};
pub use scoring::{
    aggregate_nutrients, analyze_meal, compute_meal_effects, meal_fodmap, meal_nova,
    mindful_meal_score, MealAnalysis,
};

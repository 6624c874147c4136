/// Nutrient value types and food classifications
///
/// `NutrientProfile` is the fixed set of eight tracked nutrient values. The
/// same shape serves as per-serving data on foods and as aggregated totals
/// on meals. Missing source data is always represented as `0.0`, never as
/// an option: the scoring rules treat "unknown" and "none" identically,
/// matching how the upstream food databases report sparse nutrient panels.
///
/// `NovaClass` (1-4) and `FodmapLevel` order themselves from least to most
/// processed / most restrictive, so meal-level dominance is a plain `max`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// The eight tracked nutrient values
///
/// Units: kcal for energy, grams for macros and fiber/sugar, milligrams
/// for sodium. All fields default to zero so sparse JSON panels from
/// external providers deserialize cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientProfile {
    pub energy_kcal: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub saturated_fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
}

/// Aggregated nutrient values for a whole meal
///
/// Same shape as a per-serving profile; kept as an alias so signatures read
/// as what they mean.
pub type NutrientTotals = NutrientProfile;

impl NutrientProfile {
    /// Returns this profile scaled by a serving multiplier
    pub fn scaled(&self, factor: f64) -> NutrientProfile {
        NutrientProfile {
            energy_kcal: self.energy_kcal * factor,
            protein_g: self.protein_g * factor,
            carbs_g: self.carbs_g * factor,
            fat_g: self.fat_g * factor,
            saturated_fat_g: self.saturated_fat_g * factor,
            fiber_g: self.fiber_g * factor,
            sugar_g: self.sugar_g * factor,
            sodium_mg: self.sodium_mg * factor,
        }
    }

    /// Adds another profile into this one, field by field
    pub fn accumulate(&mut self, other: &NutrientProfile) {
        self.energy_kcal += other.energy_kcal;
        self.protein_g += other.protein_g;
        self.carbs_g += other.carbs_g;
        self.fat_g += other.fat_g;
        self.saturated_fat_g += other.saturated_fat_g;
        self.fiber_g += other.fiber_g;
        self.sugar_g += other.sugar_g;
        self.sodium_mg += other.sodium_mg;
    }
}

/// NOVA food-processing classification (1-4)
///
/// 1 = unprocessed or minimally processed, 2 = processed culinary
/// ingredient, 3 = processed food, 4 = ultra-processed food. Stored as a
/// SMALLINT in the database and serialized as the bare number in JSON,
/// which is how the classification is written everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[repr(i16)]
pub enum NovaClass {
    Unprocessed = 1,
    ProcessedIngredient = 2,
    Processed = 3,
    UltraProcessed = 4,
}

impl NovaClass {
    /// The numeric class (1-4)
    pub fn as_u8(self) -> u8 {
        self as i16 as u8
    }

    /// Parses a numeric class; anything outside 1-4 is rejected
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NovaClass::Unprocessed),
            2 => Some(NovaClass::ProcessedIngredient),
            3 => Some(NovaClass::Processed),
            4 => Some(NovaClass::UltraProcessed),
            _ => None,
        }
    }
}

impl Serialize for NovaClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for NovaClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        NovaClass::from_u8(value)
            .ok_or_else(|| de::Error::custom(format!("NOVA class out of range: {}", value)))
    }
}

/// FODMAP dietary classification
///
/// Ordered so that `max` over a meal's items yields the most restrictive
/// level present.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "fodmap_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FodmapLevel {
    Low,
    Moderate,
    High,
}

/// One logged food within a meal
///
/// A value snapshot: `nutrients` is the per-serving panel copied from the
/// catalog (or entered by hand) at log time, so later edits to the catalog
/// never rewrite meal history. `quantity` is the number of servings eaten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    /// Catalog food this snapshot came from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_item_id: Option<Uuid>,

    /// Display name at log time
    pub name: String,

    /// Servings eaten (fractional allowed; must be non-negative)
    pub quantity: f64,

    /// Per-serving nutrient panel
    #[serde(default)]
    pub nutrients: NutrientProfile,

    /// NOVA class, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nova_class: Option<NovaClass>,

    /// FODMAP level, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fodmap: Option<FodmapLevel>,
}

/// The three 0-10 effect axes computed for a meal
///
/// `strength` and `immunity` read as "higher is better"; `inflammation`
/// reads as "higher is worse".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealEffects {
    pub strength: f64,
    pub immunity: f64,
    pub inflammation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults_to_zero() {
        let profile = NutrientProfile::default();
        assert_eq!(profile.energy_kcal, 0.0);
        assert_eq!(profile.sodium_mg, 0.0);
    }

    #[test]
    fn test_sparse_panel_deserializes_with_zero_fill() {
        let profile: NutrientProfile =
            serde_json::from_str(r#"{"energy_kcal": 120.0, "protein_g": 8.5}"#).unwrap();
        assert_eq!(profile.energy_kcal, 120.0);
        assert_eq!(profile.protein_g, 8.5);
        assert_eq!(profile.carbs_g, 0.0);
        assert_eq!(profile.fiber_g, 0.0);
    }

    #[test]
    fn test_scaled_and_accumulate() {
        let base = NutrientProfile {
            energy_kcal: 100.0,
            protein_g: 10.0,
            sodium_mg: 150.0,
            ..Default::default()
        };

        let mut totals = base.scaled(2.0);
        assert_eq!(totals.energy_kcal, 200.0);
        assert_eq!(totals.protein_g, 20.0);

        totals.accumulate(&base.scaled(0.5));
        assert_eq!(totals.energy_kcal, 250.0);
        assert_eq!(totals.sodium_mg, 375.0);
    }

    #[test]
    fn test_nova_serializes_as_number() {
        let json = serde_json::to_string(&NovaClass::UltraProcessed).unwrap();
        assert_eq!(json, "4");

        let parsed: NovaClass = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, NovaClass::Unprocessed);
    }

    #[test]
    fn test_nova_out_of_range_rejected() {
        assert!(serde_json::from_str::<NovaClass>("0").is_err());
        assert!(serde_json::from_str::<NovaClass>("5").is_err());
        assert_eq!(NovaClass::from_u8(3), Some(NovaClass::Processed));
        assert_eq!(NovaClass::from_u8(7), None);
    }

    #[test]
    fn test_nova_and_fodmap_ordering() {
        assert!(NovaClass::Unprocessed < NovaClass::UltraProcessed);
        assert!(FodmapLevel::Low < FodmapLevel::Moderate);
        assert!(FodmapLevel::Moderate < FodmapLevel::High);
    }

    #[test]
    fn test_fodmap_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FodmapLevel::Moderate).unwrap(),
            r#""moderate""#
        );
    }

    #[test]
    fn test_meal_item_roundtrip_without_optional_fields() {
        let item = MealItem {
            food_item_id: None,
            name: "Oats".to_string(),
            quantity: 1.5,
            nutrients: NutrientProfile::default(),
            nova_class: None,
            fodmap: None,
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("nova_class"));
        assert!(!json.contains("food_item_id"));

        let back: MealItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}

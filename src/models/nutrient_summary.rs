use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// The nutrient values this tool reports, per 100g and per serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NutrientKey {
    Kcal100g,
    Protein100g,
    Fat100g,
    Carbs100g,
    KcalServing,
    ProteinServing,
    FatServing,
    CarbsServing,
}

impl NutrientKey {
    pub const ALL: [NutrientKey; 8] = [
        NutrientKey::Kcal100g,
        NutrientKey::Protein100g,
        NutrientKey::Fat100g,
        NutrientKey::Carbs100g,
        NutrientKey::KcalServing,
        NutrientKey::ProteinServing,
        NutrientKey::FatServing,
        NutrientKey::CarbsServing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientKey::Kcal100g => "kcal_100g",
            NutrientKey::Protein100g => "protein_100g",
            NutrientKey::Fat100g => "fat_100g",
            NutrientKey::Carbs100g => "carbs_100g",
            NutrientKey::KcalServing => "kcal_serving",
            NutrientKey::ProteinServing => "protein_serving",
            NutrientKey::FatServing => "fat_serving",
            NutrientKey::CarbsServing => "carbs_serving",
        }
    }
}

/// Resolved nutrient values. Holds only keys that had a value upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutrientSummary {
    values: BTreeMap<NutrientKey, f64>,
}

impl NutrientSummary {
    pub(crate) fn insert(&mut self, key: NutrientKey, value: f64) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: NutrientKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    pub fn contains(&self, key: NutrientKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NutrientKey, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// True when any per-serving value is known.
    pub fn has_serving_values(&self) -> bool {
        self.values.keys().any(|k| {
            matches!(
                k,
                NutrientKey::KcalServing
                    | NutrientKey::ProteinServing
                    | NutrientKey::FatServing
                    | NutrientKey::CarbsServing
            )
        })
    }
}

impl Serialize for NutrientSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}

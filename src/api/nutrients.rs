use serde_json::{Map, Value};

use crate::models::{NutrientKey, NutrientSummary};

/// Upstream keys to read for each nutrient, primary first.
fn source_keys(key: NutrientKey) -> &'static [&'static str] {
    match key {
        NutrientKey::Kcal100g => &["energy-kcal_100g", "energy-kcal_value"],
        NutrientKey::Protein100g => &["proteins_100g"],
        NutrientKey::Fat100g => &["fat_100g"],
        NutrientKey::Carbs100g => &["carbohydrates_100g"],
        NutrientKey::KcalServing => &["energy-kcal_serving"],
        NutrientKey::ProteinServing => &["proteins_serving"],
        NutrientKey::FatServing => &["fat_serving"],
        NutrientKey::CarbsServing => &["carbohydrates_serving"],
    }
}

/// Reduce a raw `nutriments` mapping to the values this tool reports.
///
/// Values that are neither numbers nor numeric strings count as absent, so
/// upstream text such as `"<0.5"` or `"traces"` is dropped and shows as N/A.
/// A fallback key is consulted only when the primary is absent (missing, null
/// or non-numeric). Absent values are left out of the summary entirely.
pub fn extract_nutrient_summary(nutriments: &Map<String, Value>) -> NutrientSummary {
    let mut summary = NutrientSummary::default();
    for key in NutrientKey::ALL {
        let amount = source_keys(key)
            .iter()
            .find_map(|name| nutriments.get(*name).and_then(as_amount));
        if let Some(amount) = amount {
            summary.insert(key, amount);
        }
    }
    summary
}

fn as_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    amount.is_finite().then_some(amount)
}

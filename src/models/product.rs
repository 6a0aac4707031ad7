use serde_json::{Map, Value};

use crate::api::extract_nutrient_summary;
use crate::models::NutrientSummary;

/// One product as returned by the nutrition database.
///
/// Upstream records are often incomplete, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub code: Option<String>,
    pub name: Option<String>,
    pub brands: Option<String>,
    pub quantity: Option<String>,
    pub serving_size: Option<String>,
    pub ecoscore_grade: Option<String>,
    pub nutriments: Map<String, Value>,
}

impl Product {
    /// Build a record from a raw JSON product object. Never fails; fields
    /// that are missing or of an unexpected type come out as `None`.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let nutriments = obj
            .get("nutriments")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        Self {
            code: text_field(obj, "code"),
            name: text_field(obj, "product_name"),
            brands: text_field(obj, "brands"),
            quantity: text_field(obj, "quantity"),
            serving_size: text_field(obj, "serving_size"),
            ecoscore_grade: text_field(obj, "ecoscore_grade"),
            nutriments,
        }
    }

    pub fn nutrient_summary(&self) -> NutrientSummary {
        extract_nutrient_summary(&self.nutriments)
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        // Barcodes occasionally arrive as bare numbers
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//! Terminal rendering for result rows and the product detail view.

use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use yansi::Paint;

use crate::api::{ApiError, NutritionClient};
use crate::models::{NutrientKey, NutrientSummary, Product};
use crate::worker::products_from_lookup;

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_NAME: &str = "Unknown";

pub const RESULT_HEADERS: [&str; 9] = [
    "#",
    "Barcode",
    "Name",
    "Brand",
    "kcal/100g",
    "Protein/100g",
    "Fat/100g",
    "Carbs/100g",
    "Quantity",
];

pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table
}

fn amount(summary: &NutrientSummary, key: NutrientKey) -> String {
    summary
        .get(key)
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn text_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.unwrap_or(fallback)
}

/// One row per product, numbered from 1.
pub fn results_table(products: &[Product]) -> Table {
    let mut table = new_table();
    table.set_header(RESULT_HEADERS.to_vec());
    for (idx, product) in products.iter().enumerate() {
        let summary = product.nutrient_summary();
        table.add_row(vec![
            (idx + 1).to_string(),
            product.code.clone().unwrap_or_default(),
            text_or(product.name.as_deref(), UNKNOWN_NAME).to_string(),
            product.brands.clone().unwrap_or_default(),
            amount(&summary, NutrientKey::Kcal100g),
            amount(&summary, NutrientKey::Protein100g),
            amount(&summary, NutrientKey::Fat100g),
            amount(&summary, NutrientKey::Carbs100g),
            text_or(product.quantity.as_deref(), NOT_AVAILABLE).to_string(),
        ]);
    }
    table
}

fn detail_line(out: &mut String, label: &str, value: &str) {
    let padded = format!("{:<15}", format!("{}:", label));
    out.push_str(&format!("  {}{}\n", Paint::new(padded).bold(), value));
}

fn nutrient_block(
    out: &mut String,
    title: &str,
    summary: &NutrientSummary,
    keys: [NutrientKey; 4],
) {
    out.push_str(&format!("\n{}\n", Paint::new(title).underline()));
    let [kcal, protein, fat, carbs] = keys;
    detail_line(out, "Energy", &format!("{} kcal", amount(summary, kcal)));
    detail_line(out, "Protein", &format!("{} g", amount(summary, protein)));
    detail_line(out, "Fat", &format!("{} g", amount(summary, fat)));
    detail_line(out, "Carbohydrates", &format!("{} g", amount(summary, carbs)));
}

/// Detail view text for a single product.
pub fn render_details(product: &Product) -> String {
    let summary = product.nutrient_summary();
    let mut out = String::new();

    out.push_str(&format!("{}\n", Paint::new("Product details").bold()));
    detail_line(&mut out, "Name", text_or(product.name.as_deref(), UNKNOWN_NAME));
    detail_line(&mut out, "Brand", text_or(product.brands.as_deref(), NOT_AVAILABLE));
    detail_line(&mut out, "Barcode", text_or(product.code.as_deref(), NOT_AVAILABLE));
    detail_line(&mut out, "Quantity", text_or(product.quantity.as_deref(), NOT_AVAILABLE));
    detail_line(&mut out, "Serving size", text_or(product.serving_size.as_deref(), NOT_AVAILABLE));
    if let Some(grade) = product.ecoscore_grade.as_deref() {
        detail_line(&mut out, "Eco-score", &grade.to_uppercase());
    }

    nutrient_block(
        &mut out,
        "Per 100g",
        &summary,
        [
            NutrientKey::Kcal100g,
            NutrientKey::Protein100g,
            NutrientKey::Fat100g,
            NutrientKey::Carbs100g,
        ],
    );
    if summary.has_serving_values() {
        nutrient_block(
            &mut out,
            "Per serving",
            &summary,
            [
                NutrientKey::KcalServing,
                NutrientKey::ProteinServing,
                NutrientKey::FatServing,
                NutrientKey::CarbsServing,
            ],
        );
    }
    out
}

pub fn render_detail_error(err: &ApiError) -> String {
    format!("Failed to load details: {}", err)
}

/// Fetch a product afresh and render its detail view.
///
/// Failures are rendered in place of the details instead of being returned.
pub async fn load_details(client: &NutritionClient, code: &str) -> String {
    match client.lookup_by_code(code).await {
        Ok(response) => match products_from_lookup(&response).first() {
            Some(product) => render_details(product),
            None => format!("No details available for {}", code.trim()),
        },
        Err(e) => {
            tracing::warn!(%code, error = %e, "Detail lookup failed");
            render_detail_error(&e)
        }
    }
}

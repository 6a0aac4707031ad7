pub mod nutrient_summary;
pub mod product;

pub use nutrient_summary::{NutrientKey, NutrientSummary};
pub use product::Product;

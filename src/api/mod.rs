// Atomic API modules
pub mod client;
pub mod error;
pub mod nutrients;
pub mod products;

// Re-export commonly used items
pub use client::{api_call, set_silent, HttpTransport, Transport};
pub use error::ApiError;
pub use nutrients::extract_nutrient_summary;
pub use products::{NutritionClient, QueryOptions};

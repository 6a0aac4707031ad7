use std::env;
use std::path::Path;
use std::time::Duration;

// Default configuration constants
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";
pub const DEFAULT_LOCALE: &str = "ru";
pub const DEFAULT_REGION: &str = "ru";

/// Page size used by the query service when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 5;
/// Page size the background task requests for text searches.
pub const TASK_PAGE_SIZE: u32 = 10;

/// Applied to every request. Not configurable.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Identifying header sent with every request. Not configurable.
pub const USER_AGENT: &str = "Darcons-Trade-CalorieFetcher/1.0 (+https://darcons-trade.example)";

pub const DEFAULT_PRODUCT_FIELDS: &str =
    "code,product_name,nutriments,brands,quantity,serving_size,lang,lc";
pub const DEFAULT_SEARCH_FIELDS: &str =
    "code,product_name,brands,nutriments,quantity,serving_size,ecoscore_grade";

/// Effective runtime settings, resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub locale: String,
    pub region: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            base_url: get_base_url(),
            locale: get_locale(),
            region: get_region(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_base_url() -> String {
    sanitize_base_url(&env::var("OFF_BASE_URL").unwrap_or_default())
}

pub fn get_locale() -> String {
    non_empty_or(env::var("OFF_LOCALE").unwrap_or_default(), DEFAULT_LOCALE)
}

pub fn get_region() -> String {
    non_empty_or(env::var("OFF_REGION").unwrap_or_default(), DEFAULT_REGION)
}

fn non_empty_or(raw: String, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

//! OpenFoodFacts API access
//!
//! The client speaks the category search endpoint over blocking HTTP and
//! hands back already-cleaned records. A fixed list of curated category
//! slugs drives ingestion; the API itself is only queried for products.

mod clean;
mod sample;

pub use clean::{clean_all, clean_product, CleanError};
pub use sample::SampleSource;

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::entities::NutritionGrade;

const BASE_CATEGORY_URL: &str = "https://fr.openfoodfacts.org/categorie/";
const PRODUCT_FIELDS: &str = "brands,nutrition_grades,product_name_fr,stores,url";
const DEFAULT_API_PAGE_SIZE: usize = 500;

/// The curated categories the program ingests.
const CATEGORY_SLUGS: &[&str] = &[
    "biscuits",
    "viandes-fraiches",
    "cremes-dessert",
    "yaourts",
    "barres-de-cereales",
    "boissons-energisantes",
    "sodas",
    "charcuteries",
    "cereales-pour-petit-dejeuner",
    "jus-de-fruits",
];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A category as handed to ingestion, before it has a database id.
#[derive(Debug, Clone)]
pub struct RawCategory {
    pub name: String,
    pub url: String,
}

/// One product record as returned by the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub product_name_fr: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub nutrition_grades: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub stores: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    products: Vec<RawProduct>,
}

/// A field-complete, cleaned product record ready for ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanProduct {
    pub name: String,
    pub url: String,
    pub grade: NutritionGrade,
    pub brands: Vec<String>,
    pub stores: Vec<String>,
}

/// A batch of cleaned records plus the count of records the cleaning
/// stage dropped.
#[derive(Debug, Clone, Default)]
pub struct CleanBatch {
    pub kept: Vec<CleanProduct>,
    pub skipped: usize,
}

/// Where ingestion pulls its records from: the live API, or the embedded
/// sample dataset for offline use and tests.
pub trait ProductSource {
    fn categories(&self) -> Result<Vec<RawCategory>, ApiError>;
    fn products(&self, category: &RawCategory) -> Result<CleanBatch, ApiError>;
}

/// Build the curated category list. Purely local - the slugs are fixed.
pub fn curated_categories() -> Vec<RawCategory> {
    CATEGORY_SLUGS
        .iter()
        .map(|slug| RawCategory {
            name: display_name(slug),
            url: format!("{}{}", BASE_CATEGORY_URL, slug),
        })
        .collect()
}

fn display_name(slug: &str) -> String {
    let spaced = slug.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Blocking client for the OpenFoodFacts API.
pub struct OffClient {
    http: reqwest::blocking::Client,
    page_size: usize,
}

impl OffClient {
    pub fn new() -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("nutriswap/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            page_size: DEFAULT_API_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

impl ProductSource for OffClient {
    fn categories(&self) -> Result<Vec<RawCategory>, ApiError> {
        Ok(curated_categories())
    }

    fn products(&self, category: &RawCategory) -> Result<CleanBatch, ApiError> {
        let url = format!(
            "{}.json?page_size={}&fields={}",
            category.url, self.page_size, PRODUCT_FIELDS
        );
        log::debug!("GET {}", url);
        let page: SearchPage = self.http.get(&url).send()?.error_for_status()?.json()?;
        Ok(clean_all(&page.products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_categories_have_urls() {
        let categories = curated_categories();
        assert_eq!(categories.len(), CATEGORY_SLUGS.len());
        assert_eq!(categories[0].name, "Biscuits");
        assert_eq!(
            categories[0].url,
            "https://fr.openfoodfacts.org/categorie/biscuits"
        );
        assert_eq!(categories[9].name, "Jus de fruits");
    }
}

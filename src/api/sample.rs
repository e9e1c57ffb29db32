//! Embedded offline dataset
//!
//! A small, fixed slice of the real search payloads, decoded through the
//! same cleaning path as live data. Used by `init --sample` and the
//! end-to-end tests so neither needs network access.

use super::{
    clean_all, ApiError, CleanBatch, ProductSource, RawCategory, SearchPage, BASE_CATEGORY_URL,
};

const SAMPLE_SLUGS: &[&str] = &["yaourts", "biscuits", "jus-de-fruits"];

const YAOURTS: &str = r#"{
  "products": [
    {"product_name_fr": "Yaourt nature", "url": "https://fr.openfoodfacts.org/produit/3000001",
     "nutrition_grades": "a", "brands": "Danone", "stores": "Auchan,Carrefour"},
    {"product_name_fr": "Yaourt grec", "url": "https://fr.openfoodfacts.org/produit/3000002",
     "nutrition_grades": "b", "brands": "Oikos,Danone", "stores": "Carrefour"},
    {"product_name_fr": "Yaourt aux fruits", "url": "https://fr.openfoodfacts.org/produit/3000003",
     "nutrition_grades": "c", "brands": "Panier de Yoplait", "stores": "Leclerc"},
    {"product_name_fr": "Yaourt vanille", "url": "https://fr.openfoodfacts.org/produit/3000004",
     "nutrition_grades": "d", "brands": "La Laitiere", "stores": "Auchan"},
    {"product_name_fr": "Yaourt soja nature", "url": "https://fr.openfoodfacts.org/produit/3000005",
     "nutrition_grades": "a", "brands": "Sojasun", "stores": "Monoprix,Carrefour"},
    {"product_name_fr": "Yaourt sans stores", "url": "https://fr.openfoodfacts.org/produit/3000006",
     "nutrition_grades": "b", "brands": "Danone"}
  ]
}"#;

const BISCUITS: &str = r#"{
  "products": [
    {"product_name_fr": "Petit beurre", "url": "https://fr.openfoodfacts.org/produit/3100001",
     "nutrition_grades": "c", "brands": "LU", "stores": "Auchan"},
    {"product_name_fr": "Biscuits avoine", "url": "https://fr.openfoodfacts.org/produit/3100002",
     "nutrition_grades": "a", "brands": "Gerble", "stores": "Carrefour,Auchan"},
    {"product_name_fr": "Cookies chocolat", "url": "https://fr.openfoodfacts.org/produit/3100003",
     "nutrition_grades": "e", "brands": "Milka", "stores": "Leclerc"},
    {"product_name_fr": "Sables nature", "url": "https://fr.openfoodfacts.org/produit/3100004",
     "nutrition_grades": "d", "brands": "Bonne Maman", "stores": "Monoprix"},
    {"product_name_fr": "Galettes de riz", "url": "https://fr.openfoodfacts.org/produit/3100005",
     "nutrition_grades": "b", "brands": "Bjorg", "stores": "Carrefour"}
  ]
}"#;

const JUS_DE_FRUITS: &str = r#"{
  "products": [
    {"product_name_fr": "Pur jus d orange", "url": "https://fr.openfoodfacts.org/produit/3200001",
     "nutrition_grades": "c", "brands": "Tropicana", "stores": "Auchan"},
    {"product_name_fr": "Jus de pomme", "url": "https://fr.openfoodfacts.org/produit/3200002",
     "nutrition_grades": "c", "brands": "Andros", "stores": "Carrefour"},
    {"product_name_fr": "Jus multifruits", "url": "https://fr.openfoodfacts.org/produit/3200003",
     "nutrition_grades": "d", "brands": "Joker", "stores": "Leclerc,Auchan"},
    {"product_name_fr": "Eau aromatisee citron", "url": "https://fr.openfoodfacts.org/produit/3200004",
     "nutrition_grades": "b", "brands": "Volvic", "stores": "Monoprix"}
  ]
}"#;

/// Offline stand-in for the live API.
#[derive(Debug, Default)]
pub struct SampleSource;

impl SampleSource {
    pub fn new() -> Self {
        Self
    }
}

impl ProductSource for SampleSource {
    fn categories(&self) -> Result<Vec<RawCategory>, ApiError> {
        Ok(SAMPLE_SLUGS
            .iter()
            .map(|slug| RawCategory {
                name: super::display_name(slug),
                url: format!("{}{}", BASE_CATEGORY_URL, slug),
            })
            .collect())
    }

    fn products(&self, category: &RawCategory) -> Result<CleanBatch, ApiError> {
        let payload = match category.url.rsplit('/').next() {
            Some("yaourts") => YAOURTS,
            Some("biscuits") => BISCUITS,
            Some("jus-de-fruits") => JUS_DE_FRUITS,
            _ => return Ok(CleanBatch::default()),
        };
        let page: SearchPage = serde_json::from_str(payload)?;
        Ok(clean_all(&page.products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_categories() {
        let source = SampleSource::new();
        let categories = source.categories().unwrap();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[2].name, "Jus de fruits");
    }

    #[test]
    fn test_sample_products_pass_cleaning() {
        let source = SampleSource::new();
        for category in source.categories().unwrap() {
            let batch = source.products(&category).unwrap();
            assert!(!batch.kept.is_empty(), "category {}", category.name);
        }
    }

    #[test]
    fn test_incomplete_sample_record_is_skipped() {
        let source = SampleSource::new();
        let yaourts = &source.categories().unwrap()[0];
        let batch = source.products(yaourts).unwrap();
        // The record without a stores field is dropped by cleaning
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.kept.len(), 5);
    }
}

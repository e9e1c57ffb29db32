//! Brands and stores - the two name-keyed entity catalogs

use crate::core::registry::PagedRegistry;

const BRAND_BASE_URL: &str = "https://world.openfoodfacts.org/brand/";
const STORE_BASE_URL: &str = "https://world.openfoodfacts.org/store/";

/// Which of the two name-keyed catalogs an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Brand,
    Store,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Brand => "brand",
            EntityKind::Store => "store",
        }
    }

    /// Derive the OpenFoodFacts page URL for an entity with no source URL.
    pub fn derive_url(&self, name: &str) -> String {
        let slug = match self {
            EntityKind::Brand => name.to_lowercase().replace(' ', "-"),
            EntityKind::Store => name.to_lowercase().replace(' ', "-").replace('\'', "-"),
        };
        match self {
            EntityKind::Brand => format!("{}{}", BRAND_BASE_URL, slug),
            EntityKind::Store => format!("{}{}", STORE_BASE_URL, slug),
        }
    }
}

/// A brand or store: an id, a name and the paged registry of product ids
/// observed under it.
#[derive(Debug, Clone)]
pub struct NamedEntity {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub products: PagedRegistry<i64>,
}

impl NamedEntity {
    pub fn new(id: i64, name: String, url: String, page_size: usize) -> Self {
        Self {
            id,
            name,
            url,
            products: PagedRegistry::new(page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_brand_url() {
        assert_eq!(
            EntityKind::Brand.derive_url("Bonne Maman"),
            "https://world.openfoodfacts.org/brand/bonne-maman"
        );
    }

    #[test]
    fn test_derive_store_url_replaces_apostrophes() {
        assert_eq!(
            EntityKind::Store.derive_url("Marc's Market"),
            "https://world.openfoodfacts.org/store/marc-s-market"
        );
    }
}

//! Product categories

use crate::core::registry::{Keyed, PagedRegistry};
use crate::entities::product::Product;

/// A product category. The category owns its products, held in a paged
/// registry so the browse UI can walk them page by page.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub products: PagedRegistry<Product>,
}

impl Category {
    pub fn new(id: i64, name: String, url: String, page_size: usize) -> Self {
        Self {
            id,
            name,
            url,
            products: PagedRegistry::new(page_size),
        }
    }
}

impl Keyed for Category {
    fn key(&self) -> i64 {
        self.id
    }
}

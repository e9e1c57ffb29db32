//! Substitutes and favorites

use chrono::{DateTime, Utc};

use crate::core::registry::Keyed;
use crate::entities::product::ProductCore;
use crate::entities::LoadState;

/// A candidate replacement for a product: the matched product's own data
/// plus the products-table id it was matched from.
///
/// `core.id` and `original_id` coincide at construction; `original_id` is
/// kept separately because it survives promotion to [`Favorite`], where the
/// favorite gets an id of its own.
#[derive(Debug, Clone)]
pub struct Substitute {
    pub core: ProductCore,
    /// Products-table id of the row this substitute was matched from.
    pub original_id: i64,
    pub brands: Vec<i64>,
    pub stores: Vec<i64>,
    pub brands_loaded: LoadState,
    pub stores_loaded: LoadState,
}

impl Substitute {
    pub fn new(core: ProductCore) -> Self {
        let original_id = core.id;
        Self {
            core,
            original_id,
            brands: Vec::new(),
            stores: Vec::new(),
            brands_loaded: LoadState::Unloaded,
            stores_loaded: LoadState::Unloaded,
        }
    }
}

impl Keyed for Substitute {
    fn key(&self) -> i64 {
        self.core.id
    }
}

/// A substitute the user chose to keep. Identity for deduplication is
/// `original_id`; the favorite's own `id` is its favorites-table row id.
///
/// One favorite may replace several distinct products: `substitute_to`
/// grows across saves and is deduplicated by product id.
#[derive(Debug, Clone)]
pub struct Favorite {
    /// Favorites-table id, distinct from `original_id`.
    pub id: i64,
    pub core: ProductCore,
    pub original_id: i64,
    pub brands: Vec<i64>,
    pub stores: Vec<i64>,
    /// Products this favorite stands in for.
    pub substitute_to: Vec<ProductCore>,
    pub brands_loaded: LoadState,
    pub stores_loaded: LoadState,
    /// Guards the lazy fetch of `substitute_to` from storage.
    pub links_loaded: LoadState,
    pub saved_at: DateTime<Utc>,
}

impl Favorite {
    /// Promote a substitute to a favorite under a freshly assigned id.
    /// The in-memory substitute data is authoritative, so the links flag
    /// starts out `Loaded`.
    pub fn from_substitute(id: i64, substitute: &Substitute, saved_at: DateTime<Utc>) -> Self {
        Self {
            id,
            core: substitute.core.clone(),
            original_id: substitute.original_id,
            brands: substitute.brands.clone(),
            stores: substitute.stores.clone(),
            substitute_to: Vec::new(),
            brands_loaded: substitute.brands_loaded,
            stores_loaded: substitute.stores_loaded,
            links_loaded: LoadState::Loaded,
            saved_at,
        }
    }

    /// Add a replaced product, deduplicated by id.
    /// Returns false when the product was already linked.
    pub fn link_product(&mut self, product: ProductCore) -> bool {
        if self.is_linked_to(product.id) {
            return false;
        }
        self.substitute_to.push(product);
        true
    }

    pub fn is_linked_to(&self, product_id: i64) -> bool {
        self.substitute_to.iter().any(|p| p.id == product_id)
    }

    /// Drop the link to a product. Returns the removed core, or None when
    /// no such link existed.
    pub fn unlink_product(&mut self, product_id: i64) -> Option<ProductCore> {
        let pos = self.substitute_to.iter().position(|p| p.id == product_id)?;
        Some(self.substitute_to.remove(pos))
    }
}

impl Keyed for Favorite {
    fn key(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::product::NutritionGrade;

    fn core(id: i64, name: &str) -> ProductCore {
        ProductCore {
            id,
            name: name.into(),
            url: format!("https://example.org/p/{}", id),
            grade: NutritionGrade::A,
        }
    }

    #[test]
    fn test_substitute_keeps_original_id() {
        let sub = Substitute::new(core(7, "Compote"));
        assert_eq!(sub.original_id, 7);
        assert_eq!(sub.core.id, 7);
    }

    #[test]
    fn test_favorite_link_dedup() {
        let sub = Substitute::new(core(7, "Compote"));
        let mut fav = Favorite::from_substitute(1, &sub, Utc::now());
        assert!(fav.link_product(core(2, "Confiture")));
        assert!(!fav.link_product(core(2, "Confiture")));
        assert_eq!(fav.substitute_to.len(), 1);
    }

    #[test]
    fn test_favorite_unlink() {
        let sub = Substitute::new(core(7, "Compote"));
        let mut fav = Favorite::from_substitute(1, &sub, Utc::now());
        fav.link_product(core(2, "Confiture"));
        assert!(fav.unlink_product(9).is_none());
        let removed = fav.unlink_product(2).unwrap();
        assert_eq!(removed.id, 2);
        assert!(fav.substitute_to.is_empty());
    }
}

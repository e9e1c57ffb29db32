//! In-memory brand/store catalogs with find-or-create semantics

use crate::entities::named::{EntityKind, NamedEntity};

/// Result of a [`NamedCatalog::find_or_create`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogHit {
    pub id: i64,
    pub created: bool,
}

/// A deduplicated catalog of brands or stores.
///
/// Ids are assigned as `len + 1` at creation and stay gap-free because
/// brand/store deletion is unsupported, which lets `get` index directly.
/// Names arrive case-normalized from the cleaning stage; the catalog does
/// not renormalize.
#[derive(Debug, Clone)]
pub struct NamedCatalog {
    kind: EntityKind,
    entries: Vec<NamedEntity>,
    page_size: usize,
}

impl NamedCatalog {
    pub fn new(kind: EntityKind, page_size: usize) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            page_size,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Linear scan for an exact name match; create on miss. The scan is
    /// O(catalog size), acceptable for the tens-to-hundreds of entries a
    /// personal dataset produces.
    pub fn find_or_create(&mut self, name: &str, url: Option<&str>) -> CatalogHit {
        if let Some(existing) = self.entries.iter().find(|e| e.name == name) {
            return CatalogHit {
                id: existing.id,
                created: false,
            };
        }
        let id = self.entries.len() as i64 + 1;
        let url = match url {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => self.kind.derive_url(name),
        };
        self.entries
            .push(NamedEntity::new(id, name.to_string(), url, self.page_size));
        CatalogHit { id, created: true }
    }

    /// Re-insert an entity loaded from storage. Rows must arrive in
    /// ascending id order so the gap-free indexing holds.
    pub fn restore(&mut self, id: i64, name: String, url: String) {
        debug_assert_eq!(id, self.entries.len() as i64 + 1);
        self.entries
            .push(NamedEntity::new(id, name, url, self.page_size));
    }

    pub fn get(&self, id: i64) -> Option<&NamedEntity> {
        if id < 1 {
            return None;
        }
        self.entries.get(id as usize - 1)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut NamedEntity> {
        if id < 1 {
            return None;
        }
        self.entries.get_mut(id as usize - 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedEntity> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_or_create_idempotent() {
        let mut catalog = NamedCatalog::new(EntityKind::Brand, 25);
        let first = catalog.find_or_create("alpro", None);
        let second = catalog.find_or_create("alpro", None);
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.id, second.id);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut catalog = NamedCatalog::new(EntityKind::Store, 25);
        assert_eq!(catalog.find_or_create("auchan", None).id, 1);
        assert_eq!(catalog.find_or_create("carrefour", None).id, 2);
        assert_eq!(catalog.find_or_create("auchan", None).id, 1);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_url_derived_when_missing() {
        let mut catalog = NamedCatalog::new(EntityKind::Brand, 25);
        let hit = catalog.find_or_create("bonne maman", None);
        assert_eq!(
            catalog.get(hit.id).unwrap().url,
            "https://world.openfoodfacts.org/brand/bonne-maman"
        );

        let hit = catalog.find_or_create("alpro", Some("https://example.org/alpro"));
        assert_eq!(catalog.get(hit.id).unwrap().url, "https://example.org/alpro");
    }

    #[test]
    fn test_get_out_of_range() {
        let catalog = NamedCatalog::new(EntityKind::Brand, 25);
        assert!(catalog.get(0).is_none());
        assert!(catalog.get(1).is_none());
        assert!(catalog.get(-3).is_none());
    }
}

//! Favorite reconciliation - saving, deduplication, link removal

use chrono::Utc;

use crate::core::registry::PagedRegistry;
use crate::entities::{Favorite, LoadState, ProductCore, Substitute};
use crate::storage::{Storage, StorageError};

/// Outcome of a save attempt. `AlreadyLinked` is a normal result, not an
/// error - the exact (favorite, product) pair already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadyLinked,
}

/// Outcome of removing a single link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlinkOutcome {
    Unlinked,
    /// The removed link was the last one; the favorite itself is gone.
    RemovedLast,
}

/// The deduplicated registry of saved substitutes.
///
/// A favorite's identity is its `original_id`: each distinct original
/// product has at most one favorite, whose `substitute_to` list grows
/// across saves. Favorite ids are handed out from a running counter
/// primed with the storage-side maximum.
#[derive(Debug)]
pub struct FavoriteBook {
    registry: PagedRegistry<Favorite>,
    last_saved_id: i64,
    page_size: usize,
}

impl FavoriteBook {
    pub fn new(page_size: usize) -> Self {
        Self {
            registry: PagedRegistry::new(page_size),
            last_saved_id: 0,
            page_size,
        }
    }

    pub fn registry(&self) -> &PagedRegistry<Favorite> {
        &self.registry
    }

    pub fn flush(&mut self) {
        self.registry.flush();
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Prime the id counter from storage's max-id query.
    pub fn prime(&mut self, last_saved_id: i64) {
        self.last_saved_id = last_saved_id;
    }

    pub fn last_saved_id(&self) -> i64 {
        self.last_saved_id
    }

    /// Re-insert a favorite loaded from storage.
    pub fn restore(&mut self, favorite: Favorite) {
        self.registry.add(favorite);
    }

    pub fn find(&self, favorite_id: i64) -> Option<&Favorite> {
        self.registry.find(favorite_id)
    }

    pub fn find_mut(&mut self, favorite_id: i64) -> Option<&mut Favorite> {
        self.registry.find_mut(favorite_id)
    }

    /// Dedup lookup by original product identity, buffer first then pages.
    pub fn find_by_original(&self, original_id: i64) -> Option<&Favorite> {
        self.registry.find_by(|f| f.original_id == original_id)
    }

    /// Save `substitute` as a replacement for `product`.
    ///
    /// Persists before mutating memory, so a storage failure leaves the
    /// registry untouched. A brand-new favorite is the only case that
    /// inserts into the registry; an existing favorite only grows its
    /// `substitute_to` list.
    pub fn try_save(
        &mut self,
        storage: &Storage,
        substitute: &Substitute,
        product: &ProductCore,
    ) -> Result<SaveOutcome, StorageError> {
        if let Some(existing) = self
            .registry
            .find_by_mut(|f| f.original_id == substitute.original_id)
        {
            if existing.is_linked_to(product.id) {
                return Ok(SaveOutcome::AlreadyLinked);
            }
            storage.link_product_favorite(product.id, existing.id)?;
            existing.links_loaded = LoadState::Loaded;
            existing.link_product(product.clone());
            return Ok(SaveOutcome::Saved);
        }

        let id = self.last_saved_id + 1;
        let mut favorite = Favorite::from_substitute(id, substitute, Utc::now());
        favorite.link_product(product.clone());
        storage.insert_favorite(&favorite)?;
        storage.link_product_favorite(product.id, id)?;
        self.last_saved_id = id;
        self.registry.add(favorite);
        Ok(SaveOutcome::Saved)
    }

    /// Remove every link of a favorite plus the favorite itself, from
    /// storage and from the registry. Removing an unknown id is a no-op.
    pub fn remove_all(
        &mut self,
        storage: &Storage,
        favorite_id: i64,
    ) -> Result<Option<Favorite>, StorageError> {
        storage.delete_favorite_links(favorite_id)?;
        storage.delete_favorite(favorite_id)?;
        let mut removed = self.registry.remove(favorite_id);
        if let Some(favorite) = removed.as_mut() {
            favorite.substitute_to.clear();
        }
        Ok(removed)
    }

    /// Remove one link; cascades into [`Self::remove_all`] when it was the
    /// favorite's last remaining link.
    pub fn remove_one(
        &mut self,
        storage: &Storage,
        favorite_id: i64,
        product_id: i64,
    ) -> Result<UnlinkOutcome, StorageError> {
        storage.unlink_product_favorite(product_id, favorite_id)?;
        let now_empty = match self.registry.find_mut(favorite_id) {
            Some(favorite) => {
                favorite.unlink_product(product_id);
                favorite.substitute_to.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.remove_all(storage, favorite_id)?;
            return Ok(UnlinkOutcome::RemovedLast);
        }
        Ok(UnlinkOutcome::Unlinked)
    }

    /// Forget everything, resetting the id counter. Storage clearing is
    /// the caller's concern.
    pub fn clear(&mut self) {
        self.registry = PagedRegistry::new(self.page_size);
        self.last_saved_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NutritionGrade;

    /// Storage with one category and products 1..=4 so favorite links
    /// satisfy the foreign keys.
    fn seeded_storage() -> Storage {
        let storage = Storage::open_in_memory().unwrap();
        let cat = storage
            .insert_category("Yaourts", "https://example.org/c/yaourts")
            .unwrap();
        for name in ["Yaourt nature", "Yaourt grec", "Yaourt vanille", "Yaourt soja"] {
            let id = storage
                .insert_product(name, "https://example.org/p", NutritionGrade::B)
                .unwrap();
            storage.link_category_product(cat, id).unwrap();
        }
        storage
    }

    fn core(id: i64, name: &str) -> ProductCore {
        ProductCore {
            id,
            name: name.into(),
            url: format!("https://example.org/p/{}", id),
            grade: NutritionGrade::B,
        }
    }

    fn substitute(original_id: i64) -> Substitute {
        Substitute::new(core(original_id, "Yaourt soja"))
    }

    #[test]
    fn test_first_save_creates_favorite() {
        let storage = seeded_storage();
        let mut book = FavoriteBook::new(25);
        let outcome = book
            .try_save(&storage, &substitute(4), &core(1, "Yaourt nature"))
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(book.len(), 1);
        assert_eq!(book.last_saved_id(), 1);
        let favorite = book.find_by_original(4).unwrap();
        assert_eq!(favorite.id, 1);
        assert_eq!(favorite.substitute_to.len(), 1);
    }

    #[test]
    fn test_duplicate_pair_is_rejected() {
        let storage = seeded_storage();
        let mut book = FavoriteBook::new(25);
        book.try_save(&storage, &substitute(4), &core(1, "Yaourt nature"))
            .unwrap();
        let outcome = book
            .try_save(&storage, &substitute(4), &core(1, "Yaourt nature"))
            .unwrap();
        assert_eq!(outcome, SaveOutcome::AlreadyLinked);
        let favorite = book.find_by_original(4).unwrap();
        assert_eq!(favorite.substitute_to.len(), 1);
        // No second favorite and no wasted id
        assert_eq!(book.len(), 1);
        assert_eq!(book.last_saved_id(), 1);
    }

    #[test]
    fn test_same_favorite_links_second_product() {
        let storage = seeded_storage();
        let mut book = FavoriteBook::new(25);
        book.try_save(&storage, &substitute(4), &core(1, "Yaourt nature"))
            .unwrap();
        let outcome = book
            .try_save(&storage, &substitute(4), &core(2, "Yaourt grec"))
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);
        // Same favorite instance grew; registry did not gain an entry
        assert_eq!(book.len(), 1);
        let favorite = book.find_by_original(4).unwrap();
        let linked: Vec<i64> = favorite.substitute_to.iter().map(|p| p.id).collect();
        assert_eq!(linked, vec![1, 2]);
        // Both links persisted
        assert_eq!(storage.products_of_favorite(favorite.id).unwrap().len(), 2);
    }

    #[test]
    fn test_dedup_survives_flush() {
        let storage = seeded_storage();
        let mut book = FavoriteBook::new(25);
        book.try_save(&storage, &substitute(4), &core(1, "Yaourt nature"))
            .unwrap();
        book.flush();
        // The favorite now lives in a flushed page; dedup still finds it
        let outcome = book
            .try_save(&storage, &substitute(4), &core(1, "Yaourt nature"))
            .unwrap();
        assert_eq!(outcome, SaveOutcome::AlreadyLinked);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_remove_all_clears_storage_and_registry() {
        let storage = seeded_storage();
        let mut book = FavoriteBook::new(25);
        book.try_save(&storage, &substitute(4), &core(1, "Yaourt nature"))
            .unwrap();
        book.try_save(&storage, &substitute(4), &core(2, "Yaourt grec"))
            .unwrap();

        let removed = book.remove_all(&storage, 1).unwrap().unwrap();
        assert!(removed.substitute_to.is_empty());
        assert!(book.find_by_original(4).is_none());
        assert!(storage.favorites().unwrap().is_empty());
        assert!(storage.products_of_favorite(1).unwrap().is_empty());
        // Idempotent: removing again is a silent no-op
        assert!(book.remove_all(&storage, 1).unwrap().is_none());
    }

    #[test]
    fn test_remove_last_link_cascades() {
        let storage = seeded_storage();
        let mut book = FavoriteBook::new(25);
        book.try_save(&storage, &substitute(4), &core(1, "Yaourt nature"))
            .unwrap();
        book.try_save(&storage, &substitute(4), &core(2, "Yaourt grec"))
            .unwrap();

        assert_eq!(
            book.remove_one(&storage, 1, 1).unwrap(),
            UnlinkOutcome::Unlinked
        );
        assert_eq!(book.find(1).unwrap().substitute_to.len(), 1);

        assert_eq!(
            book.remove_one(&storage, 1, 2).unwrap(),
            UnlinkOutcome::RemovedLast
        );
        assert!(book.find(1).is_none());
        assert!(storage.favorites().unwrap().is_empty());
    }

    #[test]
    fn test_ids_continue_after_reload() {
        let storage = seeded_storage();
        let mut book = FavoriteBook::new(25);
        book.try_save(&storage, &substitute(4), &core(1, "Yaourt nature"))
            .unwrap();

        // Simulate a later session primed from storage
        let mut reloaded = FavoriteBook::new(25);
        reloaded.prime(storage.max_favorite_id().unwrap());
        let outcome = reloaded
            .try_save(&storage, &substitute(3), &core(1, "Yaourt nature"))
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(reloaded.find_by_original(3).unwrap().id, 2);
    }
}

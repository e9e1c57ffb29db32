//! The session - top-level owner of storage, catalogs and registries
//!
//! All state lives here and is passed down explicitly; there is no global
//! mutable state. One session per process, single-threaded by design.

use thiserror::Error;

use crate::api::{ApiError, CleanProduct, ProductSource, RawCategory};
use crate::core::catalog::NamedCatalog;
use crate::core::favorites::{FavoriteBook, SaveOutcome, UnlinkOutcome};
use crate::core::matcher;
use crate::entities::{
    Category, EntityKind, Favorite, LoadState, Product, ProductCore, Substitute,
};
use crate::storage::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("no category with id {0} is loaded")]
    CategoryNotFound(i64),
    #[error("no product with id {0} is loaded in this category")]
    ProductNotFound(i64),
}

/// Counters reported after a bulk ingestion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestStats {
    pub categories: usize,
    pub products: usize,
    pub skipped: usize,
}

pub struct Session {
    storage: Storage,
    page_size: usize,
    categories: Vec<Category>,
    brands: NamedCatalog,
    stores: NamedCatalog,
    favorites: FavoriteBook,
}

impl Session {
    /// Open a session over a storage handle. A non-empty database is
    /// loaded into memory immediately.
    pub fn open(storage: Storage, page_size: usize) -> Result<Self, SessionError> {
        let mut session = Self {
            storage,
            page_size,
            categories: Vec::new(),
            brands: NamedCatalog::new(EntityKind::Brand, page_size),
            stores: NamedCatalog::new(EntityKind::Store, page_size),
            favorites: FavoriteBook::new(page_size),
        };
        if !session.storage.is_empty()? {
            session.reload_from_storage()?;
        }
        Ok(session)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, category_id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    pub fn category_mut(&mut self, category_id: i64) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == category_id)
    }

    pub fn brands(&self) -> &NamedCatalog {
        &self.brands
    }

    pub fn stores(&self) -> &NamedCatalog {
        &self.stores
    }

    pub fn favorites(&self) -> &FavoriteBook {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoriteBook {
        &mut self.favorites
    }

    /// Resolve brand ids to display names, in id order.
    pub fn brand_names(&self, ids: &[i64]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.brands.get(*id))
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn store_names(&self, ids: &[i64]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.stores.get(*id))
            .map(|e| e.name.clone())
            .collect()
    }

    // =========================================================================
    // Ingestion
    // =========================================================================

    /// Insert raw categories into storage and memory. Returns the assigned
    /// ids, in input order.
    pub fn ingest_categories(&mut self, raw: &[RawCategory]) -> Result<Vec<i64>, SessionError> {
        let mut ids = Vec::with_capacity(raw.len());
        for category in raw {
            let id = self.storage.insert_category(&category.name, &category.url)?;
            self.categories.push(Category::new(
                id,
                category.name.clone(),
                category.url.clone(),
                self.page_size,
            ));
            ids.push(id);
        }
        Ok(ids)
    }

    /// Insert cleaned products under a category, running brand/store
    /// find-or-create for each. Integrity violations on association rows
    /// are logged and skipped; value errors skip the product. Returns the
    /// number of products ingested.
    pub fn ingest_products(
        &mut self,
        category_id: i64,
        cleaned: &[CleanProduct],
    ) -> Result<usize, SessionError> {
        if self.category(category_id).is_none() {
            return Err(SessionError::CategoryNotFound(category_id));
        }

        let mut staged: Vec<Product> = Vec::with_capacity(cleaned.len());
        for clean in cleaned {
            let id = match self.storage.insert_product(&clean.name, &clean.url, clean.grade) {
                Ok(id) => id,
                Err(StorageError::Value(msg)) => {
                    log::warn!("skipping product {:?}: {}", clean.name, msg);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if let Err(err) = self.storage.link_category_product(category_id, id) {
                match err {
                    StorageError::Integrity(msg) => {
                        log::warn!("category link for product {}: {}", id, msg)
                    }
                    other => return Err(other.into()),
                }
            }

            let mut product = Product::new(
                ProductCore {
                    id,
                    name: clean.name.clone(),
                    url: clean.url.clone(),
                    grade: clean.grade,
                },
                self.page_size,
            );
            product.categories.push(category_id);

            for name in &clean.brands {
                let hit = self.brands.find_or_create(name, None);
                if hit.created {
                    if let Some(entity) = self.brands.get(hit.id) {
                        self.persist_entity(EntityKind::Brand, &entity.name, &entity.url, hit.id)?;
                    }
                }
                if product.link_brand(hit.id) {
                    if let Some(entity) = self.brands.get_mut(hit.id) {
                        entity.products.add(id);
                    }
                    self.persist_link(EntityKind::Brand, id, hit.id)?;
                }
            }
            for name in &clean.stores {
                let hit = self.stores.find_or_create(name, None);
                if hit.created {
                    if let Some(entity) = self.stores.get(hit.id) {
                        self.persist_entity(EntityKind::Store, &entity.name, &entity.url, hit.id)?;
                    }
                }
                if product.link_store(hit.id) {
                    if let Some(entity) = self.stores.get_mut(hit.id) {
                        entity.products.add(id);
                    }
                    self.persist_link(EntityKind::Store, id, hit.id)?;
                }
            }
            // Freshly ingested products carry authoritative lists
            product.brands_loaded.mark_loaded();
            product.stores_loaded.mark_loaded();
            staged.push(product);
        }

        let count = staged.len();
        if let Some(category) = self.categories.iter_mut().find(|c| c.id == category_id) {
            for product in staged {
                category.products.add(product);
            }
        }
        Ok(count)
    }

    fn persist_entity(
        &self,
        kind: EntityKind,
        name: &str,
        url: &str,
        expected_id: i64,
    ) -> Result<(), SessionError> {
        let inserted = match kind {
            EntityKind::Brand => self.storage.insert_brand(name, url),
            EntityKind::Store => self.storage.insert_store(name, url),
        };
        match inserted {
            Ok(db_id) => {
                // Catalog ids and row ids advance in lockstep
                debug_assert_eq!(db_id, expected_id);
                Ok(())
            }
            Err(StorageError::Integrity(msg)) | Err(StorageError::Value(msg)) => {
                log::warn!("{} {:?} not persisted: {}", kind.label(), name, msg);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn persist_link(
        &self,
        kind: EntityKind,
        product_id: i64,
        entity_id: i64,
    ) -> Result<(), SessionError> {
        let linked = match kind {
            EntityKind::Brand => self.storage.link_product_brand(product_id, entity_id),
            EntityKind::Store => self.storage.link_product_store(product_id, entity_id),
        };
        match linked {
            Ok(()) => Ok(()),
            Err(StorageError::Integrity(msg)) => {
                log::warn!(
                    "{} link ({}, {}) skipped: {}",
                    kind.label(),
                    product_id,
                    entity_id,
                    msg
                );
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Wipe storage and memory, then re-ingest everything from `source`
    /// inside one transaction. `progress` runs before each category
    /// download so the caller can narrate.
    pub fn rebuild<F>(
        &mut self,
        source: &dyn ProductSource,
        mut progress: F,
    ) -> Result<IngestStats, SessionError>
    where
        F: FnMut(&RawCategory),
    {
        self.storage.clear(&[
            "product_favorites",
            "product_stores",
            "product_brands",
            "category_products",
            "favorites",
            "stores",
            "brands",
            "products",
            "categories",
        ])?;
        self.reset_memory();

        let raw_categories = source.categories()?;
        self.storage.begin()?;
        let result = self.ingest_all(source, &raw_categories, &mut progress);
        match result {
            Ok(stats) => {
                self.storage.commit()?;
                Ok(stats)
            }
            Err(err) => {
                let _ = self.storage.rollback();
                Err(err)
            }
        }
    }

    fn ingest_all<F>(
        &mut self,
        source: &dyn ProductSource,
        raw_categories: &[RawCategory],
        progress: &mut F,
    ) -> Result<IngestStats, SessionError>
    where
        F: FnMut(&RawCategory),
    {
        let ids = self.ingest_categories(raw_categories)?;
        let mut stats = IngestStats {
            categories: raw_categories.len(),
            ..Default::default()
        };
        for (raw, id) in raw_categories.iter().zip(ids) {
            progress(raw);
            let batch = source.products(raw)?;
            stats.skipped += batch.skipped;
            stats.products += self.ingest_products(id, &batch.kept)?;
        }
        Ok(stats)
    }

    // =========================================================================
    // Reload
    // =========================================================================

    /// Rebuild all in-memory state from storage.
    pub fn reload_from_storage(&mut self) -> Result<(), SessionError> {
        self.reset_memory();

        for row in self.storage.brands()? {
            self.brands.restore(row.id, row.name, row.url);
        }
        for row in self.storage.stores()? {
            self.stores.restore(row.id, row.name, row.url);
        }

        for row in self.storage.categories()? {
            let mut category =
                Category::new(row.id, row.name, row.url, self.page_size);
            for product_row in self.storage.products_in_category(category.id)? {
                let mut product = Product::new(
                    ProductCore {
                        id: product_row.id,
                        name: product_row.name,
                        url: product_row.url,
                        grade: product_row.grade,
                    },
                    self.page_size,
                );
                product.categories.push(category.id);
                category.products.add(product);
            }
            self.categories.push(category);
        }

        let rows = self.storage.favorites()?;
        for row in rows {
            let favorite = self.load_favorite(row)?;
            self.favorites.restore(favorite);
        }
        self.favorites.prime(self.storage.max_favorite_id()?);
        Ok(())
    }

    /// Build a favorite from its row, eagerly loading brands, stores and
    /// replaced products the way the interactive browser needs them.
    fn load_favorite(
        &self,
        row: crate::storage::FavoriteRow,
    ) -> Result<Favorite, SessionError> {
        let substitute_to: Vec<ProductCore> = self
            .storage
            .products_of_favorite(row.id)?
            .into_iter()
            .map(|p| ProductCore {
                id: p.id,
                name: p.name,
                url: p.url,
                grade: p.grade,
            })
            .collect();
        Ok(Favorite {
            id: row.id,
            core: ProductCore {
                id: row.original_id,
                name: row.name,
                url: row.url,
                grade: row.grade,
            },
            original_id: row.original_id,
            brands: self.storage.brand_ids_of_product(row.original_id)?,
            stores: self.storage.store_ids_of_product(row.original_id)?,
            substitute_to,
            brands_loaded: LoadState::Loaded,
            stores_loaded: LoadState::Loaded,
            links_loaded: LoadState::Loaded,
            saved_at: row.saved_at,
        })
    }

    fn reset_memory(&mut self) {
        self.categories.clear();
        self.brands = NamedCatalog::new(EntityKind::Brand, self.page_size);
        self.stores = NamedCatalog::new(EntityKind::Store, self.page_size);
        self.favorites = FavoriteBook::new(self.page_size);
    }

    // =========================================================================
    // Lazy loading
    // =========================================================================

    /// Load a product's brand list from storage, once. Subsequent calls
    /// are no-ops.
    pub fn ensure_product_brands(
        &mut self,
        category_id: i64,
        product_id: i64,
    ) -> Result<(), SessionError> {
        let loaded = {
            let category = self
                .category(category_id)
                .ok_or(SessionError::CategoryNotFound(category_id))?;
            let product = category
                .products
                .find(product_id)
                .ok_or(SessionError::ProductNotFound(product_id))?;
            product.brands_loaded.is_loaded()
        };
        if loaded {
            return Ok(());
        }

        let ids = self.storage.brand_ids_of_product(product_id)?;
        for brand_id in &ids {
            if let Some(entity) = self.brands.get_mut(*brand_id) {
                if !entity.products.contains(product_id) {
                    entity.products.add(product_id);
                }
            }
        }
        if let Some(category) = self.categories.iter_mut().find(|c| c.id == category_id) {
            if let Some(product) = category.products.find_mut(product_id) {
                for brand_id in ids {
                    product.link_brand(brand_id);
                }
                product.brands_loaded.mark_loaded();
            }
        }
        Ok(())
    }

    /// Load a product's store list from storage, once.
    pub fn ensure_product_stores(
        &mut self,
        category_id: i64,
        product_id: i64,
    ) -> Result<(), SessionError> {
        let loaded = {
            let category = self
                .category(category_id)
                .ok_or(SessionError::CategoryNotFound(category_id))?;
            let product = category
                .products
                .find(product_id)
                .ok_or(SessionError::ProductNotFound(product_id))?;
            product.stores_loaded.is_loaded()
        };
        if loaded {
            return Ok(());
        }

        let ids = self.storage.store_ids_of_product(product_id)?;
        for store_id in &ids {
            if let Some(entity) = self.stores.get_mut(*store_id) {
                if !entity.products.contains(product_id) {
                    entity.products.add(product_id);
                }
            }
        }
        if let Some(category) = self.categories.iter_mut().find(|c| c.id == category_id) {
            if let Some(product) = category.products.find_mut(product_id) {
                for store_id in ids {
                    product.link_store(store_id);
                }
                product.stores_loaded.mark_loaded();
            }
        }
        Ok(())
    }

    /// Load brands for every product on one page of a category registry,
    /// ahead of rendering.
    pub fn ensure_page_brands(
        &mut self,
        category_id: i64,
        page: usize,
    ) -> Result<(), SessionError> {
        let pending: Vec<i64> = {
            let category = self
                .category(category_id)
                .ok_or(SessionError::CategoryNotFound(category_id))?;
            match category.products.page(page) {
                Some(items) => items
                    .iter()
                    .filter(|p| !p.brands_loaded.is_loaded())
                    .map(|p| p.core.id)
                    .collect(),
                None => Vec::new(),
            }
        };
        for product_id in pending {
            self.ensure_product_brands(category_id, product_id)?;
        }
        Ok(())
    }

    /// Load brand/store lists for every substitute on one page of a
    /// product's registry. Substitutes reconciled at match time are
    /// already loaded and are skipped.
    pub fn ensure_substitute_page_loaded(
        &mut self,
        category_id: i64,
        product_id: i64,
        page: usize,
    ) -> Result<(), SessionError> {
        let pending: Vec<i64> = {
            let category = self
                .category(category_id)
                .ok_or(SessionError::CategoryNotFound(category_id))?;
            let product = category
                .products
                .find(product_id)
                .ok_or(SessionError::ProductNotFound(product_id))?;
            match product.substitutes.page(page) {
                Some(items) => items
                    .iter()
                    .filter(|s| {
                        !s.brands_loaded.is_loaded() || !s.stores_loaded.is_loaded()
                    })
                    .map(|s| s.original_id)
                    .collect(),
                None => Vec::new(),
            }
        };

        let mut fetched = Vec::with_capacity(pending.len());
        for original_id in pending {
            let brands = self.storage.brand_ids_of_product(original_id)?;
            let stores = self.storage.store_ids_of_product(original_id)?;
            fetched.push((original_id, brands, stores));
        }

        if let Some(category) = self.categories.iter_mut().find(|c| c.id == category_id) {
            if let Some(product) = category.products.find_mut(product_id) {
                for (original_id, brands, stores) in fetched {
                    if let Some(substitute) = product.substitutes.find_mut(original_id) {
                        if substitute.brands_loaded.mark_loaded() {
                            substitute.brands = brands;
                        }
                        if substitute.stores_loaded.mark_loaded() {
                            substitute.stores = stores;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Load missing brand lists for every favorite on one page.
    pub fn ensure_favorite_page_loaded(&mut self, page: usize) -> Result<(), SessionError> {
        let pending: Vec<(i64, i64)> = match self.favorites.registry().page(page) {
            Some(items) => items
                .iter()
                .filter(|f| !f.brands_loaded.is_loaded())
                .map(|f| (f.id, f.original_id))
                .collect(),
            None => Vec::new(),
        };
        for (favorite_id, original_id) in pending {
            let brands = self.storage.brand_ids_of_product(original_id)?;
            if let Some(favorite) = self.favorites.find_mut(favorite_id) {
                if favorite.brands_loaded.mark_loaded() {
                    favorite.brands = brands;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Substitutes and favorites
    // =========================================================================

    /// Fill a product's substitute registry, once per product instance.
    /// Returns the number of substitutes known afterwards.
    pub fn find_substitutes(
        &mut self,
        category_id: i64,
        product_id: i64,
    ) -> Result<usize, SessionError> {
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or(SessionError::CategoryNotFound(category_id))?;
        {
            let product = category
                .products
                .find(product_id)
                .ok_or(SessionError::ProductNotFound(product_id))?;
            if product.substitutes_loaded.is_loaded() {
                return Ok(product.substitutes.len());
            }
        }
        let count = matcher::find_substitutes(&self.storage, category, product_id)?;
        if let Some(product) = category.products.find_mut(product_id) {
            product.substitutes_loaded.mark_loaded();
        }
        Ok(count)
    }

    pub fn try_save_favorite(
        &mut self,
        substitute: &Substitute,
        product: &ProductCore,
    ) -> Result<SaveOutcome, SessionError> {
        self.favorites
            .try_save(&self.storage, substitute, product)
            .map_err(Into::into)
    }

    pub fn remove_favorite(&mut self, favorite_id: i64) -> Result<Option<Favorite>, SessionError> {
        self.favorites
            .remove_all(&self.storage, favorite_id)
            .map_err(Into::into)
    }

    pub fn remove_favorite_link(
        &mut self,
        favorite_id: i64,
        product_id: i64,
    ) -> Result<UnlinkOutcome, SessionError> {
        self.favorites
            .remove_one(&self.storage, favorite_id, product_id)
            .map_err(Into::into)
    }

    /// Wipe saved favorites from storage and memory; the product data
    /// stays.
    pub fn clear_favorites(&mut self) -> Result<(), SessionError> {
        self.storage.clear(&["product_favorites", "favorites"])?;
        self.favorites.clear();
        Ok(())
    }
}

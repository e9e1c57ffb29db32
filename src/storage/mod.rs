//! SQLite-backed storage layer
//!
//! One blocking connection per process. The schema is created on open when
//! missing; a missing database file always means "create fresh", never
//! retry. Association inserts that violate a constraint are surfaced as
//! [`StorageError::Integrity`] so ingestion can log and continue.

mod schema;
mod types;

pub use types::{CategoryRow, EntityRow, FavoriteRow, ProductRow};

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection};
use thiserror::Error;

use crate::entities::{Favorite, NutritionGrade};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("association violates a constraint: {0}")]
    Integrity(String),
    #[error("value cannot be stored: {0}")]
    Value(String),
    #[error("could not create database directory: {0}")]
    Io(String),
}

/// Split constraint and representation failures out of the generic sqlite
/// error so callers can apply the skip-and-continue policy.
fn classify(err: rusqlite::Error) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) => match e.code {
            rusqlite::ErrorCode::ConstraintViolation => {
                StorageError::Integrity(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            rusqlite::ErrorCode::TooBig | rusqlite::ErrorCode::TypeMismatch => {
                StorageError::Value(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => StorageError::Sqlite(err),
        },
        rusqlite::Error::ToSqlConversionFailure(_) => StorageError::Value(err.to_string()),
        _ => StorageError::Sqlite(err),
    }
}

/// Handle on the program database.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database, used by the test suite.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;",
        )?;
        schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// True when no categories have been ingested yet.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(n == 0)
    }

    /// Start the single bulk-ingestion transaction.
    pub fn begin(&self) -> Result<(), StorageError> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    /// Commit after bulk ingestion.
    pub fn commit(&self) -> Result<(), StorageError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    /// Abandon the bulk-ingestion transaction after a failure.
    pub fn rollback(&self) -> Result<(), StorageError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn insert_category(&self, name: &str, url: &str) -> Result<i64, StorageError> {
        self.conn
            .execute(
                "INSERT INTO categories (name, url) VALUES (?1, ?2)",
                params![name, url],
            )
            .map_err(classify)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn categories(&self) -> Result<Vec<CategoryRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, url FROM categories ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryRow {
                id: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub fn insert_product(
        &self,
        name: &str,
        url: &str,
        grade: NutritionGrade,
    ) -> Result<i64, StorageError> {
        self.conn
            .execute(
                "INSERT INTO products (name, url, nutrition_grade) VALUES (?1, ?2, ?3)",
                params![name, url, grade.as_str()],
            )
            .map_err(classify)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn products_in_category(&self, category_id: i64) -> Result<Vec<ProductRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, p.url, p.nutrition_grade
             FROM products p
             JOIN category_products cp ON cp.product_id = p.id
             WHERE cp.category_id = ?1
             ORDER BY p.id",
        )?;
        let rows = stmt.query_map(params![category_id], |row| {
            Ok(ProductRow {
                id: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
                grade: types::parse_grade(&row.get::<_, String>(3)?),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Candidate substitutes: same category, same-or-better grade (the
    /// grade letters order lexically, A best), different name.
    pub fn substitutes_for(
        &self,
        category_id: i64,
        grade: NutritionGrade,
        exclude_name: &str,
    ) -> Result<Vec<ProductRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, p.url, p.nutrition_grade
             FROM products p
             JOIN category_products cp ON cp.product_id = p.id
             WHERE cp.category_id = ?1
               AND p.nutrition_grade <= ?2
               AND p.name <> ?3
             ORDER BY p.nutrition_grade, p.id",
        )?;
        let rows = stmt.query_map(params![category_id, grade.as_str(), exclude_name], |row| {
            Ok(ProductRow {
                id: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
                grade: types::parse_grade(&row.get::<_, String>(3)?),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Brands / stores
    // =========================================================================

    pub fn insert_brand(&self, name: &str, url: &str) -> Result<i64, StorageError> {
        self.conn
            .execute(
                "INSERT INTO brands (name, url) VALUES (?1, ?2)",
                params![name, url],
            )
            .map_err(classify)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_store(&self, name: &str, url: &str) -> Result<i64, StorageError> {
        self.conn
            .execute(
                "INSERT INTO stores (name, url) VALUES (?1, ?2)",
                params![name, url],
            )
            .map_err(classify)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn brands(&self) -> Result<Vec<EntityRow>, StorageError> {
        self.entity_rows("brands")
    }

    pub fn stores(&self) -> Result<Vec<EntityRow>, StorageError> {
        self.entity_rows("stores")
    }

    fn entity_rows(&self, table: &str) -> Result<Vec<EntityRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, name, url FROM {} ORDER BY id", table))?;
        let rows = stmt.query_map([], |row| {
            Ok(EntityRow {
                id: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn brand_ids_of_product(&self, product_id: i64) -> Result<Vec<i64>, StorageError> {
        self.linked_ids(
            "SELECT brand_id FROM product_brands WHERE product_id = ?1 ORDER BY brand_id",
            product_id,
        )
    }

    pub fn store_ids_of_product(&self, product_id: i64) -> Result<Vec<i64>, StorageError> {
        self.linked_ids(
            "SELECT store_id FROM product_stores WHERE product_id = ?1 ORDER BY store_id",
            product_id,
        )
    }

    fn linked_ids(&self, sql: &str, id: i64) -> Result<Vec<i64>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![id], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Associations
    // =========================================================================

    pub fn link_category_product(
        &self,
        category_id: i64,
        product_id: i64,
    ) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO category_products (category_id, product_id) VALUES (?1, ?2)",
                params![category_id, product_id],
            )
            .map_err(classify)?;
        Ok(())
    }

    pub fn link_product_brand(&self, product_id: i64, brand_id: i64) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO product_brands (product_id, brand_id) VALUES (?1, ?2)",
                params![product_id, brand_id],
            )
            .map_err(classify)?;
        Ok(())
    }

    pub fn link_product_store(&self, product_id: i64, store_id: i64) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO product_stores (product_id, store_id) VALUES (?1, ?2)",
                params![product_id, store_id],
            )
            .map_err(classify)?;
        Ok(())
    }

    pub fn link_product_favorite(
        &self,
        product_id: i64,
        favorite_id: i64,
    ) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO product_favorites (product_id, favorite_id) VALUES (?1, ?2)",
                params![product_id, favorite_id],
            )
            .map_err(classify)?;
        Ok(())
    }

    pub fn unlink_product_favorite(
        &self,
        product_id: i64,
        favorite_id: i64,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "DELETE FROM product_favorites WHERE product_id = ?1 AND favorite_id = ?2",
            params![product_id, favorite_id],
        )?;
        Ok(())
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    pub fn insert_favorite(&self, favorite: &Favorite) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO favorites (id, original_id, name, url, nutrition_grade, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    favorite.id,
                    favorite.original_id,
                    favorite.core.name,
                    favorite.core.url,
                    favorite.core.grade.as_str(),
                    favorite.saved_at.to_rfc3339(),
                ],
            )
            .map_err(classify)?;
        Ok(())
    }

    pub fn favorites(&self) -> Result<Vec<FavoriteRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, original_id, name, url, nutrition_grade, saved_at
             FROM favorites ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FavoriteRow {
                id: row.get(0)?,
                original_id: row.get(1)?,
                name: row.get(2)?,
                url: row.get(3)?,
                grade: types::parse_grade(&row.get::<_, String>(4)?),
                saved_at: types::parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn products_of_favorite(&self, favorite_id: i64) -> Result<Vec<ProductRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, p.url, p.nutrition_grade
             FROM products p
             JOIN product_favorites pf ON pf.product_id = p.id
             WHERE pf.favorite_id = ?1
             ORDER BY p.id",
        )?;
        let rows = stmt.query_map(params![favorite_id], |row| {
            Ok(ProductRow {
                id: row.get(0)?,
                name: row.get(1)?,
                url: row.get(2)?,
                grade: types::parse_grade(&row.get::<_, String>(3)?),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_favorite(&self, favorite_id: i64) -> Result<(), StorageError> {
        self.conn.execute(
            "DELETE FROM favorites WHERE id = ?1",
            params![favorite_id],
        )?;
        Ok(())
    }

    pub fn delete_favorite_links(&self, favorite_id: i64) -> Result<(), StorageError> {
        self.conn.execute(
            "DELETE FROM product_favorites WHERE favorite_id = ?1",
            params![favorite_id],
        )?;
        Ok(())
    }

    /// Highest favorite id ever assigned, 0 when the table is empty.
    pub fn max_favorite_id(&self) -> Result<i64, StorageError> {
        let max: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(id), 0) FROM favorites", [], |row| {
                row.get(0)
            })?;
        Ok(max)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    const CLEARABLE: &'static [&'static str] = &[
        "categories",
        "products",
        "brands",
        "stores",
        "favorites",
        "category_products",
        "product_brands",
        "product_stores",
        "product_favorites",
    ];

    /// Delete every row of the named tables and reset their id sequences.
    pub fn clear(&self, tables: &[&str]) -> Result<(), StorageError> {
        for table in tables {
            if !Self::CLEARABLE.contains(table) {
                return Err(StorageError::Value(format!("unknown table: {}", table)));
            }
            log::debug!("clearing table {}", table);
            self.conn
                .execute(&format!("DELETE FROM {}", table), [])?;
            // sqlite_sequence only exists once an AUTOINCREMENT insert has
            // happened; a missing table is fine here.
            let _ = self.conn.execute(
                "DELETE FROM sqlite_sequence WHERE name = ?1",
                params![table],
            );
        }
        Ok(())
    }

    /// Row count for one of the known tables, for the status display.
    pub fn count(&self, table: &str) -> Result<i64, StorageError> {
        if !Self::CLEARABLE.contains(&table) {
            return Err(StorageError::Value(format!("unknown table: {}", table)));
        }
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Favorite, LoadState, ProductCore, Substitute};
    use chrono::Utc;

    fn seeded() -> Storage {
        let storage = Storage::open_in_memory().unwrap();
        let cat = storage.insert_category("Yaourts", "https://example.org/c/yaourts").unwrap();
        let p1 = storage
            .insert_product("Yaourt nature", "https://example.org/p/1", NutritionGrade::A)
            .unwrap();
        let p2 = storage
            .insert_product("Yaourt sucre", "https://example.org/p/2", NutritionGrade::C)
            .unwrap();
        storage.link_category_product(cat, p1).unwrap();
        storage.link_category_product(cat, p2).unwrap();
        storage
    }

    #[test]
    fn test_fresh_database_is_empty() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_insert_assigns_ascending_ids() {
        let storage = seeded();
        assert!(!storage.is_empty().unwrap());
        let rows = storage.products_in_category(1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[1].grade, NutritionGrade::C);
    }

    #[test]
    fn test_substitute_query_filters_grade_and_name() {
        let storage = seeded();
        // For the grade-C product: the grade-A one qualifies
        let subs = storage.substitutes_for(1, NutritionGrade::C, "Yaourt sucre").unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name, "Yaourt nature");
        // For the grade-A product: nothing is same-or-better besides itself
        let subs = storage.substitutes_for(1, NutritionGrade::A, "Yaourt nature").unwrap();
        assert!(subs.is_empty());
    }

    #[test]
    fn test_duplicate_association_is_integrity_error() {
        let storage = seeded();
        let err = storage.link_category_product(1, 1).unwrap_err();
        assert!(matches!(err, StorageError::Integrity(_)));
    }

    #[test]
    fn test_duplicate_brand_name_is_integrity_error() {
        let storage = seeded();
        storage.insert_brand("alpro", "https://example.org/b/alpro").unwrap();
        let err = storage.insert_brand("alpro", "https://example.org/b/alpro").unwrap_err();
        assert!(matches!(err, StorageError::Integrity(_)));
    }

    #[test]
    fn test_favorite_round_trip() {
        let storage = seeded();
        let mut sub = Substitute::new(ProductCore {
            id: 1,
            name: "Yaourt nature".into(),
            url: "https://example.org/p/1".into(),
            grade: NutritionGrade::A,
        });
        sub.brands_loaded = LoadState::Loaded;
        let fav = Favorite::from_substitute(1, &sub, Utc::now());
        storage.insert_favorite(&fav).unwrap();
        storage.link_product_favorite(2, fav.id).unwrap();

        assert_eq!(storage.max_favorite_id().unwrap(), 1);
        let rows = storage.favorites().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].original_id, 1);
        let linked = storage.products_of_favorite(fav.id).unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, 2);
    }

    #[test]
    fn test_clear_resets_sequences() {
        let storage = seeded();
        storage
            .clear(&["categories", "products", "category_products"])
            .unwrap();
        assert!(storage.is_empty().unwrap());
        let id = storage.insert_category("Sodas", "https://example.org/c/sodas").unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_clear_rejects_unknown_table() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(matches!(
            storage.clear(&["users"]),
            Err(StorageError::Value(_))
        ));
    }
}

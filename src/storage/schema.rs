//! Database schema initialization

use rusqlite::Connection;

use super::StorageError;

/// Create all tables and indexes. Every statement is idempotent, so this
/// runs unconditionally on open.
pub(super) fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        r#"
        -- Product categories
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            url TEXT NOT NULL
        );

        -- Products pulled from the food database
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            nutrition_grade TEXT NOT NULL
                CHECK (nutrition_grade IN ('a', 'b', 'c', 'd', 'e'))
        );
        CREATE INDEX IF NOT EXISTS idx_products_grade ON products(nutrition_grade);

        -- Brands, deduplicated by name
        CREATE TABLE IF NOT EXISTS brands (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            url TEXT NOT NULL
        );

        -- Stores, deduplicated by name
        CREATE TABLE IF NOT EXISTS stores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            url TEXT NOT NULL
        );

        -- Saved substitutes; id is assigned by the favorite reconciler
        CREATE TABLE IF NOT EXISTS favorites (
            id INTEGER PRIMARY KEY,
            original_id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            nutrition_grade TEXT NOT NULL
                CHECK (nutrition_grade IN ('a', 'b', 'c', 'd', 'e')),
            saved_at TEXT NOT NULL
        );

        -- Join tables
        CREATE TABLE IF NOT EXISTS category_products (
            category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            PRIMARY KEY (category_id, product_id)
        );
        CREATE INDEX IF NOT EXISTS idx_category_products_product
            ON category_products(product_id);

        CREATE TABLE IF NOT EXISTS product_brands (
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            brand_id INTEGER NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
            PRIMARY KEY (product_id, brand_id)
        );

        CREATE TABLE IF NOT EXISTS product_stores (
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            store_id INTEGER NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
            PRIMARY KEY (product_id, store_id)
        );

        CREATE TABLE IF NOT EXISTS product_favorites (
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            favorite_id INTEGER NOT NULL REFERENCES favorites(id) ON DELETE CASCADE,
            PRIMARY KEY (product_id, favorite_id)
        );
        CREATE INDEX IF NOT EXISTS idx_product_favorites_favorite
            ON product_favorites(favorite_id);
        "#,
    )?;

    Ok(())
}

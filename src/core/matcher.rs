//! Substitute matching and reconciliation

use crate::entities::{Category, Substitute};
use crate::storage::Storage;

use super::session::SessionError;

/// Find substitutes for a product and append them to its registry.
///
/// Candidates share the product's primary category, carry a same-or-better
/// nutrition grade and a different name. Each match is reconciled against
/// the category's in-memory products: when the matched row's product
/// already has brands or stores loaded, the lists are copied over so the
/// substitute needs no storage round-trip of its own.
///
/// Returns the number of substitutes appended.
pub fn find_substitutes(
    storage: &Storage,
    category: &mut Category,
    product_id: i64,
) -> Result<usize, SessionError> {
    let (category_id, grade, name) = {
        let product = category
            .products
            .find(product_id)
            .ok_or(SessionError::ProductNotFound(product_id))?;
        (
            product.categories.first().copied().unwrap_or(category.id),
            product.core.grade,
            product.core.name.clone(),
        )
    };

    let rows = storage.substitutes_for(category_id, grade, &name)?;

    let mut matched: Vec<Substitute> = Vec::with_capacity(rows.len());
    for row in rows {
        let mut substitute = Substitute::new(crate::entities::ProductCore {
            id: row.id,
            name: row.name,
            url: row.url,
            grade: row.grade,
        });
        // Reuse lists the original product already holds in memory
        if let Some(original) = category.products.find(substitute.original_id) {
            if original.brands_loaded.is_loaded() {
                substitute.brands = original.brands.clone();
                substitute.brands_loaded.mark_loaded();
            }
            if original.stores_loaded.is_loaded() {
                substitute.stores = original.stores.clone();
                substitute.stores_loaded.mark_loaded();
            }
        }
        matched.push(substitute);
    }

    let count = matched.len();
    let product = category
        .products
        .find_mut(product_id)
        .ok_or(SessionError::ProductNotFound(product_id))?;
    for substitute in matched {
        product.substitutes.add(substitute);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{LoadState, NutritionGrade, Product, ProductCore};

    fn storage_with_products() -> (Storage, Category) {
        let storage = Storage::open_in_memory().unwrap();
        let cat_id = storage
            .insert_category("Yaourts", "https://example.org/c/yaourts")
            .unwrap();
        let mut category = Category::new(cat_id, "Yaourts".into(), "https://example.org/c/yaourts".into(), 25);

        let specs = [
            ("Yaourt nature", NutritionGrade::A),
            ("Yaourt grec", NutritionGrade::B),
            ("Yaourt vanille", NutritionGrade::D),
        ];
        for (name, grade) in specs {
            let id = storage
                .insert_product(name, "https://example.org/p", grade)
                .unwrap();
            storage.link_category_product(cat_id, id).unwrap();
            let mut product = Product::new(
                ProductCore {
                    id,
                    name: name.into(),
                    url: "https://example.org/p".into(),
                    grade,
                },
                25,
            );
            product.categories.push(cat_id);
            category.products.add(product);
        }
        (storage, category)
    }

    #[test]
    fn test_grade_filter_is_ordinal() {
        let (storage, mut category) = storage_with_products();
        // Grade D product: both A and B qualify
        let n = find_substitutes(&storage, &mut category, 3).unwrap();
        assert_eq!(n, 2);
        // Grade A product: nothing is same-or-better with a different name
        let n = find_substitutes(&storage, &mut category, 1).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_substitutes_land_in_registry() {
        let (storage, mut category) = storage_with_products();
        find_substitutes(&storage, &mut category, 3).unwrap();
        let product = category.products.find(3).unwrap();
        assert_eq!(product.substitutes.len(), 2);
        let names: Vec<&str> = product
            .substitutes
            .iter()
            .map(|s| s.core.name.as_str())
            .collect();
        assert_eq!(names, vec!["Yaourt nature", "Yaourt grec"]);
    }

    #[test]
    fn test_reconciliation_copies_loaded_lists() {
        let (storage, mut category) = storage_with_products();
        {
            let original = category.products.find_mut(1).unwrap();
            original.brands = vec![4, 9];
            original.brands_loaded.mark_loaded();
        }
        find_substitutes(&storage, &mut category, 3).unwrap();
        let product = category.products.find(3).unwrap();
        let sub = product.substitutes.find(1).unwrap();
        assert_eq!(sub.brands, vec![4, 9]);
        assert!(sub.brands_loaded.is_loaded());
        // Stores were never loaded on the original, so not copied
        assert_eq!(sub.stores_loaded, LoadState::Unloaded);
    }

    #[test]
    fn test_unknown_product_is_explicit_error() {
        let (storage, mut category) = storage_with_products();
        let err = find_substitutes(&storage, &mut category, 99).unwrap_err();
        assert!(matches!(err, SessionError::ProductNotFound(99)));
    }
}

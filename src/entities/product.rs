//! Product types and the nutrition grade scale

use crate::core::registry::{Keyed, PagedRegistry};
use crate::entities::substitute::Substitute;
use crate::entities::LoadState;

/// Nutrition grade on the ordinal A-E scale, A best.
///
/// Ordering follows the scale: `A < B < C < D < E`, so "same or better
/// than X" is `grade <= x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NutritionGrade {
    A,
    B,
    C,
    D,
    E,
}

impl NutritionGrade {
    /// Lowercase single-letter form as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionGrade::A => "a",
            NutritionGrade::B => "b",
            NutritionGrade::C => "c",
            NutritionGrade::D => "d",
            NutritionGrade::E => "e",
        }
    }
}

impl std::fmt::Display for NutritionGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NutritionGrade::A => write!(f, "A"),
            NutritionGrade::B => write!(f, "B"),
            NutritionGrade::C => write!(f, "C"),
            NutritionGrade::D => write!(f, "D"),
            NutritionGrade::E => write!(f, "E"),
        }
    }
}

impl std::str::FromStr for NutritionGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" => Ok(NutritionGrade::A),
            "b" => Ok(NutritionGrade::B),
            "c" => Ok(NutritionGrade::C),
            "d" => Ok(NutritionGrade::D),
            "e" => Ok(NutritionGrade::E),
            _ => Err(format!("Unknown nutrition grade: {}", s)),
        }
    }
}

/// The product fields every product-shaped type embeds by value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCore {
    /// Storage-assigned id, unique for the process lifetime.
    pub id: i64,
    pub name: String,
    pub url: String,
    pub grade: NutritionGrade,
}

/// A product together with its catalog references and substitute registry.
///
/// Brand and store lists are populated at most once per instance: the
/// `LoadState` flags guard every fetch. The substitute registry is filled
/// once on the first substitute search.
#[derive(Debug, Clone)]
pub struct Product {
    pub core: ProductCore,
    /// Ids of categories this product belongs to.
    pub categories: Vec<i64>,
    /// Ids into the brand catalog.
    pub brands: Vec<i64>,
    /// Ids into the store catalog.
    pub stores: Vec<i64>,
    pub brands_loaded: LoadState,
    pub stores_loaded: LoadState,
    pub substitutes_loaded: LoadState,
    pub substitutes: PagedRegistry<Substitute>,
}

impl Product {
    pub fn new(core: ProductCore, page_size: usize) -> Self {
        Self {
            core,
            categories: Vec::new(),
            brands: Vec::new(),
            stores: Vec::new(),
            brands_loaded: LoadState::Unloaded,
            stores_loaded: LoadState::Unloaded,
            substitutes_loaded: LoadState::Unloaded,
            substitutes: PagedRegistry::new(page_size),
        }
    }

    /// Link a brand by catalog id; duplicates are ignored.
    /// Returns true when the link is new.
    pub fn link_brand(&mut self, brand_id: i64) -> bool {
        if self.brands.contains(&brand_id) {
            return false;
        }
        self.brands.push(brand_id);
        true
    }

    /// Link a store by catalog id; duplicates are ignored.
    pub fn link_store(&mut self, store_id: i64) -> bool {
        if self.stores.contains(&store_id) {
            return false;
        }
        self.stores.push(store_id);
        true
    }
}

impl Keyed for Product {
    fn key(&self) -> i64 {
        self.core.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_ordering() {
        assert!(NutritionGrade::A < NutritionGrade::B);
        assert!(NutritionGrade::B < NutritionGrade::E);
        // "same or better" is <=
        assert!(NutritionGrade::A <= NutritionGrade::A);
        assert!(!(NutritionGrade::C <= NutritionGrade::B));
    }

    #[test]
    fn test_grade_parse() {
        assert_eq!("a".parse::<NutritionGrade>().unwrap(), NutritionGrade::A);
        assert_eq!(" B ".parse::<NutritionGrade>().unwrap(), NutritionGrade::B);
        assert!("f".parse::<NutritionGrade>().is_err());
        assert!("".parse::<NutritionGrade>().is_err());
    }

    #[test]
    fn test_grade_round_trip() {
        for grade in [
            NutritionGrade::A,
            NutritionGrade::B,
            NutritionGrade::C,
            NutritionGrade::D,
            NutritionGrade::E,
        ] {
            assert_eq!(grade.as_str().parse::<NutritionGrade>().unwrap(), grade);
        }
    }

    #[test]
    fn test_link_brand_dedup() {
        let core = ProductCore {
            id: 1,
            name: "Yaourt nature".into(),
            url: "https://example.org/p/1".into(),
            grade: NutritionGrade::B,
        };
        let mut product = Product::new(core, 25);
        assert!(product.link_brand(3));
        assert!(!product.link_brand(3));
        assert_eq!(product.brands, vec![3]);
    }
}

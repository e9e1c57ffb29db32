//! Entity types - products, categories, brands/stores, substitutes, favorites

pub mod category;
pub mod named;
pub mod product;
pub mod substitute;

pub use category::Category;
pub use named::{EntityKind, NamedEntity};
pub use product::{NutritionGrade, Product, ProductCore};
pub use substitute::{Favorite, Substitute};

/// One-way lazy-load state machine guarding per-instance fetches.
///
/// An entity attribute list (brands, stores, favorite links) starts
/// `Unloaded` and transitions to `Loaded` exactly once; there is no way
/// back. Callers check `is_loaded()` before fetching so a list is never
/// populated twice for the same instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loaded,
}

impl LoadState {
    pub fn is_loaded(self) -> bool {
        matches!(self, LoadState::Loaded)
    }

    /// Transition to `Loaded`. Returns false when already loaded, so the
    /// caller can skip a redundant fetch.
    pub fn mark_loaded(&mut self) -> bool {
        if self.is_loaded() {
            return false;
        }
        *self = LoadState::Loaded;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_state_one_way() {
        let mut state = LoadState::default();
        assert!(!state.is_loaded());
        assert!(state.mark_loaded());
        assert!(state.is_loaded());
        // Second transition is refused
        assert!(!state.mark_loaded());
        assert!(state.is_loaded());
    }
}

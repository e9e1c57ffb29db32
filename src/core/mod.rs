//! Core module - registries, catalogs, matching and the session

pub mod catalog;
pub mod config;
pub mod favorites;
pub mod matcher;
pub mod registry;
pub mod session;

pub use catalog::{CatalogHit, NamedCatalog};
pub use config::{Config, DEFAULT_PAGE_SIZE};
pub use favorites::{FavoriteBook, SaveOutcome, UnlinkOutcome};
pub use registry::{Keyed, PagedRegistry};
pub use session::{IngestStats, Session, SessionError};

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports for easy external access
pub use application::service::AnimeService;
pub use domain::entities::{Anime, EntityRef, GenreRef};
pub use domain::repositories::AnimeRepository;
pub use domain::value_objects::{AnimeFilter, AnimeSortBy, AnimeStatus, CatalogStats, SortOrder};

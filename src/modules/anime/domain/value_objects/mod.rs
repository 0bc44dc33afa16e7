pub mod anime_filter;
pub mod anime_status;
pub mod catalog_stats;

pub use anime_filter::{AnimeFilter, AnimeSortBy};
pub use crate::shared::application::SortOrder;
pub use anime_status::AnimeStatus;
pub use catalog_stats::{CatalogStats, CatalogStatsSource};

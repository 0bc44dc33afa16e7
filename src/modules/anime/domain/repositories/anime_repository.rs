use async_trait::async_trait;
use uuid::Uuid;

use crate::modules::anime::domain::entities::Anime;
use crate::modules::anime::domain::value_objects::{AnimeFilter, AnimeStatus, CatalogStatsSource};
use crate::shared::application::PageRequest;
use crate::shared::errors::AppResult;

/// Insert payload with the slug already resolved.
#[derive(Debug, Clone)]
pub struct NewAnime {
    pub title: String,
    pub slug: String,
    pub synopsis: Option<String>,
    pub status: AnimeStatus,
    pub rating: Option<f32>,
    pub release_year: Option<i32>,
    pub total_episodes: Option<i32>,
    pub cover_url: Option<String>,
    pub studio_id: Option<Uuid>,
    pub anime_type_id: Option<Uuid>,
    pub genre_ids: Vec<Uuid>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AnimeChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub synopsis: Option<String>,
    pub status: Option<AnimeStatus>,
    pub rating: Option<f32>,
    pub release_year: Option<i32>,
    pub total_episodes: Option<i32>,
    pub cover_url: Option<String>,
    pub studio_id: Option<Uuid>,
    pub anime_type_id: Option<Uuid>,
    pub genre_ids: Option<Vec<Uuid>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimeRepository: Send + Sync {
    /// Filtered, sorted page window (filter/sort/offset/limit run in SQL).
    async fn list(&self, filter: &AnimeFilter, page: &PageRequest) -> AppResult<Vec<Anime>>;

    /// Count of the full filtered set.
    async fn count(&self, filter: &AnimeFilter) -> AppResult<u64>;

    /// Minimal rows of the full filtered set, oldest first, for stats.
    async fn stats_source(&self, filter: &AnimeFilter) -> AppResult<Vec<CatalogStatsSource>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Anime>>;
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Anime>>;

    async fn title_exists(&self, title: &str, exclude: Option<Uuid>) -> AppResult<bool>;
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool>;

    async fn create(&self, record: &NewAnime) -> AppResult<Anime>;
    async fn update(&self, id: Uuid, changes: &AnimeChanges) -> AppResult<Anime>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

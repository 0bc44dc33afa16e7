use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::anime::domain::entities::Anime;
use crate::modules::anime::domain::repositories::{AnimeChanges, AnimeRepository, NewAnime};
use crate::modules::anime::domain::value_objects::CatalogStats;
use crate::shared::application::{ApiResponse, Page, PageInfo};
use crate::shared::auth::{require_admin, Session};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{resolve_slug, CollisionPolicy, SlugLookup, SLUG_INSERT_ATTEMPTS};
use crate::{log_debug, log_warn};

use super::inputs::{AnimeListRequest, CreateAnimeInput, UpdateAnimeInput};

/// One catalog listing page: items plus window metadata plus the summary
/// aggregates over the whole filtered set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimePage {
    pub items: Vec<Anime>,
    pub pagination: PageInfo,
    pub stats: CatalogStats,
}

pub struct AnimeService {
    repo: Arc<dyn AnimeRepository>,
}

/// Slug existence view of the anime table for the resolver.
struct AnimeSlugs<'a>(&'a dyn AnimeRepository);

#[async_trait]
impl SlugLookup for AnimeSlugs<'_> {
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        self.0.slug_exists(slug, exclude).await
    }
}

impl AnimeService {
    pub fn new(repo: Arc<dyn AnimeRepository>) -> Self {
        Self { repo }
    }

    /// Public catalog listing. No session required.
    pub async fn list(&self, request: AnimeListRequest) -> ApiResponse<AnimePage> {
        ApiResponse::from_result(self.try_list(request).await, "Catalog listing")
    }

    pub async fn get_by_slug(&self, slug: &str) -> ApiResponse<Anime> {
        ApiResponse::from_result(self.try_get_by_slug(slug).await, "Anime found")
    }

    pub async fn get_by_id(&self, id: Uuid) -> ApiResponse<Anime> {
        ApiResponse::from_result(self.try_get_by_id(id).await, "Anime found")
    }

    pub async fn create(
        &self,
        session: Option<&Session>,
        input: CreateAnimeInput,
    ) -> ApiResponse<Anime> {
        ApiResponse::from_result(self.try_create(session, input).await, "Anime created")
    }

    pub async fn update(
        &self,
        session: Option<&Session>,
        id: Uuid,
        input: UpdateAnimeInput,
    ) -> ApiResponse<Anime> {
        ApiResponse::from_result(self.try_update(session, id, input).await, "Anime updated")
    }

    pub async fn delete(&self, session: Option<&Session>, id: Uuid) -> ApiResponse<()> {
        ApiResponse::from_result(self.try_delete(session, id).await, "Anime deleted")
    }

    async fn try_list(&self, request: AnimeListRequest) -> AppResult<AnimePage> {
        let (filter, page_request) = request.into_query();

        let items = self.repo.list(&filter, &page_request).await?;
        let total = self.repo.count(&filter).await?;
        let stats = CatalogStats::from_filtered(&self.repo.stats_source(&filter).await?);

        let page = Page::new(items, total, &page_request);
        Ok(AnimePage {
            items: page.items,
            pagination: page.pagination,
            stats,
        })
    }

    async fn try_get_by_slug(&self, slug: &str) -> AppResult<Anime> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No anime with slug '{}'", slug)))
    }

    async fn try_get_by_id(&self, id: Uuid) -> AppResult<Anime> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Anime {} not found", id)))
    }

    async fn try_create(
        &self,
        session: Option<&Session>,
        input: CreateAnimeInput,
    ) -> AppResult<Anime> {
        require_admin(session)?;
        input.validate()?;

        if self.repo.title_exists(&input.title, None).await? {
            return Err(AppError::Conflict(format!(
                "Anime titled '{}' already exists",
                input.title
            )));
        }

        // The resolver's check is a pre-flight; the unique constraint is the
        // guarantee. When a concurrent create wins the race, resolve again.
        let mut attempt = 1;
        loop {
            let slug =
                resolve_slug(&AnimeSlugs(&*self.repo), &input.title, None, CollisionPolicy::Suffix)
                    .await?;
            log_debug!("Creating anime '{}' with slug '{}'", input.title, slug);

            let record = NewAnime {
                title: input.title.clone(),
                slug,
                synopsis: input.synopsis.clone(),
                status: input.status,
                rating: input.rating,
                release_year: input.release_year,
                total_episodes: input.total_episodes,
                cover_url: input.cover_url.clone(),
                studio_id: input.studio_id,
                anime_type_id: input.anime_type_id,
                genre_ids: input.genre_ids.clone(),
            };

            match self.repo.create(&record).await {
                Err(err) if err.is_conflict() && attempt < SLUG_INSERT_ATTEMPTS => {
                    log_warn!(
                        "Insert conflict for '{}' (attempt {}), re-resolving slug",
                        input.title,
                        attempt
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn try_update(
        &self,
        session: Option<&Session>,
        id: Uuid,
        input: UpdateAnimeInput,
    ) -> AppResult<Anime> {
        require_admin(session)?;
        input.validate()?;

        let existing = self.try_get_by_id(id).await?;

        let mut changes = AnimeChanges {
            synopsis: input.synopsis,
            status: input.status,
            rating: input.rating,
            release_year: input.release_year,
            total_episodes: input.total_episodes,
            cover_url: input.cover_url,
            studio_id: input.studio_id,
            anime_type_id: input.anime_type_id,
            genre_ids: input.genre_ids,
            ..Default::default()
        };

        // A rename re-derives the slug, excluding this record from the
        // collision checks so it cannot collide with itself.
        if let Some(title) = input.title {
            if title != existing.title {
                if self.repo.title_exists(&title, Some(id)).await? {
                    return Err(AppError::Conflict(format!(
                        "Anime titled '{}' already exists",
                        title
                    )));
                }
                let slug = resolve_slug(
                    &AnimeSlugs(&*self.repo),
                    &title,
                    Some(id),
                    CollisionPolicy::Suffix,
                )
                .await?;
                changes.slug = Some(slug);
                changes.title = Some(title);
            }
        }

        self.repo.update(id, &changes).await
    }

    async fn try_delete(&self, session: Option<&Session>, id: Uuid) -> AppResult<()> {
        require_admin(session)?;
        self.try_get_by_id(id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::anime::domain::entities::GenreRef;
    use crate::modules::anime::domain::repositories::MockAnimeRepository;
    use crate::modules::anime::domain::value_objects::{AnimeStatus, CatalogStatsSource};
    use crate::shared::application::compose_page;
    use crate::shared::auth::{test_session, UserRole};
    use chrono::{Duration, TimeZone, Utc};

    fn fixture(title: &str, status: AnimeStatus, rating: Option<f32>, minute: i64) -> Anime {
        Anime {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: crate::shared::utils::slugify(title),
            synopsis: None,
            status,
            rating,
            release_year: Some(2021),
            total_episodes: Some(12),
            cover_url: None,
            genres: vec![GenreRef {
                id: Uuid::nil(),
                name: "Action".to_string(),
                slug: "action".to_string(),
            }],
            studio: None,
            anime_type: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minute),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn create_input(genre_ids: Vec<Uuid>) -> CreateAnimeInput {
        CreateAnimeInput {
            title: "Vinland Saga".to_string(),
            synopsis: None,
            status: AnimeStatus::Completed,
            rating: Some(8.8),
            release_year: Some(2019),
            total_episodes: Some(24),
            cover_url: None,
            studio_id: None,
            anime_type_id: None,
            genre_ids,
        }
    }

    /// Wire a mock so list/count/stats evaluate the canonical domain
    /// semantics against a fixed set, like the SQL implementation would.
    fn mock_catalog(repo: &mut MockAnimeRepository, catalog: Vec<Anime>) {
        let for_list = catalog.clone();
        repo.expect_list().returning(move |filter, page| {
            let mut matching: Vec<Anime> = for_list
                .iter()
                .filter(|a| filter.matches(a))
                .cloned()
                .collect();
            matching.sort_by(|a, b| filter.compare(a, b));
            Ok(compose_page(matching, page).items)
        });

        let for_count = catalog.clone();
        repo.expect_count().returning(move |filter| {
            Ok(for_count.iter().filter(|a| filter.matches(a)).count() as u64)
        });

        repo.expect_stats_source().returning(move |filter| {
            let mut matching: Vec<&Anime> =
                catalog.iter().filter(|a| filter.matches(a)).collect();
            matching.sort_by_key(|a| a.created_at);
            Ok(matching
                .into_iter()
                .map(|a| CatalogStatsSource {
                    title: a.title.clone(),
                    total_episodes: a.total_episodes,
                    created_at: a.created_at,
                    genres: a.genres.iter().map(|g| g.name.clone()).collect(),
                })
                .collect())
        });
    }

    #[tokio::test]
    async fn filtered_sorted_page_with_stats() {
        let mut repo = MockAnimeRepository::new();
        mock_catalog(
            &mut repo,
            vec![
                fixture("Finished Hit", AnimeStatus::Completed, Some(9.2), 0),
                fixture("Front Runner", AnimeStatus::Ongoing, Some(8.9), 1),
                fixture("Close Second", AnimeStatus::Ongoing, Some(8.7), 2),
                fixture("Also Running", AnimeStatus::Ongoing, Some(7.0), 3),
            ],
        );
        let service = AnimeService::new(Arc::new(repo));

        let response = service
            .list(AnimeListRequest {
                status: Some("ongoing".to_string()),
                sort_by: Some("rating".to_string()),
                sort_order: Some("desc".to_string()),
                page: Some(1),
                page_size: Some(2),
                ..Default::default()
            })
            .await;

        assert!(response.success);
        let page = response.data.unwrap();
        let titles: Vec<&str> = page.items.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Front Runner", "Close Second"]);
        assert_eq!(page.pagination.total_items, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(page.pagination.has_next);
        // Stats describe the filtered set, not the whole catalog.
        assert_eq!(page.stats.total_animes, 3);
        assert_eq!(page.stats.latest_anime.as_deref(), Some("Also Running"));
    }

    #[tokio::test]
    async fn create_rejects_empty_genres_before_persistence() {
        let mut repo = MockAnimeRepository::new();
        repo.expect_title_exists().times(0);
        repo.expect_create().times(0);
        let service = AnimeService::new(Arc::new(repo));
        let session = test_session(UserRole::Admin);

        let response = service.create(Some(&session), create_input(vec![])).await;

        assert!(!response.success);
        assert_eq!(
            response.field_error("genre_ids"),
            Some("At least one genre is required")
        );
    }

    #[tokio::test]
    async fn create_requires_admin_before_any_persistence_access() {
        let mut repo = MockAnimeRepository::new();
        repo.expect_title_exists().times(0);
        repo.expect_slug_exists().times(0);
        repo.expect_create().times(0);
        let service = AnimeService::new(Arc::new(repo));

        let anon = service.create(None, create_input(vec![Uuid::new_v4()])).await;
        assert!(!anon.success);

        let session = test_session(UserRole::User);
        let non_admin = service
            .create(Some(&session), create_input(vec![Uuid::new_v4()]))
            .await;
        assert!(!non_admin.success);
    }

    #[tokio::test]
    async fn create_resolves_slug_and_persists() {
        let mut repo = MockAnimeRepository::new();
        repo.expect_title_exists().returning(|_, _| Ok(false));
        repo.expect_slug_exists().returning(|_, _| Ok(false));
        repo.expect_create().times(1).returning(|record| {
            assert_eq!(record.slug, "vinland-saga");
            Ok(fixture("Vinland Saga", AnimeStatus::Completed, Some(8.8), 0))
        });
        let service = AnimeService::new(Arc::new(repo));
        let session = test_session(UserRole::Admin);

        let response = service
            .create(Some(&session), create_input(vec![Uuid::new_v4()]))
            .await;
        assert!(response.success);
        assert_eq!(response.data.unwrap().slug, "vinland-saga");
    }

    #[tokio::test]
    async fn create_retries_once_when_the_unique_constraint_fires() {
        let mut repo = MockAnimeRepository::new();
        repo.expect_title_exists().returning(|_, _| Ok(false));
        // First resolve sees a free slug; after the conflicting insert, the
        // second resolve finds it taken and suffixes.
        let mut exists_calls = 0;
        repo.expect_slug_exists().returning(move |slug, _| {
            exists_calls += 1;
            Ok(exists_calls > 1 && slug == "vinland-saga")
        });
        let mut create_calls = 0;
        repo.expect_create().times(2).returning(move |record| {
            create_calls += 1;
            if create_calls == 1 {
                Err(AppError::Conflict("anime_slug_key".to_string()))
            } else {
                assert_eq!(record.slug, "vinland-saga-1");
                Ok(fixture("Vinland Saga", AnimeStatus::Completed, Some(8.8), 0))
            }
        });
        let service = AnimeService::new(Arc::new(repo));
        let session = test_session(UserRole::Admin);

        let response = service
            .create(Some(&session), create_input(vec![Uuid::new_v4()]))
            .await;
        assert!(response.success);
    }

    #[tokio::test]
    async fn duplicate_title_is_a_conflict() {
        let mut repo = MockAnimeRepository::new();
        repo.expect_title_exists().returning(|_, _| Ok(true));
        repo.expect_create().times(0);
        let service = AnimeService::new(Arc::new(repo));
        let session = test_session(UserRole::Admin);

        let response = service
            .create(Some(&session), create_input(vec![Uuid::new_v4()]))
            .await;
        assert!(!response.success);
        assert!(response.message.contains("already exists"));
    }

    #[tokio::test]
    async fn rename_reslug_excludes_self() {
        let existing = fixture("Old Title", AnimeStatus::Ongoing, None, 0);
        let id = existing.id;

        let mut repo = MockAnimeRepository::new();
        let found = existing.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_title_exists()
            .withf(move |_, exclude| *exclude == Some(id))
            .returning(|_, _| Ok(false));
        repo.expect_slug_exists()
            .withf(move |_, exclude| *exclude == Some(id))
            .returning(|_, _| Ok(false));
        repo.expect_update().times(1).returning(move |_, changes| {
            assert_eq!(changes.title.as_deref(), Some("New Title"));
            assert_eq!(changes.slug.as_deref(), Some("new-title"));
            let mut updated = existing.clone();
            updated.title = "New Title".to_string();
            updated.slug = "new-title".to_string();
            Ok(updated)
        });
        let service = AnimeService::new(Arc::new(repo));
        let session = test_session(UserRole::Admin);

        let response = service
            .update(
                Some(&session),
                id,
                UpdateAnimeInput {
                    title: Some("New Title".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(response.success);
    }

    #[tokio::test]
    async fn delete_of_missing_anime_is_not_found() {
        let mut repo = MockAnimeRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_delete().times(0);
        let service = AnimeService::new(Arc::new(repo));
        let session = test_session(UserRole::Admin);

        let response = service.delete(Some(&session), Uuid::new_v4()).await;
        assert!(!response.success);
        assert!(response.message.contains("not found"));
    }
}

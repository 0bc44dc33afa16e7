use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tokio::task;
use uuid::Uuid;

use crate::modules::anime::domain::entities::{Anime, EntityRef, GenreRef};
use crate::modules::anime::domain::repositories::{AnimeChanges, AnimeRepository, NewAnime};
use crate::modules::anime::domain::value_objects::{
    AnimeFilter, AnimeSortBy, CatalogStatsSource, SortOrder,
};
use crate::modules::anime::infrastructure::models::{
    AnimeChangesRow, AnimeGenreRow, AnimeRow, NewAnimeRow,
};
use crate::schema::{anime, anime_genres, anime_types, genres, studios};
use crate::shared::application::PageRequest;
use crate::shared::database::DbConnection;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;

pub struct AnimeRepositoryImpl {
    db: Arc<Database>,
}

impl AnimeRepositoryImpl {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Base filtered query; every predicate of the filter is AND-combined.
    /// Mirrors `AnimeFilter::matches`.
    fn filtered(filter: &AnimeFilter) -> anime::BoxedQuery<'static, diesel::pg::Pg> {
        let mut query = anime::table.into_boxed();

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.trim());
            query = query.filter(anime::title.ilike(pattern));
        }
        if let Some(status) = filter.status {
            query = query.filter(anime::status.eq(status));
        }
        if let Some(type_id) = filter.anime_type_id {
            query = query.filter(anime::anime_type_id.eq(type_id));
        }
        if let Some(year) = filter.release_year {
            query = query.filter(anime::release_year.eq(year));
        }
        if let Some(min_rating) = filter.min_rating {
            query = query.filter(anime::rating.ge(min_rating));
        }
        if !filter.genre_ids.is_empty() {
            let tagged = anime_genres::table
                .filter(anime_genres::genre_id.eq_any(filter.genre_ids.clone()))
                .select(anime_genres::anime_id);
            query = query.filter(anime::id.eq_any(tagged));
        }

        query
    }

    /// Sort clause mirroring `AnimeFilter::compare`, title as tiebreaker.
    fn sorted(
        query: anime::BoxedQuery<'static, diesel::pg::Pg>,
        filter: &AnimeFilter,
    ) -> anime::BoxedQuery<'static, diesel::pg::Pg> {
        use AnimeSortBy::*;
        use SortOrder::*;

        match (filter.sort_by, filter.order) {
            (Title, Asc) => query.order(anime::title.asc()),
            (Title, Desc) => query.order(anime::title.desc()),
            (Rating, Asc) => query.order((anime::rating.asc(), anime::title.asc())),
            (Rating, Desc) => query.order((anime::rating.desc(), anime::title.asc())),
            (ReleaseYear, Asc) => query.order((anime::release_year.asc(), anime::title.asc())),
            (ReleaseYear, Desc) => query.order((anime::release_year.desc(), anime::title.asc())),
            (CreatedAt, Asc) => query.order((anime::created_at.asc(), anime::title.asc())),
            (CreatedAt, Desc) => query.order((anime::created_at.desc(), anime::title.asc())),
            (TotalEpisodes, Asc) => {
                query.order((anime::total_episodes.asc(), anime::title.asc()))
            }
            (TotalEpisodes, Desc) => {
                query.order((anime::total_episodes.desc(), anime::title.asc()))
            }
        }
    }

    /// Batch-resolve genres, studios and anime types for a set of rows.
    fn load_relations(conn: &mut DbConnection, rows: Vec<AnimeRow>) -> AppResult<Vec<Anime>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let genre_links: Vec<(Uuid, Uuid, String, String)> = anime_genres::table
            .inner_join(genres::table)
            .filter(anime_genres::anime_id.eq_any(&ids))
            .select((
                anime_genres::anime_id,
                genres::id,
                genres::name,
                genres::slug,
            ))
            .load(conn)?;

        let mut genres_by_anime: HashMap<Uuid, Vec<GenreRef>> = HashMap::new();
        for (anime_id, id, name, slug) in genre_links {
            genres_by_anime
                .entry(anime_id)
                .or_default()
                .push(GenreRef { id, name, slug });
        }

        let studio_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.studio_id).collect();
        let studio_names: HashMap<Uuid, String> = studios::table
            .filter(studios::id.eq_any(studio_ids))
            .select((studios::id, studios::name))
            .load::<(Uuid, String)>(conn)?
            .into_iter()
            .collect();

        let type_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.anime_type_id).collect();
        let type_names: HashMap<Uuid, String> = anime_types::table
            .filter(anime_types::id.eq_any(type_ids))
            .select((anime_types::id, anime_types::name))
            .load::<(Uuid, String)>(conn)?
            .into_iter()
            .collect();

        let entities = rows
            .into_iter()
            .map(|row| {
                let genres = genres_by_anime.remove(&row.id).unwrap_or_default();
                let studio = row.studio_id.and_then(|id| {
                    studio_names.get(&id).map(|name| EntityRef {
                        id,
                        name: name.clone(),
                    })
                });
                let anime_type = row.anime_type_id.and_then(|id| {
                    type_names.get(&id).map(|name| EntityRef {
                        id,
                        name: name.clone(),
                    })
                });
                row.into_entity(genres, studio, anime_type)
            })
            .collect();

        Ok(entities)
    }

    fn load_one(conn: &mut DbConnection, row: AnimeRow) -> AppResult<Anime> {
        let mut entities = Self::load_relations(conn, vec![row])?;
        entities
            .pop()
            .ok_or_else(|| AppError::Internal("Relation loading dropped a row".to_string()))
    }

    fn replace_genre_links(
        conn: &mut DbConnection,
        anime_id: Uuid,
        genre_ids: &[Uuid],
    ) -> AppResult<()> {
        diesel::delete(anime_genres::table.filter(anime_genres::anime_id.eq(anime_id)))
            .execute(conn)?;
        let links: Vec<AnimeGenreRow> = genre_ids
            .iter()
            .map(|genre_id| AnimeGenreRow {
                anime_id,
                genre_id: *genre_id,
            })
            .collect();
        diesel::insert_into(anime_genres::table)
            .values(&links)
            .execute(conn)?;
        Ok(())
    }
}

#[async_trait]
impl AnimeRepository for AnimeRepositoryImpl {
    async fn list(&self, filter: &AnimeFilter, page: &PageRequest) -> AppResult<Vec<Anime>> {
        let db = Arc::clone(&self.db);
        let filter = filter.clone();
        let offset = page.offset();
        let limit = page.limit();

        task::spawn_blocking(move || -> AppResult<Vec<Anime>> {
            let mut conn = db.get_connection()?;
            let rows = Self::sorted(Self::filtered(&filter), &filter)
                .offset(offset)
                .limit(limit)
                .load::<AnimeRow>(&mut conn)?;
            Self::load_relations(&mut conn, rows)
        })
        .await?
    }

    async fn count(&self, filter: &AnimeFilter) -> AppResult<u64> {
        let db = Arc::clone(&self.db);
        let filter = filter.clone();

        task::spawn_blocking(move || -> AppResult<u64> {
            let mut conn = db.get_connection()?;
            let count: i64 = Self::filtered(&filter).count().get_result(&mut conn)?;
            Ok(count as u64)
        })
        .await?
    }

    async fn stats_source(&self, filter: &AnimeFilter) -> AppResult<Vec<CatalogStatsSource>> {
        let db = Arc::clone(&self.db);
        let filter = filter.clone();

        task::spawn_blocking(move || -> AppResult<Vec<CatalogStatsSource>> {
            let mut conn = db.get_connection()?;

            // Oldest-first scan keeps the popular-genre tie-break stable.
            let rows: Vec<(Uuid, String, Option<i32>, DateTime<Utc>)> = Self::filtered(&filter)
                .select((
                    anime::id,
                    anime::title,
                    anime::total_episodes,
                    anime::created_at,
                ))
                .order(anime::created_at.asc())
                .load(&mut conn)?;

            let ids: Vec<Uuid> = rows.iter().map(|(id, ..)| *id).collect();
            let genre_links: Vec<(Uuid, String)> = anime_genres::table
                .inner_join(genres::table)
                .filter(anime_genres::anime_id.eq_any(&ids))
                .select((anime_genres::anime_id, genres::name))
                .load(&mut conn)?;

            let mut genres_by_anime: HashMap<Uuid, Vec<String>> = HashMap::new();
            for (anime_id, name) in genre_links {
                genres_by_anime.entry(anime_id).or_default().push(name);
            }

            Ok(rows
                .into_iter()
                .map(|(id, title, total_episodes, created_at)| CatalogStatsSource {
                    title,
                    total_episodes,
                    created_at,
                    genres: genres_by_anime.remove(&id).unwrap_or_default(),
                })
                .collect())
        })
        .await?
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Anime>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Option<Anime>> {
            let mut conn = db.get_connection()?;
            let row = anime::table
                .find(id)
                .first::<AnimeRow>(&mut conn)
                .optional()?;
            match row {
                Some(row) => Ok(Some(Self::load_one(&mut conn, row)?)),
                None => Ok(None),
            }
        })
        .await?
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Anime>> {
        let db = Arc::clone(&self.db);
        let slug = slug.to_string();

        task::spawn_blocking(move || -> AppResult<Option<Anime>> {
            let mut conn = db.get_connection()?;
            let row = anime::table
                .filter(anime::slug.eq(&slug))
                .first::<AnimeRow>(&mut conn)
                .optional()?;
            match row {
                Some(row) => Ok(Some(Self::load_one(&mut conn, row)?)),
                None => Ok(None),
            }
        })
        .await?
    }

    async fn title_exists(&self, title: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let db = Arc::clone(&self.db);
        let title = title.to_string();

        task::spawn_blocking(move || -> AppResult<bool> {
            let mut conn = db.get_connection()?;
            let mut query = anime::table.filter(anime::title.eq(&title)).into_boxed();
            if let Some(id) = exclude {
                query = query.filter(anime::id.ne(id));
            }
            let count: i64 = query.count().get_result(&mut conn)?;
            Ok(count > 0)
        })
        .await?
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let db = Arc::clone(&self.db);
        let slug = slug.to_string();

        task::spawn_blocking(move || -> AppResult<bool> {
            let mut conn = db.get_connection()?;
            let mut query = anime::table.filter(anime::slug.eq(&slug)).into_boxed();
            if let Some(id) = exclude {
                query = query.filter(anime::id.ne(id));
            }
            let count: i64 = query.count().get_result(&mut conn)?;
            Ok(count > 0)
        })
        .await?
    }

    async fn create(&self, record: &NewAnime) -> AppResult<Anime> {
        let db = Arc::clone(&self.db);
        let record = record.clone();

        task::spawn_blocking(move || -> AppResult<Anime> {
            let mut conn = db.get_connection()?;
            conn.transaction::<Anime, AppError, _>(|conn| {
                let row: AnimeRow = diesel::insert_into(anime::table)
                    .values(NewAnimeRow::from(&record))
                    .get_result(conn)?;

                let links: Vec<AnimeGenreRow> = record
                    .genre_ids
                    .iter()
                    .map(|genre_id| AnimeGenreRow {
                        anime_id: row.id,
                        genre_id: *genre_id,
                    })
                    .collect();
                diesel::insert_into(anime_genres::table)
                    .values(&links)
                    .execute(conn)?;

                Self::load_one(conn, row)
            })
        })
        .await?
    }

    async fn update(&self, id: Uuid, changes: &AnimeChanges) -> AppResult<Anime> {
        let db = Arc::clone(&self.db);
        let changes = changes.clone();

        task::spawn_blocking(move || -> AppResult<Anime> {
            let mut conn = db.get_connection()?;
            conn.transaction::<Anime, AppError, _>(|conn| {
                let changeset = AnimeChangesRow::from(&changes);
                let row: AnimeRow = if changeset.is_empty() {
                    anime::table.find(id).first(conn)?
                } else {
                    diesel::update(anime::table.find(id))
                        .set(changeset)
                        .get_result(conn)?
                };

                if let Some(genre_ids) = &changes.genre_ids {
                    Self::replace_genre_links(conn, id, genre_ids)?;
                }

                Self::load_one(conn, row)
            })
        })
        .await?
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            let deleted =
                diesel::delete(anime::table.filter(anime::id.eq(id))).execute(&mut conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound(format!("Anime {} not found", id)));
            }
            Ok(())
        })
        .await?
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use tokio::task;
use uuid::Uuid;

use crate::modules::taxonomy::domain::{
    EntityKind, NamedEntity, NamedEntityRepository, NamedEntityWithUsage, NewNamedEntity,
};
use crate::schema::{anime_genres, genres};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;

type GenreColumns = (Uuid, String, String, DateTime<Utc>);

fn entity_from(row: GenreColumns) -> NamedEntity {
    let (id, name, slug, created_at) = row;
    NamedEntity {
        id,
        name,
        slug: Some(slug),
        created_at,
    }
}

pub struct GenreRepositoryImpl {
    db: Arc<Database>,
}

impl GenreRepositoryImpl {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NamedEntityRepository for GenreRepositoryImpl {
    fn kind(&self) -> EntityKind {
        EntityKind::Genre
    }

    async fn list_with_usage(
        &self,
        search: Option<String>,
    ) -> AppResult<Vec<NamedEntityWithUsage>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<NamedEntityWithUsage>> {
            let mut conn = db.get_connection()?;

            let mut query = genres::table.into_boxed();
            if let Some(term) = search {
                query = query.filter(genres::name.ilike(format!("%{}%", term)));
            }
            let rows: Vec<GenreColumns> = query
                .order(genres::created_at.asc())
                .select((genres::id, genres::name, genres::slug, genres::created_at))
                .load(&mut conn)?;

            let counts: HashMap<Uuid, i64> = anime_genres::table
                .group_by(anime_genres::genre_id)
                .select((anime_genres::genre_id, count_star()))
                .load::<(Uuid, i64)>(&mut conn)?
                .into_iter()
                .collect();

            Ok(rows
                .into_iter()
                .map(|row| {
                    let entity = entity_from(row);
                    let anime_count = counts.get(&entity.id).copied().unwrap_or(0) as u64;
                    NamedEntityWithUsage {
                        entity,
                        anime_count,
                    }
                })
                .collect())
        })
        .await?
    }

    async fn get_all(&self) -> AppResult<Vec<NamedEntity>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<NamedEntity>> {
            let mut conn = db.get_connection()?;
            let rows: Vec<GenreColumns> = genres::table
                .order(genres::name.asc())
                .select((genres::id, genres::name, genres::slug, genres::created_at))
                .load(&mut conn)?;
            Ok(rows.into_iter().map(entity_from).collect())
        })
        .await?
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<NamedEntity>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Option<NamedEntity>> {
            let mut conn = db.get_connection()?;
            let row: Option<GenreColumns> = genres::table
                .find(id)
                .select((genres::id, genres::name, genres::slug, genres::created_at))
                .first(&mut conn)
                .optional()?;
            Ok(row.map(entity_from))
        })
        .await?
    }

    async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let db = Arc::clone(&self.db);
        let name = name.to_string();

        task::spawn_blocking(move || -> AppResult<bool> {
            let mut conn = db.get_connection()?;
            let mut query = genres::table.filter(genres::name.eq(&name)).into_boxed();
            if let Some(id) = exclude {
                query = query.filter(genres::id.ne(id));
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
            let mut query = genres::table.filter(genres::slug.eq(&slug)).into_boxed();
            if let Some(id) = exclude {
                query = query.filter(genres::id.ne(id));
            }
            let count: i64 = query.count().get_result(&mut conn)?;
            Ok(count > 0)
        })
        .await?
    }

    async fn create(&self, entity: &NewNamedEntity) -> AppResult<NamedEntity> {
        let db = Arc::clone(&self.db);
        let name = entity.name.clone();
        let slug = entity.slug.clone().ok_or_else(|| {
            AppError::Internal("Genre creation requires a resolved slug".to_string())
        })?;

        task::spawn_blocking(move || -> AppResult<NamedEntity> {
            let mut conn = db.get_connection()?;
            let row: GenreColumns = diesel::insert_into(genres::table)
                .values((genres::name.eq(&name), genres::slug.eq(&slug)))
                .returning((genres::id, genres::name, genres::slug, genres::created_at))
                .get_result(&mut conn)?;
            Ok(entity_from(row))
        })
        .await?
    }

    async fn rename<'a>(
        &self,
        id: Uuid,
        name: &'a str,
        slug: Option<&'a str>,
    ) -> AppResult<NamedEntity> {
        let db = Arc::clone(&self.db);
        let name = name.to_string();
        let slug = slug.map(str::to_string);

        task::spawn_blocking(move || -> AppResult<NamedEntity> {
            let mut conn = db.get_connection()?;
            let row: GenreColumns = match slug {
                Some(slug) => diesel::update(genres::table.find(id))
                    .set((genres::name.eq(&name), genres::slug.eq(&slug)))
                    .returning((genres::id, genres::name, genres::slug, genres::created_at))
                    .get_result(&mut conn)?,
                None => diesel::update(genres::table.find(id))
                    .set(genres::name.eq(&name))
                    .returning((genres::id, genres::name, genres::slug, genres::created_at))
                    .get_result(&mut conn)?,
            };
            Ok(entity_from(row))
        })
        .await?
    }

    async fn delete_if_unused(&self, id: Uuid) -> AppResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            conn.transaction::<(), AppError, _>(|conn| {
                let usage: i64 = anime_genres::table
                    .filter(anime_genres::genre_id.eq(id))
                    .count()
                    .get_result(conn)?;
                if usage > 0 {
                    let name: String = genres::table
                        .find(id)
                        .select(genres::name)
                        .get_result(conn)?;
                    return Err(AppError::Conflict(format!(
                        "Genre '{}' is used by {} anime",
                        name, usage
                    )));
                }

                let deleted =
                    diesel::delete(genres::table.filter(genres::id.eq(id))).execute(conn)?;
                if deleted == 0 {
                    return Err(AppError::NotFound("Genre not found".to_string()));
                }
                Ok(())
            })
        })
        .await?
    }
}

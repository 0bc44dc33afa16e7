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
use crate::schema::{anime, studios};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;

type StudioColumns = (Uuid, String, DateTime<Utc>);

fn entity_from(row: StudioColumns) -> NamedEntity {
    let (id, name, created_at) = row;
    NamedEntity {
        id,
        name,
        slug: None,
        created_at,
    }
}

pub struct StudioRepositoryImpl {
    db: Arc<Database>,
}

impl StudioRepositoryImpl {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NamedEntityRepository for StudioRepositoryImpl {
    fn kind(&self) -> EntityKind {
        EntityKind::Studio
    }

    async fn list_with_usage(
        &self,
        search: Option<String>,
    ) -> AppResult<Vec<NamedEntityWithUsage>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<NamedEntityWithUsage>> {
            let mut conn = db.get_connection()?;

            let mut query = studios::table.into_boxed();
            if let Some(term) = search {
                query = query.filter(studios::name.ilike(format!("%{}%", term)));
            }
            let rows: Vec<StudioColumns> = query
                .order(studios::created_at.asc())
                .select((studios::id, studios::name, studios::created_at))
                .load(&mut conn)?;

            let counts: HashMap<Uuid, i64> = anime::table
                .filter(anime::studio_id.is_not_null())
                .group_by(anime::studio_id)
                .select((anime::studio_id, count_star()))
                .load::<(Option<Uuid>, i64)>(&mut conn)?
                .into_iter()
                .filter_map(|(id, count)| id.map(|id| (id, count)))
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
            let rows: Vec<StudioColumns> = studios::table
                .order(studios::name.asc())
                .select((studios::id, studios::name, studios::created_at))
                .load(&mut conn)?;
            Ok(rows.into_iter().map(entity_from).collect())
        })
        .await?
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<NamedEntity>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Option<NamedEntity>> {
            let mut conn = db.get_connection()?;
            let row: Option<StudioColumns> = studios::table
                .find(id)
                .select((studios::id, studios::name, studios::created_at))
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
            let mut query = studios::table.filter(studios::name.eq(&name)).into_boxed();
            if let Some(id) = exclude {
                query = query.filter(studios::id.ne(id));
            }
            let count: i64 = query.count().get_result(&mut conn)?;
            Ok(count > 0)
        })
        .await?
    }

    // Studios are not slug-addressed.
    async fn slug_exists(&self, _slug: &str, _exclude: Option<Uuid>) -> AppResult<bool> {
        Ok(false)
    }

    async fn create(&self, entity: &NewNamedEntity) -> AppResult<NamedEntity> {
        let db = Arc::clone(&self.db);
        let name = entity.name.clone();

        task::spawn_blocking(move || -> AppResult<NamedEntity> {
            let mut conn = db.get_connection()?;
            let row: StudioColumns = diesel::insert_into(studios::table)
                .values(studios::name.eq(&name))
                .returning((studios::id, studios::name, studios::created_at))
                .get_result(&mut conn)?;
            Ok(entity_from(row))
        })
        .await?
    }

    async fn rename<'a>(
        &self,
        id: Uuid,
        name: &'a str,
        _slug: Option<&'a str>,
    ) -> AppResult<NamedEntity> {
        let db = Arc::clone(&self.db);
        let name = name.to_string();

        task::spawn_blocking(move || -> AppResult<NamedEntity> {
            let mut conn = db.get_connection()?;
            let row: StudioColumns = diesel::update(studios::table.find(id))
                .set(studios::name.eq(&name))
                .returning((studios::id, studios::name, studios::created_at))
                .get_result(&mut conn)?;
            Ok(entity_from(row))
        })
        .await?
    }

    async fn delete_if_unused(&self, id: Uuid) -> AppResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = db.get_connection()?;
            conn.transaction::<(), AppError, _>(|conn| {
                let usage: i64 = anime::table
                    .filter(anime::studio_id.eq(id))
                    .count()
                    .get_result(conn)?;
                if usage > 0 {
                    let name: String = studios::table
                        .find(id)
                        .select(studios::name)
                        .get_result(conn)?;
                    return Err(AppError::Conflict(format!(
                        "Studio '{}' is used by {} anime",
                        name, usage
                    )));
                }

                let deleted =
                    diesel::delete(studios::table.filter(studios::id.eq(id))).execute(conn)?;
                if deleted == 0 {
                    return Err(AppError::NotFound("Studio not found".to_string()));
                }
                Ok(())
            })
        })
        .await?
    }
}

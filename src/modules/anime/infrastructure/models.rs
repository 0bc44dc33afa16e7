use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::anime::domain::entities::{Anime, EntityRef, GenreRef};
use crate::modules::anime::domain::repositories::{AnimeChanges, NewAnime};
use crate::modules::anime::domain::value_objects::AnimeStatus;
use crate::schema::{anime, anime_genres};

/// Catalog item database row.
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = anime)]
pub struct AnimeRow {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnimeRow {
    /// Assemble the domain entity from the row and its resolved relations.
    pub fn into_entity(
        self,
        genres: Vec<GenreRef>,
        studio: Option<EntityRef>,
        anime_type: Option<EntityRef>,
    ) -> Anime {
        Anime {
            id: self.id,
            title: self.title,
            slug: self.slug,
            synopsis: self.synopsis,
            status: self.status,
            rating: self.rating,
            release_year: self.release_year,
            total_episodes: self.total_episodes,
            cover_url: self.cover_url,
            genres,
            studio,
            anime_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = anime)]
pub struct NewAnimeRow<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub synopsis: Option<&'a str>,
    pub status: AnimeStatus,
    pub rating: Option<f32>,
    pub release_year: Option<i32>,
    pub total_episodes: Option<i32>,
    pub cover_url: Option<&'a str>,
    pub studio_id: Option<Uuid>,
    pub anime_type_id: Option<Uuid>,
}

impl<'a> From<&'a NewAnime> for NewAnimeRow<'a> {
    fn from(record: &'a NewAnime) -> Self {
        Self {
            title: &record.title,
            slug: &record.slug,
            synopsis: record.synopsis.as_deref(),
            status: record.status,
            rating: record.rating,
            release_year: record.release_year,
            total_episodes: record.total_episodes,
            cover_url: record.cover_url.as_deref(),
            studio_id: record.studio_id,
            anime_type_id: record.anime_type_id,
        }
    }
}

/// Partial update; `None` fields stay untouched.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = anime)]
pub struct AnimeChangesRow<'a> {
    pub title: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub synopsis: Option<&'a str>,
    pub status: Option<AnimeStatus>,
    pub rating: Option<f32>,
    pub release_year: Option<i32>,
    pub total_episodes: Option<i32>,
    pub cover_url: Option<&'a str>,
    pub studio_id: Option<Uuid>,
    pub anime_type_id: Option<Uuid>,
}

impl<'a> From<&'a AnimeChanges> for AnimeChangesRow<'a> {
    fn from(changes: &'a AnimeChanges) -> Self {
        Self {
            title: changes.title.as_deref(),
            slug: changes.slug.as_deref(),
            synopsis: changes.synopsis.as_deref(),
            status: changes.status,
            rating: changes.rating,
            release_year: changes.release_year,
            total_episodes: changes.total_episodes,
            cover_url: changes.cover_url.as_deref(),
            studio_id: changes.studio_id,
            anime_type_id: changes.anime_type_id,
        }
    }
}

impl AnimeChangesRow<'_> {
    /// Diesel rejects an UPDATE with no SET clause; callers skip the
    /// statement entirely when nothing column-level changed.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.synopsis.is_none()
            && self.status.is_none()
            && self.rating.is_none()
            && self.release_year.is_none()
            && self.total_episodes.is_none()
            && self.cover_url.is_none()
            && self.studio_id.is_none()
            && self.anime_type_id.is_none()
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = anime_genres)]
pub struct AnimeGenreRow {
    pub anime_id: Uuid,
    pub genre_id: Uuid,
}

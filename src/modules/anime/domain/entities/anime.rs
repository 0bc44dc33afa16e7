use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::anime::domain::value_objects::AnimeStatus;

/// Reference to a studio or anime type attached to a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: Uuid,
    pub name: String,
}

/// Genre attached to a catalog item. Genres are slug-addressed in public
/// routes, so the slug rides along with the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// A catalog item with its relations resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anime {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub synopsis: Option<String>,
    pub status: AnimeStatus,
    pub rating: Option<f32>,
    pub release_year: Option<i32>,
    pub total_episodes: Option<i32>,
    pub cover_url: Option<String>,
    pub genres: Vec<GenreRef>,
    pub studio: Option<EntityRef>,
    pub anime_type: Option<EntityRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Anime {
    pub fn has_genre(&self, genre_id: &Uuid) -> bool {
        self.genres.iter().any(|g| &g.id == genre_id)
    }
}

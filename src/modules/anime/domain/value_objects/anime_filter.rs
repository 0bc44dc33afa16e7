//! Filter specification for catalog listings.
//!
//! `matches` and `compare` are the semantics of record for the listing: the
//! diesel repository mirrors them in SQL, and they are what the unit tests
//! exercise. Absent optional values order the way Postgres orders NULLs
//! (last ascending, first descending), so the two paths agree.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

use crate::modules::anime::domain::entities::Anime;
use crate::modules::anime::domain::value_objects::AnimeStatus;
use crate::shared::application::SortOrder;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimeSortBy {
    #[default]
    Title,
    Rating,
    ReleaseYear,
    CreatedAt,
    TotalEpisodes,
}

impl FromStr for AnimeSortBy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(AnimeSortBy::Title),
            "rating" => Ok(AnimeSortBy::Rating),
            "release_year" | "releaseyear" => Ok(AnimeSortBy::ReleaseYear),
            "created_at" | "createdat" => Ok(AnimeSortBy::CreatedAt),
            "total_episodes" | "totalepisodes" | "episodes" => Ok(AnimeSortBy::TotalEpisodes),
            _ => Err(()),
        }
    }
}

impl AnimeSortBy {
    /// Lenient parse. Unrecognized values fall back to the natural key.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimeFilter {
    pub search: Option<String>,
    pub status: Option<AnimeStatus>,
    pub genre_ids: Vec<Uuid>,
    pub anime_type_id: Option<Uuid>,
    pub release_year: Option<i32>,
    /// Inclusive minimum: an item rated exactly this value passes.
    pub min_rating: Option<f32>,
    pub sort_by: AnimeSortBy,
    pub order: SortOrder,
}

impl AnimeFilter {
    /// All set predicates must hold simultaneously.
    pub fn matches(&self, anime: &Anime) -> bool {
        if let Some(query) = self.search.as_deref() {
            let query = query.trim();
            if !query.is_empty()
                && !anime.title.to_lowercase().contains(&query.to_lowercase())
            {
                return false;
            }
        }
        if let Some(status) = self.status {
            if anime.status != status {
                return false;
            }
        }
        if !self.genre_ids.is_empty() && !self.genre_ids.iter().any(|id| anime.has_genre(id)) {
            return false;
        }
        if let Some(type_id) = self.anime_type_id {
            if anime.anime_type.as_ref().map(|t| t.id) != Some(type_id) {
                return false;
            }
        }
        if let Some(year) = self.release_year {
            if anime.release_year != Some(year) {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            match anime.rating {
                Some(rating) if rating >= min => {}
                _ => return false,
            }
        }
        true
    }

    /// Total order over catalog items for this filter's sort key, with the
    /// title as a deterministic tiebreaker.
    pub fn compare(&self, a: &Anime, b: &Anime) -> Ordering {
        let keyed = match self.sort_by {
            AnimeSortBy::Title => a.title.cmp(&b.title),
            AnimeSortBy::Rating => cmp_nullable(a.rating, b.rating, f32::total_cmp),
            AnimeSortBy::ReleaseYear => cmp_nullable(a.release_year, b.release_year, i32::cmp),
            AnimeSortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            AnimeSortBy::TotalEpisodes => {
                cmp_nullable(a.total_episodes, b.total_episodes, i32::cmp)
            }
        };
        self.order.apply(keyed).then_with(|| a.title.cmp(&b.title))
    }
}

/// `None` compares greater than any value, matching Postgres NULL ordering.
fn cmp_nullable<T: Copy>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

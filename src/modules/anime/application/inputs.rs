//! Request payloads for the catalog service. List parameters arrive
//! untrusted and are coerced here; mutation payloads validate into
//! field-keyed errors before anything touches persistence.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::anime::domain::value_objects::{
    AnimeFilter, AnimeSortBy, AnimeStatus, SortOrder,
};
use crate::shared::application::PageRequest;
use crate::shared::errors::{AppError, AppResult, FieldErrors};
use crate::shared::utils::Validator;

/// Default page size for catalog listings.
pub const ANIME_PAGE_SIZE: u32 = 12;

/// Raw listing parameters as they arrive from the route layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeListRequest {
    pub search: Option<String>,
    pub status: Option<String>,
    pub genre_ids: Vec<Uuid>,
    pub anime_type_id: Option<Uuid>,
    pub release_year: Option<i32>,
    pub min_rating: Option<f32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl AnimeListRequest {
    /// Coerce into a well-formed filter and page window. Invalid enum values
    /// fall back to defaults, the rating threshold is clamped into [0, 10],
    /// and page numbers below 1 become 1. Never fails.
    pub fn into_query(self) -> (AnimeFilter, PageRequest) {
        let filter = AnimeFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            status: self.status.as_deref().and_then(AnimeStatus::parse),
            genre_ids: self.genre_ids,
            anime_type_id: self.anime_type_id,
            release_year: self.release_year,
            min_rating: self.min_rating.map(|r| r.clamp(0.0, 10.0)),
            sort_by: self.sort_by.as_deref().map(AnimeSortBy::parse).unwrap_or_default(),
            order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
        };
        let page = PageRequest::from_raw(self.page, self.page_size, ANIME_PAGE_SIZE);
        (filter, page)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnimeInput {
    pub title: String,
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

impl CreateAnimeInput {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        Validator::note(&mut errors, "title", Validator::check_title(&self.title));
        if let Some(rating) = self.rating {
            Validator::note(&mut errors, "rating", Validator::check_rating(rating));
        }
        if let Some(year) = self.release_year {
            Validator::note(&mut errors, "release_year", Validator::check_release_year(year));
        }
        if let Some(episodes) = self.total_episodes {
            Validator::note(
                &mut errors,
                "total_episodes",
                Validator::check_total_episodes(episodes),
            );
        }
        if self.genre_ids.is_empty() {
            errors.add("genre_ids", "At least one genre is required");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAnimeInput {
    pub title: Option<String>,
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

impl UpdateAnimeInput {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        if let Some(title) = self.title.as_deref() {
            Validator::note(&mut errors, "title", Validator::check_title(title));
        }
        if let Some(rating) = self.rating {
            Validator::note(&mut errors, "rating", Validator::check_rating(rating));
        }
        if let Some(year) = self.release_year {
            Validator::note(&mut errors, "release_year", Validator::check_release_year(year));
        }
        if let Some(episodes) = self.total_episodes {
            Validator::note(
                &mut errors,
                "total_episodes",
                Validator::check_total_episodes(episodes),
            );
        }
        if let Some(genre_ids) = &self.genre_ids {
            if genre_ids.is_empty() {
                errors.add("genre_ids", "At least one genre is required");
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

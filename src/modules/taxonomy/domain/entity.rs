//! Named lookup entities referenced by catalog items: genres, studios and
//! anime types. One model covers all three; genres additionally carry a
//! slug for public routing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

use crate::shared::application::SortOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Genre,
    Studio,
    AnimeType,
}

impl EntityKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Genre => "Genre",
            EntityKind::Studio => "Studio",
            EntityKind::AnimeType => "Anime type",
        }
    }

    /// Only genres are slug-addressed in public routes.
    pub fn has_slug(&self) -> bool {
        matches!(self, EntityKind::Genre)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A named entity together with how many catalog items reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntityWithUsage {
    pub entity: NamedEntity,
    pub anime_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamedEntitySortBy {
    #[default]
    Name,
    Animes,
    CreatedAt,
}

impl NamedEntitySortBy {
    /// Lenient parse. Unrecognized values fall back to the natural key.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "name" => NamedEntitySortBy::Name,
            "animes" | "anime_count" | "usage" => NamedEntitySortBy::Animes,
            "created_at" | "createdat" => NamedEntitySortBy::CreatedAt,
            _ => NamedEntitySortBy::Name,
        }
    }

    pub fn compare(
        &self,
        order: SortOrder,
        a: &NamedEntityWithUsage,
        b: &NamedEntityWithUsage,
    ) -> Ordering {
        let keyed = match self {
            NamedEntitySortBy::Name => a.entity.name.cmp(&b.entity.name),
            NamedEntitySortBy::Animes => a.anime_count.cmp(&b.anime_count),
            NamedEntitySortBy::CreatedAt => a.entity.created_at.cmp(&b.entity.created_at),
        };
        order
            .apply(keyed)
            .then_with(|| a.entity.name.cmp(&b.entity.name))
    }
}

/// Summary panel over a (possibly searched) named-entity listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyStats {
    pub total: u64,
    pub used: u64,
    pub unused: u64,
    pub most_popular: Option<String>,
}

impl TaxonomyStats {
    /// Derive from usage-counted rows. The most-popular tie breaks
    /// first-seen-wins, so callers pass rows in a stable scan order.
    pub fn from_usage(rows: &[NamedEntityWithUsage]) -> Self {
        let total = rows.len() as u64;
        let used = rows.iter().filter(|r| r.anime_count > 0).count() as u64;
        let most_popular = rows
            .iter()
            .filter(|r| r.anime_count > 0)
            .fold(None::<&NamedEntityWithUsage>, |best, row| match best {
                Some(current) if current.anime_count >= row.anime_count => best,
                _ => Some(row),
            })
            .map(|row| row.entity.name.clone());

        Self {
            total,
            used,
            unused: total - used,
            most_popular,
        }
    }
}

#[cfg(test)]
pub(crate) fn usage_fixture(name: &str, count: u64, day: u32) -> NamedEntityWithUsage {
    use chrono::TimeZone;
    NamedEntityWithUsage {
        entity: NamedEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: Some(crate::shared::utils::slugify(name)),
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        },
        anime_count: count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_split_used_and_unused() {
        let rows = vec![
            usage_fixture("Action", 3, 1),
            usage_fixture("Romance", 0, 2),
            usage_fixture("Drama", 1, 3),
        ];
        let stats = TaxonomyStats::from_usage(&rows);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.used, 2);
        assert_eq!(stats.unused, 1);
        assert_eq!(stats.most_popular.as_deref(), Some("Action"));
    }

    #[test]
    fn most_popular_tie_goes_to_first_seen() {
        let rows = vec![
            usage_fixture("Drama", 2, 1),
            usage_fixture("Action", 2, 2),
        ];
        let stats = TaxonomyStats::from_usage(&rows);
        assert_eq!(stats.most_popular.as_deref(), Some("Drama"));
    }

    #[test]
    fn all_unused_has_no_most_popular() {
        let rows = vec![usage_fixture("Action", 0, 1)];
        let stats = TaxonomyStats::from_usage(&rows);
        assert_eq!(stats.most_popular, None);
    }

    #[test]
    fn sort_by_usage_descending_with_name_tiebreak() {
        let mut rows = vec![
            usage_fixture("Romance", 1, 1),
            usage_fixture("Drama", 5, 2),
            usage_fixture("Action", 5, 3),
        ];
        rows.sort_by(|a, b| NamedEntitySortBy::Animes.compare(SortOrder::Desc, a, b));
        let names: Vec<&str> = rows.iter().map(|r| r.entity.name.as_str()).collect();
        assert_eq!(names, vec!["Action", "Drama", "Romance"]);
    }

    #[test]
    fn unknown_sort_key_falls_back_to_name() {
        assert_eq!(NamedEntitySortBy::parse("banana"), NamedEntitySortBy::Name);
        assert_eq!(NamedEntitySortBy::parse("animes"), NamedEntitySortBy::Animes);
    }
}

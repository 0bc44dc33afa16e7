use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal projection of one filtered catalog item, loaded oldest-first so
/// the popular-genre tie-break below is deterministic.
#[derive(Debug, Clone)]
pub struct CatalogStatsSource {
    pub title: String,
    pub total_episodes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub genres: Vec<String>,
}

/// Summary aggregates over the filtered set of a catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_animes: u64,
    pub total_episodes: u64,
    pub most_popular_genre: Option<String>,
    pub latest_anime: Option<String>,
}

impl CatalogStats {
    /// Derive the summary from the filtered set. Genre ties break
    /// first-seen-wins in scan order; the latest-anime tie keeps the first
    /// row seen with the maximum timestamp.
    pub fn from_filtered(rows: &[CatalogStatsSource]) -> Self {
        let total_animes = rows.len() as u64;
        let total_episodes = rows
            .iter()
            .filter_map(|r| r.total_episodes)
            .map(|e| e.max(0) as u64)
            .sum();

        // First-seen order preserved; counts bump in place.
        let mut genre_counts: Vec<(&str, u64)> = Vec::new();
        for row in rows {
            for genre in &row.genres {
                match genre_counts.iter_mut().find(|(name, _)| name == genre) {
                    Some((_, count)) => *count += 1,
                    None => genre_counts.push((genre, 1)),
                }
            }
        }
        let most_popular_genre = genre_counts
            .iter()
            .fold(None::<(&str, u64)>, |best, &(name, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((name, count)),
            })
            .map(|(name, _)| name.to_string());

        let latest_anime = rows
            .iter()
            .fold(None::<&CatalogStatsSource>, |best, row| match best {
                Some(current) if current.created_at >= row.created_at => best,
                _ => Some(row),
            })
            .map(|row| row.title.clone());

        Self {
            total_animes,
            total_episodes,
            most_popular_genre,
            latest_anime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(title: &str, episodes: Option<i32>, day: u32, genres: &[&str]) -> CatalogStatsSource {
        CatalogStatsSource {
            title: title.to_string(),
            total_episodes: episodes,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn empty_set_yields_empty_stats() {
        let stats = CatalogStats::from_filtered(&[]);
        assert_eq!(stats, CatalogStats::default());
    }

    #[test]
    fn totals_and_latest() {
        let rows = vec![
            row("Old", Some(24), 1, &["Action"]),
            row("New", Some(12), 5, &["Romance"]),
            row("Unaired", None, 3, &["Action"]),
        ];
        let stats = CatalogStats::from_filtered(&rows);
        assert_eq!(stats.total_animes, 3);
        assert_eq!(stats.total_episodes, 36);
        assert_eq!(stats.latest_anime.as_deref(), Some("New"));
        assert_eq!(stats.most_popular_genre.as_deref(), Some("Action"));
    }

    #[test]
    fn popular_genre_tie_goes_to_first_seen() {
        let rows = vec![
            row("A", None, 1, &["Drama", "Comedy"]),
            row("B", None, 2, &["Comedy", "Drama"]),
        ];
        let stats = CatalogStats::from_filtered(&rows);
        assert_eq!(stats.most_popular_genre.as_deref(), Some("Drama"));
    }
}

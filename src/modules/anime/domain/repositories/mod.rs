pub mod anime_repository;

pub use anime_repository::{AnimeChanges, AnimeRepository, NewAnime};

#[cfg(test)]
pub use anime_repository::MockAnimeRepository;

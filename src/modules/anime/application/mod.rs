pub mod inputs;
pub mod service;

pub use inputs::{AnimeListRequest, CreateAnimeInput, UpdateAnimeInput, ANIME_PAGE_SIZE};
pub use service::{AnimePage, AnimeService};

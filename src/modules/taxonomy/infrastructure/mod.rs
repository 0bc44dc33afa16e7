pub mod persistence;

pub use persistence::{AnimeTypeRepositoryImpl, GenreRepositoryImpl, StudioRepositoryImpl};

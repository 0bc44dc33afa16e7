pub mod anime_type_repository_impl;
pub mod genre_repository_impl;
pub mod studio_repository_impl;

pub use anime_type_repository_impl::AnimeTypeRepositoryImpl;
pub use genre_repository_impl::GenreRepositoryImpl;
pub use studio_repository_impl::StudioRepositoryImpl;

//! Anime catalog backend: slug-addressed anime records plus the genre,
//! studio and anime-type lookup tables they reference. Listing, filtering
//! and admin-gated CRUD are exposed as application services returning a
//! uniform tagged result; persistence runs on Diesel against Postgres.

pub mod modules;
mod schema;
pub mod shared;

use std::sync::Arc;

use modules::anime::{
    application::AnimeService, domain::repositories::AnimeRepository,
    infrastructure::AnimeRepositoryImpl,
};
use modules::taxonomy::{
    application::NamedEntityService, domain::NamedEntityRepository, AnimeTypeRepositoryImpl,
    GenreRepositoryImpl, StudioRepositoryImpl,
};
use shared::errors::AppResult;
use shared::utils::logger::init_logger;
use shared::Database;

/// Fully wired service graph. Embedders build one at startup and hand the
/// services to whatever surface (HTTP, IPC) fronts them.
pub struct AppContext {
    pub database: Arc<Database>,
    pub anime: Arc<AnimeService>,
    pub genres: Arc<NamedEntityService>,
    pub studios: Arc<NamedEntityService>,
    pub anime_types: Arc<NamedEntityService>,
}

impl AppContext {
    /// Read configuration, connect, run pending migrations and wire services.
    pub fn initialize() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        init_logger();

        let database = Arc::new(Database::new()?);
        database.run_migrations()?;

        Ok(Self::from_database(database))
    }

    /// Wire services onto an existing pool. Migrations are the caller's
    /// responsibility here; test harnesses use this with a prepared schema.
    pub fn from_database(database: Arc<Database>) -> Self {
        let anime_repo: Arc<dyn AnimeRepository> =
            Arc::new(AnimeRepositoryImpl::new(Arc::clone(&database)));
        let genre_repo: Arc<dyn NamedEntityRepository> =
            Arc::new(GenreRepositoryImpl::new(Arc::clone(&database)));
        let studio_repo: Arc<dyn NamedEntityRepository> =
            Arc::new(StudioRepositoryImpl::new(Arc::clone(&database)));
        let anime_type_repo: Arc<dyn NamedEntityRepository> =
            Arc::new(AnimeTypeRepositoryImpl::new(Arc::clone(&database)));

        Self {
            database,
            anime: Arc::new(AnimeService::new(anime_repo)),
            genres: Arc::new(NamedEntityService::new(genre_repo)),
            studios: Arc::new(NamedEntityService::new(studio_repo)),
            anime_types: Arc::new(NamedEntityService::new(anime_type_repo)),
        }
    }
}

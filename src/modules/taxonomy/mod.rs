pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{NamedEntityListRequest, NamedEntityPage, NamedEntityService};
pub use domain::{EntityKind, NamedEntity, NamedEntityRepository, NamedEntityWithUsage};
pub use infrastructure::{AnimeTypeRepositoryImpl, GenreRepositoryImpl, StudioRepositoryImpl};

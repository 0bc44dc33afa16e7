pub mod entity;
pub mod repository;

pub use entity::{
    EntityKind, NamedEntity, NamedEntitySortBy, NamedEntityWithUsage, TaxonomyStats,
};
pub use repository::{NamedEntityRepository, NewNamedEntity};

#[cfg(test)]
pub use repository::MockNamedEntityRepository;

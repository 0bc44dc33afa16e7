use async_trait::async_trait;
use uuid::Uuid;

use super::entity::{EntityKind, NamedEntity, NamedEntityWithUsage};
use crate::shared::errors::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNamedEntity {
    pub name: String,
    pub slug: Option<String>,
}

/// Persistence port shared by genres, studios and anime types. One trait
/// keeps the application layer identical across the three lookup tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NamedEntityRepository: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// All entities with their usage counts, in created_at ascending order.
    /// `search` is a case-insensitive name substring filter.
    async fn list_with_usage(&self, search: Option<String>)
        -> AppResult<Vec<NamedEntityWithUsage>>;

    /// Plain listing, name ascending, for form dropdowns.
    async fn get_all(&self) -> AppResult<Vec<NamedEntity>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<NamedEntity>>;

    async fn name_exists(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool>;

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool>;

    async fn create(&self, entity: &NewNamedEntity) -> AppResult<NamedEntity>;

    async fn rename<'a>(&self, id: Uuid, name: &'a str, slug: Option<&'a str>)
        -> AppResult<NamedEntity>;

    /// Delete the entity only when no catalog item references it. The usage
    /// check and the delete run in one transaction; a nonzero count comes
    /// back as `Conflict` naming the entity and its usage count.
    async fn delete_if_unused(&self, id: Uuid) -> AppResult<()>;
}

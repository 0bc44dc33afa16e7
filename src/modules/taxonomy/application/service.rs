use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::log_debug;
use crate::modules::taxonomy::domain::{
    NamedEntity, NamedEntityRepository, NamedEntityWithUsage, NewNamedEntity, TaxonomyStats,
};
use crate::shared::application::{compose_page, ApiResponse, PageInfo};
use crate::shared::auth::{require_admin, Session};
use crate::shared::errors::{AppError, AppResult, FieldErrors};
use crate::shared::utils::{
    resolve_slug, CollisionPolicy, SlugLookup, Validator, SLUG_INSERT_ATTEMPTS,
};

use super::inputs::NamedEntityListRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntityPage {
    pub items: Vec<NamedEntityWithUsage>,
    pub pagination: PageInfo,
    pub stats: TaxonomyStats,
}

/// Application service over one lookup table. The same service runs genres,
/// studios and anime types; behavior differences hang off `repo.kind()`.
pub struct NamedEntityService {
    repo: Arc<dyn NamedEntityRepository>,
}

struct EntitySlugs<'a>(&'a dyn NamedEntityRepository);

#[async_trait]
impl SlugLookup for EntitySlugs<'_> {
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        self.0.slug_exists(slug, exclude).await
    }
}

impl NamedEntityService {
    pub fn new(repo: Arc<dyn NamedEntityRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, request: NamedEntityListRequest) -> ApiResponse<NamedEntityPage> {
        let kind = self.repo.kind();
        ApiResponse::from_result(
            self.try_list(request).await,
            &format!("{} list loaded", kind.display_name()),
        )
    }

    pub async fn get_all(&self) -> ApiResponse<Vec<NamedEntity>> {
        let kind = self.repo.kind();
        ApiResponse::from_result(
            self.repo.get_all().await,
            &format!("{} options loaded", kind.display_name()),
        )
    }

    pub async fn create(
        &self,
        session: Option<&Session>,
        name: &str,
        policy: CollisionPolicy,
    ) -> ApiResponse<NamedEntity> {
        let kind = self.repo.kind();
        ApiResponse::from_result(
            self.try_create(session, name, policy).await,
            &format!("{} created successfully", kind.display_name()),
        )
    }

    pub async fn rename(
        &self,
        session: Option<&Session>,
        id: Uuid,
        name: &str,
    ) -> ApiResponse<NamedEntity> {
        let kind = self.repo.kind();
        ApiResponse::from_result(
            self.try_rename(session, id, name).await,
            &format!("{} updated successfully", kind.display_name()),
        )
    }

    pub async fn delete(&self, session: Option<&Session>, id: Uuid) -> ApiResponse<()> {
        let kind = self.repo.kind();
        ApiResponse::from_result(
            self.try_delete(session, id).await,
            &format!("{} deleted successfully", kind.display_name()),
        )
    }

    async fn try_list(&self, request: NamedEntityListRequest) -> AppResult<NamedEntityPage> {
        let (search, sort_by, order, page_request) = request.into_query();
        let mut rows = self.repo.list_with_usage(search).await?;

        // Stats read the repository's created_at-ascending order so that
        // popularity ties resolve to the oldest entity.
        let stats = TaxonomyStats::from_usage(&rows);

        rows.sort_by(|a, b| sort_by.compare(order, a, b));
        let page = compose_page(rows, &page_request);

        Ok(NamedEntityPage {
            items: page.items,
            pagination: page.pagination,
            stats,
        })
    }

    async fn try_create(
        &self,
        session: Option<&Session>,
        name: &str,
        policy: CollisionPolicy,
    ) -> AppResult<NamedEntity> {
        let user = require_admin(session)?;
        let kind = self.repo.kind();
        let name = name.trim();

        if let Some(message) = Validator::check_entity_name(name) {
            return Err(AppError::Validation(FieldErrors::single("name", message)));
        }
        if self.repo.name_exists(name, None).await? {
            return Err(AppError::Conflict(format!(
                "{} '{}' already exists",
                kind.display_name(),
                name
            )));
        }

        log_debug!(
            "user {} creating {} '{}'",
            user.username,
            kind.display_name(),
            name
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            let slug = if kind.has_slug() {
                Some(resolve_slug(&EntitySlugs(self.repo.as_ref()), name, None, policy).await?)
            } else {
                None
            };
            let entity = NewNamedEntity {
                name: name.to_string(),
                slug,
            };
            match self.repo.create(&entity).await {
                Err(err)
                    if err.is_conflict()
                        && kind.has_slug()
                        && policy == CollisionPolicy::Suffix
                        && attempt < SLUG_INSERT_ATTEMPTS =>
                {
                    continue
                }
                other => return other,
            }
        }
    }

    async fn try_rename(
        &self,
        session: Option<&Session>,
        id: Uuid,
        name: &str,
    ) -> AppResult<NamedEntity> {
        require_admin(session)?;
        let kind = self.repo.kind();
        let name = name.trim();

        if let Some(message) = Validator::check_entity_name(name) {
            return Err(AppError::Validation(FieldErrors::single("name", message)));
        }
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found", kind.display_name())))?;
        if self.repo.name_exists(name, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "{} '{}' already exists",
                kind.display_name(),
                name
            )));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let slug = if kind.has_slug() && current.name != name {
                Some(
                    resolve_slug(
                        &EntitySlugs(self.repo.as_ref()),
                        name,
                        Some(id),
                        CollisionPolicy::Suffix,
                    )
                    .await?,
                )
            } else {
                current.slug.clone()
            };
            match self.repo.rename(id, name, slug.as_deref()).await {
                Err(err)
                    if err.is_conflict()
                        && kind.has_slug()
                        && current.name != name
                        && attempt < SLUG_INSERT_ATTEMPTS =>
                {
                    continue
                }
                other => return other,
            }
        }
    }

    async fn try_delete(&self, session: Option<&Session>, id: Uuid) -> AppResult<()> {
        require_admin(session)?;
        self.repo.delete_if_unused(id).await
    }
}

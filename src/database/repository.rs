use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    ContactRequest, NewContactRequest, NewProject, NewReview, NewUser, Project, ProjectChanges,
    Review, Section, SectionChanges, SectionKind, User, UserChanges,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }
}

/// Every read and write the API performs against persistent storage.
///
/// Single-row operations are atomic on their own. `upsert_section` is the one
/// composite call: it provisions the owning user when absent and then inserts
/// or updates the section, as a unit.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    // Users
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError>;

    // Projects
    async fn list_projects(&self, owner: Option<Uuid>) -> Result<Vec<Project>, StoreError>;
    async fn project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;
    async fn create_project(&self, owner: Uuid, project: NewProject) -> Result<Project, StoreError>;
    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> Result<Project, StoreError>;
    async fn delete_project(&self, id: Uuid) -> Result<Project, StoreError>;

    // Reviews
    async fn list_reviews(&self, owner: Option<Uuid>) -> Result<Vec<Review>, StoreError>;
    async fn review(&self, id: Uuid) -> Result<Option<Review>, StoreError>;
    async fn create_review(&self, owner: Uuid, review: NewReview) -> Result<Review, StoreError>;
    async fn delete_review(&self, id: Uuid) -> Result<Review, StoreError>;

    // Contact requests
    async fn list_contacts(&self, owner: Uuid) -> Result<Vec<ContactRequest>, StoreError>;
    async fn contact(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError>;
    async fn create_contact(&self, owner: Uuid, contact: NewContactRequest) -> Result<ContactRequest, StoreError>;
    async fn update_contact_status(&self, id: Uuid, status: &str) -> Result<ContactRequest, StoreError>;
    async fn delete_contact(&self, id: Uuid) -> Result<ContactRequest, StoreError>;

    // Hero / About sections
    async fn section(&self, kind: SectionKind, username: &str) -> Result<Option<Section>, StoreError>;
    async fn upsert_section(
        &self,
        kind: SectionKind,
        username: &str,
        changes: SectionChanges,
        provision: NewUser,
    ) -> Result<Section, StoreError>;
}

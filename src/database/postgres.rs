use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    ContactRequest, NewContactRequest, NewProject, NewReview, NewUser, Project, ProjectChanges,
    Review, Section, SectionChanges, SectionKind, User, UserChanges, DEFAULT_CONTACT_STATUS,
};
use crate::database::repository::{Store, StoreError};

const USER_COLUMNS: &str = "id, email, name, username, password_hash, created_at, updated_at";
const PROJECT_COLUMNS: &str = "id, title, description, image_url, user_id, created_at, updated_at";
const REVIEW_COLUMNS: &str = "id, name, rating, comment, avatar_url, user_id, created_at";
const CONTACT_COLUMNS: &str = "id, name, email, message, status, user_id, created_at";
const SECTION_COLUMNS: &str = "id, title, description, image_url, user_id, updated_at";

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-constraint violation onto `StoreError::Conflict`
fn map_unique(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(format!("{} already exists", what));
        }
    }
    StoreError::Sqlx(err)
}

fn found<T>(row: Option<T>, what: &str) -> Result<T, StoreError> {
    row.ok_or_else(|| StoreError::not_found(format!("{} not found", what)))
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, email, name, username, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.username)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, "Username"))
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                name = COALESCE($3, name),
                username = COALESCE($4, username),
                password_hash = COALESCE($5, password_hash),
                updated_at = now()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.name)
            .bind(changes.username)
            .bind(changes.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique(e, "Username"))?;
        found(row, "User")
    }

    async fn list_projects(&self, owner: Option<Uuid>) -> Result<Vec<Project>, StoreError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC",
            PROJECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, Project>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_project(&self, owner: Uuid, project: NewProject) -> Result<Project, StoreError> {
        let sql = format!(
            "INSERT INTO projects (id, title, description, image_url, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(Uuid::new_v4())
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.image_url)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> Result<Project, StoreError> {
        let sql = format!(
            "UPDATE projects SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                updated_at = now()
             WHERE id = $1
             RETURNING {}",
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.image_url)
            .fetch_optional(&self.pool)
            .await?;
        found(row, "Project")
    }

    async fn delete_project(&self, id: Uuid) -> Result<Project, StoreError> {
        let sql = format!("DELETE FROM projects WHERE id = $1 RETURNING {}", PROJECT_COLUMNS);
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        found(row, "Project")
    }

    async fn list_reviews(&self, owner: Option<Uuid>) -> Result<Vec<Review>, StoreError> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC",
            REVIEW_COLUMNS
        );
        let rows = sqlx::query_as::<_, Review>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn review(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        let sql = format!("SELECT {} FROM reviews WHERE id = $1", REVIEW_COLUMNS);
        let row = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_review(&self, owner: Uuid, review: NewReview) -> Result<Review, StoreError> {
        let sql = format!(
            "INSERT INTO reviews (id, name, rating, comment, avatar_url, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            REVIEW_COLUMNS
        );
        let row = sqlx::query_as::<_, Review>(&sql)
            .bind(Uuid::new_v4())
            .bind(&review.name)
            .bind(review.rating)
            .bind(&review.comment)
            .bind(&review.avatar_url)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_review(&self, id: Uuid) -> Result<Review, StoreError> {
        let sql = format!("DELETE FROM reviews WHERE id = $1 RETURNING {}", REVIEW_COLUMNS);
        let row = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        found(row, "Review")
    }

    async fn list_contacts(&self, owner: Uuid) -> Result<Vec<ContactRequest>, StoreError> {
        let sql = format!(
            "SELECT {} FROM contact_requests WHERE user_id = $1 ORDER BY created_at DESC",
            CONTACT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ContactRequest>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn contact(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError> {
        let sql = format!("SELECT {} FROM contact_requests WHERE id = $1", CONTACT_COLUMNS);
        let row = sqlx::query_as::<_, ContactRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_contact(&self, owner: Uuid, contact: NewContactRequest) -> Result<ContactRequest, StoreError> {
        let sql = format!(
            "INSERT INTO contact_requests (id, name, email, message, status, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            CONTACT_COLUMNS
        );
        let row = sqlx::query_as::<_, ContactRequest>(&sql)
            .bind(Uuid::new_v4())
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.message)
            .bind(DEFAULT_CONTACT_STATUS)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_contact_status(&self, id: Uuid, status: &str) -> Result<ContactRequest, StoreError> {
        let sql = format!(
            "UPDATE contact_requests SET status = $2 WHERE id = $1 RETURNING {}",
            CONTACT_COLUMNS
        );
        let row = sqlx::query_as::<_, ContactRequest>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        found(row, "Contact request")
    }

    async fn delete_contact(&self, id: Uuid) -> Result<ContactRequest, StoreError> {
        let sql = format!("DELETE FROM contact_requests WHERE id = $1 RETURNING {}", CONTACT_COLUMNS);
        let row = sqlx::query_as::<_, ContactRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        found(row, "Contact request")
    }

    async fn section(&self, kind: SectionKind, username: &str) -> Result<Option<Section>, StoreError> {
        let sql = format!(
            "SELECT s.id, s.title, s.description, s.image_url, s.user_id, s.updated_at
             FROM {} s JOIN users u ON u.id = s.user_id
             WHERE u.username = $1",
            kind.table()
        );
        let row = sqlx::query_as::<_, Section>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn upsert_section(
        &self,
        kind: SectionKind,
        username: &str,
        changes: SectionChanges,
        provision: NewUser,
    ) -> Result<Section, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, email, name, username, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&provision.email)
        .bind(&provision.name)
        .bind(username)
        .bind(&provision.password_hash)
        .execute(&mut *tx)
        .await?;

        let user_id: Uuid = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&mut *tx)
            .await?;

        // kind.table() is a fixed identifier, never user input
        let sql = format!(
            "INSERT INTO {table} (id, title, description, image_url, user_id)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, ''), $5)
             ON CONFLICT (user_id) DO UPDATE SET
                title = COALESCE($2, {table}.title),
                description = COALESCE($3, {table}.description),
                image_url = COALESCE($4, {table}.image_url),
                updated_at = now()
             RETURNING {columns}",
            table = kind.table(),
            columns = SECTION_COLUMNS
        );
        let section = sqlx::query_as::<_, Section>(&sql)
            .bind(Uuid::new_v4())
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.image_url)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(section)
    }
}

//! In-process test harness: an in-memory `Store` and a router driver.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

use crate::app::{app, AppState};
use crate::auth::UNUSABLE_PASSWORD;
use crate::config::AppConfig;
use crate::database::models::{
    ContactRequest, NewContactRequest, NewProject, NewReview, NewUser, Project, ProjectChanges,
    Review, Section, SectionChanges, SectionKind, User, UserChanges, DEFAULT_CONTACT_STATUS,
};
use crate::database::{Store, StoreError};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    reviews: Vec<Review>,
    contacts: Vec<ContactRequest>,
    heroes: Vec<Section>,
    abouts: Vec<Section>,
}

impl Tables {
    fn sections(&mut self, kind: SectionKind) -> &mut Vec<Section> {
        match kind {
            SectionKind::Hero => &mut self.heroes,
            SectionKind::About => &mut self.abouts,
        }
    }

    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

/// Mirrors `PgStore` semantics closely enough for handler tests
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    lookups_down: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make user lookups fail as if the pool were exhausted
    pub fn fail_user_lookups(&self) {
        self.lookups_down.store(true, Ordering::SeqCst);
    }

    fn check_lookups(&self) -> Result<(), StoreError> {
        if self.lookups_down.load(Ordering::SeqCst) {
            return Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn section_count(&self) -> usize {
        let t = self.tables.read().await;
        t.heroes.len() + t.abouts.len()
    }
}

fn take<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool, what: &str) -> Result<T, StoreError> {
    match rows.iter().position(matches) {
        Some(i) => Ok(rows.remove(i)),
        None => Err(StoreError::not_found(format!("{} not found", what))),
    }
}

fn newest_first<T: Clone>(rows: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = rows.collect();
    out.reverse();
    out
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.check_lookups()?;
        Ok(self.tables.read().await.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check_lookups()?;
        Ok(self
            .tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        if t.username_taken(&user.username, None) {
            return Err(StoreError::Conflict("Username already exists".into()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            username: user.username,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        if let Some(username) = &changes.username {
            if t.username_taken(username, Some(id)) {
                return Err(StoreError::Conflict("Username already exists".into()));
            }
        }
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::not_found("User not found"))?;
        if let Some(v) = changes.email {
            user.email = v;
        }
        if let Some(v) = changes.name {
            user.name = v;
        }
        if let Some(v) = changes.username {
            user.username = v;
        }
        if let Some(v) = changes.password_hash {
            user.password_hash = v;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list_projects(&self, owner: Option<Uuid>) -> Result<Vec<Project>, StoreError> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.projects
                .iter()
                .filter(|p| owner.map_or(true, |o| p.user_id == o))
                .cloned(),
        ))
    }

    async fn project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.tables.read().await.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn create_project(&self, owner: Uuid, project: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            title: project.title,
            description: project.description,
            image_url: project.image_url,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: Uuid, changes: ProjectChanges) -> Result<Project, StoreError> {
        let mut t = self.tables.write().await;
        let project = t
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Project not found"))?;
        if let Some(v) = changes.title {
            project.title = v;
        }
        if let Some(v) = changes.description {
            project.description = v;
        }
        if let Some(v) = changes.image_url {
            project.image_url = v;
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: Uuid) -> Result<Project, StoreError> {
        take(&mut self.tables.write().await.projects, |p| p.id == id, "Project")
    }

    async fn list_reviews(&self, owner: Option<Uuid>) -> Result<Vec<Review>, StoreError> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.reviews
                .iter()
                .filter(|r| owner.map_or(true, |o| r.user_id == o))
                .cloned(),
        ))
    }

    async fn review(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        Ok(self.tables.read().await.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn create_review(&self, owner: Uuid, review: NewReview) -> Result<Review, StoreError> {
        let review = Review {
            id: Uuid::new_v4(),
            name: review.name,
            rating: review.rating,
            comment: review.comment,
            avatar_url: review.avatar_url,
            user_id: owner,
            created_at: Utc::now(),
        };
        self.tables.write().await.reviews.push(review.clone());
        Ok(review)
    }

    async fn delete_review(&self, id: Uuid) -> Result<Review, StoreError> {
        take(&mut self.tables.write().await.reviews, |r| r.id == id, "Review")
    }

    async fn list_contacts(&self, owner: Uuid) -> Result<Vec<ContactRequest>, StoreError> {
        let t = self.tables.read().await;
        Ok(newest_first(t.contacts.iter().filter(|c| c.user_id == owner).cloned()))
    }

    async fn contact(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError> {
        Ok(self.tables.read().await.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn create_contact(&self, owner: Uuid, contact: NewContactRequest) -> Result<ContactRequest, StoreError> {
        let contact = ContactRequest {
            id: Uuid::new_v4(),
            name: contact.name,
            email: contact.email,
            message: contact.message,
            status: DEFAULT_CONTACT_STATUS.to_string(),
            user_id: owner,
            created_at: Utc::now(),
        };
        self.tables.write().await.contacts.push(contact.clone());
        Ok(contact)
    }

    async fn update_contact_status(&self, id: Uuid, status: &str) -> Result<ContactRequest, StoreError> {
        let mut t = self.tables.write().await;
        let contact = t
            .contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::not_found("Contact request not found"))?;
        contact.status = status.to_string();
        Ok(contact.clone())
    }

    async fn delete_contact(&self, id: Uuid) -> Result<ContactRequest, StoreError> {
        take(&mut self.tables.write().await.contacts, |c| c.id == id, "Contact request")
    }

    async fn section(&self, kind: SectionKind, username: &str) -> Result<Option<Section>, StoreError> {
        let mut t = self.tables.write().await;
        let Some(user_id) = t.users.iter().find(|u| u.username == username).map(|u| u.id) else {
            return Ok(None);
        };
        Ok(t.sections(kind).iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn upsert_section(
        &self,
        kind: SectionKind,
        username: &str,
        changes: SectionChanges,
        provision: NewUser,
    ) -> Result<Section, StoreError> {
        let mut t = self.tables.write().await;
        let now = Utc::now();

        let user_id = match t.users.iter().find(|u| u.username == username) {
            Some(u) => u.id,
            None => {
                let user = User {
                    id: Uuid::new_v4(),
                    email: provision.email,
                    name: provision.name,
                    username: username.to_string(),
                    password_hash: provision.password_hash,
                    created_at: now,
                    updated_at: now,
                };
                let id = user.id;
                t.users.push(user);
                id
            }
        };

        let sections = t.sections(kind);
        if let Some(section) = sections.iter_mut().find(|s| s.user_id == user_id) {
            if let Some(v) = changes.title {
                section.title = v;
            }
            if let Some(v) = changes.description {
                section.description = v;
            }
            if let Some(v) = changes.image_url {
                section.image_url = v;
            }
            section.updated_at = now;
            return Ok(section.clone());
        }

        let section = Section {
            id: Uuid::new_v4(),
            title: changes.title.unwrap_or_default(),
            description: changes.description.unwrap_or_default(),
            image_url: changes.image_url.unwrap_or_default(),
            user_id,
            updated_at: now,
        };
        sections.push(section.clone());
        Ok(section)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_vars(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/portfolio_test".to_string()),
        "JWT_SECRET" => Some("test-secret".to_string()),
        _ => None,
    })
    .expect("test config")
}

/// Router over a fresh `MemoryStore`, driven with `oneshot`
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), test_config());
        let router = app(state.clone());
        Self { store, state, router }
    }

    /// A user that cannot log in; enough for identity-header tests
    pub async fn seed_user(&self, username: &str) -> User {
        self.store
            .create_user(NewUser {
                email: format!("{}@example.com", username),
                name: username.to_string(),
                username: username.to_string(),
                password_hash: UNUSABLE_PASSWORD.to_string(),
            })
            .await
            .expect("seed user")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn request(method: Method, uri: &str, body: Option<String>, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("request")
    }

    pub async fn get(&self, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
        self.send(Self::request(Method::GET, uri, None, headers)).await
    }

    pub async fn delete(&self, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
        self.send(Self::request(Method::DELETE, uri, None, headers)).await
    }

    pub async fn post(&self, uri: &str, body: Value, headers: &[(&str, &str)]) -> (StatusCode, Value) {
        self.send(Self::request(Method::POST, uri, Some(body.to_string()), headers)).await
    }

    pub async fn post_raw(&self, uri: &str, body: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
        self.send(Self::request(Method::POST, uri, Some(body.to_string()), headers)).await
    }

    pub async fn patch(&self, uri: &str, body: Value, headers: &[(&str, &str)]) -> (StatusCode, Value) {
        self.send(Self::request(Method::PATCH, uri, Some(body.to_string()), headers)).await
    }
}

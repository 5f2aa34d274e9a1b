// Demo content for a fresh database: one owner with hero, about and two projects.
// Running it again for the same username leaves existing rows alone.

use tracing::info;

use crate::auth::{hash_password, AuthError};
use crate::database::models::{NewProject, NewUser, SectionChanges, SectionKind, User};
use crate::database::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            username: "demo".to_string(),
            password: "demo123".to_string(),
            name: "Demo Developer".to_string(),
            email: "demo@example.com".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum SeedOutcome {
    Created(User),
    AlreadyPresent(User),
}

pub async fn seed_demo(store: &dyn Store, opts: &SeedOptions) -> Result<SeedOutcome, SeedError> {
    if let Some(existing) = store.user_by_username(&opts.username).await? {
        info!("Seed skipped, user '{}' already exists", existing.username);
        return Ok(SeedOutcome::AlreadyPresent(existing));
    }

    let user = store
        .create_user(NewUser {
            email: opts.email.clone(),
            name: opts.name.clone(),
            username: opts.username.clone(),
            password_hash: hash_password(&opts.password)?,
        })
        .await?;

    let provision = NewUser {
        email: user.email.clone(),
        name: user.name.clone(),
        username: user.username.clone(),
        password_hash: user.password_hash.clone(),
    };

    store
        .upsert_section(
            SectionKind::Hero,
            &user.username,
            SectionChanges {
                title: Some(format!("Hi, I'm {}", user.name)),
                description: Some("Welcome to my portfolio".to_string()),
                image_url: Some("/images/hero.jpg".to_string()),
            },
            provision.clone(),
        )
        .await?;

    store
        .upsert_section(
            SectionKind::About,
            &user.username,
            SectionChanges {
                title: Some("About Me".to_string()),
                description: Some("I'm a passionate developer who loves building things.".to_string()),
                image_url: Some("/images/about.jpg".to_string()),
            },
            provision,
        )
        .await?;

    for (title, description) in [
        ("Portfolio Website", "The site you are looking at right now."),
        ("Task Tracker", "A small kanban board with drag and drop."),
    ] {
        store
            .create_project(
                user.id,
                NewProject {
                    title: title.to_string(),
                    description: description.to_string(),
                    image_url: String::new(),
                },
            )
            .await?;
    }

    info!("Seeded demo content for '{}'", user.username);
    Ok(SeedOutcome::Created(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::testing::MemoryStore;

    #[tokio::test]
    async fn seeds_once_per_username() {
        let store = MemoryStore::new();
        let opts = SeedOptions::default();

        let first = seed_demo(&store, &opts).await.unwrap();
        let user = match first {
            SeedOutcome::Created(user) => user,
            other => panic!("expected a fresh seed, got {:?}", other),
        };
        assert!(verify_password(&opts.password, &user.password_hash));
        assert_eq!(store.user_count().await, 1);
        assert_eq!(store.section_count().await, 2);
        assert_eq!(store.list_projects(Some(user.id)).await.unwrap().len(), 2);

        let second = seed_demo(&store, &opts).await.unwrap();
        assert!(matches!(second, SeedOutcome::AlreadyPresent(_)));
        assert_eq!(store.list_projects(Some(user.id)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn hero_title_uses_display_name() {
        let store = MemoryStore::new();
        let opts = SeedOptions {
            username: "jane".into(),
            name: "Jane".into(),
            ..SeedOptions::default()
        };
        seed_demo(&store, &opts).await.unwrap();

        let hero = store.section(SectionKind::Hero, "jane").await.unwrap().unwrap();
        assert_eq!(hero.title, "Hi, I'm Jane");
    }
}

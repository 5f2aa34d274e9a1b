use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The two one-per-user content blocks shown on the public site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Hero,
    About,
}

impl SectionKind {
    pub fn table(self) -> &'static str {
        match self {
            SectionKind::Hero => "hero_sections",
            SectionKind::About => "about_sections",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Hero => "Hero section",
            SectionKind::About => "About section",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub user_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SectionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Accepted values for `ContactRequest::status`
pub const CONTACT_STATUSES: [&str; 3] = ["new", "read", "replied"];
pub const DEFAULT_CONTACT_STATUS: &str = "new";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub status: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

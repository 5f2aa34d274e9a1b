// Request bodies accepted by the API, with their validation rules.
// Messages for fields the public forms show (name, email, message, status,
// username, password) are in Thai; the rest stay in English.

use serde::Deserialize;
use uuid::Uuid;

use crate::api::validation::{Validate, Violation, Violations};
use crate::database::models::CONTACT_STATUSES;

pub mod messages {
    pub const NAME_REQUIRED: &str = "กรุณากรอกชื่อ";
    pub const NAME_TOO_LONG: &str = "ชื่อต้องมีความยาวไม่เกิน 100 ตัวอักษร";
    pub const EMAIL_REQUIRED: &str = "กรุณากรอกอีเมล";
    pub const EMAIL_INVALID: &str = "รูปแบบอีเมลไม่ถูกต้อง";
    pub const MESSAGE_REQUIRED: &str = "กรุณากรอกข้อความ";
    pub const MESSAGE_TOO_LONG: &str = "ข้อความต้องมีความยาวไม่เกิน 5000 ตัวอักษร";
    pub const STATUS_INVALID: &str = "สถานะต้องเป็น new, read หรือ replied";
    pub const USERNAME_REQUIRED: &str = "กรุณากรอกชื่อผู้ใช้";
    pub const USERNAME_LENGTH: &str = "ชื่อผู้ใช้ต้องมีความยาว 3-32 ตัวอักษร";
    pub const USERNAME_CHARSET: &str = "ชื่อผู้ใช้ใช้ได้เฉพาะตัวอักษรภาษาอังกฤษ ตัวเลข _ และ -";
    pub const PASSWORD_REQUIRED: &str = "กรุณากรอกรหัสผ่าน";
    pub const PASSWORD_TOO_SHORT: &str = "รหัสผ่านต้องมีอย่างน้อย 6 ตัวอักษร";
}

use messages::*;

const NAME_MAX: usize = 100;
const MESSAGE_MAX: usize = 5000;
const TITLE_MAX: usize = 200;
const PASSWORD_MIN: usize = 6;

fn check_name(v: &mut Violations, name: &str) {
    if v.not_empty("name", name, NAME_REQUIRED) {
        v.max_length("name", name, NAME_MAX, NAME_TOO_LONG);
    }
}

fn check_email(v: &mut Violations, email: &str) {
    if v.not_empty("email", email, EMAIL_REQUIRED) {
        v.email("email", email, EMAIL_INVALID);
    }
}

fn check_username(v: &mut Violations, username: &str) {
    if !v.not_empty("username", username, USERNAME_REQUIRED) {
        return;
    }
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        v.add("username", "length", USERNAME_LENGTH);
    }
    if !is_username(username) {
        v.add("username", "matches", USERNAME_CHARSET);
    }
}

fn check_password(v: &mut Violations, password: &str) {
    if v.not_empty("password", password, PASSWORD_REQUIRED) {
        v.min_length("password", password, PASSWORD_MIN, PASSWORD_TOO_SHORT);
    }
}

fn check_title(v: &mut Violations, title: &str) {
    if v.not_empty("title", title, "title should not be empty") {
        v.max_length("title", title, TITLE_MAX, "title must be shorter than or equal to 200 characters");
    }
}

fn check_recipient(v: &mut Violations, user_id: Option<Uuid>, username: Option<&str>) {
    let has_username = username.map(|u| !u.trim().is_empty()).unwrap_or(false);
    if user_id.is_none() && !has_username {
        v.add("userId", "isDefined", "userId or username must be provided");
    }
}

/// Usernames appear in URLs, so keep them to a URL-safe alphabet
pub fn is_username(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for CreateUserDto {
    fn violations(&self) -> Vec<Violation> {
        let mut v = Violations::new();
        check_email(&mut v, &self.email);
        check_name(&mut v, &self.name);
        check_username(&mut v, &self.username);
        check_password(&mut v, &self.password);
        v.into_vec()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Validate for UpdateUserDto {
    fn violations(&self) -> Vec<Violation> {
        let mut v = Violations::new();
        if let Some(email) = &self.email {
            check_email(&mut v, email);
        }
        if let Some(name) = &self.name {
            check_name(&mut v, name);
        }
        if let Some(username) = &self.username {
            check_username(&mut v, username);
        }
        if let Some(password) = &self.password {
            check_password(&mut v, password);
        }
        v.into_vec()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginDto {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginDto {
    fn violations(&self) -> Vec<Violation> {
        let mut v = Violations::new();
        v.not_empty("username", &self.username, USERNAME_REQUIRED);
        v.not_empty("password", &self.password, PASSWORD_REQUIRED);
        v.into_vec()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
}

impl Validate for CreateContactDto {
    fn violations(&self) -> Vec<Violation> {
        let mut v = Violations::new();
        check_name(&mut v, &self.name);
        check_email(&mut v, &self.email);
        if v.not_empty("message", &self.message, MESSAGE_REQUIRED) {
            v.max_length("message", &self.message, MESSAGE_MAX, MESSAGE_TOO_LONG);
        }
        check_recipient(&mut v, self.user_id, self.username.as_deref());
        v.into_vec()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateContactStatusDto {
    #[serde(default)]
    pub status: String,
}

impl Validate for UpdateContactStatusDto {
    fn violations(&self) -> Vec<Violation> {
        let mut v = Violations::new();
        v.one_of("status", &self.status, &CONTACT_STATUSES, STATUS_INVALID);
        v.into_vec()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectDto {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

impl Validate for CreateProjectDto {
    fn violations(&self) -> Vec<Violation> {
        let mut v = Violations::new();
        check_title(&mut v, &self.title);
        v.into_vec()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl Validate for UpdateProjectDto {
    fn violations(&self) -> Vec<Violation> {
        let mut v = Violations::new();
        if let Some(title) = &self.title {
            check_title(&mut v, title);
        }
        v.into_vec()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub avatar_url: String,
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
}

impl Validate for CreateReviewDto {
    fn violations(&self) -> Vec<Violation> {
        let mut v = Violations::new();
        check_name(&mut v, &self.name);
        if !(1..=5).contains(&self.rating) {
            v.add("rating", "range", "rating must be between 1 and 5");
        }
        check_recipient(&mut v, self.user_id, self.username.as_deref());
        v.into_vec()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSectionDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Used only when the owning user has to be provisioned
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Validate for UpsertSectionDto {
    fn violations(&self) -> Vec<Violation> {
        let mut v = Violations::new();
        if let Some(title) = &self.title {
            v.max_length("title", title, TITLE_MAX, "title must be shorter than or equal to 200 characters");
        }
        if let Some(name) = &self.name {
            check_name(&mut v, name);
        }
        if let Some(email) = &self.email {
            check_email(&mut v, email);
        }
        v.into_vec()
    }
}

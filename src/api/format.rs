//! Flattening of validation failures into `field -> message` maps.
//!
//! Only a fixed set of form fields is ever reported individually. Structured
//! violations map directly by property. Loose strings (typically body-parsing
//! errors) are classified by keyword: whole-word Latin matches, substring Thai
//! matches, and finally the leading identifier token of the message.

use std::collections::BTreeMap;

use crate::api::validation::Violation;

/// Fields the public forms render errors for
pub const RECOGNIZED_FIELDS: [&str; 6] = ["name", "email", "message", "status", "username", "password"];

struct FieldKeywords {
    field: &'static str,
    latin: &'static [&'static str],
    thai: &'static [&'static str],
}

// `username` precedes `name`: "ชื่อผู้ใช้" contains "ชื่อ".
const FIELD_KEYWORDS: &[FieldKeywords] = &[
    FieldKeywords {
        field: "username",
        latin: &["username", "user_name", "login"],
        thai: &["ชื่อผู้ใช้"],
    },
    FieldKeywords {
        field: "password",
        latin: &["password", "passwd"],
        thai: &["รหัสผ่าน"],
    },
    FieldKeywords {
        field: "email",
        latin: &["email", "e-mail", "mail"],
        thai: &["อีเมล", "อีเมล์"],
    },
    FieldKeywords {
        field: "message",
        latin: &["message", "msg"],
        thai: &["ข้อความ"],
    },
    FieldKeywords {
        field: "status",
        latin: &["status"],
        thai: &["สถานะ"],
    },
    FieldKeywords {
        field: "name",
        latin: &["name", "fullname"],
        thai: &["ชื่อ"],
    },
];

pub fn is_recognized(field: &str) -> bool {
    RECOGNIZED_FIELDS.contains(&field)
}

/// Build the `errors` map of a validation response. The first message seen
/// for a field wins. An empty map means nothing was recognised.
pub fn field_errors(violations: &[Violation]) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();

    for violation in violations {
        let (field, message) = match violation {
            Violation::Field { property, .. } => {
                if !is_recognized(property) {
                    continue;
                }
                match violation.first_message() {
                    Some(msg) => (property.as_str(), msg.to_string()),
                    None => continue,
                }
            }
            Violation::Message(text) => match classify_message(text) {
                Some(field) => (field, text.clone()),
                None => continue,
            },
        };
        errors.entry(field.to_string()).or_insert(message);
    }

    errors
}

/// Every message carried by the violations, in order
pub fn flatten_messages(violations: &[Violation]) -> Vec<String> {
    violations.iter().flat_map(Violation::messages).collect()
}

/// Guess which recognised field a free-form message is about
pub fn classify_message(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .filter(|w| !w.is_empty())
        .collect();

    for entry in FIELD_KEYWORDS {
        if entry.latin.iter().any(|kw| words.contains(kw)) {
            return Some(entry.field);
        }
        if entry.thai.iter().any(|kw| text.contains(kw)) {
            return Some(entry.field);
        }
    }

    let token = leading_identifier(text)?.to_lowercase();
    RECOGNIZED_FIELDS.iter().copied().find(|f| *f == token)
}

/// `^[A-Za-z_][A-Za-z0-9_]*`
fn leading_identifier(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }
    let end = chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    Some(&text[..end])
}

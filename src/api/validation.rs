use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A failed rule on one property, e.g. `("isNotEmpty", "กรุณากรอกชื่อ")`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    pub message: String,
}

/// One validation failure. Our own validators emit `Field`; body-parsing
/// failures and anything else without a known property arrive as `Message`.
///
/// Constraints keep the order the rules were checked in.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Field {
        property: String,
        constraints: Vec<Constraint>,
    },
    Message(String),
}

impl Violation {
    pub fn field(property: &str, constraint: &str, message: &str) -> Self {
        Violation::Field {
            property: property.to_string(),
            constraints: vec![Constraint {
                name: constraint.to_string(),
                message: message.to_string(),
            }],
        }
    }

    /// Human-readable messages carried by this violation
    pub fn messages(&self) -> Vec<String> {
        match self {
            Violation::Field { constraints, .. } => constraints.iter().map(|c| c.message.clone()).collect(),
            Violation::Message(msg) => vec![msg.clone()],
        }
    }

    /// Message of the first rule that failed
    pub fn first_message(&self) -> Option<&str> {
        match self {
            Violation::Field { constraints, .. } => constraints.first().map(|c| c.message.as_str()),
            Violation::Message(msg) => Some(msg),
        }
    }
}

/// Accumulates violations for one DTO, merging constraints per property
#[derive(Debug, Default)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, property: &str, constraint: &str, message: &str) {
        for existing in self.0.iter_mut() {
            if let Violation::Field { property: p, constraints } = existing {
                if p == property {
                    if !constraints.iter().any(|c| c.name == constraint) {
                        constraints.push(Constraint {
                            name: constraint.to_string(),
                            message: message.to_string(),
                        });
                    }
                    return;
                }
            }
        }
        self.0.push(Violation::field(property, constraint, message));
    }

    pub fn not_empty(&mut self, property: &str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.add(property, "isNotEmpty", message);
            return false;
        }
        true
    }

    pub fn max_length(&mut self, property: &str, value: &str, max: usize, message: &str) {
        if value.chars().count() > max {
            self.add(property, "maxLength", message);
        }
    }

    pub fn min_length(&mut self, property: &str, value: &str, min: usize, message: &str) {
        if value.chars().count() < min {
            self.add(property, "minLength", message);
        }
    }

    pub fn email(&mut self, property: &str, value: &str, message: &str) {
        if !is_email(value) {
            self.add(property, "isEmail", message);
        }
    }

    pub fn one_of(&mut self, property: &str, value: &str, allowed: &[&str], message: &str) {
        if !allowed.contains(&value) {
            self.add(property, "isIn", message);
        }
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

/// Loose structural check: one `@`, a non-empty local part, a dotted domain
pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

pub trait Validate {
    fn violations(&self) -> Vec<Violation>;

    fn validate(&self) -> Result<(), ApiError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(violations))
        }
    }
}

/// JSON body extractor that also runs `Validate`
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

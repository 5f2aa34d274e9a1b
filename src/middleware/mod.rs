pub mod identity;

pub use identity::{resolve_identity, CurrentUser, USERNAME_HEADER, USER_ID_HEADER};

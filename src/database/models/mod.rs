pub mod contact;
pub mod project;
pub mod review;
pub mod section;
pub mod user;

pub use contact::{ContactRequest, NewContactRequest, CONTACT_STATUSES, DEFAULT_CONTACT_STATUS};
pub use project::{NewProject, Project, ProjectChanges};
pub use review::{NewReview, Review};
pub use section::{Section, SectionChanges, SectionKind};
pub use user::{NewUser, User, UserChanges};

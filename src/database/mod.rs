pub mod manager;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod seed;

pub use manager::{DatabaseError, DatabaseManager};
pub use postgres::PgStore;
pub use repository::{Store, StoreError};

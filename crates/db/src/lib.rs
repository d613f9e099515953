pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod store;

pub use connection::{connect_with_settings, DbPool};
pub use fixtures::{DemoCatalog, SeedResult, VerificationResult};
pub use repositories::RepositoryError;
pub use store::{InMemoryRecommendationStore, RepositoryStore, SqlRecommendationStore};

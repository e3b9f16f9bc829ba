// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod profiles;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::{InMemoryEventStore, InMemoryProfiles};
pub use postgres::{PostgresClient, PostgresError};
pub use profiles::{ProfileClient, ProfileClientError};

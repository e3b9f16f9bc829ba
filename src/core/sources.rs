//! Collaborators the resolver reads from.
//!
//! Storage and the profile service are reached through these traits so the
//! pipeline can run against PostgreSQL and the HTTP profile client in
//! production and against in-memory fixtures in tests.

use std::future::Future;
use thiserror::Error;

use crate::models::{Event, EventPage, Location, PageRequest, UserProfile};

/// Boxed error raised by a source implementation
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by event and profile sources
///
/// Implementations convert their own errors into this type.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("event store error: {0}")]
    Store(#[source] BoxError),

    #[error("profile service error: {0}")]
    Profile(#[source] BoxError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Geospatial event storage
pub trait EventStore: Send + Sync {
    /// Events within `radius_km` of `origin`, nearest first.
    ///
    /// With `page` set, only that window is returned and `total_count` holds
    /// the size of the full result; without it every match is returned.
    fn find_near(
        &self,
        origin: Location,
        radius_km: f64,
        page: Option<PageRequest>,
    ) -> impl Future<Output = Result<EventPage, SourceError>> + Send;

    /// Elapsed events the user joined or attended
    fn find_past_participation(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Event>, SourceError>> + Send;
}

/// Source of user sport preferences
pub trait ProfileProvider: Send + Sync {
    fn get_profile(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<UserProfile, SourceError>> + Send;
}

//! Huddle Algo - Event recommendation service for the Huddle sports app
//!
//! Given a user and a location, this library finds nearby sport events, drops
//! the ones the user cannot join, scores the rest against the user's history
//! or declared preferences, and returns a ranked, paginated page.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    haversine_km, EventScorer, EventStore, ProfileProvider, RecommendQuery, Recommender,
    RecommenderSettings, ResolveError, ScoringStrategy, SourceError,
};
pub use crate::models::{Event, EventSummary, Location, PageRequest, RankedPage, SkillLevel, UserProfile};

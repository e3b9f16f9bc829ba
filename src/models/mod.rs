// Model exports
pub mod datetime;
pub mod domain;
pub mod requests;
pub mod responses;

pub use datetime::{parse_cutoff, parse_time_of_day};
pub use domain::{
    normalize_sport, BoundingBox, Event, EventPage, Location, PageRequest, ScoredEvent, SkillLevel,
    UnknownSkillLevel, UserProfile,
};
pub use requests::{NearbyEventsQuery, RecommendEventsRequest};
pub use responses::{ErrorResponse, EventSummary, HealthResponse, NearbyEventsResponse, RankedPage};

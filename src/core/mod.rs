// Core algorithm exports
pub mod distance;
pub mod eligibility;
pub mod locator;
pub mod ranking;
pub mod resolver;
pub mod scoring;
pub mod sources;

pub use distance::{calculate_bounding_box, haversine_km, is_within_bounding_box};
pub use eligibility::{dedupe_by_id, is_joinable, retain_joinable};
pub use locator::{locate, LocateQuery, LocatedEvents};
pub use ranking::{page_window, paginate, rank};
pub use resolver::{RecommendQuery, Recommender, RecommenderSettings, ResolveError};
pub use scoring::{score_candidates, EventScorer, HistoryScorer, ProfileScorer, ScoringStrategy};
pub use sources::{EventStore, ProfileProvider, SourceError};

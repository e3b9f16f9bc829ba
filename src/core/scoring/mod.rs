//! Candidate scoring strategies.
//!
//! Two strategies implement [`EventScorer`]: [`HistoryScorer`] compares each
//! candidate against events the user already took part in, and
//! [`ProfileScorer`] matches candidates against declared sport preferences.
//! [`ScoringStrategy::select`] picks exactly one of them per request.

pub mod history;
pub mod profile;

pub use history::{jaccard, HistoryScorer};
pub use profile::ProfileScorer;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::models::{Event, ScoredEvent, UserProfile};

/// Assigns a relevance score to a candidate event.
///
/// Implementations must be `Send + Sync` so scoring can fan out across the
/// worker pool. Scoring is infallible; missing information scores `0.0`.
pub trait EventScorer: Send + Sync {
    /// Score a single candidate
    fn score(&self, candidate: &Event) -> f64;

    /// Score every candidate on `pool`, one slot per candidate in input order
    fn compute_scores(&self, candidates: &[Event], pool: &ThreadPool) -> Vec<f64> {
        pool.install(|| candidates.par_iter().map(|c| self.score(c)).collect())
    }
}

/// The strategy active for one resolution call
#[derive(Debug, Clone)]
pub enum ScoringStrategy {
    History(HistoryScorer),
    Profile(ProfileScorer),
}

impl ScoringStrategy {
    /// History wins whenever the user has any; otherwise fall back to the profile
    pub fn select(history: Vec<Event>, profile: &UserProfile) -> Self {
        if history.is_empty() {
            tracing::debug!("Scoring user {} by profile preferences", profile.user_id);
            Self::Profile(ProfileScorer::new(profile))
        } else {
            tracing::debug!(
                "Scoring user {} against {} past events",
                profile.user_id,
                history.len()
            );
            Self::History(HistoryScorer::new(history))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::History(_) => "history",
            Self::Profile(_) => "profile",
        }
    }
}

impl EventScorer for ScoringStrategy {
    fn score(&self, candidate: &Event) -> f64 {
        match self {
            Self::History(scorer) => scorer.score(candidate),
            Self::Profile(scorer) => scorer.score(candidate),
        }
    }
}

/// Score `candidates` in parallel and pair each with its score
///
/// Scores land in pre-indexed slots, so the output keeps the input order.
pub fn score_candidates<S: EventScorer + ?Sized>(
    scorer: &S,
    candidates: Vec<Event>,
    pool: &ThreadPool,
) -> Vec<ScoredEvent> {
    let scores = scorer.compute_scores(&candidates, pool);
    candidates
        .into_iter()
        .zip(scores)
        .map(|(event, score)| ScoredEvent { event, score })
        .collect()
}

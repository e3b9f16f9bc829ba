use chrono::Utc;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::{
    eligibility::{dedupe_by_id, retain_joinable},
    locator::{locate, LocateQuery, LocatedEvents},
    ranking::{paginate, rank},
    scoring::{score_candidates, ScoringStrategy},
    sources::{EventStore, ProfileProvider, SourceError},
};
use crate::models::{Location, PageRequest, RankedPage, UserProfile};

/// Errors that abort a resolution call
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("recommendation deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("scoring task failed: {0}")]
    Scoring(#[from] tokio::task::JoinError),

    #[error("failed to build scoring pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Tunables for the resolution pipeline
#[derive(Debug, Clone, Copy)]
pub struct RecommenderSettings {
    pub default_radius_km: f64,
    pub allow_expansion: bool,
    pub scoring_threads: usize,
    pub deadline: Duration,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            default_radius_km: 25.0,
            allow_expansion: true,
            scoring_threads: 4,
            deadline: Duration::from_secs(5),
        }
    }
}

/// A request for recommendations around one origin
#[derive(Debug, Clone)]
pub struct RecommendQuery {
    pub user_id: String,
    pub origin: Location,
    /// Falls back to the configured default radius
    pub radius_km: Option<f64>,
    /// Falls back to the configured expansion policy
    pub allow_expansion: Option<bool>,
    pub page: PageRequest,
}

/// Event recommendation orchestrator
///
/// # Pipeline Stages
/// 1. Locate candidates near the origin (with one radius expansion)
/// 2. Drop events the user cannot join
/// 3. Select the history or profile scoring strategy
/// 4. Score candidates on the bounded worker pool
/// 5. Rank and paginate
pub struct Recommender<S, P> {
    store: Arc<S>,
    profiles: Arc<P>,
    pool: Arc<ThreadPool>,
    settings: RecommenderSettings,
}

impl<S, P> Clone for Recommender<S, P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            profiles: Arc::clone(&self.profiles),
            pool: Arc::clone(&self.pool),
            settings: self.settings,
        }
    }
}

impl<S: EventStore, P: ProfileProvider> Recommender<S, P> {
    pub fn new(
        store: Arc<S>,
        profiles: Arc<P>,
        settings: RecommenderSettings,
    ) -> Result<Self, ResolveError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.scoring_threads.max(1))
            .thread_name(|i| format!("huddle-scoring-{i}"))
            .build()?;

        Ok(Self {
            store,
            profiles,
            pool: Arc::new(pool),
            settings,
        })
    }

    pub fn settings(&self) -> &RecommenderSettings {
        &self.settings
    }

    /// Ranked, paginated recommendations for `query.user_id`
    ///
    /// The whole pipeline runs under the configured deadline.
    pub async fn recommend(&self, query: &RecommendQuery) -> Result<RankedPage, ResolveError> {
        let deadline = self.settings.deadline;
        tokio::time::timeout(deadline, self.resolve(query))
            .await
            .map_err(|_| ResolveError::DeadlineExceeded(deadline))?
    }

    /// Nearby events without eligibility filtering or scoring
    pub async fn nearby(&self, query: &LocateQuery) -> Result<LocatedEvents, ResolveError> {
        let deadline = self.settings.deadline;
        tokio::time::timeout(deadline, locate(self.store.as_ref(), query))
            .await
            .map_err(|_| ResolveError::DeadlineExceeded(deadline))?
            .map_err(ResolveError::from)
    }

    async fn resolve(&self, query: &RecommendQuery) -> Result<RankedPage, ResolveError> {
        let user_id = query.user_id.as_str();
        let locate_query = LocateQuery {
            origin: query.origin,
            radius_km: query.radius_km.unwrap_or(self.settings.default_radius_km),
            allow_expansion: query.allow_expansion.unwrap_or(self.settings.allow_expansion),
            paginate: false,
            page: query.page,
        };

        let pool = locate(self.store.as_ref(), &locate_query).await?.into_items();
        let located = pool.len();
        let candidates = dedupe_by_id(retain_joinable(pool, user_id, Utc::now()));

        tracing::debug!(
            "User {}: {} located, {} eligible",
            user_id,
            located,
            candidates.len()
        );

        if candidates.is_empty() {
            return Ok(paginate(Vec::new(), query.page));
        }

        let history = self.store.find_past_participation(user_id).await?;
        let profile = if history.is_empty() {
            self.load_profile(user_id).await?
        } else {
            UserProfile::empty(user_id)
        };

        let strategy = ScoringStrategy::select(history, &profile);
        let strategy_name = strategy.name();
        let workers = Arc::clone(&self.pool);

        let scored = tokio::task::spawn_blocking(move || {
            score_candidates(&strategy, candidates, &workers)
        })
        .await?;

        tracing::info!(
            "Scored {} events for user {} using {} strategy",
            scored.len(),
            user_id,
            strategy_name
        );

        Ok(paginate(rank(scored), query.page))
    }

    /// A missing profile is treated as having no preferences
    async fn load_profile(&self, user_id: &str) -> Result<UserProfile, SourceError> {
        match self.profiles.get_profile(user_id).await {
            Ok(profile) => Ok(profile),
            Err(SourceError::NotFound(what)) => {
                tracing::warn!("No profile for user {} ({}), scoring without preferences", user_id, what);
                Ok(UserProfile::empty(user_id))
            }
            Err(e) => Err(e),
        }
    }
}

use std::collections::HashSet;
use std::hash::Hash;

use super::EventScorer;
use crate::core::distance::haversine_km;
use crate::models::Event;

/// Weight of the distance term in a pair score
const DISTANCE_WEIGHT: f64 = 0.4;
/// Weight of the categorical term in a pair score
const CATEGORICAL_WEIGHT: f64 = 0.4;
/// Weight of the time term in a pair score
const TIME_WEIGHT: f64 = 0.2;

/// Distance is scaled linearly per this many kilometers, without clamping
const DISTANCE_SCALE_KM: f64 = 100.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Scores candidates by their similarity to the user's past events
#[derive(Debug, Clone)]
pub struct HistoryScorer {
    history: Vec<Event>,
}

impl HistoryScorer {
    pub fn new(history: Vec<Event>) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &[Event] {
        &self.history
    }
}

impl EventScorer for HistoryScorer {
    /// Mean pair score over every past event except the candidate itself.
    ///
    /// With nothing left to compare against the score is `0.0`.
    fn score(&self, candidate: &Event) -> f64 {
        let (sum, count) = self
            .history
            .iter()
            .filter(|past| past.id != candidate.id)
            .map(|past| pair_score(past, candidate))
            .fold((0.0, 0usize), |(sum, count), score| (sum + score, count + 1));

        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

/// Weighted similarity between one past event and one candidate
pub fn pair_score(past: &Event, candidate: &Event) -> f64 {
    DISTANCE_WEIGHT * distance_score(past, candidate)
        + CATEGORICAL_WEIGHT * categorical_score(past, candidate)
        + TIME_WEIGHT * time_score(past, candidate)
}

/// Great-circle distance in hundreds of kilometers.
///
/// Grows with distance and is not clamped to 1.
#[inline]
pub fn distance_score(past: &Event, candidate: &Event) -> f64 {
    haversine_km(past.location, candidate.location) / DISTANCE_SCALE_KM
}

/// Mean of start-time closeness within a day and duration closeness in hours
pub fn time_score(past: &Event, candidate: &Event) -> f64 {
    let start_gap = f64::from(past.start_second().abs_diff(candidate.start_second()));
    let start = 1.0 - start_gap / SECONDS_PER_DAY;

    let duration_gap = (past.duration_hours() - candidate.duration_hours()).abs();
    let duration = 1.0 - duration_gap / HOURS_PER_DAY;

    (start + duration) / 2.0
}

/// Mean of participant overlap, skill overlap and sport match
pub fn categorical_score(past: &Event, candidate: &Event) -> f64 {
    let participants = jaccard(&past.participants, &candidate.participants);
    let skills = jaccard(
        &past.required_skill_level.iter().collect::<HashSet<_>>(),
        &candidate.required_skill_level.iter().collect::<HashSet<_>>(),
    );
    let sport = if same_sport(&past.sport_type, &candidate.sport_type) {
        1.0
    } else {
        0.0
    };

    (participants + skills + sport) / 3.0
}

/// |A ∩ B| / |A ∪ B|; two empty sets score 0.0
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

#[inline]
fn same_sport(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

//! In-process event and profile sources.
//!
//! They answer the same queries as the PostgreSQL store and the profile
//! client without any I/O, for embedding the recommender and for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::distance::{calculate_bounding_box, haversine_km, is_within_bounding_box};
use crate::core::ranking::page_window;
use crate::core::sources::{EventStore, ProfileProvider, SourceError};
use crate::models::{Event, EventPage, Location, PageRequest, UserProfile};

/// Event store holding a fixed set of events
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: Vec<Event>,
    history: HashMap<String, Vec<Event>>,
    queried_radii: Mutex<Vec<f64>>,
}

impl InMemoryEventStore {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Register past participation for a user
    pub fn with_history(mut self, user_id: impl Into<String>, events: Vec<Event>) -> Self {
        self.history.insert(user_id.into(), events);
        self
    }

    /// Every radius `find_near` was called with, in call order
    pub fn queried_radii(&self) -> Vec<f64> {
        self.queried_radii
            .lock()
            .map(|radii| radii.clone())
            .unwrap_or_default()
    }
}

impl EventStore for InMemoryEventStore {
    async fn find_near(
        &self,
        origin: Location,
        radius_km: f64,
        page: Option<PageRequest>,
    ) -> Result<EventPage, SourceError> {
        if let Ok(mut radii) = self.queried_radii.lock() {
            radii.push(radius_km);
        }

        let bbox = calculate_bounding_box(origin, radius_km);
        let mut within: Vec<(f64, &Event)> = self
            .events
            .iter()
            .filter(|event| is_within_bounding_box(event.location, &bbox))
            .map(|event| (haversine_km(origin, event.location), event))
            .filter(|(distance, _)| *distance <= radius_km)
            .collect();
        within.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total_count = within.len() as u64;
        let window = match page {
            Some(page) => page_window(within.len(), page),
            None => 0..within.len(),
        };
        let items = within
            .get(window)
            .unwrap_or_default()
            .iter()
            .map(|(_, event)| (*event).clone())
            .collect();

        Ok(EventPage { items, total_count })
    }

    async fn find_past_participation(&self, user_id: &str) -> Result<Vec<Event>, SourceError> {
        Ok(self.history.get(user_id).cloned().unwrap_or_default())
    }
}

/// Profile source backed by a map
#[derive(Debug, Default)]
pub struct InMemoryProfiles {
    profiles: HashMap<String, UserProfile>,
}

impl InMemoryProfiles {
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profiles.insert(profile.user_id.clone(), profile);
        self
    }
}

impl ProfileProvider for InMemoryProfiles {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, SourceError> {
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("Profile not found for user {}", user_id)))
    }
}

/// A public soccer event at the given position, 18:00-19:30 with no
/// participants, skill requirements or cutoff
#[cfg(test)]
pub(crate) fn sample_event(id: &str, longitude: f64, latitude: f64) -> Event {
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::{BTreeSet, HashSet};

    Event {
        id: id.to_string(),
        sport_type: "Soccer".to_string(),
        location: Location::new(longitude, latitude),
        date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
        duration: "1.5".to_string(),
        max_participants: 10,
        participants: HashSet::new(),
        required_skill_level: BTreeSet::new(),
        created_by: "organizer".to_string(),
        is_private: false,
        whitelisted_users: HashSet::new(),
        cut_off_time: None,
    }
}

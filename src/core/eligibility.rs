use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::models::Event;

/// Check whether `user_id` may be offered `event` at `now`
///
/// An event is dropped when its cutoff has passed, or when it is private and
/// the user is not on its whitelist. A missing cutoff never excludes.
#[inline]
pub fn is_joinable(event: &Event, user_id: &str, now: DateTime<Utc>) -> bool {
    if event.cut_off_time.is_some_and(|cutoff| cutoff < now) {
        return false;
    }

    !event.is_private || event.whitelisted_users.contains(user_id)
}

/// Keep the events `user_id` may join, preserving order
pub fn retain_joinable(events: Vec<Event>, user_id: &str, now: DateTime<Utc>) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| is_joinable(event, user_id, now))
        .collect()
}

/// Drop repeated event ids, keeping the first (nearest) occurrence
pub fn dedupe_by_id(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::with_capacity(events.len());
    events
        .into_iter()
        .filter(|event| seen.insert(event.id.clone()))
        .collect()
}

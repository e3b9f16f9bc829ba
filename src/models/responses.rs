use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::datetime;
use crate::models::domain::{Event, Location, ScoredEvent, SkillLevel};

/// Event as returned to clients of the recommendation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: String,
    pub sport_type: String,
    pub location: Location,
    pub date: NaiveDate,
    #[serde(with = "datetime::time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "datetime::time_of_day")]
    pub end_time: NaiveTime,
    pub duration: String,
    pub max_participants: u32,
    pub participant_count: usize,
    pub required_skill_level: BTreeSet<SkillLevel>,
    pub created_by: String,
    pub is_private: bool,
    #[serde(default, with = "datetime::cutoff")]
    pub cut_off_time: Option<DateTime<Utc>>,
    /// Present only for ranked results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            sport_type: event.sport_type.clone(),
            location: event.location,
            date: event.date,
            start_time: event.start_time,
            end_time: event.end_time,
            duration: event.duration.clone(),
            max_participants: event.max_participants,
            participant_count: event.participants.len(),
            required_skill_level: event.required_skill_level.clone(),
            created_by: event.created_by.clone(),
            is_private: event.is_private,
            cut_off_time: event.cut_off_time,
            score: None,
        }
    }
}

impl From<&ScoredEvent> for EventSummary {
    fn from(scored: &ScoredEvent) -> Self {
        Self {
            score: Some(scored.score),
            ..Self::from(&scored.event)
        }
    }
}

/// One page of ranked recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPage {
    pub items: Vec<EventSummary>,
    pub total_count: u64,
    pub page: u32,
    pub size: u32,
}

/// Response for the nearby-events lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyEventsResponse {
    pub items: Vec<EventSummary>,
    pub is_paginated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::datetime;

/// Geographic position of an event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Convert to a `geo` point (x = longitude, y = latitude)
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

/// Skill level an event requires or a user prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

#[derive(Debug, Clone, Error)]
#[error("unknown skill level: {0}")]
pub struct UnknownSkillLevel(pub String);

impl FromStr for SkillLevel {
    type Err = UnknownSkillLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BEGINNER" => Ok(Self::Beginner),
            "INTERMEDIATE" => Ok(Self::Intermediate),
            "ADVANCED" => Ok(Self::Advanced),
            "PROFESSIONAL" => Ok(Self::Professional),
            _ => Err(UnknownSkillLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for SkillLevel {
    type Error = UnknownSkillLevel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Beginner => "BEGINNER",
            Self::Intermediate => "INTERMEDIATE",
            Self::Advanced => "ADVANCED",
            Self::Professional => "PROFESSIONAL",
        };
        f.write_str(name)
    }
}

/// A sport event as seen by the recommendation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub sport_type: String,
    pub location: Location,
    pub date: NaiveDate,
    #[serde(with = "datetime::time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "datetime::time_of_day")]
    pub end_time: NaiveTime,
    /// Duration in hours, kept as the text upstream writers produce
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub max_participants: u32,
    #[serde(default)]
    pub participants: HashSet<String>,
    #[serde(default)]
    pub required_skill_level: BTreeSet<SkillLevel>,
    pub created_by: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub whitelisted_users: HashSet<String>,
    /// Normalized at ingestion; `None` means no cutoff (or an unparseable one)
    #[serde(default, with = "datetime::cutoff")]
    pub cut_off_time: Option<DateTime<Utc>>,
}

impl Event {
    /// Seconds since midnight of the event start
    pub fn start_second(&self) -> u32 {
        self.start_time.num_seconds_from_midnight()
    }

    /// Duration as a numeric hour count; blank or non-numeric text counts as zero
    pub fn duration_hours(&self) -> f64 {
        let trimmed = self.duration.trim();
        if trimmed.is_empty() {
            return 0.0;
        }
        match trimmed.parse::<f64>() {
            Ok(hours) if hours.is_finite() => hours,
            _ => {
                tracing::debug!(event_id = %self.id, duration = trimmed, "Non-numeric duration, using 0");
                0.0
            }
        }
    }
}

/// A user's declared sport preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId", default)]
    pub user_id: String,
    /// Sport name -> preferred skill ranking, as entered by the user
    #[serde(rename = "sportsOfPreference", default)]
    pub sports_of_preference: HashMap<String, String>,
}

impl UserProfile {
    /// Profile with no declared preferences
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            sports_of_preference: HashMap::new(),
        }
    }
}

/// Normalize a sport name for comparison: trimmed, single-spaced, lower-case
pub fn normalize_sport(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Candidate paired with the score its strategy assigned
#[derive(Debug, Clone)]
pub struct ScoredEvent {
    pub event: Event,
    pub score: f64,
}

/// Zero-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Offset of the first item; saturates instead of overflowing
    pub fn offset(&self) -> u64 {
        u64::from(self.page).saturating_mul(u64::from(self.size))
    }
}

/// One window of events returned by the store
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub items: Vec<Event>,
    pub total_count: u64,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

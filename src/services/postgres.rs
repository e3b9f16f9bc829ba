use chrono::{NaiveDate, NaiveTime};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

use crate::core::distance::calculate_bounding_box;
use crate::core::sources::{EventStore, SourceError};
use crate::models::{parse_cutoff, Event, EventPage, Location, PageRequest, SkillLevel};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

impl From<PostgresError> for SourceError {
    fn from(err: PostgresError) -> Self {
        SourceError::Store(Box::new(err))
    }
}

/// Great-circle distance from ($1 lon, $2 lat) in kilometers, as SQL
const DISTANCE_KM_SQL: &str = r#"
    6371.0088 * 2.0 * ASIN(LEAST(1.0, SQRT(
        POWER(SIN(RADIANS(e.latitude - $2) / 2.0), 2)
        + COS(RADIANS($2)) * COS(RADIANS(e.latitude))
          * POWER(SIN(RADIANS(e.longitude - $1) / 2.0), 2)
    )))
"#;

const EVENT_COLUMNS: &str = r#"
    e.id, e.sport_type, e.longitude, e.latitude, e.event_date, e.start_time, e.end_time,
    e.duration, e.max_participants, e.participants, e.required_skill_level, e.created_by,
    e.is_private, e.whitelisted_users, e.cut_off_time
"#;

/// Raw `events` row, before cutoff and skill normalization
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    sport_type: String,
    longitude: f64,
    latitude: f64,
    event_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    duration: Option<String>,
    max_participants: i32,
    participants: Vec<String>,
    required_skill_level: Vec<String>,
    created_by: String,
    is_private: bool,
    whitelisted_users: Vec<String>,
    cut_off_time: Option<String>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        let required_skill_level: BTreeSet<SkillLevel> = row
            .required_skill_level
            .iter()
            .filter_map(|raw| match raw.parse() {
                Ok(level) => Some(level),
                Err(e) => {
                    tracing::warn!("Event {}: {}", row.id, e);
                    None
                }
            })
            .collect();

        Event {
            cut_off_time: row.cut_off_time.as_deref().and_then(parse_cutoff),
            id: row.id,
            sport_type: row.sport_type,
            location: Location::new(row.longitude, row.latitude),
            date: row.event_date,
            start_time: row.start_time,
            end_time: row.end_time,
            duration: row.duration.unwrap_or_default(),
            max_participants: u32::try_from(row.max_participants).unwrap_or(0),
            participants: row.participants.into_iter().collect(),
            required_skill_level,
            created_by: row.created_by,
            is_private: row.is_private,
            whitelisted_users: row.whitelisted_users.into_iter().collect(),
        }
    }
}

/// PostgreSQL-backed event store
///
/// Answers nearest-events queries with a bounding-box prefilter and an exact
/// haversine distance, and resolves a user's past participation.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Events within `radius_km` of `origin`, nearest first
    pub async fn query_near(
        &self,
        origin: Location,
        radius_km: f64,
        page: Option<PageRequest>,
    ) -> Result<EventPage, PostgresError> {
        let bbox = calculate_bounding_box(origin, radius_km);
        let query = format!(
            r#"
            WITH candidates AS (
                SELECT {EVENT_COLUMNS}, {DISTANCE_KM_SQL} AS distance_km
                FROM events e
                WHERE e.latitude BETWEEN $4 AND $5
                  AND e.longitude BETWEEN $6 AND $7
            )
            SELECT * FROM candidates
            WHERE distance_km <= $3
            ORDER BY distance_km ASC
            LIMIT $8 OFFSET $9
            "#
        );

        let (limit, offset) = match page {
            Some(page) => (
                Some(i64::from(page.size)),
                i64::try_from(page.offset()).unwrap_or(i64::MAX),
            ),
            None => (None, 0),
        };

        let rows: Vec<EventRow> = sqlx::query_as(&query)
            .bind(origin.longitude)
            .bind(origin.latitude)
            .bind(radius_km)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let items: Vec<Event> = rows.into_iter().map(Event::from).collect();

        let total_count = match page {
            Some(_) => self.count_near(origin, radius_km).await?,
            None => items.len() as u64,
        };

        tracing::debug!(
            "Found {} events within {}km (total: {})",
            items.len(),
            radius_km,
            total_count
        );

        Ok(EventPage { items, total_count })
    }

    /// Number of events within `radius_km` of `origin`
    async fn count_near(&self, origin: Location, radius_km: f64) -> Result<u64, PostgresError> {
        let bbox = calculate_bounding_box(origin, radius_km);
        let query = format!(
            r#"
            SELECT COUNT(*) FROM events e
            WHERE e.latitude BETWEEN $4 AND $5
              AND e.longitude BETWEEN $6 AND $7
              AND {DISTANCE_KM_SQL} <= $3
            "#
        );

        let count: i64 = sqlx::query_scalar(&query)
            .bind(origin.longitude)
            .bind(origin.latitude)
            .bind(radius_km)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Elapsed events the user joined or attended
    pub async fn query_past_participation(&self, user_id: &str) -> Result<Vec<Event>, PostgresError> {
        let query = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events e
            JOIN event_participants p ON p.event_id = e.id
            WHERE p.user_id = $1
              AND p.status IN ('JOINED', 'ATTENDED')
              AND (e.event_date + e.end_time) < LOCALTIMESTAMP
            "#
        );

        let rows: Vec<EventRow> = sqlx::query_as(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("User {} has {} past events", user_id, rows.len());

        Ok(rows.into_iter().map(Event::from).collect())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl EventStore for PostgresClient {
    async fn find_near(
        &self,
        origin: Location,
        radius_km: f64,
        page: Option<PageRequest>,
    ) -> Result<EventPage, SourceError> {
        Ok(self.query_near(origin, radius_km, page).await?)
    }

    async fn find_past_participation(&self, user_id: &str) -> Result<Vec<Event>, SourceError> {
        Ok(self.query_past_participation(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> EventRow {
        EventRow {
            id: "evt-1".to_string(),
            sport_type: "Basketball".to_string(),
            longitude: 13.4,
            latitude: 52.5,
            event_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            duration: None,
            max_participants: 10,
            participants: vec!["u1".to_string(), "u2".to_string(), "u1".to_string()],
            required_skill_level: vec!["beginner".to_string(), "legendary".to_string()],
            created_by: "org".to_string(),
            is_private: false,
            whitelisted_users: vec![],
            cut_off_time: Some("2026-11-02T17:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_row_mapping_normalizes_fields() {
        let event = Event::from(row());

        assert_eq!(event.participants.len(), 2);
        assert_eq!(
            event.required_skill_level.into_iter().collect::<Vec<_>>(),
            vec![SkillLevel::Beginner]
        );
        assert_eq!(event.duration, "");
        assert!(event.cut_off_time.is_some());
    }

    #[test]
    fn test_database_error_becomes_store_error() {
        let err = SourceError::from(PostgresError::SqlxError(sqlx::Error::PoolTimedOut));
        let SourceError::Store(source) = err else {
            panic!("expected a store error, got {:?}", err);
        };
        assert!(source.downcast_ref::<PostgresError>().is_some());
    }

    #[test]
    fn test_row_mapping_fails_open_on_bad_cutoff() {
        let mut raw = row();
        raw.cut_off_time = Some("tomorrow-ish".to_string());
        raw.max_participants = -1;

        let event = Event::from(raw);
        assert!(event.cut_off_time.is_none());
        assert_eq!(event.max_participants, 0);
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_query_near_against_database() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let client = PostgresClient::from_settings(&url, Some(2), Some(1), None, None)
            .await
            .expect("Failed to connect");

        let page = client
            .query_near(Location::new(13.405, 52.52), 25.0, Some(PageRequest::new(0, 5)))
            .await
            .unwrap();
        assert!(page.items.len() <= 5);
    }
}

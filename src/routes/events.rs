use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::RecommendationSettings;
use crate::core::{LocateQuery, LocatedEvents, RecommendQuery, Recommender, ResolveError, SourceError};
use crate::models::{
    ErrorResponse, EventSummary, HealthResponse, Location, NearbyEventsQuery,
    NearbyEventsResponse, PageRequest, RecommendEventsRequest,
};
use crate::services::{PostgresClient, ProfileClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender<PostgresClient, ProfileClient>,
    pub postgres: Arc<PostgresClient>,
    pub settings: RecommendationSettings,
}

/// Configure all event routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/events/recommended", web::post().to(recommended_events))
        .route("/events/nearby", web::get().to(nearby_events));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recommended events endpoint
///
/// POST /api/v1/events/recommended
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "longitude": 13.405,
///   "latitude": 52.52,
///   "radiusKm": 25,
///   "allowExpansion": true,
///   "page": 0,
///   "size": 20
/// }
/// ```
async fn recommended_events(
    state: web::Data<AppState>,
    req: web::Json<RecommendEventsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommended_events request: {:?}", errors);
        return validation_error(errors);
    }

    let req = req.into_inner();
    let query = RecommendQuery {
        origin: Location::new(req.longitude, req.latitude),
        radius_km: req.radius_km,
        allow_expansion: req.allow_expansion,
        page: PageRequest::new(req.page, state.settings.page_size(req.size)),
        user_id: req.user_id,
    };

    tracing::info!(
        "Recommending events for user: {}, page: {}, size: {}",
        query.user_id,
        query.page.page,
        query.page.size
    );

    match state.recommender.recommend(&query).await {
        Ok(page) => {
            tracing::info!(
                "Returning {} of {} events for user {}",
                page.items.len(),
                page.total_count,
                query.user_id
            );
            HttpResponse::Ok().json(page)
        }
        Err(e) => resolve_error(&e),
    }
}

/// Nearby events endpoint
///
/// GET /api/v1/events/nearby?longitude=..&latitude=..&radiusKm=..&paginate=true&page=0&size=20
async fn nearby_events(
    state: web::Data<AppState>,
    query: web::Query<NearbyEventsQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let settings = &state.settings;
    let locate_query = LocateQuery {
        origin: Location::new(query.longitude, query.latitude),
        radius_km: query.radius_km.unwrap_or(settings.default_radius_km),
        allow_expansion: query.allow_expansion.unwrap_or(settings.allow_expansion),
        paginate: query.paginate,
        page: PageRequest::new(query.page, settings.page_size(query.size)),
    };

    match state.recommender.nearby(&locate_query).await {
        Ok(located) => {
            let is_paginated = located.is_paginated();
            let total_count = match &located {
                LocatedEvents::Paged { total_count, .. } => Some(*total_count),
                LocatedEvents::All(_) => None,
            };
            HttpResponse::Ok().json(NearbyEventsResponse {
                items: located.items().iter().map(EventSummary::from).collect(),
                is_paginated,
                total_count,
            })
        }
        Err(e) => resolve_error(&e),
    }
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Map a pipeline failure to an HTTP response
fn resolve_error(err: &ResolveError) -> HttpResponse {
    match err {
        ResolveError::Source(SourceError::NotFound(what)) => {
            HttpResponse::NotFound().json(ErrorResponse {
                error: "Not found".to_string(),
                message: what.clone(),
                status_code: 404,
            })
        }
        ResolveError::DeadlineExceeded(_) => {
            tracing::warn!("{}", err);
            HttpResponse::GatewayTimeout().json(ErrorResponse {
                error: "Recommendation timed out".to_string(),
                message: err.to_string(),
                status_code: 504,
            })
        }
        _ => {
            tracing::error!("Failed to resolve events: {}", err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to resolve events".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}

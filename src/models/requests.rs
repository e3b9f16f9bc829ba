use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request for ranked event recommendations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendEventsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = 0.1, max = 20000.0))]
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
    #[serde(alias = "allow_expansion", rename = "allowExpansion", default)]
    pub allow_expansion: Option<bool>,
    #[serde(default)]
    pub page: u32,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub size: Option<u32>,
}

/// Query string for the nearby-events lookup
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyEventsQuery {
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = 0.1, max = 20000.0))]
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
    #[serde(alias = "allow_expansion", rename = "allowExpansion", default)]
    pub allow_expansion: Option<bool>,
    #[serde(default = "default_paginate")]
    pub paginate: bool,
    #[serde(default)]
    pub page: u32,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub size: Option<u32>,
}

fn default_paginate() -> bool {
    true
}

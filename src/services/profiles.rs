use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::sources::{ProfileProvider, SourceError};
use crate::models::UserProfile;
use crate::services::cache::{CacheError, CacheKey, CacheManager};

/// Errors that can occur when interacting with the profile service
#[derive(Debug, Error)]
pub enum ProfileClientError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// User profile service client
///
/// Fetches a user's sport preferences, optionally through a [`CacheManager`].
pub struct ProfileClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    cache: Option<Arc<CacheManager>>,
}

impl ProfileClient {
    /// Create a new profile service client
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProfileClientError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            cache: None,
        })
    }

    /// Cache fetched profiles in `cache`
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn profile_url(&self, user_id: &str) -> String {
        format!(
            "{}/users/{}/profile",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(user_id)
        )
    }

    /// Fetch a user's profile, consulting the cache first
    pub async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, ProfileClientError> {
        let cache_key = CacheKey::profile(user_id);

        if let Some(cache) = &self.cache {
            match cache.get::<UserProfile>(&cache_key).await {
                Ok(profile) => return Ok(profile),
                Err(CacheError::CacheMiss(_)) => {}
                Err(e) => tracing::warn!("Profile cache read failed for {}: {}", user_id, e),
            }
        }

        let profile = self.request_profile(user_id).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&cache_key, &profile).await {
                tracing::warn!("Failed to cache profile for {}: {}", user_id, e);
            }
        }

        Ok(profile)
    }

    async fn request_profile(&self, user_id: &str) -> Result<UserProfile, ProfileClientError> {
        let url = self.profile_url(user_id);
        tracing::debug!("Fetching profile for user: {}", user_id);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(ProfileClientError::NotFound(format!(
                    "Profile not found for user {}",
                    user_id
                )))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ProfileClientError::Unauthorized)
            }
            status if !status.is_success() => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Failed to fetch profile for {}: {} - {}", user_id, status, body);
                return Err(ProfileClientError::ApiError(format!(
                    "Failed to fetch profile: {}",
                    status
                )));
            }
            _ => {}
        }

        let mut profile: UserProfile = response
            .json()
            .await
            .map_err(|e| ProfileClientError::InvalidResponse(format!("Failed to parse profile: {}", e)))?;

        if profile.user_id.is_empty() {
            profile.user_id = user_id.to_string();
        }

        Ok(profile)
    }
}

impl From<ProfileClientError> for SourceError {
    fn from(err: ProfileClientError) -> Self {
        match err {
            ProfileClientError::NotFound(what) => SourceError::NotFound(what),
            other => SourceError::Profile(Box::new(other)),
        }
    }
}

impl ProfileProvider for ProfileClient {
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, SourceError> {
        Ok(self.fetch_profile(user_id).await?)
    }
}

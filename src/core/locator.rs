use crate::core::sources::{EventStore, SourceError};
use crate::models::{Event, Location, PageRequest};

/// Radius multiplier for the single fallback query
pub const EXPANSION_FACTOR: f64 = 2.0;

/// Parameters for a nearby-events lookup
#[derive(Debug, Clone, Copy)]
pub struct LocateQuery {
    pub origin: Location,
    pub radius_km: f64,
    pub allow_expansion: bool,
    pub paginate: bool,
    pub page: PageRequest,
}

/// Events found around an origin, nearest first
#[derive(Debug, Clone)]
pub enum LocatedEvents {
    /// One page of the result plus the size of the whole result
    Paged { items: Vec<Event>, total_count: u64 },
    /// Every event inside the radius
    All(Vec<Event>),
}

impl LocatedEvents {
    pub fn is_paginated(&self) -> bool {
        matches!(self, Self::Paged { .. })
    }

    pub fn items(&self) -> &[Event] {
        match self {
            Self::Paged { items, .. } | Self::All(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<Event> {
        match self {
            Self::Paged { items, .. } | Self::All(items) => items,
        }
    }
}

/// Query the store for events near `query.origin`.
///
/// An empty first result with expansion allowed triggers exactly one retry at
/// twice the radius, using the same page window. There is no third attempt.
pub async fn locate<S: EventStore>(
    store: &S,
    query: &LocateQuery,
) -> Result<LocatedEvents, SourceError> {
    let window = query.paginate.then_some(query.page);

    let mut found = store.find_near(query.origin, query.radius_km, window).await?;

    if found.items.is_empty() && query.allow_expansion {
        let expanded_km = query.radius_km * EXPANSION_FACTOR;
        tracing::debug!(
            "No events within {}km of ({}, {}), retrying at {}km",
            query.radius_km,
            query.origin.longitude,
            query.origin.latitude,
            expanded_km
        );
        found = store.find_near(query.origin, expanded_km, window).await?;
    }

    tracing::debug!("Located {} candidate events", found.items.len());

    Ok(if query.paginate {
        LocatedEvents::Paged {
            items: found.items,
            total_count: found.total_count,
        }
    } else {
        LocatedEvents::All(found.items)
    })
}

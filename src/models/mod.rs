use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod movie;
pub mod streaming_service;
pub mod user;

pub use movie::{Movie, NewMovie};
pub use streaming_service::{Service, ServiceIcon, KNOWN_SERVICES};
pub use user::{NewUser, User, UserSummary, UserUpdate};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw movie record from `GET /search/movie`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMovie {
    /// TMDB movie id
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    /// `YYYY-MM-DD`, sometimes an empty string for unreleased titles
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f64,
}

impl CatalogMovie {
    /// Year component of the release date, if the catalog supplied one
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

/// Envelope of `GET /search/movie`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<CatalogMovie>,
}

/// A single provider entry inside a region's offer lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchOffer {
    pub provider_name: String,
    #[serde(default)]
    pub provider_id: Option<i64>,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub display_priority: Option<i64>,
}

/// Offers for one region from `GET /movie/{id}/watch/providers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionOffers {
    #[serde(default)]
    pub link: Option<String>,
    /// Subscription ("flatrate") offers; rent and buy lists are ignored
    #[serde(default)]
    pub flatrate: Vec<WatchOffer>,
}

/// Envelope of `GET /movie/{id}/watch/providers`
#[derive(Debug, Deserialize)]
pub struct WatchProvidersResponse {
    #[serde(default)]
    pub results: HashMap<String, RegionOffers>,
}

impl WatchProvidersResponse {
    /// Flatrate offers for `region`, empty when the region is absent
    pub fn flatrate_for(self, region: &str) -> Vec<WatchOffer> {
        self.results
            .into_iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(region))
            .map(|(_, offers)| offers.flatrate)
            .unwrap_or_default()
    }
}

/// A search result decorated with its streaming offers
///
/// This is also the movie descriptor the client posts back when saving a
/// movie to the watchlist, so it round-trips through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMovie {
    #[serde(flatten)]
    pub movie: CatalogMovie,
    #[serde(default)]
    pub offers: Vec<WatchOffer>,
}

impl EnrichedMovie {
    pub fn without_offers(movie: CatalogMovie) -> Self {
        Self {
            movie,
            offers: Vec::new(),
        }
    }
}

/// The enriched result set of the last search in a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: Vec<EnrichedMovie>,
}

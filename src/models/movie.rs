use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CatalogMovie;

/// A movie saved locally the first time any user adds it to a watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Movie {
    /// Local identifier
    pub id: i32,
    /// TMDB identifier, unique within the store
    pub catalog_id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`Movie`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub catalog_id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_year: Option<i32>,
}

impl From<&CatalogMovie> for NewMovie {
    fn from(movie: &CatalogMovie) -> Self {
        Self {
            catalog_id: movie.id,
            title: movie.title.trim().to_string(),
            overview: movie.overview.clone().filter(|o| !o.is_empty()),
            poster_path: movie.poster_path.clone(),
            release_year: movie.release_year(),
        }
    }
}

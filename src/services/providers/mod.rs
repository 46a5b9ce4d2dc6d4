/// Movie catalog provider abstraction
///
/// The catalog answers two questions: which movies match a free-text query,
/// and where a given movie can be streamed. TMDB is the only implementation;
/// the trait keeps handlers and tests independent of the HTTP client.
use crate::{
    error::AppResult,
    models::{CatalogMovie, WatchOffer},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search for movies by title
    ///
    /// Returns the first page of results in the catalog's relevance order.
    async fn search_movies(&self, query: &str) -> AppResult<Vec<CatalogMovie>>;

    /// Fetch the subscription ("flatrate") offers for one movie
    ///
    /// A movie with no entry for the configured region yields an empty list.
    /// A non-success response is an error.
    async fn fetch_watch_offers(&self, movie_id: i64) -> AppResult<Vec<WatchOffer>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

pub mod accounts;
pub mod enrichment;
pub mod movie_search;
pub mod providers;
pub mod ranking;
pub mod watchlist;

pub use providers::{CatalogProvider, TmdbProvider};

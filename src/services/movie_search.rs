use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{EnrichedMovie, SearchSnapshot},
    services::{enrichment::enrich_with_offers, providers::CatalogProvider, ranking::rank_by_popularity},
};

/// Runs the search pipeline: catalog search, popularity ranking, offer enrichment
///
/// A blank query yields no results without touching the catalog. A failed
/// catalog search is returned to the caller; failed offer lookups are not.
pub async fn search_movies(
    provider: Arc<dyn CatalogProvider>,
    query: &str,
) -> AppResult<Vec<EnrichedMovie>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let raw = provider.search_movies(query).await?;
    let ranked = rank_by_popularity(&raw);
    let enriched = enrich_with_offers(provider, ranked).await;

    tracing::info!(
        query = %query,
        results = enriched.len(),
        with_offers = enriched.iter().filter(|m| !m.offers.is_empty()).count(),
        "Search results enriched"
    );

    Ok(enriched)
}

/// Runs [`search_movies`] and packages the result for the session cache
pub async fn search_snapshot(
    provider: Arc<dyn CatalogProvider>,
    query: &str,
) -> AppResult<SearchSnapshot> {
    let results = search_movies(provider, query).await?;
    Ok(SearchSnapshot {
        query: query.trim().to_string(),
        results,
    })
}

use std::sync::Arc;

use crate::{
    models::{CatalogMovie, EnrichedMovie},
    services::providers::CatalogProvider,
};

/// Attaches streaming offers to every movie in `movies`
///
/// One lookup is spawned per movie and all of them are awaited before
/// returning. Output order and length match the input. A failed lookup, or a
/// task that panicked, leaves that movie with an empty offer list and never
/// affects its siblings.
pub async fn enrich_with_offers(
    provider: Arc<dyn CatalogProvider>,
    movies: Vec<CatalogMovie>,
) -> Vec<EnrichedMovie> {
    let mut tasks = Vec::with_capacity(movies.len());

    for movie in &movies {
        let provider = provider.clone();
        let movie_id = movie.id;
        let task = tokio::spawn(async move { provider.fetch_watch_offers(movie_id).await });
        tasks.push(task);
    }

    let mut enriched = Vec::with_capacity(movies.len());
    let mut failures = 0usize;

    for (movie, task) in movies.into_iter().zip(tasks) {
        let entry = match task.await {
            Ok(Ok(offers)) => EnrichedMovie { movie, offers },
            Ok(Err(e)) => {
                tracing::warn!(error = %e, movie_id = movie.id, "Watch offer lookup failed");
                failures += 1;
                EnrichedMovie::without_offers(movie)
            }
            Err(e) => {
                tracing::error!(error = %e, movie_id = movie.id, "Watch offer task join error");
                failures += 1;
                EnrichedMovie::without_offers(movie)
            }
        };
        enriched.push(entry);
    }

    if failures > 0 {
        tracing::warn!(
            total = enriched.len(),
            failed = failures,
            provider = provider.name(),
            "Partial watch offer enrichment"
        );
    }

    enriched
}

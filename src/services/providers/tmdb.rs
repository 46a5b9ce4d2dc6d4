/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Search: /search/movie?query=... → first page of matching movies
/// 2. Offers: /movie/{id}/watch/providers → offers keyed by region code
///
/// Both endpoints authenticate with a bearer read-access token.
use crate::{
    error::{AppError, AppResult},
    models::{CatalogMovie, SearchResponse, WatchOffer, WatchProvidersResponse},
    services::providers::CatalogProvider,
};
use reqwest::{Client as HttpClient, Response};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_token: String,
    api_url: String,
    region: String,
}

impl TmdbProvider {
    pub fn new(api_token: String, api_url: String, region: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_token,
            api_url: api_url.trim_end_matches('/').to_string(),
            region,
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search/movie", self.api_url)
    }

    fn watch_providers_url(&self, movie_id: i64) -> String {
        format!("{}/movie/{}/watch/providers", self.api_url, movie_id)
    }

    /// Converts a non-success status into `AppError::ExternalApi`
    async fn ensure_success(response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::ExternalApi(format!(
            "TMDB API returned status {}: {}",
            status, body
        )))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<CatalogMovie>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http_client
            .get(self.search_url())
            .bearer_auth(&self.api_token)
            .header("accept", "application/json")
            .query(&[
                ("query", query),
                ("include_adult", "false"),
                ("language", "en-US"),
                ("page", "1"),
            ])
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let search: SearchResponse = response.json().await?;

        tracing::info!(
            query = %query,
            results = search.results.len(),
            provider = self.name(),
            "Movie search completed"
        );

        Ok(search.results)
    }

    async fn fetch_watch_offers(&self, movie_id: i64) -> AppResult<Vec<WatchOffer>> {
        let response = self
            .http_client
            .get(self.watch_providers_url(movie_id))
            .bearer_auth(&self.api_token)
            .header("accept", "application/json")
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let providers: WatchProvidersResponse = response.json().await?;
        let offers = providers.flatrate_for(&self.region);

        tracing::debug!(
            movie_id,
            region = %self.region,
            offers = offers.len(),
            provider = self.name(),
            "Watch offers fetched"
        );

        Ok(offers)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Query,
        http::{header, HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Serves `app` on an ephemeral local port and returns its base URL
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", address)
    }

    fn provider_at(api_url: String) -> TmdbProvider {
        TmdbProvider::new("test_token".to_string(), api_url, "US".to_string())
    }

    fn create_test_provider() -> TmdbProvider {
        TmdbProvider::new(
            "test_token".to_string(),
            "http://test.local/3/".to_string(),
            "US".to_string(),
        )
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let provider = create_test_provider();
        assert_eq!(provider.search_url(), "http://test.local/3/search/movie");
        assert_eq!(
            provider.watch_providers_url(603),
            "http://test.local/3/movie/603/watch/providers"
        );
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_request() {
        // test.local is unresolvable, so any request would fail
        let provider = create_test_provider();
        let results = provider.search_movies("   ").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_an_error() {
        let provider = TmdbProvider::new(
            "test_token".to_string(),
            "http://127.0.0.1:9".to_string(),
            "US".to_string(),
        );
        let result = provider.fetch_watch_offers(603).await;
        assert!(matches!(result, Err(AppError::HttpClient(_))));
    }

    #[tokio::test]
    async fn test_non_success_status_is_external_api_error() {
        let app = Router::new()
            .route(
                "/movie/:id/watch/providers",
                get(|| async { (StatusCode::NOT_FOUND, "The resource could not be found.") }),
            )
            .route(
                "/search/movie",
                get(|| async { (StatusCode::UNAUTHORIZED, "Invalid API key") }),
            );
        let provider = provider_at(serve(app).await);

        let offers = provider.fetch_watch_offers(603).await;
        assert!(matches!(offers, Err(AppError::ExternalApi(ref m)) if m.contains("404")));

        let search = provider.search_movies("matrix").await;
        assert!(matches!(search, Err(AppError::ExternalApi(ref m)) if m.contains("401")));
    }

    #[tokio::test]
    async fn test_search_sends_token_and_query() {
        let app = Router::new().route(
            "/search/movie",
            get(
                |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                    let authorized = headers
                        .get(header::AUTHORIZATION)
                        .map(|v| v == "Bearer test_token")
                        .unwrap_or(false);
                    if !authorized || params.get("query").map(String::as_str) != Some("matrix") {
                        return (StatusCode::BAD_REQUEST, Json(json!({})));
                    }
                    let body = json!({
                        "page": 1,
                        "results": [
                            {"id": 603, "title": "The Matrix", "popularity": 50.0,
                             "release_date": "1999-03-31"}
                        ]
                    });
                    (StatusCode::OK, Json(body))
                },
            ),
        );
        let provider = provider_at(serve(app).await);

        let results = provider.search_movies("matrix").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 603);
        assert_eq!(results[0].release_year(), Some(1999));
    }

    #[tokio::test]
    async fn test_offers_only_for_configured_region() {
        let body: Value = json!({
            "id": 603,
            "results": {
                "GB": {"link": "https://example.com/gb", "flatrate": [{"provider_name": "Netflix"}]},
                "us": {"link": "https://example.com/us", "flatrate": [{"provider_name": "Hulu"}]}
            }
        });
        let other_region: Value = json!({
            "id": 604,
            "results": {
                "GB": {"flatrate": [{"provider_name": "Netflix"}]}
            }
        });
        let app = Router::new().route(
            "/movie/:id/watch/providers",
            get(move |axum::extract::Path(id): axum::extract::Path<i64>| {
                let body = if id == 603 { body.clone() } else { other_region.clone() };
                async move { Json(body) }
            }),
        );
        let provider = provider_at(serve(app).await);

        let offers = provider.fetch_watch_offers(603).await.unwrap();
        let names: Vec<&str> = offers.iter().map(|o| o.provider_name.as_str()).collect();
        assert_eq!(names, vec!["Hulu"]);

        assert!(provider.fetch_watch_offers(604).await.unwrap().is_empty());
    }
}

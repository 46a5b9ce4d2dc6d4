use std::collections::HashSet;

use serde::Serialize;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{
        streaming_service::is_known_service, EnrichedMovie, Movie, NewMovie, SearchSnapshot, Service,
        ServiceIcon,
    },
};

/// Outcome of saving a movie to a watchlist
#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistAddition {
    pub movie: Movie,
    pub movie_created: bool,
    pub like_created: bool,
    pub services_linked: usize,
}

/// A saved movie with the services the viewer can watch it on
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WatchlistEntry {
    pub movie: Movie,
    pub liked_at: chrono::DateTime<chrono::Utc>,
    pub services: Vec<ServiceIcon>,
}

/// Parses the movie descriptor posted from a search results page
///
/// The descriptor must carry a catalog id and a non-blank title.
pub fn parse_movie_descriptor(raw: &str) -> AppResult<EnrichedMovie> {
    let movie: EnrichedMovie = serde_json::from_str(raw)
        .map_err(|e| AppError::InvalidInput(format!("Unreadable movie descriptor: {}", e)))?;

    if movie.movie.title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Movie descriptor has no title".to_string(),
        ));
    }

    Ok(movie)
}

/// Resolves a posted descriptor to the matching entry of the cached search
///
/// Only the catalog id is taken from the client. The movie and its offers come
/// from the snapshot built by the server, so a posted offer list never reaches
/// the store.
pub fn select_from_search(
    snapshot: Option<&SearchSnapshot>,
    posted: &EnrichedMovie,
) -> AppResult<EnrichedMovie> {
    snapshot
        .and_then(|snapshot| {
            snapshot
                .results
                .iter()
                .find(|candidate| candidate.movie.id == posted.movie.id)
        })
        .cloned()
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Movie {} is not among the current search results",
                posted.movie.id
            ))
        })
}

/// Saves a movie to the user's watchlist
///
/// Each step is idempotent and committed on its own, so a repeated call
/// completes whatever an interrupted one left undone:
/// 1. find or create the movie by catalog id
/// 2. create the user's like if absent
/// 3. link the movie to every known service among its offers
pub async fn add_to_watchlist(
    store: &dyn Store,
    user_id: i32,
    selected: &EnrichedMovie,
) -> AppResult<WatchlistAddition> {
    let (movie, movie_created) = match store.movie_by_catalog_id(selected.movie.id).await? {
        Some(movie) => (movie, false),
        None => (store.create_movie(NewMovie::from(&selected.movie)).await?, true),
    };

    let like_created = if store.has_like(user_id, movie.id).await? {
        false
    } else {
        store.add_like(user_id, movie.id).await?
    };

    let mut services_linked = 0;
    let mut seen = HashSet::new();
    for offer in selected
        .offers
        .iter()
        .filter(|offer| is_known_service(&offer.provider_name))
    {
        if !seen.insert(offer.provider_name.as_str()) {
            continue;
        }
        let Some(service) = store.service_by_name(&offer.provider_name).await? else {
            tracing::warn!(service = %offer.provider_name, "Known service missing from store");
            continue;
        };
        if store.add_movie_service(movie.id, service.id).await? {
            services_linked += 1;
        }
    }

    tracing::info!(
        user_id,
        movie_id = movie.id,
        catalog_id = movie.catalog_id,
        movie_created,
        like_created,
        services_linked,
        "Movie added to watchlist"
    );

    Ok(WatchlistAddition {
        movie,
        movie_created,
        like_created,
        services_linked,
    })
}

/// Keeps the services the user subscribes to, preserving `available` order
pub fn owned_services(available: &[Service], subscribed: &HashSet<i32>) -> Vec<ServiceIcon> {
    available
        .iter()
        .filter(|service| subscribed.contains(&service.id))
        .map(ServiceIcon::from)
        .collect()
}

/// Builds the user's watchlist, each movie badged with the services they own
pub async fn watchlist_for(store: &dyn Store, user_id: i32) -> AppResult<Vec<WatchlistEntry>> {
    let subscribed: HashSet<i32> = store.user_service_ids(user_id).await?.into_iter().collect();
    let liked = store.liked_movies(user_id).await?;

    let mut entries = Vec::with_capacity(liked.len());
    for liked_movie in liked {
        let available = store.movie_services(liked_movie.movie.id).await?;
        entries.push(WatchlistEntry {
            services: owned_services(&available, &subscribed),
            movie: liked_movie.movie,
            liked_at: liked_movie.liked_at,
        });
    }

    Ok(entries)
}

/// Removes a movie from the user's watchlist
///
/// Fails with `AppError::NotFound` when the user has no like for the movie,
/// which also covers attempts on another user's like.
pub async fn remove_from_watchlist(store: &dyn Store, user_id: i32, movie_id: i32) -> AppResult<()> {
    if store.remove_like(user_id, movie_id).await? {
        tracing::info!(user_id, movie_id, "Movie removed from watchlist");
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "Movie {} is not on this watchlist",
            movie_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::{CatalogMovie, NewUser, WatchOffer},
    };

    fn offer(name: &str) -> WatchOffer {
        WatchOffer {
            provider_name: name.to_string(),
            provider_id: None,
            logo_path: None,
            display_priority: None,
        }
    }

    fn matrix(offers: Vec<WatchOffer>) -> EnrichedMovie {
        EnrichedMovie {
            movie: CatalogMovie {
                id: 603,
                title: "The Matrix".to_string(),
                overview: Some("Wake up, Neo.".to_string()),
                poster_path: Some("/matrix.jpg".to_string()),
                release_date: Some("1999-03-31".to_string()),
                popularity: 50.0,
            },
            offers,
        }
    }

    async fn create_user(store: &MemoryStore, name: &str) -> i32 {
        store
            .create_user(NewUser {
                username: name.to_string(),
                email: format!("{}@example.com", name),
                password_hash: "hash".to_string(),
                image_url: "/img.png".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    async fn service_id(store: &MemoryStore, name: &str) -> i32 {
        store.service_by_name(name).await.unwrap().unwrap().id
    }

    #[test]
    fn test_parse_descriptor() {
        let raw = r#"{"id": 603, "title": "The Matrix", "popularity": 50.0,
                      "offers": [{"provider_name": "Netflix"}]}"#;
        let movie = parse_movie_descriptor(raw).unwrap();
        assert_eq!(movie.movie.id, 603);
        assert_eq!(movie.offers, vec![offer("Netflix")]);
    }

    #[test]
    fn test_parse_descriptor_rejects_garbage() {
        assert!(matches!(
            parse_movie_descriptor("{not json"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_descriptor_rejects_missing_fields() {
        assert!(parse_movie_descriptor(r#"{"title": "No id"}"#).is_err());
        assert!(parse_movie_descriptor(r#"{"id": 1}"#).is_err());
        assert!(parse_movie_descriptor(r#"{"id": 1, "title": "  "}"#).is_err());
    }

    #[test]
    fn test_select_uses_cached_offers() {
        let snapshot = SearchSnapshot {
            query: "matrix".to_string(),
            results: vec![matrix(vec![offer("Hulu")])],
        };
        let forged = matrix(vec![offer("Netflix"), offer("Starz")]);

        let selected = select_from_search(Some(&snapshot), &forged).unwrap();
        assert_eq!(selected.offers, vec![offer("Hulu")]);
    }

    #[test]
    fn test_select_rejects_movie_outside_search() {
        let snapshot = SearchSnapshot {
            query: "matrix".to_string(),
            results: vec![matrix(vec![])],
        };
        let mut other = matrix(vec![]);
        other.movie.id = 999;

        assert!(matches!(
            select_from_search(Some(&snapshot), &other),
            Err(AppError::InvalidInput(_))
        ));
        assert!(select_from_search(None, &matrix(vec![])).is_err());
    }

    #[tokio::test]
    async fn test_add_creates_movie_like_and_known_subscriptions() {
        let store = MemoryStore::new();
        let user_id = create_user(&store, "alice").await;

        let selected = matrix(vec![offer("Netflix"), offer("Hulu"), offer("Mubi")]);
        let added = add_to_watchlist(&store, user_id, &selected).await.unwrap();

        assert!(added.movie_created);
        assert!(added.like_created);
        assert_eq!(added.services_linked, 2);
        assert_eq!(added.movie.catalog_id, 603);
        assert_eq!(added.movie.release_year, Some(1999));

        let names: Vec<String> = store
            .movie_services(added.movie.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Netflix", "Hulu"]);
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let store = MemoryStore::new();
        let user_id = create_user(&store, "alice").await;
        let selected = matrix(vec![offer("Netflix"), offer("Netflix")]);

        add_to_watchlist(&store, user_id, &selected).await.unwrap();
        let again = add_to_watchlist(&store, user_id, &selected).await.unwrap();

        assert!(!again.movie_created);
        assert!(!again.like_created);
        assert_eq!(again.services_linked, 0);
        assert_eq!(store.movie_count().await, 1);
        assert_eq!(store.like_count().await, 1);
        assert_eq!(store.movie_service_count().await, 1);
    }

    #[tokio::test]
    async fn test_second_user_reuses_movie() {
        let store = MemoryStore::new();
        let alice = create_user(&store, "alice").await;
        let bob = create_user(&store, "bob").await;
        let selected = matrix(vec![offer("Hulu")]);

        let first = add_to_watchlist(&store, alice, &selected).await.unwrap();
        let second = add_to_watchlist(&store, bob, &selected).await.unwrap();

        assert_eq!(first.movie.id, second.movie.id);
        assert!(!second.movie_created);
        assert!(second.like_created);
        assert_eq!(store.movie_count().await, 1);
        assert_eq!(store.like_count().await, 2);
        assert_eq!(store.movie_service_count().await, 1);
    }

    #[test]
    fn test_owned_services_filter() {
        let available = vec![
            Service {
                id: 2,
                name: "Netflix".to_string(),
                icon_url: "n.jpg".to_string(),
            },
            Service {
                id: 5,
                name: "Hulu".to_string(),
                icon_url: "h.jpg".to_string(),
            },
        ];
        let subscribed: HashSet<i32> = [2, 7].into_iter().collect();

        let icons = owned_services(&available, &subscribed);
        assert_eq!(icons.len(), 1);
        assert_eq!(icons[0].name, "Netflix");

        assert!(owned_services(&available, &HashSet::new()).is_empty());
    }

    #[tokio::test]
    async fn test_watchlist_shows_only_owned_services() {
        let store = MemoryStore::new();
        let user_id = create_user(&store, "alice").await;
        let netflix = service_id(&store, "Netflix").await;
        store.set_user_services(user_id, &[netflix]).await.unwrap();

        add_to_watchlist(&store, user_id, &matrix(vec![offer("Netflix"), offer("Hulu")]))
            .await
            .unwrap();

        let entries = watchlist_for(&store, user_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        let names: Vec<&str> = entries[0].services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Netflix"]);
    }

    #[tokio::test]
    async fn test_watchlist_movie_without_owned_service_has_no_icons() {
        let store = MemoryStore::new();
        let user_id = create_user(&store, "alice").await;
        let netflix = service_id(&store, "Netflix").await;
        store.set_user_services(user_id, &[netflix]).await.unwrap();

        add_to_watchlist(&store, user_id, &matrix(vec![offer("Hulu")]))
            .await
            .unwrap();

        let entries = watchlist_for(&store, user_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].services.is_empty());
    }

    #[tokio::test]
    async fn test_remove_own_like() {
        let store = MemoryStore::new();
        let user_id = create_user(&store, "alice").await;
        let added = add_to_watchlist(&store, user_id, &matrix(vec![])).await.unwrap();

        remove_from_watchlist(&store, user_id, added.movie.id)
            .await
            .unwrap();
        assert!(watchlist_for(&store, user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cannot_remove_another_users_like() {
        let store = MemoryStore::new();
        let alice = create_user(&store, "alice").await;
        let mallory = create_user(&store, "mallory").await;
        let added = add_to_watchlist(&store, alice, &matrix(vec![])).await.unwrap();

        let result = remove_from_watchlist(&store, mallory, added.movie.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store.has_like(alice, added.movie.id).await.unwrap());
    }
}

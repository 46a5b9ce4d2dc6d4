use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    db::{
        session::{SessionData, SessionId, SessionStore},
        store::{LikedMovie, Store},
    },
    error::{AppError, AppResult},
    models::{Movie, NewMovie, NewUser, Service, User, UserUpdate, KNOWN_SERVICES},
};

/// In-process [`Store`], seeded with the known services
///
/// Used by the test suite and for running the server without Postgres.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

/// Inner state that can be modified
struct MemoryStoreInner {
    next_user_id: i32,
    next_movie_id: i32,
    users: HashMap<i32, User>,
    services: Vec<Service>,
    movies: HashMap<i32, Movie>,
    movie_services: BTreeSet<(i32, i32)>,
    likes: HashMap<(i32, i32), DateTime<Utc>>,
    user_services: BTreeSet<(i32, i32)>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a store holding only the seeded services
    pub fn new() -> Self {
        let services = KNOWN_SERVICES
            .iter()
            .zip(1..)
            .map(|((name, icon_url), id)| Service {
                id,
                name: name.to_string(),
                icon_url: icon_url.to_string(),
            })
            .collect();

        Self {
            inner: Arc::new(RwLock::new(MemoryStoreInner {
                next_user_id: 1,
                next_movie_id: 1,
                users: HashMap::new(),
                services,
                movies: HashMap::new(),
                movie_services: BTreeSet::new(),
                likes: HashMap::new(),
                user_services: BTreeSet::new(),
            })),
        }
    }

    /// Number of stored (movie, service) pairs
    pub async fn movie_service_count(&self) -> usize {
        self.inner.read().await.movie_services.len()
    }

    /// Number of stored movies
    pub async fn movie_count(&self) -> usize {
        self.inner.read().await.movies.len()
    }

    /// Number of stored likes
    pub async fn like_count(&self) -> usize {
        self.inner.read().await.likes.len()
    }
}

impl MemoryStoreInner {
    fn identity_taken(&self, except: Option<i32>, username: &str, email: &str) -> bool {
        self.users
            .values()
            .filter(|u| Some(u.id) != except)
            .any(|u| u.username == username || u.email == email)
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.identity_taken(None, &user.username, &user.email) {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let id = inner.next_user_id;
        inner.next_user_id += 1;

        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            image_url: user.image_url,
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, id: i32, update: UserUpdate) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.identity_taken(Some(id), &update.username, &update.email) {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User {}", id)))?;
        user.username = update.username;
        user.email = update.email;
        user.image_url = update.image_url;
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i32) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        inner.likes.retain(|(user_id, _), _| *user_id != id);
        inner.user_services.retain(|(user_id, _)| *user_id != id);
        Ok(true)
    }

    async fn list_services(&self) -> AppResult<Vec<Service>> {
        Ok(self.inner.read().await.services.clone())
    }

    async fn service_by_name(&self, name: &str) -> AppResult<Option<Service>> {
        let inner = self.inner.read().await;
        Ok(inner.services.iter().find(|s| s.name == name).cloned())
    }

    async fn user_service_ids(&self, user_id: i32) -> AppResult<Vec<i32>> {
        let inner = self.inner.read().await;
        Ok(inner
            .user_services
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, service_id)| *service_id)
            .collect())
    }

    async fn set_user_services(&self, user_id: i32, service_ids: &[i32]) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let known: Vec<i32> = service_ids
            .iter()
            .copied()
            .filter(|id| inner.services.iter().any(|s| s.id == *id))
            .collect();

        inner.user_services.retain(|(uid, _)| *uid != user_id);
        for service_id in known {
            inner.user_services.insert((user_id, service_id));
        }
        Ok(())
    }

    async fn movie_by_catalog_id(&self, catalog_id: i64) -> AppResult<Option<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner
            .movies
            .values()
            .find(|m| m.catalog_id == catalog_id)
            .cloned())
    }

    async fn create_movie(&self, movie: NewMovie) -> AppResult<Movie> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner
            .movies
            .values()
            .find(|m| m.catalog_id == movie.catalog_id)
        {
            return Ok(existing.clone());
        }

        let id = inner.next_movie_id;
        inner.next_movie_id += 1;

        let movie = Movie {
            id,
            catalog_id: movie.catalog_id,
            title: movie.title,
            overview: movie.overview,
            poster_path: movie.poster_path,
            release_year: movie.release_year,
            created_at: Utc::now(),
        };
        inner.movies.insert(id, movie.clone());
        Ok(movie)
    }

    async fn movie_services(&self, movie_id: i32) -> AppResult<Vec<Service>> {
        let inner = self.inner.read().await;
        Ok(inner
            .services
            .iter()
            .filter(|s| inner.movie_services.contains(&(movie_id, s.id)))
            .cloned()
            .collect())
    }

    async fn add_movie_service(&self, movie_id: i32, service_id: i32) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if !inner.movies.contains_key(&movie_id) {
            return Err(AppError::NotFound(format!("Movie {}", movie_id)));
        }
        Ok(inner.movie_services.insert((movie_id, service_id)))
    }

    async fn has_like(&self, user_id: i32, movie_id: i32) -> AppResult<bool> {
        Ok(self
            .inner
            .read()
            .await
            .likes
            .contains_key(&(user_id, movie_id)))
    }

    async fn add_like(&self, user_id: i32, movie_id: i32) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("User {}", user_id)));
        }
        if !inner.movies.contains_key(&movie_id) {
            return Err(AppError::NotFound(format!("Movie {}", movie_id)));
        }
        if inner.likes.contains_key(&(user_id, movie_id)) {
            return Ok(false);
        }
        inner.likes.insert((user_id, movie_id), Utc::now());
        Ok(true)
    }

    async fn remove_like(&self, user_id: i32, movie_id: i32) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.likes.remove(&(user_id, movie_id)).is_some())
    }

    async fn liked_movies(&self, user_id: i32) -> AppResult<Vec<LikedMovie>> {
        let inner = self.inner.read().await;
        let mut liked: Vec<LikedMovie> = inner
            .likes
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .filter_map(|((_, movie_id), liked_at)| {
                inner.movies.get(movie_id).map(|movie| LikedMovie {
                    movie: movie.clone(),
                    liked_at: *liked_at,
                })
            })
            .collect();

        liked.sort_by(|a, b| {
            b.liked_at
                .cmp(&a.liked_at)
                .then_with(|| b.movie.id.cmp(&a.movie.id))
        });
        Ok(liked)
    }
}

/// In-process [`SessionStore`]
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionData>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> AppResult<Option<SessionData>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn save(&self, id: &SessionId, data: &SessionData) -> AppResult<()> {
        self.sessions.write().await.insert(id.clone(), data.clone());
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> AppResult<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}

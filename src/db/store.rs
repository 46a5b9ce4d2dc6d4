use crate::{
    error::AppResult,
    models::{Movie, NewMovie, NewUser, Service, User, UserUpdate},
};

/// A liked movie together with when it was liked
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LikedMovie {
    #[sqlx(flatten)]
    pub movie: Movie,
    pub liked_at: chrono::DateTime<chrono::Utc>,
}

/// Persistence seam for accounts, movies, services and the relations between them
///
/// Every insert that models a relation is idempotent and reports whether a
/// row was actually created.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // Users

    /// Creates a user. Fails with `AppError::Conflict` on a duplicate username or email.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>>;

    async fn user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Fails with `AppError::Conflict` on a duplicate username or email.
    async fn update_user(&self, id: i32, update: UserUpdate) -> AppResult<User>;

    /// Deletes a user with their likes and subscriptions. Returns false if absent.
    async fn delete_user(&self, id: i32) -> AppResult<bool>;

    // Services

    /// All services in seed order
    async fn list_services(&self) -> AppResult<Vec<Service>>;

    async fn service_by_name(&self, name: &str) -> AppResult<Option<Service>>;

    /// Ids of the services the user personally subscribes to
    async fn user_service_ids(&self, user_id: i32) -> AppResult<Vec<i32>>;

    /// Replaces the user's subscriptions. Unknown service ids are ignored.
    async fn set_user_services(&self, user_id: i32, service_ids: &[i32]) -> AppResult<()>;

    // Movies

    async fn movie_by_catalog_id(&self, catalog_id: i64) -> AppResult<Option<Movie>>;

    /// Creates a movie, returning the existing row if the catalog id is already stored
    async fn create_movie(&self, movie: NewMovie) -> AppResult<Movie>;

    /// Services a movie is available on, in service order
    async fn movie_services(&self, movie_id: i32) -> AppResult<Vec<Service>>;

    /// Inserts the (movie, service) pair if absent
    async fn add_movie_service(&self, movie_id: i32, service_id: i32) -> AppResult<bool>;

    // Likes

    async fn has_like(&self, user_id: i32, movie_id: i32) -> AppResult<bool>;

    /// Inserts the (user, movie) like if absent
    async fn add_like(&self, user_id: i32, movie_id: i32) -> AppResult<bool>;

    /// Deletes the (user, movie) like. Returns false if the user had no such like.
    async fn remove_like(&self, user_id: i32, movie_id: i32) -> AppResult<bool>;

    /// The user's liked movies, most recently liked first
    async fn liked_movies(&self, user_id: i32) -> AppResult<Vec<LikedMovie>>;
}

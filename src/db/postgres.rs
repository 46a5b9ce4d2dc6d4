use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::store::{LikedMovie, Store},
    error::{AppError, AppResult},
    models::{Movie, NewMovie, NewUser, Service, User, UserUpdate},
};

const USER_COLUMNS: &str = "id, username, email, password_hash, image_url, created_at";
const MOVIE_COLUMNS: &str =
    "id, catalog_id, title, overview, poster_path, release_year, created_at";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations, seeding the service catalog
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Maps unique violations to `AppError::Conflict`
fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Postgres-backed [`Store`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, image_url) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Username already taken"))
    }

    async fn user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, id: i32, update: UserUpdate) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET username = $2, email = $3, image_url = $4 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.username)
        .bind(&update.email)
        .bind(&update.image_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Username already taken"))?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))
    }

    async fn delete_user(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_services(&self) -> AppResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT id, name, icon_url FROM services ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    async fn service_by_name(&self, name: &str) -> AppResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>(
            "SELECT id, name, icon_url FROM services WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    async fn user_service_ids(&self, user_id: i32) -> AppResult<Vec<i32>> {
        let ids = sqlx::query_scalar::<_, i32>(
            "SELECT service_id FROM user_services WHERE user_id = $1 ORDER BY service_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn set_user_services(&self, user_id: i32, service_ids: &[i32]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_services WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        // Ids that match no service row are dropped by the join
        sqlx::query(
            "INSERT INTO user_services (user_id, service_id) \
             SELECT $1, s.id FROM services s WHERE s.id = ANY($2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(service_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn movie_by_catalog_id(&self, catalog_id: i64) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE catalog_id = $1"
        ))
        .bind(catalog_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(movie)
    }

    async fn create_movie(&self, movie: NewMovie) -> AppResult<Movie> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let movie = sqlx::query_as::<_, Movie>(&format!(
            "INSERT INTO movies (catalog_id, title, overview, poster_path, release_year) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (catalog_id) DO UPDATE SET catalog_id = EXCLUDED.catalog_id \
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(movie.catalog_id)
        .bind(&movie.title)
        .bind(&movie.overview)
        .bind(&movie.poster_path)
        .bind(movie.release_year)
        .fetch_one(&self.pool)
        .await?;
        Ok(movie)
    }

    async fn movie_services(&self, movie_id: i32) -> AppResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT s.id, s.name, s.icon_url FROM services s \
             JOIN movie_services ms ON ms.service_id = s.id \
             WHERE ms.movie_id = $1 ORDER BY s.id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    async fn add_movie_service(&self, movie_id: i32, service_id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO movie_services (movie_id, service_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(movie_id)
        .bind(service_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn has_like(&self, user_id: i32, movie_id: i32) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_likes_movies WHERE user_id = $1 AND movie_id = $2)",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn add_like(&self, user_id: i32, movie_id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO user_likes_movies (user_id, movie_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_like(&self, user_id: i32, movie_id: i32) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM user_likes_movies WHERE user_id = $1 AND movie_id = $2")
                .bind(user_id)
                .bind(movie_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn liked_movies(&self, user_id: i32) -> AppResult<Vec<LikedMovie>> {
        let movies = sqlx::query_as::<_, LikedMovie>(
            "SELECT m.id, m.catalog_id, m.title, m.overview, m.poster_path, m.release_year, \
                    m.created_at, l.liked_at \
             FROM movies m JOIN user_likes_movies l ON l.movie_id = m.id \
             WHERE l.user_id = $1 ORDER BY l.liked_at DESC, m.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }
}

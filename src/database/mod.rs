use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{query, query_as, query_scalar, SqlitePool};

use crate::models::{Favorite, User};
use crate::utils::AppError;

type Result<T> = std::result::Result<T, sqlx::Error>;

/// Relational store for users and their favorites.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(url: &str, max_connections: u32) -> std::result::Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Connects, retrying a fixed number of times with a fixed delay while
    /// the store is not reachable yet. Gives up with the last error.
    pub async fn connect_with_retry(
        url: &str,
        max_connections: u32,
        retries: u32,
        delay: Duration,
    ) -> std::result::Result<Self, AppError> {
        let mut retries_left = retries.max(1);

        loop {
            match Self::connect(url, max_connections).await {
                Ok(db) => {
                    log::info!("✅ Connected to database");
                    return Ok(db);
                }
                Err(e) => {
                    retries_left -= 1;
                    log::error!("❌ Database connection failed: {}", e);
                    log::warn!("🔁 {} retries left", retries_left);

                    if retries_left == 0 {
                        return Err(e);
                    }

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Single-connection in-memory database; each connection to
    /// `sqlite::memory:` is its own database, so the pool must never recycle it.
    pub async fn in_memory() -> std::result::Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    async fn migrate(&self) -> std::result::Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        log::debug!("🔧 Database migrations applied");
        Ok(())
    }

    pub async fn ping(&self) -> bool {
        query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// ==================== USERS ====================

impl Database {
    pub async fn find_user(&self, id: i64) -> Result<Option<User>> {
        query_as::<_, User>("SELECT id, email, username, password FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_user_with_favorites(&self, id: i64) -> Result<Option<User>> {
        let Some(mut user) = self.find_user(id).await? else {
            return Ok(None);
        };

        user.favorites = self.favorites_for_user(id).await?;
        Ok(Some(user))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        query_as::<_, User>("SELECT id, email, username, password FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn user_id_by_email(&self, email: &str) -> Result<Option<i64>> {
        query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn user_id_by_username(&self, username: &str) -> Result<Option<i64>> {
        query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let mut users =
            query_as::<_, User>("SELECT id, email, username, password FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        let mut favorites: HashMap<i64, Vec<Favorite>> = HashMap::new();
        for favorite in self.all_favorites().await? {
            favorites.entry(favorite.user_id).or_default().push(favorite);
        }

        for user in &mut users {
            user.favorites = favorites.remove(&user.id).unwrap_or_default();
        }

        Ok(users)
    }

    /// `password` must already be hashed.
    pub async fn insert_user(&self, email: &str, username: &str, password: &str) -> Result<User> {
        query_as::<_, User>(
            "
            INSERT INTO users (email, username, password)
            VALUES (?, ?, ?)
            RETURNING id, email, username, password
            ",
        )
        .bind(email)
        .bind(username)
        .bind(password)
        .fetch_one(&self.pool)
        .await
    }

    /// `None` keeps the stored value. Returns the number of rows touched.
    pub async fn update_user(
        &self,
        id: i64,
        email: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<u64> {
        query(
            "
            UPDATE users
            SET email = coalesce(?, email),
                username = coalesce(?, username),
                password = coalesce(?, password)
            WHERE id = ?
            ",
        )
        .bind(email)
        .bind(username)
        .bind(password)
        .bind(id)
        .execute(&self.pool)
        .await
        .map(|done| done.rows_affected())
    }

    /// Favorites go with the user (ON DELETE CASCADE).
    pub async fn delete_user(&self, id: i64) -> Result<u64> {
        query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|done| done.rows_affected())
    }
}

// ==================== FAVORITES ====================

impl Database {
    pub async fn favorites_for_user(&self, user_id: i64) -> Result<Vec<Favorite>> {
        query_as::<_, Favorite>(
            "SELECT id, user_id, movie_id FROM favorites WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn all_favorites(&self) -> Result<Vec<Favorite>> {
        query_as::<_, Favorite>("SELECT id, user_id, movie_id FROM favorites ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    /// Idempotent per (user, movie): favoriting twice returns the existing row.
    pub async fn insert_favorite(&self, user_id: i64, movie_id: i64) -> Result<Favorite> {
        query(
            "
            INSERT INTO favorites (user_id, movie_id)
            VALUES (?, ?)
            ON CONFLICT (user_id, movie_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await?;

        query_as::<_, Favorite>(
            "SELECT id, user_id, movie_id FROM favorites WHERE user_id = ? AND movie_id = ?",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Removes the movie from every user's favorites.
    pub async fn delete_favorites_by_movie(&self, movie_id: i64) -> Result<u64> {
        query("DELETE FROM favorites WHERE movie_id = ?")
            .bind(movie_id)
            .execute(&self.pool)
            .await
            .map(|done| done.rows_affected())
    }
}

use std::{collections::HashMap, sync::Arc};

use sea_orm::{DatabaseConnection, EntityTrait};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::Movie,
    tmdb::TmdbClient,
};

/// Fetch-or-reuse store for catalog movies.
#[derive(Clone)]
pub struct CatalogCache {
    db: DatabaseConnection,
    tmdb: Arc<TmdbClient>,
    sync_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl CatalogCache {
    pub fn new(db: DatabaseConnection, tmdb: Arc<TmdbClient>) -> Self {
        Self { db, tmdb, sync_locks: Arc::default() }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn get_movie(&self, movie_id: &str) -> AppResult<Option<Movie>> {
        let model = movie::Entity::find_by_id(movie_id.to_string()).one(&self.db).await?;
        model.map(Movie::try_from).transpose()
    }

    /// Returns the stored movie, synchronizing it from the catalog on first use.
    ///
    /// Concurrent calls for the same id share one synchronization: the second
    /// caller waits on the per-id lock and then finds the stored row.
    pub async fn resolve(&self, movie_id: &str) -> AppResult<Movie> {
        let movie_id = movie_id.trim();
        if movie_id.is_empty() {
            return Err(AppError::InvalidRequest("movieId is required".to_string()));
        }

        if let Some(movie) = self.get_movie(movie_id).await? {
            debug!(movie_id = %movie_id, "movie already cached");
            return Ok(movie);
        }

        let lock = self.sync_lock(movie_id).await;
        let _guard = lock.lock().await;

        if let Some(movie) = self.get_movie(movie_id).await? {
            debug!(movie_id = %movie_id, "movie cached by concurrent request");
            return Ok(movie);
        }

        let movie = self.tmdb.movie(movie_id).await?;

        match self.insert_movie(&movie).await {
            Ok(()) => {
                debug!(movie_id = %movie_id, title = %movie.title, "movie synchronized");
                Ok(movie)
            },
            Err(AppError::Conflict(msg)) => {
                debug!(
                    movie_id = %movie_id,
                    conflict = %msg,
                    "movie inserted elsewhere, reusing row"
                );
                self.get_movie(movie_id)
                    .await?
                    .ok_or_else(|| AppError::MovieNotFound(movie_id.to_string()))
            },
            Err(err) => Err(err),
        }
    }

    /// Plain insert; a duplicate id comes back as [`AppError::Conflict`].
    pub async fn insert_movie(&self, movie: &Movie) -> AppResult<()> {
        movie::Entity::insert(movie.to_active_model()?).exec(&self.db).await?;
        Ok(())
    }

    async fn sync_lock(&self, movie_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.sync_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(movie_id.to_string()).or_default().clone()
    }
}

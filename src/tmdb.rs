use futures::future::try_join;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::TmdbConfig,
    error::AppResult,
    fetch::RetryingFetcher,
    models::{Movie, MovieCredits, MovieDetails, NowPlayingResponse},
};

pub struct TmdbClient {
    fetcher: RetryingFetcher,
    base_url: String,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, config: &TmdbConfig) -> Self {
        let fetcher =
            RetryingFetcher::new(client, config.access_token.clone(), config.fetch, config.rps);
        Self { fetcher, base_url: config.base_url.trim_end_matches('/').to_string() }
    }

    pub async fn now_playing(&self) -> AppResult<Vec<Value>> {
        let url = format!("{}/movie/now_playing", self.base_url);
        let resp: NowPlayingResponse = self.fetcher.fetch_json(&url).await?;
        Ok(resp.results)
    }

    pub async fn movie_details(&self, movie_id: &str) -> AppResult<MovieDetails> {
        let url = format!("{}/movie/{}", self.base_url, urlencoding::encode(movie_id));
        self.fetcher.fetch_json(&url).await
    }

    pub async fn movie_credits(&self, movie_id: &str) -> AppResult<MovieCredits> {
        let url = format!("{}/movie/{}/credits", self.base_url, urlencoding::encode(movie_id));
        self.fetcher.fetch_json(&url).await
    }

    /// Details and credits are requested concurrently; either failing fails both.
    pub async fn movie(&self, movie_id: &str) -> AppResult<Movie> {
        debug!(movie_id = %movie_id, "fetching movie from catalog");
        let (details, credits) =
            try_join(self.movie_details(movie_id), self.movie_credits(movie_id)).await?;
        Ok(Movie::from_catalog(movie_id, details, credits))
    }
}

use sea_orm::{ConnectOptions, DatabaseConnection, EntityTrait};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::{
    config::{FetchConfig, TmdbConfig},
    db,
    entities::movie,
    models::{Genre, Movie},
    tmdb::TmdbClient,
};

pub async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    db::connect_and_migrate(opts).await.expect("in-memory database")
}

pub fn fast_fetch_config() -> FetchConfig {
    FetchConfig { timeout_ms: 2_000, max_attempts: 3, initial_backoff_ms: 5, backoff_multiplier: 2 }
}

pub fn tmdb_client(base_url: &str) -> TmdbClient {
    let config = TmdbConfig {
        base_url: base_url.to_string(),
        access_token: "token".to_string(),
        rps: 1_000,
        fetch: fast_fetch_config(),
    };
    TmdbClient::new(reqwest::Client::new(), &config)
}

pub fn details_body(title: &str) -> Value {
    json!({
        "id": 550,
        "title": title,
        "overview": "An insomniac office worker and a soap maker form an underground fight club.",
        "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
        "backdrop_path": "/hZkgoQYus5vegHoetLkCJzb17zJ.jpg",
        "genres": [{ "id": 18, "name": "Drama" }],
        "release_date": "1999-10-15",
        "original_language": "en",
        "tagline": null,
        "vote_average": 8.4,
        "runtime": 139
    })
}

pub fn credits_body() -> Value {
    json!({
        "id": 550,
        "cast": [
            { "id": 819, "name": "Edward Norton", "character": "The Narrator" },
            { "id": 287, "name": "Brad Pitt", "character": "Tyler Durden" }
        ],
        "crew": []
    })
}

/// Serves details and credits for `movie_id`, each expected `calls` times.
pub async fn mount_movie(server: &MockServer, movie_id: &str, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/movie/{movie_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(details_body("Fight Club")))
        .expect(calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/movie/{movie_id}/credits")))
        .respond_with(ResponseTemplate::new(200).set_body_json(credits_body()))
        .expect(calls)
        .mount(server)
        .await;
}

pub fn sample_movie(id: &str) -> Movie {
    Movie {
        id: id.to_string(),
        title: format!("Movie {id}"),
        overview: "A film.".to_string(),
        poster_path: Some(format!("/{id}.jpg")),
        backdrop_path: None,
        genres: vec![Genre { id: 18, name: "Drama".to_string() }],
        casts: vec![json!({ "name": "Someone" })],
        release_date: "2024-01-01".to_string(),
        original_language: "en".to_string(),
        tagline: String::new(),
        vote_average: 7.5,
        runtime: 120,
    }
}

pub async fn seed_movie(db: &DatabaseConnection, id: &str) -> Movie {
    let movie = sample_movie(id);
    movie::Entity::insert(movie.to_active_model().expect("active model"))
        .exec(db)
        .await
        .expect("seed movie");
    movie
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};

use crate::{
    AppState, availability,
    error::{AppError, AppResult},
    models::{
        AddShowRequest, MessageBody, NowPlayingBody, OccupiedSeatsBody, ShowBody, ShowListBody,
    },
    scheduler,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/show/now-playing", get(now_playing))
        .route("/api/show/add", post(add_show))
        .route("/api/show/all", get(list_shows))
        .route("/api/show/{movie_id}", get(get_show))
        .route("/api/booking/seats/{show_id}", get(occupied_seats))
        .with_state(state)
}

pub async fn now_playing(State(state): State<Arc<AppState>>) -> AppResult<Json<NowPlayingBody>> {
    let movies = state.tmdb.now_playing().await?;
    Ok(Json(NowPlayingBody { success: true, movies }))
}

pub async fn add_show(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AddShowRequest>, JsonRejection>,
) -> AppResult<Json<MessageBody>> {
    let Json(req) = body.map_err(|err| AppError::InvalidRequest(err.body_text()))?;

    let created =
        scheduler::create_shows(&state.cache, &req.movie_id, &req.shows_input, req.show_price)
            .await?;

    let message = format!("{created} show(s) added successfully.");
    Ok(Json(MessageBody { success: true, message }))
}

pub async fn list_shows(State(state): State<Arc<AppState>>) -> AppResult<Json<ShowListBody>> {
    let shows = availability::upcoming_movies(&state.db, jiff::Timestamp::now()).await?;
    Ok(Json(ShowListBody { success: true, shows }))
}

pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<ShowBody>> {
    let availability =
        availability::movie_availability(&state.db, &movie_id, jiff::Timestamp::now()).await?;
    Ok(Json(ShowBody { success: true, movie: availability.movie, date_time: availability.slots }))
}

pub async fn occupied_seats(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<String>,
) -> AppResult<Json<OccupiedSeatsBody>> {
    let show_id: i32 = show_id
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidRequest(format!("invalid show id {show_id:?}")))?;
    let occupied_seats = availability::occupied_seats(&state.db, show_id).await?;
    Ok(Json(OccupiedSeatsBody { success: true, occupied_seats }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::MockServer;

    use super::*;
    use crate::{cache::CatalogCache, test_support};

    async fn app(server: &MockServer) -> Router {
        let db = test_support::memory_db().await;
        let tmdb = Arc::new(test_support::tmdb_client(&server.uri()));
        let cache = CatalogCache::new(db.clone(), tmdb.clone());
        router(Arc::new(AppState { db, tmdb, cache }))
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.expect("response");
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn add_then_read_back_future_shows() {
        let server = MockServer::start().await;
        test_support::mount_movie(&server, "550", 1).await;
        let app = app(&server).await;

        let (status, body) = call(
            &app,
            post_json(
                "/api/show/add",
                json!({
                    "movieId": "550",
                    "showsInput": [
                        { "date": "2999-05-01", "time": ["14:00", "18:00"] },
                        { "date": "2999-05-02", "time": ["20:00"] }
                    ],
                    "showPrice": 12.5
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = call(&app, get("/api/show/550")).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["movie"]["title"], "Fight Club");
        assert_eq!(body["dateTime"]["2999-05-01"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["dateTime"]["2999-05-01"][0]["time"], "2999-05-01T14:00:00Z");
        assert!(body["dateTime"]["2999-05-02"][0]["showId"].is_i64());

        let (_, body) = call(&app, get("/api/show/all")).await;
        assert_eq!(body["shows"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["shows"][0]["id"], "550");
    }

    #[tokio::test]
    async fn failures_are_reported_in_the_body() {
        let server = MockServer::start().await;
        let app = app(&server).await;

        let (status, body) = call(&app, get("/api/show/12345")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "movie 12345 not found");
    }

    #[tokio::test]
    async fn malformed_request_body_is_a_failure_body() {
        let server = MockServer::start().await;
        let app = app(&server).await;

        let req = post_json("/api/show/add", json!({ "movieId": "550" }));
        let (status, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn invalid_show_id_is_a_failure_body() {
        let server = MockServer::start().await;
        let app = app(&server).await;

        let (status, body) = call(&app, get("/api/booking/seats/abc")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};

use crate::{fetch::FetchError, models::FailureBody};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed catalog response from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("movie {0} not found")]
    MovieNotFound(String),

    #[error("show {0} not found")]
    ShowNotFound(i32),

    #[error("invalid show slot {date} {time}: {source}")]
    InvalidSlot {
        date: String,
        time: String,
        #[source]
        source: jiff::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A row with the same key already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Db(DbErr),

    #[error("stored data could not be decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Time(#[from] jiff::Error),
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::Conflict(msg),
            _ => Self::Db(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "request failed");
        (StatusCode::OK, Json(FailureBody::new(self.to_string()))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_db_errors_are_not_conflicts() {
        let err = DbErr::Custom("not a constraint".to_string());
        assert!(matches!(AppError::from(err), AppError::Db(_)));
    }

    #[tokio::test]
    async fn failures_render_as_success_false_with_ok_status() {
        let resp = AppError::MovieNotFound("42".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "movie 42 not found");
    }
}

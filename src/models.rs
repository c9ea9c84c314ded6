use std::collections::{BTreeMap, HashMap};

use jiff::Timestamp;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{entities::movie, error::AppResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// A catalog movie as stored locally.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genres: Vec<Genre>,
    /// Cast entries exactly as the catalog returned them.
    pub casts: Vec<Value>,
    pub release_date: String,
    pub original_language: String,
    pub tagline: String,
    pub vote_average: f64,
    pub runtime: i32,
}

impl Movie {
    pub fn from_catalog(id: &str, details: MovieDetails, credits: MovieCredits) -> Self {
        Self {
            id: id.to_string(),
            title: details.title,
            overview: details.overview,
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            genres: details.genres,
            casts: credits.cast,
            release_date: details.release_date,
            original_language: details.original_language,
            tagline: details.tagline.unwrap_or_default(),
            vote_average: details.vote_average,
            runtime: details.runtime,
        }
    }

    pub fn to_active_model(&self) -> AppResult<movie::ActiveModel> {
        Ok(movie::ActiveModel {
            id: Set(self.id.clone()),
            title: Set(self.title.clone()),
            overview: Set(self.overview.clone()),
            poster_path: Set(self.poster_path.clone()),
            backdrop_path: Set(self.backdrop_path.clone()),
            genres: Set(serde_json::to_value(&self.genres)?),
            casts: Set(Value::Array(self.casts.clone())),
            release_date: Set(self.release_date.clone()),
            original_language: Set(self.original_language.clone()),
            tagline: Set(self.tagline.clone()),
            vote_average: Set(self.vote_average),
            runtime: Set(self.runtime),
        })
    }
}

impl TryFrom<movie::Model> for Movie {
    type Error = crate::error::AppError;

    fn try_from(model: movie::Model) -> AppResult<Self> {
        Ok(Self {
            id: model.id,
            title: model.title,
            overview: model.overview,
            poster_path: model.poster_path,
            backdrop_path: model.backdrop_path,
            genres: serde_json::from_value(model.genres)?,
            casts: serde_json::from_value(model.casts)?,
            release_date: model.release_date,
            original_language: model.original_language,
            tagline: model.tagline,
            vote_average: model.vote_average,
            runtime: model.runtime,
        })
    }
}

/// `GET movie/{id}`
#[derive(Debug, Deserialize)]
pub struct MovieDetails {
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genres: Vec<Genre>,
    pub release_date: String,
    pub original_language: String,
    pub tagline: Option<String>,
    pub vote_average: f64,
    pub runtime: i32,
}

/// `GET movie/{id}/credits`
#[derive(Debug, Deserialize)]
pub struct MovieCredits {
    pub cast: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct NowPlayingResponse {
    pub results: Vec<Value>,
}

/// One date of a scheduling request with its times of day.
#[derive(Clone, Debug, Deserialize)]
pub struct ScheduleEntry {
    pub date: String,
    #[serde(rename = "time")]
    pub times: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddShowRequest {
    pub movie_id: String,
    pub shows_input: Vec<ScheduleEntry>,
    pub show_price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowSlot {
    pub time: Timestamp,
    pub show_id: i32,
}

/// Upcoming slots of one movie keyed by UTC calendar date (`YYYY-MM-DD`).
pub type SlotsByDate = BTreeMap<String, Vec<ShowSlot>>;

#[derive(Clone, Debug)]
pub struct Availability {
    pub movie: Movie,
    pub slots: SlotsByDate,
}

/// Seat id -> booking reference.
pub type SeatMap = HashMap<String, String>;

#[derive(Debug, Serialize)]
pub struct FailureBody {
    success: bool,
    message: String,
}

impl FailureBody {
    pub fn new(message: String) -> Self {
        Self { success: false, message }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct NowPlayingBody {
    pub success: bool,
    pub movies: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct ShowListBody {
    pub success: bool,
    pub shows: Vec<Movie>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowBody {
    pub success: bool,
    pub movie: Movie,
    pub date_time: SlotsByDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupiedSeatsBody {
    pub success: bool,
    pub occupied_seats: Vec<String>,
}

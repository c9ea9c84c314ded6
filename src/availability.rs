use std::collections::HashSet;

use jiff::{Timestamp, tz::TimeZone};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use crate::{
    entities::{movie, show},
    error::{AppError, AppResult},
    models::{Availability, Movie, SeatMap, ShowSlot, SlotsByDate},
};

/// Movies with at least one show at or after `now`, each listed once.
///
/// Ordered by each movie's earliest upcoming show.
pub async fn upcoming_movies(db: &DatabaseConnection, now: Timestamp) -> AppResult<Vec<Movie>> {
    let rows = show::Entity::find()
        .filter(show::Column::ShowDateTime.gte(now.as_second()))
        .order_by_asc(show::Column::ShowDateTime)
        .find_also_related(movie::Entity)
        .all(db)
        .await?;

    let mut seen = HashSet::new();
    let mut movies = Vec::new();
    for (show, movie) in rows {
        let Some(movie) = movie else {
            debug!(show_id = show.id, movie_id = %show.movie_id, "show without movie, skipping");
            continue;
        };
        if seen.insert(movie.id.clone()) {
            movies.push(Movie::try_from(movie)?);
        }
    }

    Ok(movies)
}

/// A movie and its upcoming shows grouped by UTC calendar date.
pub async fn movie_availability(
    db: &DatabaseConnection,
    movie_id: &str,
    now: Timestamp,
) -> AppResult<Availability> {
    let movie = movie::Entity::find_by_id(movie_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| AppError::MovieNotFound(movie_id.to_string()))?;

    let shows = show::Entity::find()
        .filter(show::Column::MovieId.eq(movie_id))
        .filter(show::Column::ShowDateTime.gte(now.as_second()))
        .order_by_asc(show::Column::ShowDateTime)
        .order_by_asc(show::Column::Id)
        .all(db)
        .await?;

    let mut slots = SlotsByDate::new();
    for show in shows {
        let time = Timestamp::from_second(show.show_date_time)?;
        let date = time.to_zoned(TimeZone::UTC).date().to_string();
        slots.entry(date).or_default().push(ShowSlot { time, show_id: show.id });
    }

    Ok(Availability { movie: Movie::try_from(movie)?, slots })
}

/// Seat ids already taken for a show.
pub async fn occupied_seats(db: &DatabaseConnection, show_id: i32) -> AppResult<Vec<String>> {
    let show = show::Entity::find_by_id(show_id)
        .one(db)
        .await?
        .ok_or(AppError::ShowNotFound(show_id))?;

    let seats: SeatMap = serde_json::from_value(show.occupied_seats)?;
    let mut seats: Vec<String> = seats.into_keys().collect();
    seats.sort();
    Ok(seats)
}

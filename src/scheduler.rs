use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
use sea_orm::{EntityTrait, Set, TransactionTrait};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    cache::CatalogCache,
    entities::show,
    error::{AppError, AppResult},
    models::ScheduleEntry,
};

/// Expands `{date, times}` entries into show instants, in input order.
///
/// Each `date` + `time` pair is read as a civil date-time in UTC. The first
/// pair that does not parse fails the whole schedule.
pub fn expand_schedule(schedule: &[ScheduleEntry]) -> AppResult<Vec<Timestamp>> {
    let mut slots = Vec::new();
    for entry in schedule {
        for time in &entry.times {
            let slot = slot_instant(&entry.date, time).map_err(|source| AppError::InvalidSlot {
                date: entry.date.clone(),
                time: time.clone(),
                source,
            })?;
            slots.push(slot);
        }
    }
    Ok(slots)
}

fn slot_instant(date: &str, time: &str) -> Result<Timestamp, jiff::Error> {
    let civil: DateTime = format!("{}T{}", date.trim(), time.trim()).parse()?;
    Ok(civil.to_zoned(TimeZone::UTC)?.timestamp())
}

/// Creates one show per slot in `schedule` for `movie_id`, synchronizing the
/// movie from the catalog first if needed. Returns the number of shows created.
pub async fn create_shows(
    cache: &CatalogCache,
    movie_id: &str,
    schedule: &[ScheduleEntry],
    price: f64,
) -> AppResult<usize> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::InvalidRequest(format!(
            "showPrice must be a non-negative number, got {price}"
        )));
    }

    let slots = expand_schedule(schedule)?;
    let movie = cache.resolve(movie_id).await?;

    if slots.is_empty() {
        debug!(movie_id = %movie.id, "empty schedule, nothing to insert");
        return Ok(0);
    }

    let models = slots.iter().map(|slot| show::ActiveModel {
        id: Default::default(),
        movie_id: Set(movie.id.clone()),
        show_date_time: Set(slot.as_second()),
        show_price: Set(price),
        occupied_seats: Set(Value::Object(Map::new())),
    });

    let txn = cache.db().begin().await?;
    show::Entity::insert_many(models).exec(&txn).await?;
    txn.commit().await?;

    info!(movie_id = %movie.id, shows = slots.len(), price = price, "shows scheduled");
    Ok(slots.len())
}

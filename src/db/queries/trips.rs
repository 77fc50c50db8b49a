use crate::models::money;
use crate::models::trip::{Budget, NewTrip, Trip, UpdateTrip};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const TRIP_COLUMNS: &str = "id, name, description, start_date, end_date, origin, destination,
         budget_cents, budget_currency, owner_id, is_active, cover_image, notes, plan,
         created_at, updated_at";

fn map_trip_row(row: &Row) -> rusqlite::Result<Trip> {
    let budget_cents: Option<i64> = row.get(7)?;
    let budget_currency: String = row.get(8)?;
    Ok(Trip {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        origin: row.get(5)?,
        destination: row.get(6)?,
        budget: budget_cents.map(|amount_cents| Budget {
            amount_cents,
            currency: budget_currency,
        }),
        owner_id: row.get(9)?,
        is_active: row.get(10)?,
        cover_image: row.get(11)?,
        notes: row.get(12)?,
        plan: row.get(13)?,
        places: Vec::new(),
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

#[derive(Default)]
pub struct TripFilter {
    pub is_active: Option<bool>,
    /// Keep trips whose [start_date, end_date] range contains this date.
    pub includes_date: Option<String>,
    /// Case-insensitive substring match on the destination.
    pub destination: Option<String>,
    pub owner_id: Option<i64>,
    /// SQL ORDER BY expression. Defaults to "start_date DESC".
    pub sort_sql: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn push_filters(
    sql: &mut String,
    params_vec: &mut Vec<Box<dyn rusqlite::ToSql>>,
    filter: &TripFilter,
) {
    if let Some(is_active) = filter.is_active {
        sql.push_str(" AND is_active = ?");
        params_vec.push(Box::new(is_active));
    }
    if let Some(ref date) = filter.includes_date {
        sql.push_str(" AND start_date <= ? AND end_date >= ?");
        params_vec.push(Box::new(date.clone()));
        params_vec.push(Box::new(date.clone()));
    }
    if let Some(ref destination) = filter.destination {
        sql.push_str(" AND destination LIKE ?");
        params_vec.push(Box::new(format!("%{}%", destination)));
    }
    if let Some(owner_id) = filter.owner_id {
        sql.push_str(" AND owner_id = ?");
        params_vec.push(Box::new(owner_id));
    }
}

pub fn list_trips(conn: &Connection, filter: &TripFilter) -> rusqlite::Result<Vec<Trip>> {
    let mut sql = format!("SELECT {} FROM trips WHERE 1=1", TRIP_COLUMNS);
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    push_filters(&mut sql, &mut params_vec, filter);

    let order_by = filter.sort_sql.as_deref().unwrap_or("start_date DESC");
    sql.push_str(&format!(" ORDER BY {}, id DESC", order_by));

    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit));
    }
    if let Some(offset) = filter.offset {
        sql.push_str(" OFFSET ?");
        params_vec.push(Box::new(offset));
    }

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let trips = stmt
        .query_map(params_refs.as_slice(), map_trip_row)?
        .filter_map(|t| t.ok())
        .collect::<Vec<_>>();

    debug!(count = trips.len(), "Listed trips");
    Ok(trips)
}

pub fn count_trips(conn: &Connection, filter: &TripFilter) -> rusqlite::Result<i64> {
    let mut sql = String::from("SELECT COUNT(*) FROM trips WHERE 1=1");
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    push_filters(&mut sql, &mut params_vec, filter);

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))
}

pub fn get_trip(conn: &Connection, id: i64) -> rusqlite::Result<Option<Trip>> {
    conn.query_row(
        &format!("SELECT {} FROM trips WHERE id = ?", TRIP_COLUMNS),
        [id],
        map_trip_row,
    )
    .optional()
}

pub fn create_trip(conn: &Connection, trip: &NewTrip) -> rusqlite::Result<i64> {
    let budget_cents = trip
        .budget
        .as_ref()
        .and_then(|b| b.amount)
        .map(money::to_cents);
    let budget_currency = trip
        .budget
        .as_ref()
        .and_then(|b| b.currency.clone())
        .unwrap_or_else(|| "USD".into());

    conn.execute(
        "INSERT INTO trips (name, description, start_date, end_date, origin, destination,
         budget_cents, budget_currency, owner_id, is_active, cover_image, notes)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            trip.name,
            trip.description,
            trip.start_date,
            trip.end_date,
            trip.origin,
            trip.destination,
            budget_cents,
            budget_currency,
            trip.owner_id,
            trip.is_active,
            trip.cover_image,
            trip.notes,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(trip_id = id, destination = %trip.destination, "Created trip");
    Ok(id)
}

/// Partial update; only provided fields change. Returns false when the trip
/// does not exist.
pub fn update_trip(conn: &Connection, id: i64, update: &UpdateTrip) -> rusqlite::Result<bool> {
    let mut sets: Vec<String> = Vec::new();
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(ref name) = update.name {
        sets.push("name = ?".into());
        params_vec.push(Box::new(name.clone()));
    }
    if let Some(ref description) = update.description {
        sets.push("description = ?".into());
        params_vec.push(Box::new(description.clone()));
    }
    if let Some(ref start_date) = update.start_date {
        sets.push("start_date = ?".into());
        params_vec.push(Box::new(start_date.clone()));
    }
    if let Some(ref end_date) = update.end_date {
        sets.push("end_date = ?".into());
        params_vec.push(Box::new(end_date.clone()));
    }
    if let Some(ref origin) = update.origin {
        sets.push("origin = ?".into());
        params_vec.push(Box::new(origin.clone()));
    }
    if let Some(ref destination) = update.destination {
        sets.push("destination = ?".into());
        params_vec.push(Box::new(destination.clone()));
    }
    if let Some(ref budget) = update.budget {
        if let Some(amount) = budget.amount {
            sets.push("budget_cents = ?".into());
            params_vec.push(Box::new(money::to_cents(amount)));
        }
        if let Some(ref currency) = budget.currency {
            sets.push("budget_currency = ?".into());
            params_vec.push(Box::new(currency.clone()));
        }
    }
    if let Some(is_active) = update.is_active {
        sets.push("is_active = ?".into());
        params_vec.push(Box::new(is_active));
    }
    if let Some(ref cover_image) = update.cover_image {
        sets.push("cover_image = ?".into());
        params_vec.push(Box::new(cover_image.clone()));
    }
    if let Some(ref notes) = update.notes {
        sets.push("notes = ?".into());
        params_vec.push(Box::new(notes.clone()));
    }

    if sets.is_empty() {
        return trip_exists(conn, id);
    }

    sets.push("updated_at = datetime('now')".into());
    let sql = format!("UPDATE trips SET {} WHERE id = ?", sets.join(", "));
    params_vec.push(Box::new(id));

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = conn.execute(&sql, params_refs.as_slice())?;
    if rows > 0 {
        debug!(trip_id = id, "Updated trip");
    }
    Ok(rows > 0)
}

fn trip_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM trips WHERE id = ?)",
        [id],
        |row| row.get(0),
    )
}

pub fn delete_trip(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM trips WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(trip_id = id, "Deleted trip");
    }
    Ok(rows > 0)
}

pub fn store_plan(conn: &Connection, id: i64, plan: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE trips SET plan = ?, updated_at = datetime('now') WHERE id = ?",
        params![plan, id],
    )?;
    if rows > 0 {
        debug!(trip_id = id, "Stored generated plan on trip");
    }
    Ok(rows > 0)
}

// Trip <-> place membership

pub fn trip_has_place(conn: &Connection, trip_id: i64, place_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM trip_places WHERE trip_id = ? AND place_id = ?)",
        [trip_id, place_id],
        |row| row.get(0),
    )
}

pub fn add_place(conn: &Connection, trip_id: i64, place_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO trip_places (trip_id, place_id) VALUES (?, ?)",
        [trip_id, place_id],
    )?;
    debug!(trip_id, place_id, "Added place to trip");
    Ok(())
}

pub fn remove_place(conn: &Connection, trip_id: i64, place_id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM trip_places WHERE trip_id = ? AND place_id = ?",
        [trip_id, place_id],
    )?;
    Ok(rows > 0)
}

// Statistics

pub struct TripCounts {
    pub total: i64,
    pub active: i64,
    pub upcoming: i64,
    pub past: i64,
}

pub fn count_by_status(conn: &Connection, today: &str) -> rusqlite::Result<TripCounts> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM trips", [], |row| row.get(0))?;
    let active: i64 = conn.query_row(
        "SELECT COUNT(*) FROM trips
         WHERE start_date <= ? AND end_date >= ? AND is_active = 1",
        [today, today],
        |row| row.get(0),
    )?;
    let upcoming: i64 = conn.query_row(
        "SELECT COUNT(*) FROM trips WHERE start_date > ? AND is_active = 1",
        [today],
        |row| row.get(0),
    )?;
    let past: i64 = conn.query_row(
        "SELECT COUNT(*) FROM trips WHERE end_date < ?",
        [today],
        |row| row.get(0),
    )?;

    Ok(TripCounts {
        total,
        active,
        upcoming,
        past,
    })
}

pub struct DestinationCount {
    pub destination: String,
    pub count: i64,
}

/// Top destinations by trip count.
pub fn destination_counts(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<DestinationCount>> {
    let mut stmt = conn.prepare(
        "SELECT destination, COUNT(*) as count FROM trips
         GROUP BY destination ORDER BY count DESC LIMIT ?",
    )?;
    let counts = stmt
        .query_map([limit], |row| {
            Ok(DestinationCount {
                destination: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .filter_map(|c| c.ok())
        .collect();
    Ok(counts)
}

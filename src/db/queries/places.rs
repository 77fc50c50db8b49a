use crate::models::place::{NewPlace, Place, PlaceSummary, Rating, UpdatePlace};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

fn map_place_row(row: &Row) -> rusqlite::Result<Place> {
    let images_json: String = row.get(6)?;
    Ok(Place {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        is_popular: row.get(5)?,
        images: serde_json::from_str(&images_json).unwrap_or_default(),
        average_rating: row.get(7)?,
        ratings: Vec::new(),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

const PLACE_COLUMNS: &str = "id, name, location, description, category, is_popular,
         images, average_rating, created_at, updated_at";

#[derive(Default)]
pub struct PlaceFilter {
    /// Case-insensitive substring over name, description, location, category.
    pub search: Option<String>,
    /// Normalized category; `None` means no category filter.
    pub category: Option<String>,
    pub popular_only: bool,
}

pub fn list_places(conn: &Connection, filter: &PlaceFilter) -> rusqlite::Result<Vec<Place>> {
    let mut sql = format!("SELECT {} FROM places WHERE 1=1", PLACE_COLUMNS);
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(ref search) = filter.search {
        sql.push_str(
            " AND (name LIKE ?1 OR description LIKE ?1 OR location LIKE ?1 OR category LIKE ?1)",
        );
        params_vec.push(Box::new(format!("%{}%", search)));
    }
    if let Some(ref category) = filter.category {
        sql.push_str(" AND category = ?");
        params_vec.push(Box::new(category.clone()));
    }
    if filter.popular_only {
        sql.push_str(" AND is_popular = 1");
    }

    sql.push_str(" ORDER BY name");

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let places = stmt
        .query_map(params_refs.as_slice(), map_place_row)?
        .filter_map(|p| p.ok())
        .collect::<Vec<_>>();

    debug!(count = places.len(), "Listed places");
    Ok(places)
}

pub fn get_place(conn: &Connection, id: i64) -> rusqlite::Result<Option<Place>> {
    let place = conn
        .query_row(
            &format!("SELECT {} FROM places WHERE id = ?", PLACE_COLUMNS),
            [id],
            map_place_row,
        )
        .optional()?;

    match place {
        Some(mut p) => {
            p.ratings = get_ratings(conn, id)?;
            Ok(Some(p))
        }
        None => Ok(None),
    }
}

pub fn place_name_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM places WHERE name = ?)",
        [name],
        |row| row.get(0),
    )
}

pub fn create_place(conn: &Connection, place: &NewPlace, category: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO places (name, location, description, category, is_popular, images)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            place.name,
            place.location,
            place.description,
            category,
            place.is_popular,
            serde_json::to_string(&place.images).unwrap_or_else(|_| "[]".into()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(place_id = id, name = %place.name, "Created place");
    Ok(id)
}

/// Partial update; only the provided fields change. Returns false when the
/// place does not exist.
pub fn update_place(conn: &Connection, id: i64, update: &UpdatePlace) -> rusqlite::Result<bool> {
    let mut sets: Vec<String> = Vec::new();
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(ref name) = update.name {
        sets.push("name = ?".into());
        params_vec.push(Box::new(name.clone()));
    }
    if let Some(ref location) = update.location {
        sets.push("location = ?".into());
        params_vec.push(Box::new(location.clone()));
    }
    if let Some(ref description) = update.description {
        sets.push("description = ?".into());
        params_vec.push(Box::new(description.clone()));
    }
    if let Some(ref category) = update.category {
        sets.push("category = ?".into());
        params_vec.push(Box::new(category.clone()));
    }
    if let Some(is_popular) = update.is_popular {
        sets.push("is_popular = ?".into());
        params_vec.push(Box::new(is_popular));
    }
    if let Some(ref images) = update.images {
        sets.push("images = ?".into());
        params_vec.push(Box::new(
            serde_json::to_string(images).unwrap_or_else(|_| "[]".into()),
        ));
    }

    if sets.is_empty() {
        return place_exists(conn, id);
    }

    sets.push("updated_at = datetime('now')".into());
    let sql = format!("UPDATE places SET {} WHERE id = ?", sets.join(", "));
    params_vec.push(Box::new(id));

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = conn.execute(&sql, params_refs.as_slice())?;
    if rows > 0 {
        debug!(place_id = id, "Updated place");
    }
    Ok(rows > 0)
}

fn place_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM places WHERE id = ?)",
        [id],
        |row| row.get(0),
    )
}

pub fn delete_place(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM places WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(place_id = id, "Deleted place");
    }
    Ok(rows > 0)
}

pub fn add_rating(
    conn: &Connection,
    place_id: i64,
    rating: i64,
    review: Option<&str>,
    user_id: Option<i64>,
) -> rusqlite::Result<f64> {
    conn.execute(
        "INSERT INTO place_ratings (place_id, user_id, rating, review) VALUES (?, ?, ?, ?)",
        params![place_id, user_id, rating, review],
    )?;

    // Recompute rather than increment, so the stored average never drifts.
    let average: f64 = conn.query_row(
        "SELECT AVG(rating) FROM place_ratings WHERE place_id = ?",
        [place_id],
        |row| row.get(0),
    )?;
    conn.execute(
        "UPDATE places SET average_rating = ?, updated_at = datetime('now') WHERE id = ?",
        params![average, place_id],
    )?;

    debug!(place_id, rating, "Added place rating");
    Ok(average)
}

fn get_ratings(conn: &Connection, place_id: i64) -> rusqlite::Result<Vec<Rating>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, rating, review, created_at
         FROM place_ratings WHERE place_id = ? ORDER BY created_at DESC",
    )?;
    let ratings = stmt
        .query_map([place_id], |row| {
            Ok(Rating {
                id: row.get(0)?,
                user_id: row.get(1)?,
                rating: row.get(2)?,
                review: row.get(3)?,
                date: row.get(4)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();
    Ok(ratings)
}

/// Summaries for a batch of trips, keyed by trip id.
pub fn summaries_for_trips(
    conn: &Connection,
    trip_ids: &[i64],
) -> rusqlite::Result<std::collections::HashMap<i64, Vec<PlaceSummary>>> {
    use std::collections::HashMap;

    if trip_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders: String = trip_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "SELECT tp.trip_id, p.id, p.name, p.location, p.category
         FROM places p
         JOIN trip_places tp ON p.id = tp.place_id
         WHERE tp.trip_id IN ({})
         ORDER BY p.name",
        placeholders
    );

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = trip_ids
        .iter()
        .map(|id| id as &dyn rusqlite::ToSql)
        .collect();

    let rows = stmt.query_map(params.as_slice(), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            PlaceSummary {
                id: row.get(1)?,
                name: row.get(2)?,
                location: row.get(3)?,
                category: row.get(4)?,
            },
        ))
    })?;

    let mut map: std::collections::HashMap<i64, Vec<PlaceSummary>> = HashMap::new();
    for row in rows.filter_map(|r| r.ok()) {
        map.entry(row.0).or_default().push(row.1);
    }
    Ok(map)
}

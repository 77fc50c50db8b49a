use crate::models::expense::{Expense, NewExpense, UpdateExpense};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use tracing::debug;

const EXPENSE_COLUMNS: &str = "id, title, amount_cents, category, date, location, description,
         trip_id, place_id, currency, payment_method, receipt_image, tags,
         created_at, updated_at";

fn map_expense_row(row: &Row) -> rusqlite::Result<Expense> {
    let tags_json: String = row.get(12)?;
    Ok(Expense {
        id: row.get(0)?,
        title: row.get(1)?,
        amount_cents: row.get(2)?,
        category: row.get(3)?,
        date: row.get(4)?,
        location: row.get(5)?,
        description: row.get(6)?,
        trip_id: row.get(7)?,
        place_id: row.get(8)?,
        currency: row.get(9)?,
        payment_method: row.get(10)?,
        receipt_image: row.get(11)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

#[derive(Default)]
pub struct ExpenseFilter {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub category: Option<String>,
    pub trip_id: Option<i64>,
    /// SQL ORDER BY expression. Defaults to "date DESC".
    pub sort_sql: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn push_filters(
    sql: &mut String,
    params_vec: &mut Vec<Box<dyn rusqlite::ToSql>>,
    filter: &ExpenseFilter,
) {
    if let Some(ref from_date) = filter.from_date {
        sql.push_str(" AND date >= ?");
        params_vec.push(Box::new(from_date.clone()));
    }
    if let Some(ref to_date) = filter.to_date {
        sql.push_str(" AND date <= ?");
        params_vec.push(Box::new(to_date.clone()));
    }
    if let Some(ref category) = filter.category {
        sql.push_str(" AND category = ?");
        params_vec.push(Box::new(category.clone()));
    }
    if let Some(trip_id) = filter.trip_id {
        sql.push_str(" AND trip_id = ?");
        params_vec.push(Box::new(trip_id));
    }
}

pub fn list_expenses(conn: &Connection, filter: &ExpenseFilter) -> rusqlite::Result<Vec<Expense>> {
    let mut sql = format!("SELECT {} FROM expenses WHERE 1=1", EXPENSE_COLUMNS);
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    push_filters(&mut sql, &mut params_vec, filter);

    let order_by = filter.sort_sql.as_deref().unwrap_or("date DESC");
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
    let expenses = stmt
        .query_map(params_refs.as_slice(), map_expense_row)?
        .filter_map(|e| e.ok())
        .collect::<Vec<_>>();

    debug!(count = expenses.len(), "Listed expenses");
    Ok(expenses)
}

pub fn count_expenses(conn: &Connection, filter: &ExpenseFilter) -> rusqlite::Result<i64> {
    let mut sql = String::from("SELECT COUNT(*) FROM expenses WHERE 1=1");
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    push_filters(&mut sql, &mut params_vec, filter);

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))
}

pub fn get_expense(conn: &Connection, id: i64) -> rusqlite::Result<Option<Expense>> {
    conn.query_row(
        &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
        [id],
        map_expense_row,
    )
    .optional()
}

pub fn create_expense(conn: &Connection, expense: &NewExpense) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO expenses (title, amount_cents, category, date, location, description,
         trip_id, place_id, currency, payment_method, receipt_image, tags)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            expense.title,
            expense.amount_cents(),
            expense.category,
            expense.date,
            expense.location,
            expense.description,
            expense.trip_id,
            expense.place_id,
            expense.currency,
            expense.payment_method,
            expense.receipt_image,
            serde_json::to_string(&expense.tags).unwrap_or_else(|_| "[]".into()),
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(
        expense_id = id,
        amount_cents = expense.amount_cents(),
        "Created expense"
    );
    Ok(id)
}

/// Partial update; only provided fields change. Returns false when the
/// expense does not exist.
pub fn update_expense(conn: &Connection, id: i64, update: &UpdateExpense) -> rusqlite::Result<bool> {
    let mut sets: Vec<String> = Vec::new();
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(ref title) = update.title {
        sets.push("title = ?".into());
        params_vec.push(Box::new(title.clone()));
    }
    if let Some(amount) = update.amount {
        sets.push("amount_cents = ?".into());
        params_vec.push(Box::new(crate::models::money::to_cents(amount)));
    }
    if let Some(ref category) = update.category {
        sets.push("category = ?".into());
        params_vec.push(Box::new(category.clone()));
    }
    if let Some(ref date) = update.date {
        sets.push("date = ?".into());
        params_vec.push(Box::new(date.clone()));
    }
    if let Some(ref location) = update.location {
        sets.push("location = ?".into());
        params_vec.push(Box::new(location.clone()));
    }
    if let Some(ref description) = update.description {
        sets.push("description = ?".into());
        params_vec.push(Box::new(description.clone()));
    }
    if let Some(trip_id) = update.trip_id {
        sets.push("trip_id = ?".into());
        params_vec.push(Box::new(trip_id));
    }
    if let Some(place_id) = update.place_id {
        sets.push("place_id = ?".into());
        params_vec.push(Box::new(place_id));
    }
    if let Some(ref currency) = update.currency {
        sets.push("currency = ?".into());
        params_vec.push(Box::new(currency.clone()));
    }
    if let Some(ref payment_method) = update.payment_method {
        sets.push("payment_method = ?".into());
        params_vec.push(Box::new(payment_method.clone()));
    }
    if let Some(ref receipt_image) = update.receipt_image {
        sets.push("receipt_image = ?".into());
        params_vec.push(Box::new(receipt_image.clone()));
    }
    if let Some(ref tags) = update.tags {
        sets.push("tags = ?".into());
        params_vec.push(Box::new(
            serde_json::to_string(tags).unwrap_or_else(|_| "[]".into()),
        ));
    }

    if sets.is_empty() {
        return expense_exists(conn, id);
    }

    sets.push("updated_at = datetime('now')".into());
    let sql = format!("UPDATE expenses SET {} WHERE id = ?", sets.join(", "));
    params_vec.push(Box::new(id));

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = conn.execute(&sql, params_refs.as_slice())?;
    if rows > 0 {
        debug!(expense_id = id, "Updated expense");
    }
    Ok(rows > 0)
}

fn expense_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM expenses WHERE id = ?)",
        [id],
        |row| row.get(0),
    )
}

pub fn delete_expense(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM expenses WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(expense_id = id, "Deleted expense");
    }
    Ok(rows > 0)
}

pub fn count_for_trip(conn: &Connection, trip_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM expenses WHERE trip_id = ?",
        [trip_id],
        |row| row.get(0),
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TripExpenseTotal {
    pub total_cents: i64,
    pub count: i64,
}

/// Expense totals for a batch of trips in one grouped query, keyed by trip
/// id. Trips without expenses are simply absent from the map.
pub fn totals_for_trips(
    conn: &Connection,
    trip_ids: &[i64],
) -> rusqlite::Result<HashMap<i64, TripExpenseTotal>> {
    if trip_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders: String = trip_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "SELECT trip_id, SUM(amount_cents), COUNT(*)
         FROM expenses WHERE trip_id IN ({})
         GROUP BY trip_id",
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
            TripExpenseTotal {
                total_cents: row.get(1)?,
                count: row.get(2)?,
            },
        ))
    })?;

    let mut totals: HashMap<i64, TripExpenseTotal> = HashMap::new();
    for row in rows.filter_map(|r| r.ok()) {
        totals.insert(row.0, row.1);
    }
    Ok(totals)
}

pub struct TripExpenseRanking {
    pub trip_id: Option<i64>,
    pub total_cents: i64,
    pub count: i64,
    pub trip_name: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Per-trip expense totals over all expenses, highest spend first, with the
/// trip summary joined in. Expenses without a trip group under `None`.
pub fn totals_by_trip(conn: &Connection) -> rusqlite::Result<Vec<TripExpenseRanking>> {
    let mut stmt = conn.prepare(
        "SELECT e.trip_id, SUM(e.amount_cents) as total, COUNT(*),
                t.name, t.destination, t.start_date, t.end_date
         FROM expenses e
         LEFT JOIN trips t ON e.trip_id = t.id
         GROUP BY e.trip_id
         ORDER BY total DESC",
    )?;

    let rankings = stmt
        .query_map([], |row| {
            Ok(TripExpenseRanking {
                trip_id: row.get(0)?,
                total_cents: row.get(1)?,
                count: row.get(2)?,
                trip_name: row.get(3)?,
                destination: row.get(4)?,
                start_date: row.get(5)?,
                end_date: row.get(6)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(rankings)
}

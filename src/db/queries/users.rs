use crate::models::user::User;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

fn map_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        phone_number: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, phone_number, created_at, updated_at";

pub fn get_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
        [id],
        map_user_row,
    )
    .optional()
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
        [email],
        map_user_row,
    )
    .optional()
}

pub fn email_exists(conn: &Connection, email: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)",
        [email],
        |row| row.get(0),
    )
}

pub fn username_exists(conn: &Connection, username: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
        [username],
        |row| row.get(0),
    )
}

pub fn create_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
    phone_number: Option<&str>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (username, email, password_hash, phone_number)
         VALUES (?, ?, ?, ?)",
        params![username, email, password_hash, phone_number],
    )?;
    let id = conn.last_insert_rowid();
    debug!(user_id = id, username = %username, "Created user");
    Ok(id)
}

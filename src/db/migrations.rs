use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

/// Apply any `.sql` files in `migrations_dir` that have not been recorded in
/// the `_migrations` table yet, in lexicographic filename order.
pub fn run_migrations(conn: &Connection, migrations_dir: &Path) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let mut pending = 0;
    for path in migration_files(migrations_dir) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let applied: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE name = ?)",
            [name.as_str()],
            |row| row.get(0),
        )?;
        if applied {
            continue;
        }

        let sql = fs::read_to_string(&path)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        tracing::info!(migration = %name, "Applying migration");
        conn.execute_batch(&sql)?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?)", [name.as_str()])?;
        pending += 1;
    }

    if pending > 0 {
        tracing::info!(count = pending, "Migrations applied");
    } else {
        tracing::debug!(dir = %migrations_dir.display(), "Schema up to date");
    }

    Ok(())
}

fn migration_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map(|ext| ext == "sql").unwrap_or(false))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

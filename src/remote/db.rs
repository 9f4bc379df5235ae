//! Database Connection and Setup
//!
//! Opens the local SQLite database and brings its schema up to date.

use rusqlite::Connection;
use std::path::Path;

use crate::domain::{DomainError, DomainResult};

/// Open (or create) the database at `db_path` and run migrations
///
/// `":memory:"` gives a throwaway database.
pub fn open_db(db_path: &Path) -> DomainResult<Connection> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Internal(format!("Failed to open db: {}", e)))?;

    run_migrations(&conn)?;
    log::info!("grocery db ready at {}", db_path.display());
    Ok(conn)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS groceries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )?;

    // Flag columns arrived after the first schema; older files lack them
    if !column_exists(conn, "groceries", "done")? {
        conn.execute(
            "ALTER TABLE groceries ADD COLUMN done INTEGER NOT NULL DEFAULT 0",
            [],
        )
        .map_err(|e| DomainError::Internal(format!("Failed to add done: {}", e)))?;
    }

    if !column_exists(conn, "groceries", "deleted")? {
        conn.execute(
            "ALTER TABLE groceries ADD COLUMN deleted INTEGER NOT NULL DEFAULT 0",
            [],
        )
        .map_err(|e| DomainError::Internal(format!("Failed to add deleted: {}", e)))?;
    }

    if !column_exists(conn, "groceries", "modified_at")? {
        conn.execute(
            "ALTER TABLE groceries ADD COLUMN modified_at INTEGER NOT NULL DEFAULT 0",
            [],
        )
        .map_err(|e| DomainError::Internal(format!("Failed to add modified_at: {}", e)))?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_groceries_modified ON groceries(modified_at)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrates_first_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groceries.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "CREATE TABLE groceries (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL)",
                [],
            )
            .unwrap();
            conn.execute("INSERT INTO groceries (name) VALUES ('Flour')", [])
                .unwrap();
        }

        let conn = open_db(&path).unwrap();
        assert!(column_exists(&conn, "groceries", "done").unwrap());
        assert!(column_exists(&conn, "groceries", "deleted").unwrap());
        assert!(column_exists(&conn, "groceries", "modified_at").unwrap());

        let done: i64 = conn
            .query_row("SELECT done FROM groceries WHERE name = 'Flour'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(done, 0);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = open_db(Path::new(":memory:")).unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
    }
}

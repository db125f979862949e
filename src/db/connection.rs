use std::path::Path;

use rusqlite::{Connection, Result};

const CREATE_KV_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";

pub fn establish_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute(CREATE_KV_TABLE, [])?;
    Ok(conn)
}

pub fn establish_in_memory_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute(CREATE_KV_TABLE, [])?;
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    establish_in_memory_connection()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_establish_connection_creates_table() {
        let dir = tempfile::tempdir().unwrap();
        let conn = establish_connection(dir.path().join("ledger.db")).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_establish_connection_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        establish_connection(&path).unwrap();
        assert!(establish_connection(&path).is_ok());
    }
}

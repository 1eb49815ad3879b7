//! Schema migrations, applied in order. `PRAGMA user_version` records how many have run.

use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};

const INITIAL_SCHEMA: &str = include_str!("migrations/V1__initial_schema.sql");

fn steps() -> Vec<M<'static>> {
    vec![M::up(INITIAL_SCHEMA)]
}

pub fn runner() -> Migrations<'static> {
    Migrations::new(steps())
}

pub fn latest_version() -> i64 {
    steps().len() as i64
}

/// Schema version recorded in the database; 0 for a fresh file.
pub fn current_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_valid() {
        assert!(runner().validate().is_ok());
    }

    #[test]
    fn fresh_database_moves_to_latest_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(current_version(&conn).unwrap(), 0);

        runner().to_latest(&mut conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), latest_version());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('documents', 'summaries')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}

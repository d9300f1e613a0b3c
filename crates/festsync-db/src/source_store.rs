use std::path::Path;

use festsync_common::{Error, Result, SourceRow, SourceValue};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Statement};
use tracing::{debug, info, warn};

/// Read-only handle to the legacy SQLite database.
///
/// Opened once per run and passed by reference to every table migration.
pub struct SourceStore {
    conn: Connection,
}

impl SourceStore {
    /// Open `path` read-only. A missing or unreadable file is an error; the
    /// file is never created.
    pub fn open(path: &Path) -> Result<Self> {
        info!("opening source database at {}", path.display());
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            Error::Source(format!(
                "failed to open source database at {}: {e}",
                path.display()
            ))
        })?;

        // Opening is lazy; touch the schema so a corrupt file fails here.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| {
            Error::Source(format!(
                "{} is not a readable SQLite database: {e}",
                path.display()
            ))
        })?;

        Ok(Self { conn })
    }

    /// Wrap an existing connection. Used for in-memory databases.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// User tables in name order, excluding SQLite internals.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .map_err(|e| Error::Source(format!("failed to prepare table listing: {e}")))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Source(format!("failed to list tables: {e}")))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Source(format!("failed to read table name: {e}")))
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| Error::Source(format!("failed to count rows in {table}: {e}")))?;
        Ok(count as usize)
    }

    /// Every row of `table` in rowid order.
    pub fn read_all(&self, table: &str) -> Result<Vec<SourceRow>> {
        let sql = format!("SELECT * FROM {}", quote_identifier(table));
        let rows = self.read_rows(table, &sql)?;
        debug!("read {} rows from {table}", rows.len());
        Ok(rows)
    }

    /// At most `limit` rows of `table`.
    pub fn sample_rows(&self, table: &str, limit: usize) -> Result<Vec<SourceRow>> {
        let sql = format!(
            "SELECT * FROM {} LIMIT {}",
            quote_identifier(table),
            i64::try_from(limit).unwrap_or(i64::MAX)
        );
        self.read_rows(table, &sql)
    }

    fn read_rows(&self, table: &str, sql: &str) -> Result<Vec<SourceRow>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| Error::Source(format!("failed to read table {table}: {e}")))?;
        collect_rows(&mut stmt)
            .map_err(|e| Error::Source(format!("failed to read row from {table}: {e}")))
    }
}

fn collect_rows(stmt: &mut Statement<'_>) -> rusqlite::Result<Vec<SourceRow>> {
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = SourceRow::new();
        for (idx, name) in columns.iter().enumerate() {
            record.push(name.clone(), to_source_value(name, row.get_ref(idx)?));
        }
        out.push(record);
    }
    Ok(out)
}

/// TEXT that is not valid UTF-8 is converted lossily (invalid sequences
/// become U+FFFD) and logged, so the row still migrates.
fn to_source_value(column: &str, value: ValueRef<'_>) -> SourceValue {
    match value {
        ValueRef::Null => SourceValue::Null,
        ValueRef::Integer(n) => SourceValue::Integer(n),
        ValueRef::Real(f) => SourceValue::Real(f),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => SourceValue::Text(text.to_owned()),
            Err(e) => {
                warn!("column {column} holds invalid UTF-8 ({e}); replacing bad bytes");
                SourceValue::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        },
        ValueRef::Blob(bytes) => SourceValue::Blob(bytes.to_vec()),
    }
}

/// Quote a table name for interpolation into SQL, doubling embedded quotes.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> SourceStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (
                email TEXT PRIMARY KEY,
                name TEXT,
                interests TEXT,
                is_verified INTEGER,
                avatar BLOB,
                rating REAL
            );
            CREATE TABLE notifications (id INTEGER PRIMARY KEY, message TEXT);
            INSERT INTO users VALUES ('ada@example.com', 'Ada', '[\"music\"]', 1, x'0102', 4.5);
            INSERT INTO users VALUES ('bob@example.com', 'Bob', NULL, 0, NULL, NULL);
            INSERT INTO users VALUES ('cy@example.com', 'Cy', '', 1, NULL, 3.0);
            INSERT INTO users VALUES ('di@example.com', 'Di', NULL, 0, NULL, NULL);",
        )
        .unwrap();
        SourceStore::from_connection(conn)
    }

    #[test]
    fn lists_user_tables_in_name_order() {
        let store = seeded_store();
        assert_eq!(store.list_tables().unwrap(), vec!["notifications", "users"]);
    }

    #[test]
    fn counts_rows() {
        let store = seeded_store();
        assert_eq!(store.row_count("users").unwrap(), 4);
        assert_eq!(store.row_count("notifications").unwrap(), 0);
    }

    #[test]
    fn read_all_preserves_types_and_order() {
        let store = seeded_store();
        let rows = store.read_all("users").unwrap();
        assert_eq!(rows.len(), 4);

        let ada = &rows[0];
        assert_eq!(ada.get("email"), Some(&SourceValue::Text("ada@example.com".into())));
        assert_eq!(ada.get("is_verified"), Some(&SourceValue::Integer(1)));
        assert_eq!(ada.get("avatar"), Some(&SourceValue::Blob(vec![1, 2])));
        assert_eq!(ada.get("rating"), Some(&SourceValue::Real(4.5)));

        let names: Vec<_> = ada.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["email", "name", "interests", "is_verified", "avatar", "rating"]
        );

        assert!(rows[1].get("interests").unwrap().is_null());
    }

    #[test]
    fn sample_rows_respects_limit() {
        let store = seeded_store();
        assert_eq!(store.sample_rows("users", 3).unwrap().len(), 3);
        assert_eq!(store.sample_rows("users", 10).unwrap().len(), 4);
    }

    #[test]
    fn missing_table_is_a_source_error() {
        let store = seeded_store();
        let err = store.read_all("fests").unwrap_err();
        assert!(matches!(err, Error::Source(_)));
        assert!(err.to_string().contains("fests"));
    }

    #[test]
    fn hostile_table_names_stay_inside_the_quotes() {
        let store = seeded_store();
        assert!(store.read_all("users; DROP TABLE users").is_err());
        assert!(store.row_count("users\" ; --").is_err());
        assert_eq!(store.row_count("users").unwrap(), 4);
    }

    #[test]
    fn reads_tables_with_non_identifier_names() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE \"event-feedback\" (rating INTEGER);
             CREATE TABLE \"odd\"\"name\" (x TEXT);
             INSERT INTO \"event-feedback\" VALUES (5), (4);
             INSERT INTO \"odd\"\"name\" VALUES ('y');",
        )
        .unwrap();
        let store = SourceStore::from_connection(conn);

        assert_eq!(store.list_tables().unwrap(), vec!["event-feedback", "odd\"name"]);
        assert_eq!(store.row_count("event-feedback").unwrap(), 2);
        assert_eq!(store.sample_rows("event-feedback", 1).unwrap().len(), 1);
        assert_eq!(store.read_all("odd\"name").unwrap().len(), 1);
    }

    #[test]
    fn huge_sample_limit_is_clamped() {
        let store = seeded_store();
        assert_eq!(store.sample_rows("users", usize::MAX).unwrap().len(), 4);
    }

    #[test]
    fn invalid_utf8_text_is_replaced_not_dropped() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (email TEXT, name TEXT);
             INSERT INTO users VALUES ('a@x.io', CAST(x'41ff42' AS TEXT));",
        )
        .unwrap();
        let store = SourceStore::from_connection(conn);

        let rows = store.read_all("users").unwrap();
        assert_eq!(rows[0].get("name"), Some(&SourceValue::Text("A\u{FFFD}B".into())));
    }

    #[test]
    fn open_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceStore::open(&dir.path().join("missing.db")).err().unwrap();
        assert!(matches!(err, Error::Source(_)));
        assert!(!dir.path().join("missing.db").exists());
    }

    #[test]
    fn open_fails_for_non_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![b'x'; 4096]).unwrap();
        assert!(SourceStore::open(&path).is_err());
    }

    #[test]
    fn open_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fest.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE fests (fest_id TEXT); INSERT INTO fests VALUES ('f1');")
                .unwrap();
        }
        let store = SourceStore::open(&path).unwrap();
        assert_eq!(store.row_count("fests").unwrap(), 1);
    }
}

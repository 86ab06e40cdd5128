//! SQLite driver built on rusqlite. The `database` connection parameter is a
//! file path (or `:memory:`); host, port and credentials are ignored.

use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OpenFlags, Row};

use super::{ProfileBackend, DELETE_PROFILE, INSERT_PROFILE, SELECT_PROFILES, UPDATE_PROFILE};
use crate::error::StoreError;
use crate::models::{CustomerProfile, ProfileFields};

/// Path rusqlite treats as a private in-memory database.
const IN_MEMORY: &str = ":memory:";

/// Session against a local SQLite file.
pub(crate) struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open an existing database file. The file is never created and the
    /// schema is never touched, matching how the MySQL driver behaves.
    pub(crate) fn open(path: &str) -> Result<Self, StoreError> {
        let conn = if path == IN_MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        }
        .map_err(|err| StoreError::Connection(err.to_string()))?;

        // SQLite opens lazily; reading the header here turns "not a database"
        // into a connect-time failure instead of a surprise on first query.
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(|err| StoreError::Connection(err.to_string()))?;

        Ok(Self { conn })
    }
}

impl ProfileBackend for SqliteBackend {
    fn list(&mut self) -> Result<Vec<CustomerProfile>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(SELECT_PROFILES)
            .map_err(|err| classify(err, "fetching data"))?;

        let profiles = stmt
            .query_map([], profile_from_row)
            .map_err(|err| classify(err, "fetching data"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| classify(err, "fetching data"))?;

        Ok(profiles)
    }

    fn insert(&mut self, fields: &ProfileFields) -> Result<i64, StoreError> {
        self.conn
            .execute(
                INSERT_PROFILE,
                params![
                    fields.name,
                    fields.business_name,
                    fields.email,
                    fields.phone,
                    fields.address,
                    fields.description
                ],
            )
            .map_err(|err| classify(err, "adding profile"))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&mut self, id: i64, fields: &ProfileFields) -> Result<u64, StoreError> {
        let updated = self
            .conn
            .execute(
                UPDATE_PROFILE,
                params![
                    fields.name,
                    fields.business_name,
                    fields.email,
                    fields.phone,
                    fields.address,
                    fields.description,
                    id
                ],
            )
            .map_err(|err| classify(err, "updating profile"))?;

        Ok(updated as u64)
    }

    fn delete(&mut self, id: i64) -> Result<u64, StoreError> {
        let deleted = self
            .conn
            .execute(DELETE_PROFILE, params![id])
            .map_err(|err| classify(err, "deleting profile"))?;

        Ok(deleted as u64)
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        self.conn
            .close()
            .map_err(|(_, err)| StoreError::Connection(err.to_string()))
    }
}

/// Map a row by column name so tables carrying extra columns such as
/// `created_at` still load.
fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<CustomerProfile> {
    Ok(CustomerProfile {
        id: row.get("id")?,
        name: text(row, "name")?,
        business_name: text(row, "business_name")?,
        email: text(row, "email")?,
        phone: text(row, "phone")?,
        address: text(row, "address")?,
        description: text(row, "description")?,
    })
}

fn text(row: &Row<'_>, column: &str) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(column)?.unwrap_or_default())
}

/// Split SQLite failures into "the file is unusable" and "this statement
/// failed".
fn classify(err: SqlError, action: &'static str) -> StoreError {
    match err.sqlite_error_code() {
        Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::SystemIoFailure) => {
            StoreError::Connection(err.to_string())
        }
        _ => StoreError::query(action, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_with_schema(schema: &str) -> SqliteBackend {
        let backend = SqliteBackend::open(IN_MEMORY).unwrap();
        backend.conn.execute_batch(schema).unwrap();
        backend
    }

    const SCHEMA: &str = "CREATE TABLE customer_profiles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        business_name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT,
        address TEXT,
        description TEXT
    )";

    #[test]
    fn null_optional_columns_read_as_empty() {
        let mut backend = backend_with_schema(SCHEMA);
        backend
            .conn
            .execute(
                "INSERT INTO customer_profiles (name, business_name, email) VALUES ('a', 'b', 'c')",
                [],
            )
            .unwrap();

        let rows = backend.list().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].phone, "");
        assert_eq!(rows[0].description, "");
    }

    #[test]
    fn missing_table_is_a_query_error() {
        let mut backend = SqliteBackend::open(IN_MEMORY).unwrap();
        let err = backend.list().unwrap_err();
        match err {
            StoreError::Query { action, .. } => assert_eq!(action, "fetching data"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_database_file_fails_at_connect() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), vec![b'x'; 4096]).unwrap();
        let err = SqliteBackend::open(&file.path().to_string_lossy()).err().unwrap();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}

//! MySQL driver built on sqlx. Only compiled with the `mysql` feature.
//!
//! sqlx is async, so each handle carries its own current-thread tokio
//! runtime and blocks on every statement. That keeps the store API
//! synchronous for the TUI and the CLI.

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{ConnectOptions, Connection, Row};
use tokio::runtime::{Builder, Runtime};

use super::{
    ConnectionParams, ProfileBackend, DELETE_PROFILE, INSERT_PROFILE, SELECT_PROFILES,
    UPDATE_PROFILE,
};
use crate::error::StoreError;
use crate::models::{CustomerProfile, ProfileFields};

/// Session against a MySQL server. The handle owns a single connection (no
/// pool) plus a current-thread runtime so every call blocks until the server
/// answers.
pub(crate) struct MySqlBackend {
    runtime: Runtime,
    conn: MySqlConnection,
}

impl MySqlBackend {
    /// Connect with the given credentials. Failures are reported as-is and
    /// never retried.
    pub(crate) fn open(params: &ConnectionParams) -> Result<Self, StoreError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| StoreError::Connection(format!("failed to start runtime: {err}")))?;

        let options = MySqlConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .username(&params.user)
            .password(&params.password)
            .database(&params.database);

        let conn = runtime
            .block_on(options.connect())
            .map_err(|err| StoreError::Connection(err.to_string()))?;

        Ok(Self { runtime, conn })
    }
}

impl ProfileBackend for MySqlBackend {
    fn list(&mut self) -> Result<Vec<CustomerProfile>, StoreError> {
        let rows = self
            .runtime
            .block_on(sqlx::query(SELECT_PROFILES).fetch_all(&mut self.conn))
            .map_err(|err| classify(err, "fetching data"))?;

        rows.iter()
            .map(profile_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| classify(err, "fetching data"))
    }

    fn insert(&mut self, fields: &ProfileFields) -> Result<i64, StoreError> {
        let result = self
            .runtime
            .block_on(
                sqlx::query(INSERT_PROFILE)
                    .bind(&fields.name)
                    .bind(&fields.business_name)
                    .bind(&fields.email)
                    .bind(&fields.phone)
                    .bind(&fields.address)
                    .bind(&fields.description)
                    .execute(&mut self.conn),
            )
            .map_err(|err| classify(err, "adding profile"))?;

        i64::try_from(result.last_insert_id())
            .map_err(|err| StoreError::query("adding profile", err.to_string()))
    }

    fn update(&mut self, id: i64, fields: &ProfileFields) -> Result<u64, StoreError> {
        let result = self
            .runtime
            .block_on(
                sqlx::query(UPDATE_PROFILE)
                    .bind(&fields.name)
                    .bind(&fields.business_name)
                    .bind(&fields.email)
                    .bind(&fields.phone)
                    .bind(&fields.address)
                    .bind(&fields.description)
                    .bind(id)
                    .execute(&mut self.conn),
            )
            .map_err(|err| classify(err, "updating profile"))?;

        Ok(result.rows_affected())
    }

    fn delete(&mut self, id: i64) -> Result<u64, StoreError> {
        let result = self
            .runtime
            .block_on(sqlx::query(DELETE_PROFILE).bind(id).execute(&mut self.conn))
            .map_err(|err| classify(err, "deleting profile"))?;

        Ok(result.rows_affected())
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        let MySqlBackend { runtime, conn } = *self;
        runtime
            .block_on(conn.close())
            .map_err(|err| StoreError::Connection(err.to_string()))
    }
}

/// Rows are read by column name; extra columns are ignored.
fn profile_from_row(row: &MySqlRow) -> Result<CustomerProfile, sqlx::Error> {
    Ok(CustomerProfile {
        id: read_id(row)?,
        name: text(row, "name")?,
        business_name: text(row, "business_name")?,
        email: text(row, "email")?,
        phone: text(row, "phone")?,
        address: text(row, "address")?,
        description: text(row, "description")?,
    })
}

/// `id` may be declared signed or `UNSIGNED`; accept both.
fn read_id(row: &MySqlRow) -> Result<i64, sqlx::Error> {
    match row.try_get::<i64, _>("id") {
        Ok(id) => Ok(id),
        Err(signed_err) => {
            let id = row.try_get::<u64, _>("id").map_err(|_| signed_err)?;
            i64::try_from(id).map_err(|err| sqlx::Error::Decode(Box::new(err)))
        }
    }
}

fn text(row: &MySqlRow, column: &str) -> Result<String, sqlx::Error> {
    Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
}

/// Transport failures end the session; anything the server answered is a
/// per-statement failure.
fn classify(err: sqlx::Error, action: &'static str) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
        other => StoreError::query(action, other.to_string()),
    }
}

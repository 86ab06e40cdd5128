use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::{info, warn};

use super::ProfileBackend;
use crate::error::StoreError;

/// Host pre-filled in the connect form.
pub const DEFAULT_HOST: &str = "localhost";
/// MySQL's standard port; the secrets file may override it.
pub const DEFAULT_PORT: u16 = 3306;

/// Which client library opens the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// MySQL wire protocol through sqlx.
    #[default]
    Mysql,
    /// Local SQLite file through rusqlite. `database` is the file path.
    Sqlite,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Mysql => write!(f, "mysql"),
            Driver::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Everything needed to open a session.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub driver: Driver,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionParams {
    /// Parameters for a SQLite file; the network fields are left at their
    /// defaults and ignored.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            driver: Driver::Sqlite,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: String::new(),
            password: String::new(),
            database: path.into(),
        }
    }

    /// Short label for logs and the UI header. Never includes the password.
    pub fn describe(&self) -> String {
        match self.driver {
            Driver::Mysql => format!(
                "mysql://{}@{}:{}/{}",
                self.user, self.host, self.port, self.database
            ),
            Driver::Sqlite => format!("sqlite:{}", self.database),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Opaque reference to an open database session. Dropping it releases the
/// underlying connection; [`Handle::close`] does so explicitly and reports
/// driver errors.
pub struct Handle {
    pub(crate) backend: Box<dyn ProfileBackend>,
    label: String,
}

impl Handle {
    /// Where this handle points, e.g. `mysql://app@localhost:3306/crm`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wrap an already open backend.
    #[cfg(test)]
    pub(crate) fn from_backend(backend: Box<dyn ProfileBackend>, label: impl Into<String>) -> Self {
        Self {
            backend,
            label: label.into(),
        }
    }

    /// Release the session. Consuming `self` rules out a second close.
    pub fn close(self) -> Result<(), StoreError> {
        let label = self.label;
        match self.backend.close() {
            Ok(()) => {
                info!(db = %label, "closed database session");
                Ok(())
            }
            Err(err) => {
                warn!(db = %label, error = %err, "error while closing database session");
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("label", &self.label).finish()
    }
}

/// Open a session for `params`. Failures carry the driver's own message and
/// are never retried.
pub fn connect(params: &ConnectionParams) -> Result<Handle, StoreError> {
    let label = params.describe();
    info!(db = %label, "opening database session");

    let backend: Result<Box<dyn ProfileBackend>, StoreError> = match params.driver {
        Driver::Sqlite => super::sqlite::SqliteBackend::open(&params.database)
            .map(|backend| Box::new(backend) as Box<dyn ProfileBackend>),
        Driver::Mysql => open_mysql(params),
    };

    match backend {
        Ok(backend) => {
            info!(db = %label, "database session established");
            Ok(Handle { backend, label })
        }
        Err(err) => {
            warn!(db = %label, error = %err, "failed to open database session");
            Err(err)
        }
    }
}

#[cfg(feature = "mysql")]
fn open_mysql(params: &ConnectionParams) -> Result<Box<dyn ProfileBackend>, StoreError> {
    super::mysql::MySqlBackend::open(params)
        .map(|backend| Box::new(backend) as Box<dyn ProfileBackend>)
}

#[cfg(not(feature = "mysql"))]
fn open_mysql(_params: &ConnectionParams) -> Result<Box<dyn ProfileBackend>, StoreError> {
    Err(StoreError::Connection(
        "this build was compiled without MySQL support".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_password() {
        let params = ConnectionParams {
            driver: Driver::Mysql,
            host: "db.internal".into(),
            port: 3307,
            user: "crm".into(),
            password: "hunter2".into(),
            database: "profiles".into(),
        };
        let rendered = format!("{params:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
        assert_eq!(params.describe(), "mysql://crm@db.internal:3307/profiles");
    }

    #[test]
    fn sqlite_connect_failure_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("profiles.sqlite");
        let params = ConnectionParams::sqlite(missing.to_string_lossy());
        let err = connect(&params).unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}

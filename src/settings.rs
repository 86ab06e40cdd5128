//! Connection settings gathered from the secrets file, the environment and
//! the command line, in increasing order of precedence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;
use tracing::{debug, info};

use crate::db::{ConnectionParams, Driver, DEFAULT_HOST, DEFAULT_PORT};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".customer-profiles";
/// Secrets file looked up inside the data directory when `--secrets` is not
/// given.
const SECRETS_FILE_NAME: &str = "secrets.toml";
/// Log folder inside the data directory.
const LOG_DIR_NAME: &str = "logs";
/// Prefix for environment overrides, e.g. `PROFILES_DB_HOST`.
pub const ENV_PREFIX: &str = "PROFILES_DB_";

/// Connection fields that may or may not be known yet. Every source
/// produces one of these and they are layered with [`ConnectionDraft::overlay`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionDraft {
    pub driver: Option<Driver>,
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(alias = "username")]
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl ConnectionDraft {
    /// Fields set in `other` replace the ones in `self`.
    pub fn overlay(self, other: ConnectionDraft) -> ConnectionDraft {
        ConnectionDraft {
            driver: other.driver.or(self.driver),
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            user: other.user.or(self.user),
            password: other.password.or(self.password),
            database: other.database.or(self.database),
        }
    }

    pub fn driver(&self) -> Driver {
        self.driver.unwrap_or_default()
    }

    /// Fill the gaps with defaults, without checking completeness.
    pub fn with_defaults(&self) -> ConnectionParams {
        ConnectionParams {
            driver: self.driver(),
            host: self
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            user: self.user.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            database: self.database.clone().unwrap_or_default(),
        }
    }

    /// Parameters when every field the driver needs is present and non-empty.
    /// SQLite only needs the database path; MySQL needs host, user, password
    /// and database.
    pub fn complete(&self) -> Option<ConnectionParams> {
        let params = self.with_defaults();
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        let ready = match params.driver {
            Driver::Sqlite => filled(&self.database),
            Driver::Mysql => {
                filled(&self.host)
                    && filled(&self.user)
                    && filled(&self.password)
                    && filled(&self.database)
            }
        };
        ready.then_some(params)
    }
}

impl From<&ConnectionParams> for ConnectionDraft {
    fn from(params: &ConnectionParams) -> Self {
        ConnectionDraft {
            driver: Some(params.driver),
            host: Some(params.host.clone()),
            port: Some(params.port),
            user: Some(params.user.clone()),
            password: Some(params.password.clone()),
            database: Some(params.database.clone()),
        }
    }
}

/// Layout of the secrets file. Both the flat `[mysql]` table and the
/// `[connections.mysql]` table are understood; the flat one wins.
#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    mysql: Option<ConnectionDraft>,
    connections: Option<ConnectionsTable>,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectionsTable {
    mysql: Option<ConnectionDraft>,
}

/// Parse secrets from TOML text.
pub fn parse_secrets(content: &str) -> Result<ConnectionDraft> {
    let file: SecretsFile =
        toml::from_str(content).context("failed to parse secrets file (invalid TOML)")?;
    let nested = file
        .connections
        .and_then(|connections| connections.mysql)
        .unwrap_or_default();
    Ok(nested.overlay(file.mysql.unwrap_or_default()))
}

/// Read the secrets file. A missing default file is fine; a missing file the
/// user asked for explicitly is an error.
pub fn load_secrets(path: &Path, explicit: bool) -> Result<ConnectionDraft> {
    if !path.exists() {
        if explicit {
            bail!("secrets file not found at {}", path.display());
        }
        debug!(path = %path.display(), "no secrets file; skipping");
        return Ok(ConnectionDraft::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read secrets file {}", path.display()))?;
    info!(path = %path.display(), "loaded connection secrets");
    parse_secrets(&content)
}

/// Read `PROFILES_DB_*` variables from an arbitrary key/value source.
pub fn draft_from_vars<I>(vars: I) -> Result<ConnectionDraft>
where
    I: IntoIterator<Item = (String, String)>,
{
    envy::prefixed(ENV_PREFIX)
        .from_iter(vars)
        .context("invalid PROFILES_DB_* environment variable")
}

/// Load `.env` (if any) into the process environment, then read the
/// `PROFILES_DB_*` overrides.
pub fn load_env() -> Result<ConnectionDraft> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env file");
    }
    draft_from_vars(std::env::vars())
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: ConnectionDraft,
    pub log_dir: PathBuf,
}

impl Settings {
    /// Layer secrets file, environment and command-line values.
    pub fn load(
        secrets_path: Option<&Path>,
        cli: ConnectionDraft,
        log_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let secrets = match secrets_path {
            Some(path) => load_secrets(path, true)?,
            None => match data_dir() {
                Ok(dir) => load_secrets(&dir.join(SECRETS_FILE_NAME), false)?,
                Err(_) => ConnectionDraft::default(),
            },
        };
        let env = load_env()?;

        let log_dir = match log_dir {
            Some(dir) => dir,
            None => default_log_dir()?,
        };

        Ok(Self {
            connection: secrets.overlay(env).overlay(cli),
            log_dir,
        })
    }
}

/// `~/.customer-profiles/logs`, used when `--log-dir` is not given.
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join(LOG_DIR_NAME))
}

/// Resolve `~/.customer-profiles`.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

//! Customer profile manager: a small CRUD service over one `customer_profiles`
//! table, driven from a ratatui front-end or headless subcommands.
pub mod cli;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod search;
pub mod session;
pub mod settings;
pub mod ui;

/// Store operations and the connection manager.
pub use db::{
    connect, delete_profile, insert_profile, list_profiles, update_profile, ConnectionParams,
    Driver, Handle,
};

pub use error::StoreError;
pub use models::{CustomerProfile, ProfileFields};
pub use search::filter_profiles;
pub use session::{CommandOutcome, ProfileCommand, Session};
pub use settings::{ConnectionDraft, Settings};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

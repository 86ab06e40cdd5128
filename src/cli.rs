//! Command-line surface. Without a subcommand the terminal UI starts; the
//! other subcommands run one profile command against the store and exit.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::db::Driver;
use crate::models::{CustomerProfile, ProfileFields, PROFILE_COLUMNS};
use crate::search::filter_profiles;
use crate::session::{CommandOutcome, ProfileCommand, Session};
use crate::settings::ConnectionDraft;

#[derive(Parser, Debug)]
#[command(
    name = "customer-profiles",
    version,
    about = "Manage customer business profiles stored in MySQL or SQLite"
)]
pub struct Cli {
    /// Secrets file with a [mysql] table (defaults to ~/.customer-profiles/secrets.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub secrets: Option<PathBuf>,

    /// Directory for rolling log files (defaults to ~/.customer-profiles/logs)
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Connection overrides; anything given here wins over the secrets file and
/// the environment.
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Database driver
    #[arg(long, global = true, value_enum)]
    pub driver: Option<Driver>,

    /// Database host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Database port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Database user
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Database password
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Database name, or the file path for SQLite
    #[arg(long, global = true)]
    pub database: Option<String>,
}

impl ConnectionArgs {
    pub fn to_draft(&self) -> ConnectionDraft {
        ConnectionDraft {
            driver: self.driver,
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive terminal UI (default)
    Tui,

    /// Print every profile as tab-separated rows
    List {
        /// Only print rows where some field contains this text (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Add a new profile and print its id
    Add(ProfileArgs),

    /// Overwrite every field of an existing profile
    Update {
        /// Profile id to overwrite
        #[arg(long)]
        id: i64,

        #[command(flatten)]
        fields: ProfileArgs,
    },

    /// Delete a profile by id
    Delete {
        /// Profile id to delete
        #[arg(long)]
        id: i64,
    },
}

/// The six editable profile fields. Omitted optional fields are stored empty.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Contact name (required)
    #[arg(long)]
    pub name: String,

    /// Business name (required)
    #[arg(long)]
    pub business_name: String,

    /// Contact email (required)
    #[arg(long)]
    pub email: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    #[arg(long, default_value = "")]
    pub address: String,

    #[arg(long, default_value = "")]
    pub description: String,
}

impl From<ProfileArgs> for ProfileFields {
    fn from(args: ProfileArgs) -> Self {
        ProfileFields {
            name: args.name,
            business_name: args.business_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            description: args.description,
        }
    }
}

/// Run one headless command against a connected session, writing results to
/// `out`.
pub fn run_command<W: Write>(session: &mut Session, command: Commands, out: &mut W) -> Result<()> {
    match command {
        Commands::Tui => Ok(()),
        Commands::List { search } => {
            let profiles = match session.dispatch(ProfileCommand::ListRequested)? {
                CommandOutcome::Listed(profiles) => profiles,
                _ => Vec::new(),
            };
            let shown = match search.as_deref() {
                Some(term) => filter_profiles(&profiles, term),
                None => profiles,
            };
            write_listing(out, &shown)
        }
        Commands::Add(args) => {
            let fields = ProfileFields::from(args);
            fields.validate_required()?;
            if let CommandOutcome::Inserted(id) =
                session.dispatch(ProfileCommand::InsertRequested(fields))?
            {
                writeln!(out, "{id}").context("failed to write output")?;
            }
            Ok(())
        }
        Commands::Update { id, fields } => {
            session.dispatch(ProfileCommand::UpdateRequested(id, fields.into()))?;
            writeln!(out, "Updated profile {id}").context("failed to write output")
        }
        Commands::Delete { id } => {
            session.dispatch(ProfileCommand::DeleteRequested(id))?;
            writeln!(out, "Deleted profile {id}").context("failed to write output")
        }
    }
}

fn write_listing<W: Write>(out: &mut W, profiles: &[CustomerProfile]) -> Result<()> {
    writeln!(out, "{}", PROFILE_COLUMNS.join("\t")).context("failed to write output")?;
    for profile in profiles {
        let row: Vec<String> = profile
            .column_values()
            .iter()
            .map(|value| escape_cell(value))
            .collect();
        writeln!(out, "{}", row.join("\t")).context("failed to write output")?;
    }
    Ok(())
}

/// Keep each profile on one line of tab-separated output.
fn escape_cell(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace("\r\n", "\n")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

//! Binary entry point: start logging, resolve settings, then either run the
//! TUI or a single headless command.
use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use customer_profiles::cli::{run_command, Cli, Commands};
use customer_profiles::{logging, run_app, settings, App, Session, Settings};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging comes first so settings resolution is recorded too.
    let log_dir = match cli.log_dir.clone() {
        Some(dir) => dir,
        None => settings::default_log_dir()?,
    };
    let _guard = logging::init(&log_dir)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting customer-profiles");

    let settings = Settings::load(
        cli.secrets.as_deref(),
        cli.connection.to_draft(),
        Some(log_dir),
    )?;

    match cli.command {
        None | Some(Commands::Tui) => {
            let mut app = App::new(&settings);
            run_app(&mut app)
        }
        Some(command) => {
            let params = settings.connection.complete().context(
                "missing connection settings; pass --database (and --host/--user/--password for MySQL) or provide a secrets file",
            )?;

            let mut session = Session::default();
            session.connect(&params)?;

            let stdout = io::stdout();
            let result = run_command(&mut session, command, &mut stdout.lock());
            if let Err(err) = &result {
                error!(error = %err, "command failed");
            }
            session.close();
            result
        }
    }
}
